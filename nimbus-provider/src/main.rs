//! nimbus: converge Nimbus cloud resource definitions from the command line.
//!
//! `apply` reads a JSON file of definitions and creates each resource in
//! order, `get` refreshes one resource by id, `destroy` tears one down.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nimbus_provider::{Provider, ResourceData, resource};
use nimbus_sdk::{Config, Platform};

/// Nimbus cloud resource provider
#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about)]
struct Args {
    /// API access key
    #[arg(long, env = "NIMBUS_ACCESS_KEY")]
    access_key: String,

    /// API secret key
    #[arg(long, env = "NIMBUS_SECRET_KEY")]
    secret_key: String,

    /// Region code
    #[arg(long, env = "NIMBUS_REGION", default_value = "KR")]
    region: String,

    /// Platform generation
    #[arg(long, env = "NIMBUS_PLATFORM", value_enum, default_value_t = PlatformArg::Vpc)]
    platform: PlatformArg,

    /// API endpoint override
    #[arg(long, env = "NIMBUS_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Classic,
    Vpc,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Classic => Platform::Classic,
            PlatformArg::Vpc => Platform::Vpc,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create every resource in a definitions file
    Apply {
        /// JSON file: a definition object or an array of them
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Refresh one resource's attributes
    Get { type_name: String, id: String },
    /// Destroy one resource
    Destroy { type_name: String, id: String },
}

/// One resource definition from an apply file.
#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    attributes: Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nimbus=info,nimbus_provider=info,nimbus_sdk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::new(
        &args.access_key,
        &args.secret_key,
        &args.region,
        args.platform.into(),
    );
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    let provider = Provider::new(config)?;

    match args.command {
        Command::Apply { file } => apply(&provider, &file).await,
        Command::Get { type_name, id } => {
            let mut data = ResourceData::with_id(id);
            resource::read(&provider, &type_name, &mut data).await?;
            println!("{}", serde_json::to_string_pretty(&data.to_json())?);
            Ok(())
        }
        Command::Destroy { type_name, id } => {
            let mut data = ResourceData::with_id(id.clone());
            resource::delete(&provider, &type_name, &mut data).await?;
            info!(%type_name, %id, "destroyed");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn credentials_come_from_the_environment() {
        // SAFETY: no other test in this binary touches these variables
        unsafe {
            std::env::set_var("NIMBUS_ACCESS_KEY", "env-access");
            std::env::set_var("NIMBUS_SECRET_KEY", "env-secret");
            std::env::set_var("NIMBUS_PLATFORM", "classic");
        }
        let args = Args::try_parse_from(["nimbus", "get", "nimbus_server", "100"]).unwrap();
        assert_eq!(args.access_key, "env-access");
        assert_eq!(args.secret_key, "env-secret");
        assert!(matches!(args.platform, PlatformArg::Classic));
    }
}

async fn apply(provider: &Provider, file: &PathBuf) -> Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let parsed: Value = serde_json::from_str(&raw).context("parsing definitions file")?;

    let definitions: Vec<Definition> = match parsed {
        Value::Array(_) => serde_json::from_value(parsed)?,
        other => vec![serde_json::from_value(other)?],
    };

    for definition in definitions {
        let attributes = match definition.attributes {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let mut data = ResourceData::from_value(attributes)?;
        info!(type_name = %definition.type_name, "applying definition");
        match resource::create(provider, &definition.type_name, &mut data).await {
            Ok(()) => {
                println!("{}", serde_json::to_string_pretty(&data.to_json())?);
            }
            Err(e) => {
                error!(type_name = %definition.type_name, error = %e, "apply failed");
                return Err(e.into());
            }
        }
    }
    Ok(())
}
