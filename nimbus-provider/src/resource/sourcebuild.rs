//! SourceBuild environment data sources. VPC-only.
//!
//! Plain catalog lookups: docker engines, and runtime versions for an
//! (OS, runtime) pair. Filter blocks apply to the flattened rows.

use serde_json::{Map, Value, json};

use nimbus_sdk::IdName;

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::filter::apply_filters;
use crate::provider::Provider;
use crate::schema::{Attr, AttrKind, Schema};

pub const TYPE_DOCKER: &str = "nimbus_sourcebuild_docker_engines";
pub const TYPE_RUNTIME_VERSIONS: &str = "nimbus_sourcebuild_runtime_versions";

pub fn docker_schema() -> Schema {
    Schema::new()
        .attr("filter", Attr::optional(AttrKind::List))
        .attr("docker_engines", Attr::computed(AttrKind::List))
}

pub fn runtime_versions_schema() -> Schema {
    Schema::new()
        .attr("os_id", Attr::required(AttrKind::Int))
        .attr("runtime_id", Attr::required(AttrKind::Int))
        .attr("filter", Attr::optional(AttrKind::List))
        .attr("runtime_versions", Attr::computed(AttrKind::List))
}

pub async fn read_docker(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    provider.require_vpc(TYPE_DOCKER)?;
    // A re-read sees the computed rows from the previous resolution.
    if data.id().is_none() {
        docker_schema().validate(data)?;
    }

    let resp = provider.client().sourcebuild().get_docker_env().await?;
    let rows = apply_filters(&data.filters()?, id_name_rows(&resp.docker))?;

    data.set("docker_engines", Value::Array(rows.into_iter().map(Value::Object).collect()));
    data.set_id(provider.region().to_string());
    Ok(())
}

pub async fn read_runtime_versions(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    provider.require_vpc(TYPE_RUNTIME_VERSIONS)?;
    if data.id().is_none() {
        runtime_versions_schema().validate(data)?;
    }

    let os_id = required_int(data, "os_id")?;
    let runtime_id = required_int(data, "runtime_id")?;

    let resp = provider
        .client()
        .sourcebuild()
        .get_runtime_version_env(os_id, runtime_id)
        .await?;
    let rows = apply_filters(&data.filters()?, id_name_rows(&resp.version))?;

    data.set(
        "runtime_versions",
        Value::Array(rows.into_iter().map(Value::Object).collect()),
    );
    data.set_id(format!("{os_id}-{runtime_id}"));
    Ok(())
}

fn id_name_rows(items: &[IdName]) -> Vec<Map<String, Value>> {
    items
        .iter()
        .map(|item| {
            let mut map = Map::new();
            if let Some(id) = item.id {
                map.insert("id".to_string(), json!(id));
            }
            if let Some(name) = &item.name {
                map.insert("name".to_string(), json!(name));
            }
            map
        })
        .collect()
}

fn required_int(data: &ResourceData, name: &str) -> Result<i64> {
    data.get_i64(name)
        .ok_or_else(|| ProviderError::InvalidAttributes(format!("missing attribute {name}")))
}
