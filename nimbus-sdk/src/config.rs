//! Client configuration. Read-only after construction; every resource
//! operation sees the same credentials, region and platform.

use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.nimbuscloud.io";

/// Platform generation of the cloud API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// First-generation API (`server` service).
    Classic,
    /// VPC-generation API (`vserver`, `vmysql` services).
    Vpc,
}

impl Platform {
    pub fn supports_vpc(self) -> bool {
        matches!(self, Platform::Vpc)
    }
}

/// API service families, each with its own URL prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Server,
    Vserver,
    Vmysql,
    Sourcebuild,
}

impl Service {
    /// URL prefix under the API gateway, also the signed portion of the path.
    pub fn prefix(self) -> &'static str {
        match self {
            Service::Server => "/server/v2",
            Service::Vserver => "/vserver/v2",
            Service::Vmysql => "/vmysql/v2",
            Service::Sourcebuild => "/sourcebuild/v1",
        }
    }
}

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub access_key: String,
    pub secret_key: String,
    pub region_code: String,
    pub platform: Platform,
    /// Gateway base URL override (no trailing slash). Used by tests to point
    /// at a local mock.
    pub base_url: Option<String>,
}

impl Config {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region_code: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region_code: region_code.into(),
            platform,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub(crate) fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}
