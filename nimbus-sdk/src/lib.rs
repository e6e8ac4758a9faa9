//! Typed REST client for the Nimbus cloud API.
//!
//! The cloud exposes two historical platform generations with separate
//! request/response shapes for logically identical resources:
//! - classic (`server` service)
//! - VPC (`vserver`, `vmysql` services)
//!
//! plus the platform-neutral `sourcebuild` service for build-environment
//! metadata. Each service is reachable through a borrowed sub-client:
//!
//! ```no_run
//! # async fn demo() -> Result<(), nimbus_sdk::ApiError> {
//! use nimbus_sdk::{ApiClient, Config, Platform};
//!
//! let config = Config::new("access", "secret", "KR", Platform::Vpc);
//! let client = ApiClient::new(config)?;
//! let resp = client
//!     .vserver()
//!     .get_block_storage_instance_detail(&Default::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod sign;
mod types;

pub mod codes;
pub mod server;
pub mod sourcebuild;
pub mod vmysql;
pub mod vserver;

pub use client::ApiClient;
pub use config::{Config, Platform, Service};
pub use error::{ApiError, Result};
pub use types::{CommonCode, CommonResponse, IdName, ResponseError};

impl ApiClient {
    /// Classic platform server/storage service.
    pub fn server(&self) -> server::ServerApi<'_> {
        server::ServerApi { client: self }
    }

    /// VPC platform server/storage service.
    pub fn vserver(&self) -> vserver::VserverApi<'_> {
        vserver::VserverApi { client: self }
    }

    /// VPC managed MySQL service.
    pub fn vmysql(&self) -> vmysql::VmysqlApi<'_> {
        vmysql::VmysqlApi { client: self }
    }

    /// SourceBuild build-environment metadata service.
    pub fn sourcebuild(&self) -> sourcebuild::SourcebuildApi<'_> {
        sourcebuild::SourcebuildApi { client: self }
    }
}
