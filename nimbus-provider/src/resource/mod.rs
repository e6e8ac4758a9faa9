//! Per-resource handlers.
//!
//! Each module maps its attribute schema onto SDK calls: build the request
//! from the definition, issue it, wait for the lifecycle to settle, flatten
//! the response back into the attribute map.

pub mod access_control_group;
pub mod block_storage;
pub mod mysql;
pub mod mysql_recovery;
pub mod server_instance;
pub mod sourcebuild;

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;

/// Resource type names accepted in definitions.
pub fn known_types() -> &'static [&'static str] {
    &[
        block_storage::TYPE,
        server_instance::TYPE,
        mysql::TYPE,
        mysql_recovery::TYPE,
        access_control_group::TYPE,
        sourcebuild::TYPE_DOCKER,
        sourcebuild::TYPE_RUNTIME_VERSIONS,
    ]
}

/// Create (or, for data sources, resolve) a resource of the given type.
pub async fn create(provider: &Provider, type_name: &str, data: &mut ResourceData) -> Result<()> {
    match type_name {
        t if t == block_storage::TYPE => block_storage::create(provider, data).await,
        t if t == server_instance::TYPE => server_instance::create(provider, data).await,
        t if t == mysql::TYPE => mysql::create(provider, data).await,
        t if t == mysql_recovery::TYPE => mysql_recovery::create(provider, data).await,
        // Data sources have no create; applying one is a read.
        t if t == access_control_group::TYPE => access_control_group::read(provider, data).await,
        t if t == sourcebuild::TYPE_DOCKER => sourcebuild::read_docker(provider, data).await,
        t if t == sourcebuild::TYPE_RUNTIME_VERSIONS => {
            sourcebuild::read_runtime_versions(provider, data).await
        }
        other => Err(unknown_type(other)),
    }
}

/// Refresh a resource's attributes from the API.
pub async fn read(provider: &Provider, type_name: &str, data: &mut ResourceData) -> Result<()> {
    match type_name {
        t if t == block_storage::TYPE => block_storage::read(provider, data).await,
        t if t == server_instance::TYPE => server_instance::read(provider, data).await,
        t if t == mysql::TYPE => mysql::read(provider, data).await,
        t if t == mysql_recovery::TYPE => mysql_recovery::read(provider, data).await,
        t if t == access_control_group::TYPE => access_control_group::read(provider, data).await,
        t if t == sourcebuild::TYPE_DOCKER => sourcebuild::read_docker(provider, data).await,
        t if t == sourcebuild::TYPE_RUNTIME_VERSIONS => {
            sourcebuild::read_runtime_versions(provider, data).await
        }
        other => Err(unknown_type(other)),
    }
}

/// Converge a resource's attributes in place. No Nimbus attribute is
/// mutable through the API, so for every type this re-reads; data sources
/// re-resolve.
pub async fn update(provider: &Provider, type_name: &str, data: &mut ResourceData) -> Result<()> {
    match type_name {
        t if t == block_storage::TYPE => block_storage::update(provider, data).await,
        t if t == server_instance::TYPE => server_instance::update(provider, data).await,
        t if t == mysql::TYPE => mysql::update(provider, data).await,
        t if t == mysql_recovery::TYPE => mysql_recovery::update(provider, data).await,
        _ => read(provider, type_name, data).await,
    }
}

/// Destroy a resource. Data sources have nothing to destroy.
pub async fn delete(provider: &Provider, type_name: &str, data: &mut ResourceData) -> Result<()> {
    match type_name {
        t if t == block_storage::TYPE => block_storage::delete(provider, data).await,
        t if t == server_instance::TYPE => server_instance::delete(provider, data).await,
        t if t == mysql::TYPE => mysql::delete(provider, data).await,
        t if t == mysql_recovery::TYPE => mysql_recovery::delete(provider, data).await,
        t if t == access_control_group::TYPE
            || t == sourcebuild::TYPE_DOCKER
            || t == sourcebuild::TYPE_RUNTIME_VERSIONS =>
        {
            Ok(())
        }
        other => Err(unknown_type(other)),
    }
}

fn unknown_type(name: &str) -> ProviderError {
    ProviderError::InvalidAttributes(format!(
        "unknown resource type {name}; known types: {}",
        known_types().join(", ")
    ))
}
