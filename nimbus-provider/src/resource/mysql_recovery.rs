//! MySQL recovery server resource. VPC-only.
//!
//! A recovery server is not a top-level API object: it is created under an
//! existing MySQL instance and only ever appears inside the parent's server
//! list. The handler resolves it there by name right after create, then by
//! server instance number. A missing parent means the recovery server is
//! gone too.
//!
//! Because the parent is needed for every lookup, the resource id is the
//! composite `parent_no:server_no`; a bare server number is still accepted
//! when the attribute map carries `mysql_instance_no`.

use serde::Serialize;
use tracing::info;

use nimbus_sdk::{codes, vmysql};

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::retry::retry_on_codes;
use crate::schema::{Attr, AttrKind, Schema};
use crate::waiter::{Refresh, StateMachine};

pub const TYPE: &str = "nimbus_mysql_recovery";

pub fn schema() -> Schema {
    Schema::new()
        .attr("mysql_instance_no", Attr::required(AttrKind::String))
        .attr("recovery_server_name", Attr::required(AttrKind::String))
        .attr(
            "file_name",
            Attr::optional(AttrKind::String).conflicts_with(&["recovery_time"]),
        )
        .attr(
            "recovery_time",
            Attr::optional(AttrKind::String).conflicts_with(&["file_name"]),
        )
        .attr("server_instance_no", Attr::computed(AttrKind::String))
        .attr("status_name", Attr::computed(AttrKind::String))
        .attr("subnet_no", Attr::computed(AttrKind::String))
        .attr("vpc_no", Attr::computed(AttrKind::String))
        .attr("private_domain", Attr::computed(AttrKind::String))
        .attr("public_domain", Attr::computed(AttrKind::String))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecoveryServer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_instance_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_domain: Option<String>,
}

impl RecoveryServer {
    fn from_wire(server: &vmysql::CloudMysqlServerInstance) -> Self {
        Self {
            server_instance_no: server.cloud_mysql_server_instance_no.clone(),
            recovery_server_name: server.cloud_mysql_server_name.clone(),
            status_name: server.cloud_mysql_server_instance_status_name.clone(),
            subnet_no: server.subnet_no.clone(),
            vpc_no: server.vpc_no.clone(),
            private_domain: server.private_domain.clone(),
            public_domain: server.public_domain.clone(),
        }
    }
}

fn create_machine() -> StateMachine {
    StateMachine::builder()
        .transition("creating", "settingUp")
        .transition("creating", "running")
        .transition("settingUp", "running")
        .terminal("running")
        .build()
}

fn delete_machine() -> StateMachine {
    StateMachine::builder()
        .transition("running", "deleting")
        .transition("deleting", "deleted")
        .transition("running", "deleted")
        .gone("deleted")
        .build()
}

pub async fn create(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    provider.require_vpc(TYPE)?;
    schema().validate(data)?;

    let parent_no = required(data, "mysql_instance_no")?;
    let name = required(data, "recovery_server_name")?;

    let req = vmysql::CreateCloudMysqlRecoveryInstanceRequest {
        region_code: provider.region().to_string(),
        cloud_mysql_instance_no: parent_no.clone(),
        cloud_mysql_recovery_server_name: name.clone(),
        file_name: data.get_string("file_name"),
        recovery_time: data.get_string("recovery_time"),
    };
    provider
        .client()
        .vmysql()
        .create_cloud_mysql_recovery_instance(&req)
        .await?;
    info!(parent = %parent_no, name = %name, "recovery server requested, waiting for running");

    let server = provider
        .create_waiter()
        .wait(&create_machine(), async || {
            refresh_by_name(provider, &parent_no, &name).await
        })
        .await?
        .ok_or_else(|| ProviderError::NotFound {
            resource: TYPE,
            id: name.clone(),
        })?;

    let server_no = server.server_instance_no.clone().ok_or_else(|| {
        ProviderError::InvalidAttributes(
            "recovery server settled without an instance number".to_string(),
        )
    })?;
    data.set_id(format!("{parent_no}:{server_no}"));
    read(provider, data).await
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    provider.require_vpc(TYPE)?;
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(());
    };
    let (parent_no, server_no) = parse_id(data, &id)?;

    match find_by_no(provider, &parent_no, &server_no).await? {
        None => {
            data.clear_id();
            Ok(())
        }
        Some(server) => {
            data.set("mysql_instance_no", parent_no);
            data.merge_flat(&server)
        }
    }
}

pub async fn update(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    read(provider, data).await
}

pub async fn delete(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    provider.require_vpc(TYPE)?;
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(());
    };
    let (parent_no, server_no) = parse_id(data, &id)?;

    let settings = *provider.settings();
    let region = provider.region().to_string();
    retry_on_codes(
        &[codes::OBJECT_IN_OPERATION],
        settings.delete_timeout,
        settings.retry_delay,
        async || {
            let req = vmysql::DeleteCloudMysqlServerInstanceRequest {
                region_code: region.clone(),
                cloud_mysql_server_instance_no: server_no.clone(),
            };
            match provider
                .client()
                .vmysql()
                .delete_cloud_mysql_server_instance(&req)
                .await
            {
                Ok(_) => Ok(()),
                // Parent already destroyed: nothing left to delete.
                Err(err) if err.return_code() == Some(codes::MYSQL_INSTANCE_NOT_FOUND) => Ok(()),
                Err(err) => Err(err.into()),
            }
        },
    )
    .await?;
    info!(id = %id, "recovery server delete accepted, waiting for removal");

    provider
        .delete_waiter()
        .wait(&delete_machine(), async || {
            refresh_by_no(provider, &parent_no, &server_no).await
        })
        .await?;

    data.clear_id();
    Ok(())
}

async fn find_by_no(
    provider: &Provider,
    parent_no: &str,
    server_no: &str,
) -> Result<Option<RecoveryServer>> {
    let Some(parent) = super::mysql::get(provider, parent_no).await? else {
        return Ok(None);
    };
    Ok(parent
        .cloud_mysql_server_instance_list
        .iter()
        .find(|s| s.cloud_mysql_server_instance_no.as_deref() == Some(server_no))
        .map(RecoveryServer::from_wire))
}

async fn refresh_by_no(
    provider: &Provider,
    parent_no: &str,
    server_no: &str,
) -> std::result::Result<Refresh<RecoveryServer>, ProviderError> {
    match find_by_no(provider, parent_no, server_no).await? {
        Some(server) => {
            let status = server.status_name.clone().unwrap_or_default();
            Ok(Refresh::Observed(server, status))
        }
        None => Ok(Refresh::Gone),
    }
}

/// Right after create the server has no known instance number yet; it is
/// resolved by name. Until it shows up in the parent's list the lifecycle
/// reads as still `creating`.
async fn refresh_by_name(
    provider: &Provider,
    parent_no: &str,
    name: &str,
) -> std::result::Result<Refresh<RecoveryServer>, ProviderError> {
    let Some(parent) = super::mysql::get(provider, parent_no).await? else {
        return Ok(Refresh::Gone);
    };
    let server = parent
        .cloud_mysql_server_instance_list
        .iter()
        .find(|s| s.cloud_mysql_server_name.as_deref() == Some(name));
    match server {
        Some(server) => {
            let server = RecoveryServer::from_wire(server);
            let status = server.status_name.clone().unwrap_or_default();
            Ok(Refresh::Observed(server, status))
        }
        None => Ok(Refresh::Observed(RecoveryServer::default(), "creating".to_string())),
    }
}

/// Split a composite `parent_no:server_no` id. A bare server number is
/// accepted as long as the attribute map carries `mysql_instance_no`.
fn parse_id(data: &ResourceData, id: &str) -> Result<(String, String)> {
    if let Some((parent_no, server_no)) = id.split_once(':') {
        return Ok((parent_no.to_string(), server_no.to_string()));
    }
    match data.get_string("mysql_instance_no") {
        Some(parent_no) => Ok((parent_no, id.to_string())),
        None => Err(ProviderError::InvalidAttributes(format!(
            "id {id} names no parent instance: use parent_no:server_no or set mysql_instance_no"
        ))),
    }
}

fn required(data: &ResourceData, name: &str) -> Result<String> {
    data.get_string(name)
        .ok_or_else(|| ProviderError::InvalidAttributes(format!("missing attribute {name}")))
}
