//! Managed MySQL resource. VPC-only.
//!
//! The service reports lifecycle through `cloud_mysql_instance_status_name`
//! (`creating`, `settingUp`, `running`, `deleting`). A detail call for an
//! instance that no longer exists fails with return code 5001017; the getter
//! maps that code to absence instead of an error.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use nimbus_sdk::{codes, vmysql};

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::retry::retry_on_codes;
use crate::schema::{Attr, AttrKind, Schema, Validator};
use crate::waiter::{Refresh, StateMachine};

pub const TYPE: &str = "nimbus_mysql";

pub fn schema() -> Schema {
    Schema::new()
        .attr("service_name", Attr::required(AttrKind::String))
        .attr("server_name_prefix", Attr::required(AttrKind::String))
        .attr("user_name", Attr::required(AttrKind::String))
        .attr("user_password", Attr::required(AttrKind::String))
        .attr("host_ip", Attr::required(AttrKind::String))
        .attr("database_name", Attr::required(AttrKind::String))
        .attr("subnet_no", Attr::required(AttrKind::String))
        .attr("is_ha", Attr::optional(AttrKind::Bool))
        .attr("is_multi_zone", Attr::optional(AttrKind::Bool))
        .attr("is_storage_encryption", Attr::optional(AttrKind::Bool))
        .attr("is_backup", Attr::optional(AttrKind::Bool))
        .attr(
            "backup_file_retention_period",
            Attr::optional(AttrKind::Int).validator(Validator::IntBetween(1, 30)),
        )
        .attr("is_automatic_backup", Attr::optional(AttrKind::Bool))
        .attr("backup_time", Attr::optional(AttrKind::String))
        .attr(
            "port",
            Attr::optional(AttrKind::Int).validator(Validator::IntBetween(10000, 20000)),
        )
        .attr("instance_no", Attr::computed(AttrKind::String))
        .attr("engine_version", Attr::computed(AttrKind::String))
        .attr("status_name", Attr::computed(AttrKind::String))
        .attr("vpc_no", Attr::computed(AttrKind::String))
        .attr("server_instances", Attr::computed(AttrKind::List))
}

/// Cross-attribute rules the schema cannot express.
fn validate_backup_attrs(data: &ResourceData) -> Result<()> {
    if data.get_bool("is_multi_zone") == Some(true) && data.get_bool("is_ha") != Some(true) {
        return Err(ProviderError::InvalidAttributes(
            "is_multi_zone requires is_ha".to_string(),
        ));
    }
    if data.get_bool("is_backup") == Some(true)
        && data.get_bool("is_automatic_backup") == Some(false)
        && data.get_string("backup_time").is_none()
    {
        return Err(ProviderError::InvalidAttributes(
            "backup_time is required when is_automatic_backup is false".to_string(),
        ));
    }
    Ok(())
}

/// Flattened view of one MySQL service instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CloudMysql {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ha: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_multi_zone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_storage_encryption: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_file_retention_period: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
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
    validate_backup_attrs(data)?;

    let req = vmysql::CreateCloudMysqlInstanceRequest {
        region_code: provider.region().to_string(),
        cloud_mysql_service_name: required(data, "service_name")?,
        cloud_mysql_server_name_prefix: required(data, "server_name_prefix")?,
        cloud_mysql_user_name: required(data, "user_name")?,
        cloud_mysql_user_password: required(data, "user_password")?,
        host_ip: required(data, "host_ip")?,
        cloud_mysql_database_name: required(data, "database_name")?,
        subnet_no: required(data, "subnet_no")?,
        is_ha: data.get_bool("is_ha"),
        is_multi_zone: data.get_bool("is_multi_zone"),
        is_storage_encryption: data.get_bool("is_storage_encryption"),
        is_backup: data.get_bool("is_backup"),
        backup_file_retention_period: data.get_i64("backup_file_retention_period").map(|v| v as i32),
        is_automatic_backup: data.get_bool("is_automatic_backup"),
        backup_time: data.get_string("backup_time"),
        cloud_mysql_port: data.get_i64("port").map(|v| v as i32),
    };

    let resp = provider.client().vmysql().create_cloud_mysql_instance(&req).await?;
    let id = resp
        .cloud_mysql_instance_list
        .first()
        .and_then(|i| i.cloud_mysql_instance_no.clone())
        .ok_or_else(|| {
            ProviderError::InvalidAttributes("create response carried no instance number".to_string())
        })?;
    data.set_id(id.clone());
    info!(id = %id, "mysql instance created, waiting for running");

    provider
        .create_waiter()
        .wait(&create_machine(), async || refresh(provider, &id).await)
        .await?;

    read(provider, data).await
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    provider.require_vpc(TYPE)?;
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(());
    };

    match get(provider, &id).await? {
        None => {
            data.clear_id();
            Ok(())
        }
        Some(instance) => {
            let servers: Vec<_> = instance
                .cloud_mysql_server_instance_list
                .iter()
                .map(|s| {
                    json!({
                        "server_instance_no": s.cloud_mysql_server_instance_no,
                        "name": s.cloud_mysql_server_name,
                        "role": s.cloud_mysql_server_role.as_ref().and_then(|c| c.code.clone()),
                        "status_name": s.cloud_mysql_server_instance_status_name,
                        "subnet_no": s.subnet_no,
                        "vpc_no": s.vpc_no,
                        "private_domain": s.private_domain,
                        "public_domain": s.public_domain,
                    })
                })
                .collect();
            data.set("server_instances", servers);
            if let Some(vpc_no) = instance
                .cloud_mysql_server_instance_list
                .first()
                .and_then(|s| s.vpc_no.clone())
            {
                data.set("vpc_no", vpc_no);
            }
            data.merge_flat(&flatten(&instance))
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

    let settings = *provider.settings();
    let region = provider.region().to_string();
    retry_on_codes(
        &[codes::OBJECT_IN_OPERATION],
        settings.delete_timeout,
        settings.retry_delay,
        async || {
            let req = vmysql::DeleteCloudMysqlInstanceRequest {
                region_code: region.clone(),
                cloud_mysql_instance_no: id.clone(),
            };
            provider.client().vmysql().delete_cloud_mysql_instance(&req).await?;
            Ok(())
        },
    )
    .await?;
    info!(id = %id, "mysql delete accepted, waiting for removal");

    provider
        .delete_waiter()
        .wait(&delete_machine(), async || refresh(provider, &id).await)
        .await?;

    data.clear_id();
    Ok(())
}

/// Detail lookup that maps "instance not found" (5001017) to absence.
pub(crate) async fn get(
    provider: &Provider,
    id: &str,
) -> Result<Option<vmysql::CloudMysqlInstance>> {
    let req = vmysql::GetCloudMysqlInstanceDetailRequest {
        region_code: provider.region().to_string(),
        cloud_mysql_instance_no: id.to_string(),
    };
    match provider.client().vmysql().get_cloud_mysql_instance_detail(&req).await {
        Ok(resp) => Ok(resp.cloud_mysql_instance_list.into_iter().next()),
        Err(err) if err.return_code() == Some(codes::MYSQL_INSTANCE_NOT_FOUND) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn flatten(instance: &vmysql::CloudMysqlInstance) -> CloudMysql {
    CloudMysql {
        instance_no: instance.cloud_mysql_instance_no.clone(),
        service_name: instance.cloud_mysql_service_name.clone(),
        status_name: instance.cloud_mysql_instance_status_name.clone(),
        engine_version: instance.engine_version.clone(),
        is_ha: instance.is_ha,
        is_multi_zone: instance.is_multi_zone,
        is_storage_encryption: instance.is_storage_encryption,
        is_backup: instance.is_backup,
        backup_file_retention_period: instance.backup_file_retention_period,
        backup_time: instance.backup_time.clone(),
        port: instance.cloud_mysql_port,
    }
}

async fn refresh(
    provider: &Provider,
    id: &str,
) -> std::result::Result<Refresh<vmysql::CloudMysqlInstance>, ProviderError> {
    match get(provider, id).await? {
        Some(instance) => {
            let status = instance
                .cloud_mysql_instance_status_name
                .clone()
                .unwrap_or_default();
            Ok(Refresh::Observed(instance, status))
        }
        None => Ok(Refresh::Gone),
    }
}

fn required(data: &ResourceData, name: &str) -> Result<String> {
    data.get_string(name)
        .ok_or_else(|| ProviderError::InvalidAttributes(format!("missing attribute {name}")))
}
