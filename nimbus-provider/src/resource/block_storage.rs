//! Block storage resource.
//!
//! Create attaches the new storage to a server instance and waits for the
//! `ATTAC` status; delete retries while the volume is still detaching
//! (return code 24002) and waits until the API stops reporting it.

use std::sync::Arc;

use async_trait::async_trait;
use nimbus_sdk::{ApiClient, Platform, codes, server, vserver};
use serde::Serialize;
use tracing::info;

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::retry::retry_on_codes;
use crate::schema::{Attr, AttrKind, Schema, Validator};
use crate::waiter::{Refresh, StateMachine};

pub const TYPE: &str = "nimbus_block_storage";

const GIB: i64 = 1 << 30;

pub fn schema() -> Schema {
    Schema::new()
        .attr("server_instance_no", Attr::required(AttrKind::String))
        .attr(
            "size",
            Attr::required(AttrKind::Int).validator(Validator::IntBetween(10, 1000)),
        )
        .attr("name", Attr::optional(AttrKind::String))
        .attr("description", Attr::optional(AttrKind::String))
        .attr("disk_detail_type", Attr::optional(AttrKind::String))
        .attr("zone", Attr::optional(AttrKind::String))
        .attr("snapshot_no", Attr::optional(AttrKind::String))
        .attr("block_storage_no", Attr::computed(AttrKind::String))
        .attr("server_name", Attr::computed(AttrKind::String))
        .attr("type", Attr::computed(AttrKind::String))
        .attr("device_name", Attr::computed(AttrKind::String))
        .attr("product_code", Attr::computed(AttrKind::String))
        .attr("status", Attr::computed(AttrKind::String))
        .attr("operation", Attr::computed(AttrKind::String))
        .attr("status_name", Attr::computed(AttrKind::String))
        .attr("disk_type", Attr::computed(AttrKind::String))
        .attr(
            "instance_status",
            Attr::computed(AttrKind::String).deprecated("use `status` instead"),
        )
        .attr(
            "instance_operation",
            Attr::computed(AttrKind::String).deprecated("use `operation` instead"),
        )
        .attr(
            "instance_no",
            Attr::computed(AttrKind::String).deprecated("use `block_storage_no` instead"),
        )
}

/// Transfer object flattened into the attribute map on read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlockStorage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_storage_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_instance_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Gigabytes; the wire reports bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_detail_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Platform-neutral create arguments.
#[derive(Debug, Clone, Default)]
pub struct BlockStorageArgs {
    pub server_instance_no: String,
    pub size_gb: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub disk_detail_type: Option<String>,
    pub snapshot_no: Option<String>,
    pub zone: Option<String>,
}

impl BlockStorageArgs {
    fn from_data(data: &ResourceData) -> Result<Self> {
        Ok(Self {
            server_instance_no: data
                .get_string("server_instance_no")
                .ok_or_else(|| missing("server_instance_no"))?,
            size_gb: data.get_i64("size").ok_or_else(|| missing("size"))?,
            name: data.get_string("name"),
            description: data.get_string("description"),
            disk_detail_type: data.get_string("disk_detail_type"),
            snapshot_no: data.get_string("snapshot_no"),
            zone: data.get_string("zone"),
        })
    }
}

fn missing(name: &str) -> ProviderError {
    ProviderError::InvalidAttributes(format!("missing attribute {name}"))
}

/// Platform-specific API surface, selected once at configuration load.
#[async_trait]
pub trait BlockStorageOps: Send + Sync {
    /// Issue the create call; returns the new instance number.
    async fn create(&self, args: &BlockStorageArgs) -> Result<String>;
    async fn get(&self, id: &str) -> Result<Option<BlockStorage>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

pub(crate) struct ClassicOps {
    client: Arc<ApiClient>,
}

impl ClassicOps {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlockStorageOps for ClassicOps {
    async fn create(&self, args: &BlockStorageArgs) -> Result<String> {
        // The classic API has no snapshot or zone parameters.
        let req = server::CreateBlockStorageInstanceRequest {
            server_instance_no: args.server_instance_no.clone(),
            block_storage_size: args.size_gb,
            block_storage_name: args.name.clone(),
            block_storage_description: args.description.clone(),
            disk_detail_type_code: args.disk_detail_type.clone(),
        };
        let resp = self.client.server().create_block_storage_instance(&req).await?;
        first_id(
            resp.block_storage_instance_list
                .first()
                .and_then(|i| i.block_storage_instance_no.clone()),
        )
    }

    async fn get(&self, id: &str) -> Result<Option<BlockStorage>> {
        let req = server::GetBlockStorageInstanceListRequest {
            block_storage_instance_no_list: vec![id.to_string()],
        };
        let resp = self.client.server().get_block_storage_instance_list(&req).await?;
        Ok(resp.block_storage_instance_list.into_iter().next().map(|inst| {
            BlockStorage {
                block_storage_no: inst.block_storage_instance_no,
                server_instance_no: inst.server_instance_no,
                server_name: inst.server_name,
                storage_type: inst.block_storage_type.and_then(|c| c.code),
                name: inst.block_storage_name,
                size: inst.block_storage_size.map(|b| b / GIB),
                device_name: inst.device_name,
                product_code: inst.block_storage_product_code,
                status: inst.block_storage_instance_status.and_then(|c| c.code),
                operation: inst.block_storage_instance_operation.and_then(|c| c.code),
                status_name: inst.block_storage_instance_status_name,
                description: inst.block_storage_instance_description,
                disk_type: inst.disk_type.and_then(|c| c.code),
                disk_detail_type: inst.disk_detail_type.and_then(|c| c.code),
                zone: None,
            }
        }))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let req = server::DeleteBlockStorageInstancesRequest {
            block_storage_instance_no_list: vec![id.to_string()],
        };
        self.client.server().delete_block_storage_instances(&req).await?;
        Ok(())
    }
}

pub(crate) struct VpcOps {
    client: Arc<ApiClient>,
    region: String,
}

impl VpcOps {
    pub(crate) fn new(client: Arc<ApiClient>, region: String) -> Self {
        Self { client, region }
    }
}

#[async_trait]
impl BlockStorageOps for VpcOps {
    async fn create(&self, args: &BlockStorageArgs) -> Result<String> {
        let req = vserver::CreateBlockStorageInstanceRequest {
            region_code: self.region.clone(),
            block_storage_size: args.size_gb as i32,
            server_instance_no: args.server_instance_no.clone(),
            zone_code: args.zone.clone(),
            block_storage_name: args.name.clone(),
            block_storage_description: args.description.clone(),
            block_storage_disk_detail_type_code: args.disk_detail_type.clone(),
            block_storage_snapshot_instance_no: args.snapshot_no.clone(),
        };
        let resp = self.client.vserver().create_block_storage_instance(&req).await?;
        first_id(
            resp.block_storage_instance_list
                .first()
                .and_then(|i| i.block_storage_instance_no.clone()),
        )
    }

    async fn get(&self, id: &str) -> Result<Option<BlockStorage>> {
        let req = vserver::GetBlockStorageInstanceDetailRequest {
            region_code: self.region.clone(),
            block_storage_instance_no: id.to_string(),
        };
        let resp = self.client.vserver().get_block_storage_instance_detail(&req).await?;
        Ok(resp.block_storage_instance_list.into_iter().next().map(|inst| {
            BlockStorage {
                block_storage_no: inst.block_storage_instance_no,
                server_instance_no: inst.server_instance_no,
                server_name: None,
                storage_type: inst.block_storage_type.and_then(|c| c.code),
                name: inst.block_storage_name,
                size: inst.block_storage_size.map(|b| b / GIB),
                device_name: inst.device_name,
                product_code: inst.block_storage_product_code,
                status: inst.block_storage_instance_status.and_then(|c| c.code),
                operation: inst.block_storage_instance_operation.and_then(|c| c.code),
                status_name: inst.block_storage_instance_status_name,
                description: inst.block_storage_description,
                disk_type: inst.block_storage_disk_type.and_then(|c| c.code),
                disk_detail_type: inst.block_storage_disk_detail_type.and_then(|c| c.code),
                zone: inst.zone_code,
            }
        }))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let req = vserver::DeleteBlockStorageInstancesRequest {
            region_code: self.region.clone(),
            block_storage_instance_no_list: vec![id.to_string()],
        };
        self.client.vserver().delete_block_storage_instances(&req).await?;
        Ok(())
    }
}

fn first_id(id: Option<String>) -> Result<String> {
    id.ok_or_else(|| {
        ProviderError::InvalidAttributes("create response carried no instance number".to_string())
    })
}

fn attach_machine() -> StateMachine {
    StateMachine::builder()
        .transition("INIT", "CREAT")
        .transition("INIT", "ATTAC")
        .transition("CREAT", "ATTAC")
        .terminal("ATTAC")
        .build()
}

fn terminate_machine() -> StateMachine {
    StateMachine::builder()
        .transition("ATTAC", "INIT")
        .transition("ATTAC", "TERMINATED")
        .transition("INIT", "TERMINATED")
        .gone("TERMINATED")
        .build()
}

pub async fn create(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    schema().validate(data)?;
    let args = BlockStorageArgs::from_data(data)?;

    let id = provider.block_storage.create(&args).await?;
    data.set_id(id.clone());
    info!(id = %id, "block storage created, waiting for ATTAC");

    provider
        .create_waiter()
        .wait(&attach_machine(), async || refresh(provider, &id).await)
        .await?;

    read(provider, data).await
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(());
    };

    match provider.block_storage.get(&id).await? {
        None => {
            data.clear_id();
            Ok(())
        }
        Some(storage) => {
            if provider.platform() == Platform::Classic {
                // Deprecated classic-only aliases.
                if let Some(status) = &storage.status {
                    data.set("instance_status", status.clone());
                }
                if let Some(operation) = &storage.operation {
                    data.set("instance_operation", operation.clone());
                }
                if let Some(no) = &storage.block_storage_no {
                    data.set("instance_no", no.clone());
                }
            }
            data.merge_flat(&storage)
        }
    }
}

/// No attribute is updatable in place; converging an existing volume is a
/// re-read.
pub async fn update(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    read(provider, data).await
}

pub async fn delete(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(());
    };

    let settings = *provider.settings();
    retry_on_codes(
        &[codes::DETACHING_MOUNTED_STORAGE],
        settings.delete_timeout,
        settings.retry_delay,
        async || provider.block_storage.delete(&id).await,
    )
    .await?;
    info!(id = %id, "block storage delete accepted, waiting for TERMINATED");

    provider
        .delete_waiter()
        .wait(&terminate_machine(), async || refresh(provider, &id).await)
        .await?;

    data.clear_id();
    Ok(())
}

async fn refresh(
    provider: &Provider,
    id: &str,
) -> std::result::Result<Refresh<BlockStorage>, ProviderError> {
    match provider.block_storage.get(id).await? {
        Some(storage) => {
            let status = storage.status.clone().unwrap_or_default();
            Ok(Refresh::Observed(storage, status))
        }
        None => Ok(Refresh::Gone),
    }
}
