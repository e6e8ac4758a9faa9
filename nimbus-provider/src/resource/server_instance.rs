//! Server instance resource.
//!
//! Create waits through the boot sequence (`INIT`/`CREAT`/`SETUP`) to `RUN`.
//! Delete is a two-step teardown: stop and wait for `NSTOP`, then terminate
//! and wait until the instance disappears from the API.

use std::sync::Arc;

use async_trait::async_trait;
use nimbus_sdk::{ApiClient, codes, server, vserver};
use serde::Serialize;
use tracing::info;

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::retry::retry_on_codes;
use crate::schema::{Attr, AttrKind, Schema};
use crate::waiter::{Refresh, StateMachine};

pub const TYPE: &str = "nimbus_server";

const GIB: i64 = 1 << 30;

pub fn schema() -> Schema {
    Schema::new()
        .attr("server_image_product_code", Attr::required(AttrKind::String))
        .attr("server_product_code", Attr::optional(AttrKind::String))
        .attr("name", Attr::optional(AttrKind::String))
        .attr("login_key_name", Attr::optional(AttrKind::String))
        .attr("zone", Attr::optional(AttrKind::String))
        .attr("access_control_group_no_list", Attr::optional(AttrKind::List))
        .attr("subnet_no", Attr::optional(AttrKind::String))
        .attr("vpc_no", Attr::optional(AttrKind::String))
        .attr("server_instance_no", Attr::computed(AttrKind::String))
        .attr("status", Attr::computed(AttrKind::String))
        .attr("operation", Attr::computed(AttrKind::String))
        .attr("public_ip", Attr::computed(AttrKind::String))
        .attr("private_ip", Attr::computed(AttrKind::String))
        .attr("cpu_count", Attr::computed(AttrKind::Int))
        .attr("memory_size", Attr::computed(AttrKind::Int))
        .attr("platform_type", Attr::computed(AttrKind::String))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerInstance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_instance_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_image_product_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_product_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<i32>,
    /// Gigabytes; the wire reports bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_no: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ServerInstanceArgs {
    pub server_image_product_code: String,
    pub server_product_code: Option<String>,
    pub name: Option<String>,
    pub login_key_name: Option<String>,
    pub zone: Option<String>,
    pub access_control_group_no_list: Vec<String>,
    pub subnet_no: Option<String>,
    pub vpc_no: Option<String>,
}

impl ServerInstanceArgs {
    fn from_data(data: &ResourceData) -> Result<Self> {
        Ok(Self {
            server_image_product_code: data.get_string("server_image_product_code").ok_or_else(
                || {
                    ProviderError::InvalidAttributes(
                        "missing attribute server_image_product_code".to_string(),
                    )
                },
            )?,
            server_product_code: data.get_string("server_product_code"),
            name: data.get_string("name"),
            login_key_name: data.get_string("login_key_name"),
            zone: data.get_string("zone"),
            access_control_group_no_list: data
                .get_string_list("access_control_group_no_list")
                .unwrap_or_default(),
            subnet_no: data.get_string("subnet_no"),
            vpc_no: data.get_string("vpc_no"),
        })
    }
}

#[async_trait]
pub trait ServerInstanceOps: Send + Sync {
    async fn create(&self, args: &ServerInstanceArgs) -> Result<String>;
    async fn get(&self, id: &str) -> Result<Option<ServerInstance>>;
    async fn stop(&self, id: &str) -> Result<()>;
    async fn terminate(&self, id: &str) -> Result<()>;
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
impl ServerInstanceOps for ClassicOps {
    async fn create(&self, args: &ServerInstanceArgs) -> Result<String> {
        let req = server::CreateServerInstancesRequest {
            server_image_product_code: args.server_image_product_code.clone(),
            server_product_code: args.server_product_code.clone(),
            server_name: args.name.clone(),
            login_key_name: args.login_key_name.clone(),
            zone_no: args.zone.clone(),
            access_control_group_configuration_no_list: args.access_control_group_no_list.clone(),
        };
        let resp = self.client.server().create_server_instances(&req).await?;
        first_id(
            resp.server_instance_list
                .first()
                .and_then(|i| i.server_instance_no.clone()),
        )
    }

    async fn get(&self, id: &str) -> Result<Option<ServerInstance>> {
        let req = server::GetServerInstanceListRequest {
            server_instance_no_list: vec![id.to_string()],
        };
        let resp = self.client.server().get_server_instance_list(&req).await?;
        Ok(resp.server_instance_list.into_iter().next().map(|inst| ServerInstance {
            server_instance_no: inst.server_instance_no,
            name: inst.server_name,
            status: inst.server_instance_status.and_then(|c| c.code),
            operation: inst.server_instance_operation.and_then(|c| c.code),
            server_image_product_code: inst.server_image_product_code,
            server_product_code: inst.server_product_code,
            public_ip: inst.public_ip,
            private_ip: inst.private_ip,
            cpu_count: inst.cpu_count,
            memory_size: inst.memory_size.map(|b| b / GIB),
            platform_type: inst.platform_type.and_then(|c| c.code),
            login_key_name: inst.login_key_name,
            zone: inst.zone.and_then(|z| z.zone_code),
            subnet_no: None,
            vpc_no: None,
        }))
    }

    async fn stop(&self, id: &str) -> Result<()> {
        let req = server::ServerInstanceNoListRequest {
            server_instance_no_list: vec![id.to_string()],
        };
        self.client.server().stop_server_instances(&req).await?;
        Ok(())
    }

    async fn terminate(&self, id: &str) -> Result<()> {
        let req = server::ServerInstanceNoListRequest {
            server_instance_no_list: vec![id.to_string()],
        };
        self.client.server().terminate_server_instances(&req).await?;
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

    fn no_list_request(&self, id: &str) -> vserver::ServerInstanceNoListRequest {
        vserver::ServerInstanceNoListRequest {
            region_code: self.region.clone(),
            server_instance_no_list: vec![id.to_string()],
        }
    }
}

#[async_trait]
impl ServerInstanceOps for VpcOps {
    async fn create(&self, args: &ServerInstanceArgs) -> Result<String> {
        let req = vserver::CreateServerInstancesRequest {
            region_code: self.region.clone(),
            server_image_product_code: args.server_image_product_code.clone(),
            server_product_code: args.server_product_code.clone(),
            server_name: args.name.clone(),
            login_key_name: args.login_key_name.clone(),
            subnet_no: args.subnet_no.clone(),
            vpc_no: args.vpc_no.clone(),
        };
        let resp = self.client.vserver().create_server_instances(&req).await?;
        first_id(
            resp.server_instance_list
                .first()
                .and_then(|i| i.server_instance_no.clone()),
        )
    }

    async fn get(&self, id: &str) -> Result<Option<ServerInstance>> {
        let req = vserver::GetServerInstanceDetailRequest {
            region_code: self.region.clone(),
            server_instance_no: id.to_string(),
        };
        let resp = self.client.vserver().get_server_instance_detail(&req).await?;
        Ok(resp.server_instance_list.into_iter().next().map(|inst| ServerInstance {
            server_instance_no: inst.server_instance_no,
            name: inst.server_name,
            status: inst.server_instance_status.and_then(|c| c.code),
            operation: inst.server_instance_operation.and_then(|c| c.code),
            server_image_product_code: inst.server_image_product_code,
            server_product_code: inst.server_product_code,
            public_ip: inst.public_ip,
            private_ip: inst.private_ip,
            cpu_count: inst.cpu_count,
            memory_size: inst.memory_size.map(|b| b / GIB),
            platform_type: inst.platform_type.and_then(|c| c.code),
            login_key_name: inst.login_key_name,
            zone: inst.zone.and_then(|z| z.zone_code),
            subnet_no: inst.subnet_no,
            vpc_no: inst.vpc_no,
        }))
    }

    async fn stop(&self, id: &str) -> Result<()> {
        self.client
            .vserver()
            .stop_server_instances(&self.no_list_request(id))
            .await?;
        Ok(())
    }

    async fn terminate(&self, id: &str) -> Result<()> {
        self.client
            .vserver()
            .terminate_server_instances(&self.no_list_request(id))
            .await?;
        Ok(())
    }
}

fn first_id(id: Option<String>) -> Result<String> {
    id.ok_or_else(|| {
        ProviderError::InvalidAttributes("create response carried no instance number".to_string())
    })
}

fn boot_machine() -> StateMachine {
    StateMachine::builder()
        .transition("INIT", "CREAT")
        .transition("INIT", "SETUP")
        .transition("INIT", "RUN")
        .transition("CREAT", "SETUP")
        .transition("CREAT", "RUN")
        .transition("SETUP", "RUN")
        .terminal("RUN")
        .build()
}

fn stop_machine() -> StateMachine {
    StateMachine::builder()
        .transition("RUN", "NSTOP")
        .terminal("NSTOP")
        .build()
}

fn terminate_machine() -> StateMachine {
    StateMachine::builder()
        .transition("NSTOP", "TERMT")
        .transition("TERMT", "TERMINATED")
        .transition("NSTOP", "TERMINATED")
        .gone("TERMINATED")
        .build()
}

pub async fn create(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    schema().validate(data)?;
    let args = ServerInstanceArgs::from_data(data)?;

    let settings = *provider.settings();
    let id = retry_on_codes(
        &[codes::PREVIOUS_SERVERS_NOT_TERMINATED],
        settings.create_timeout,
        settings.retry_delay,
        async || provider.server.create(&args).await,
    )
    .await?;
    data.set_id(id.clone());
    info!(id = %id, "server instance created, waiting for RUN");

    provider
        .create_waiter()
        .wait(&boot_machine(), async || refresh(provider, &id).await)
        .await?;

    read(provider, data).await
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(());
    };

    match provider.server.get(&id).await? {
        None => {
            data.clear_id();
            Ok(())
        }
        Some(instance) => data.merge_flat(&instance),
    }
}

/// Nothing converges in place; re-read only.
pub async fn update(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    read(provider, data).await
}

pub async fn delete(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(());
    };

    // Stop first; a running instance cannot be terminated. A server already
    // stopped (or gone) skips straight to termination.
    match provider.server.get(&id).await? {
        None => {
            data.clear_id();
            return Ok(());
        }
        Some(instance) if instance.status.as_deref() == Some("RUN") => {
            provider.server.stop(&id).await?;
            info!(id = %id, "server stop requested, waiting for NSTOP");
            provider
                .delete_waiter()
                .wait(&stop_machine(), async || refresh(provider, &id).await)
                .await?;
        }
        Some(_) => {}
    }

    let settings = *provider.settings();
    retry_on_codes(
        &[
            codes::SERVER_OBJECT_IN_OPERATION,
            codes::SERVER_OBJECT_IN_OPERATION_2,
            codes::OBJECT_IN_OPERATION,
        ],
        settings.delete_timeout,
        settings.retry_delay,
        async || provider.server.terminate(&id).await,
    )
    .await?;
    info!(id = %id, "server terminate accepted, waiting for removal");

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
) -> std::result::Result<Refresh<ServerInstance>, ProviderError> {
    match provider.server.get(id).await? {
        Some(instance) => {
            let status = instance.status.clone().unwrap_or_default();
            Ok(Refresh::Observed(instance, status))
        }
        None => Ok(Refresh::Gone),
    }
}
