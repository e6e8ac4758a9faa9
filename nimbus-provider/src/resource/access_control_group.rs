//! Access control group data source.
//!
//! A lookup, not a managed resource: the API list call narrows by the typed
//! query attributes, filter blocks narrow further client-side, and the
//! result must be exactly one group.

use std::sync::Arc;

use async_trait::async_trait;
use nimbus_sdk::{ApiClient, codes, server, vserver};
use serde_json::{Map, Value, json};

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::filter::apply_filters;
use crate::provider::Provider;
use crate::retry::retry_on_codes;
use crate::schema::{Attr, AttrKind, Schema};

pub const TYPE: &str = "nimbus_access_control_group";

pub fn schema() -> Schema {
    Schema::new()
        .attr("access_control_group_no", Attr::optional(AttrKind::String))
        .attr("name", Attr::optional(AttrKind::String))
        .attr("is_default", Attr::optional(AttrKind::Bool))
        .attr("vpc_no", Attr::optional(AttrKind::String))
        .attr("filter", Attr::optional(AttrKind::List))
        .attr(
            "configuration_no",
            Attr::optional(AttrKind::String)
                .deprecated("use `access_control_group_no` instead")
                .conflicts_with(&["access_control_group_no"]),
        )
        .attr("description", Attr::computed(AttrKind::String))
        .attr("is_default_group", Attr::computed(AttrKind::Bool))
}

/// Typed query attributes passed through to the list call.
#[derive(Debug, Clone, Default)]
pub struct AcgQuery {
    pub no: Option<String>,
    pub name: Option<String>,
    pub is_default: Option<bool>,
    pub vpc_no: Option<String>,
}

#[async_trait]
pub trait AccessControlGroupOps: Send + Sync {
    /// List groups as flattened attribute rows.
    async fn list(&self, query: &AcgQuery) -> Result<Vec<Map<String, Value>>>;
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
impl AccessControlGroupOps for ClassicOps {
    async fn list(&self, query: &AcgQuery) -> Result<Vec<Map<String, Value>>> {
        let req = server::GetAccessControlGroupListRequest {
            access_control_group_configuration_no_list: query.no.clone().into_iter().collect(),
            access_control_group_name: query.name.clone(),
            is_default: query.is_default,
            page_no: None,
        };
        let resp = self.client.server().get_access_control_group_list(&req).await?;
        Ok(resp
            .access_control_group_list
            .into_iter()
            .map(|group| {
                row(json!({
                    "access_control_group_no": group.access_control_group_configuration_no,
                    // Deprecated classic-only alias.
                    "configuration_no": group.access_control_group_configuration_no,
                    "name": group.access_control_group_name,
                    "description": group.access_control_group_description,
                    "is_default": group.is_default_group,
                    "is_default_group": group.is_default_group,
                }))
            })
            .collect())
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
impl AccessControlGroupOps for VpcOps {
    async fn list(&self, query: &AcgQuery) -> Result<Vec<Map<String, Value>>> {
        let req = vserver::GetAccessControlGroupListRequest {
            region_code: self.region.clone(),
            access_control_group_no_list: query.no.clone().into_iter().collect(),
            access_control_group_name: query.name.clone(),
            vpc_no: query.vpc_no.clone(),
        };
        let resp = self.client.vserver().get_access_control_group_list(&req).await?;
        let mut rows: Vec<_> = resp
            .access_control_group_list
            .into_iter()
            .map(|group| {
                row(json!({
                    "access_control_group_no": group.access_control_group_no,
                    "name": group.access_control_group_name,
                    "description": group.access_control_group_description,
                    "is_default": group.is_default,
                    "vpc_no": group.vpc_no,
                }))
            })
            .collect();
        // The VPC list call has no is_default parameter.
        if let Some(want) = query.is_default {
            rows.retain(|r| r.get("is_default").and_then(Value::as_bool) == Some(want));
        }
        Ok(rows)
    }
}

fn row(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(mut map) => {
            map.retain(|_, v| !v.is_null());
            map
        }
        _ => Map::new(),
    }
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> Result<()> {
    // Once resolved, the map holds the computed attributes this handler
    // wrote; only the first lookup validates the input.
    if data.id().is_none() {
        schema().validate(data)?;
    }

    let query = AcgQuery {
        no: data
            .get_string("access_control_group_no")
            .or_else(|| data.get_string("configuration_no")),
        name: data.get_string("name"),
        is_default: data.get_bool("is_default"),
        vpc_no: data.get_string("vpc_no"),
    };

    let settings = *provider.settings();
    let rows = retry_on_codes(
        codes::RETRYABLE,
        settings.create_timeout,
        settings.retry_delay,
        async || provider.acg.list(&query).await,
    )
    .await?;
    let mut matched = apply_filters(&data.filters()?, rows)?;

    match matched.len() {
        0 => Err(ProviderError::NotFound {
            resource: TYPE,
            id: query.name.or(query.no).unwrap_or_else(|| "<any>".to_string()),
        }),
        1 => {
            let group = matched.remove(0);
            if let Some(no) = group.get("access_control_group_no").and_then(Value::as_str) {
                data.set_id(no.to_string());
            }
            for (name, value) in group {
                data.set(name, value);
            }
            Ok(())
        }
        count => Err(ProviderError::AmbiguousResult { count }),
    }
}
