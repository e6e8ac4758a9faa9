//! Classic platform `server` service: server instances, block storage and
//! access control groups. Requests are action calls; sizes on the wire are
//! byte counts.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::types::CommonCode;

/// Borrowed sub-client for the classic `server` service.
pub struct ServerApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl ServerApi<'_> {
    pub async fn create_block_storage_instance(
        &self,
        req: &CreateBlockStorageInstanceRequest,
    ) -> Result<BlockStorageInstanceListResponse> {
        self.client
            .post(Service::Server, "createBlockStorageInstance", req)
            .await
    }

    pub async fn get_block_storage_instance_list(
        &self,
        req: &GetBlockStorageInstanceListRequest,
    ) -> Result<BlockStorageInstanceListResponse> {
        self.client
            .post(Service::Server, "getBlockStorageInstanceList", req)
            .await
    }

    pub async fn delete_block_storage_instances(
        &self,
        req: &DeleteBlockStorageInstancesRequest,
    ) -> Result<BlockStorageInstanceListResponse> {
        self.client
            .post(Service::Server, "deleteBlockStorageInstances", req)
            .await
    }

    pub async fn create_server_instances(
        &self,
        req: &CreateServerInstancesRequest,
    ) -> Result<ServerInstanceListResponse> {
        self.client
            .post(Service::Server, "createServerInstances", req)
            .await
    }

    pub async fn get_server_instance_list(
        &self,
        req: &GetServerInstanceListRequest,
    ) -> Result<ServerInstanceListResponse> {
        self.client
            .post(Service::Server, "getServerInstanceList", req)
            .await
    }

    pub async fn stop_server_instances(
        &self,
        req: &ServerInstanceNoListRequest,
    ) -> Result<ServerInstanceListResponse> {
        self.client
            .post(Service::Server, "stopServerInstances", req)
            .await
    }

    pub async fn terminate_server_instances(
        &self,
        req: &ServerInstanceNoListRequest,
    ) -> Result<ServerInstanceListResponse> {
        self.client
            .post(Service::Server, "terminateServerInstances", req)
            .await
    }

    pub async fn get_access_control_group_list(
        &self,
        req: &GetAccessControlGroupListRequest,
    ) -> Result<AccessControlGroupListResponse> {
        self.client
            .post(Service::Server, "getAccessControlGroupList", req)
            .await
    }
}

// --- Block storage ---

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlockStorageInstanceRequest {
    pub server_instance_no: String,
    /// Requested size in gigabytes.
    pub block_storage_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_storage_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_storage_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_detail_type_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBlockStorageInstanceListRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_storage_instance_no_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBlockStorageInstancesRequest {
    pub block_storage_instance_no_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStorageInstance {
    pub block_storage_instance_no: Option<String>,
    pub server_instance_no: Option<String>,
    pub server_name: Option<String>,
    pub block_storage_type: Option<CommonCode>,
    pub block_storage_name: Option<String>,
    /// Size in bytes on the wire.
    pub block_storage_size: Option<i64>,
    pub device_name: Option<String>,
    pub block_storage_product_code: Option<String>,
    pub block_storage_instance_status: Option<CommonCode>,
    pub block_storage_instance_operation: Option<CommonCode>,
    pub block_storage_instance_status_name: Option<String>,
    pub block_storage_instance_description: Option<String>,
    pub disk_type: Option<CommonCode>,
    pub disk_detail_type: Option<CommonCode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStorageInstanceListResponse {
    pub total_rows: Option<i32>,
    #[serde(default)]
    pub block_storage_instance_list: Vec<BlockStorageInstance>,
}

// --- Server instances ---

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerInstancesRequest {
    pub server_image_product_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_product_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_no: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub access_control_group_configuration_no_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetServerInstanceListRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub server_instance_no_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInstanceNoListRequest {
    pub server_instance_no_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub zone_no: Option<String>,
    pub zone_code: Option<String>,
    pub zone_name: Option<String>,
    pub region_no: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInstance {
    pub server_instance_no: Option<String>,
    pub server_name: Option<String>,
    pub server_instance_status: Option<CommonCode>,
    pub server_instance_operation: Option<CommonCode>,
    pub server_image_product_code: Option<String>,
    pub server_product_code: Option<String>,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub cpu_count: Option<i32>,
    /// Memory in bytes on the wire.
    pub memory_size: Option<i64>,
    pub platform_type: Option<CommonCode>,
    pub login_key_name: Option<String>,
    pub zone: Option<Zone>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInstanceListResponse {
    pub total_rows: Option<i32>,
    #[serde(default)]
    pub server_instance_list: Vec<ServerInstance>,
}

// --- Access control groups ---

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAccessControlGroupListRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub access_control_group_configuration_no_list: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control_group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_no: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlGroup {
    pub access_control_group_configuration_no: Option<String>,
    pub access_control_group_name: Option<String>,
    pub access_control_group_description: Option<String>,
    pub is_default_group: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlGroupListResponse {
    pub total_rows: Option<i32>,
    #[serde(default)]
    pub access_control_group_list: Vec<AccessControlGroup>,
}
