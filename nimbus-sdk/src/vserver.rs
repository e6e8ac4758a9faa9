//! VPC platform `vserver` service. Same resources as the classic `server`
//! service with different request/response shapes; every request carries the
//! region code.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::server::Zone;
use crate::types::CommonCode;

/// Borrowed sub-client for the VPC `vserver` service.
pub struct VserverApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl VserverApi<'_> {
    pub async fn create_block_storage_instance(
        &self,
        req: &CreateBlockStorageInstanceRequest,
    ) -> Result<BlockStorageInstanceListResponse> {
        self.client
            .post(Service::Vserver, "createBlockStorageInstance", req)
            .await
    }

    pub async fn get_block_storage_instance_detail(
        &self,
        req: &GetBlockStorageInstanceDetailRequest,
    ) -> Result<BlockStorageInstanceListResponse> {
        self.client
            .post(Service::Vserver, "getBlockStorageInstanceDetail", req)
            .await
    }

    pub async fn delete_block_storage_instances(
        &self,
        req: &DeleteBlockStorageInstancesRequest,
    ) -> Result<BlockStorageInstanceListResponse> {
        self.client
            .post(Service::Vserver, "deleteBlockStorageInstances", req)
            .await
    }

    pub async fn create_server_instances(
        &self,
        req: &CreateServerInstancesRequest,
    ) -> Result<ServerInstanceListResponse> {
        self.client
            .post(Service::Vserver, "createServerInstances", req)
            .await
    }

    pub async fn get_server_instance_detail(
        &self,
        req: &GetServerInstanceDetailRequest,
    ) -> Result<ServerInstanceListResponse> {
        self.client
            .post(Service::Vserver, "getServerInstanceDetail", req)
            .await
    }

    pub async fn stop_server_instances(
        &self,
        req: &ServerInstanceNoListRequest,
    ) -> Result<ServerInstanceListResponse> {
        self.client
            .post(Service::Vserver, "stopServerInstances", req)
            .await
    }

    pub async fn terminate_server_instances(
        &self,
        req: &ServerInstanceNoListRequest,
    ) -> Result<ServerInstanceListResponse> {
        self.client
            .post(Service::Vserver, "terminateServerInstances", req)
            .await
    }

    pub async fn get_access_control_group_list(
        &self,
        req: &GetAccessControlGroupListRequest,
    ) -> Result<AccessControlGroupListResponse> {
        self.client
            .post(Service::Vserver, "getAccessControlGroupList", req)
            .await
    }
}

// --- Block storage ---

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlockStorageInstanceRequest {
    pub region_code: String,
    /// Requested size in gigabytes.
    pub block_storage_size: i32,
    pub server_instance_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_storage_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_storage_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_storage_disk_detail_type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_storage_snapshot_instance_no: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBlockStorageInstanceDetailRequest {
    pub region_code: String,
    pub block_storage_instance_no: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBlockStorageInstancesRequest {
    pub region_code: String,
    pub block_storage_instance_no_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStorageInstance {
    pub block_storage_instance_no: Option<String>,
    pub server_instance_no: Option<String>,
    pub block_storage_type: Option<CommonCode>,
    pub block_storage_name: Option<String>,
    /// Size in bytes on the wire.
    pub block_storage_size: Option<i64>,
    pub device_name: Option<String>,
    pub block_storage_product_code: Option<String>,
    pub block_storage_instance_status: Option<CommonCode>,
    pub block_storage_instance_operation: Option<CommonCode>,
    pub block_storage_instance_status_name: Option<String>,
    pub block_storage_description: Option<String>,
    pub block_storage_disk_type: Option<CommonCode>,
    pub block_storage_disk_detail_type: Option<CommonCode>,
    pub zone_code: Option<String>,
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
    pub region_code: String,
    pub server_image_product_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_product_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_no: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetServerInstanceDetailRequest {
    pub region_code: String,
    pub server_instance_no: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInstanceNoListRequest {
    pub region_code: String,
    pub server_instance_no_list: Vec<String>,
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
    pub subnet_no: Option<String>,
    pub vpc_no: Option<String>,
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
    pub region_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub access_control_group_no_list: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control_group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_no: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlGroup {
    pub access_control_group_no: Option<String>,
    pub access_control_group_name: Option<String>,
    pub access_control_group_description: Option<String>,
    pub is_default: Option<bool>,
    pub vpc_no: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlGroupListResponse {
    pub total_rows: Option<i32>,
    #[serde(default)]
    pub access_control_group_list: Vec<AccessControlGroup>,
}
