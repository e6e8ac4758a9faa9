//! VPC managed MySQL service (`vmysql`). VPC-only; there is no classic
//! counterpart.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::types::CommonCode;

/// Borrowed sub-client for the `vmysql` service.
pub struct VmysqlApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl VmysqlApi<'_> {
    pub async fn create_cloud_mysql_instance(
        &self,
        req: &CreateCloudMysqlInstanceRequest,
    ) -> Result<CloudMysqlInstanceListResponse> {
        self.client
            .post(Service::Vmysql, "createCloudMysqlInstance", req)
            .await
    }

    pub async fn get_cloud_mysql_instance_detail(
        &self,
        req: &GetCloudMysqlInstanceDetailRequest,
    ) -> Result<CloudMysqlInstanceListResponse> {
        self.client
            .post(Service::Vmysql, "getCloudMysqlInstanceDetail", req)
            .await
    }

    pub async fn delete_cloud_mysql_instance(
        &self,
        req: &DeleteCloudMysqlInstanceRequest,
    ) -> Result<CloudMysqlInstanceListResponse> {
        self.client
            .post(Service::Vmysql, "deleteCloudMysqlInstance", req)
            .await
    }

    pub async fn create_cloud_mysql_recovery_instance(
        &self,
        req: &CreateCloudMysqlRecoveryInstanceRequest,
    ) -> Result<CloudMysqlInstanceListResponse> {
        self.client
            .post(Service::Vmysql, "createCloudMysqlRecoveryInstance", req)
            .await
    }

    pub async fn delete_cloud_mysql_server_instance(
        &self,
        req: &DeleteCloudMysqlServerInstanceRequest,
    ) -> Result<CloudMysqlInstanceListResponse> {
        self.client
            .post(Service::Vmysql, "deleteCloudMysqlServerInstance", req)
            .await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCloudMysqlInstanceRequest {
    pub region_code: String,
    pub cloud_mysql_service_name: String,
    pub cloud_mysql_server_name_prefix: String,
    pub cloud_mysql_user_name: String,
    pub cloud_mysql_user_password: String,
    pub host_ip: String,
    pub cloud_mysql_database_name: String,
    pub subnet_no: String,
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
    pub is_automatic_backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_mysql_port: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCloudMysqlInstanceDetailRequest {
    pub region_code: String,
    pub cloud_mysql_instance_no: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCloudMysqlInstanceRequest {
    pub region_code: String,
    pub cloud_mysql_instance_no: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCloudMysqlRecoveryInstanceRequest {
    pub region_code: String,
    pub cloud_mysql_instance_no: String,
    pub cloud_mysql_recovery_server_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCloudMysqlServerInstanceRequest {
    pub region_code: String,
    pub cloud_mysql_server_instance_no: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMysqlServerInstance {
    pub cloud_mysql_server_instance_no: Option<String>,
    pub cloud_mysql_server_name: Option<String>,
    pub cloud_mysql_server_role: Option<CommonCode>,
    pub cloud_mysql_server_instance_status_name: Option<String>,
    pub subnet_no: Option<String>,
    pub vpc_no: Option<String>,
    pub private_domain: Option<String>,
    pub public_domain: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMysqlInstance {
    pub cloud_mysql_instance_no: Option<String>,
    pub cloud_mysql_service_name: Option<String>,
    /// Lifecycle status name (`creating`, `settingUp`, `running`, `deleting`).
    pub cloud_mysql_instance_status_name: Option<String>,
    pub engine_version: Option<String>,
    pub is_ha: Option<bool>,
    pub is_multi_zone: Option<bool>,
    pub is_storage_encryption: Option<bool>,
    pub is_backup: Option<bool>,
    pub backup_file_retention_period: Option<i32>,
    pub backup_time: Option<String>,
    pub cloud_mysql_port: Option<i32>,
    #[serde(default)]
    pub cloud_mysql_server_instance_list: Vec<CloudMysqlServerInstance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMysqlInstanceListResponse {
    pub total_rows: Option<i32>,
    #[serde(default)]
    pub cloud_mysql_instance_list: Vec<CloudMysqlInstance>,
}
