//! SourceBuild build-environment metadata: docker engines and OS runtime
//! versions. Plain GET endpoints without the action-call envelope.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::types::IdName;

/// Borrowed sub-client for the `sourcebuild` service.
pub struct SourcebuildApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl SourcebuildApi<'_> {
    /// Docker engines available to build projects.
    pub async fn get_docker_env(&self) -> Result<DockerEnvResponse> {
        self.client
            .get(Service::Sourcebuild, "/env/docker", "getDockerEnv")
            .await
    }

    /// Runtime versions for an (OS, runtime) pair.
    pub async fn get_runtime_version_env(
        &self,
        os_id: i64,
        runtime_id: i64,
    ) -> Result<RuntimeVersionEnvResponse> {
        let path = format!("/env/os/{os_id}/runtime/{runtime_id}/version");
        self.client
            .get(Service::Sourcebuild, &path, "getRuntimeVersionEnv")
            .await
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerEnvResponse {
    #[serde(default)]
    pub docker: Vec<IdName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeVersionEnvResponse {
    #[serde(default)]
    pub version: Vec<IdName>,
}
