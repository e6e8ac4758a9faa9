//! Provider wiring.
//!
//! The platform split (classic vs VPC) is resolved exactly once, here: each
//! dual-platform resource gets the matching ops implementation boxed at
//! construction, and handlers call through the trait with no further
//! branching. VPC-only resources reject classic configurations when invoked.

use std::sync::Arc;
use std::time::Duration;

use nimbus_sdk::{ApiClient, Config, Platform};
use tracing::info;

use crate::error::{ProviderError, Result};
use crate::resource::access_control_group::{self, AccessControlGroupOps};
use crate::resource::block_storage::{self, BlockStorageOps};
use crate::resource::server_instance::{self, ServerInstanceOps};
use crate::waiter::Waiter;

/// Operation timing knobs. Tests shrink these to keep mock polls fast.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub create_timeout: Duration,
    pub delete_timeout: Duration,
    pub poll_interval: Duration,
    pub retry_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            create_timeout: Duration::from_secs(30 * 60),
            delete_timeout: Duration::from_secs(10 * 60),
            poll_interval: Duration::from_secs(2),
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// One configured provider instance. Read-only after construction.
pub struct Provider {
    client: Arc<ApiClient>,
    settings: Settings,
    pub(crate) block_storage: Box<dyn BlockStorageOps>,
    pub(crate) server: Box<dyn ServerInstanceOps>,
    pub(crate) acg: Box<dyn AccessControlGroupOps>,
}

impl Provider {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_settings(config, Settings::default())
    }

    pub fn with_settings(config: Config, settings: Settings) -> Result<Self> {
        let platform = config.platform;
        let region = config.region_code.clone();
        let client = Arc::new(ApiClient::new(config)?);
        info!(?platform, region = %region, "provider configured");

        let (block_storage, server, acg): (
            Box<dyn BlockStorageOps>,
            Box<dyn ServerInstanceOps>,
            Box<dyn AccessControlGroupOps>,
        ) = match platform {
            Platform::Classic => (
                Box::new(block_storage::ClassicOps::new(client.clone())),
                Box::new(server_instance::ClassicOps::new(client.clone())),
                Box::new(access_control_group::ClassicOps::new(client.clone())),
            ),
            Platform::Vpc => (
                Box::new(block_storage::VpcOps::new(client.clone(), region.clone())),
                Box::new(server_instance::VpcOps::new(client.clone(), region.clone())),
                Box::new(access_control_group::VpcOps::new(client.clone(), region)),
            ),
        };

        Ok(Self {
            client,
            settings,
            block_storage,
            server,
            acg,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn platform(&self) -> Platform {
        self.client.config().platform
    }

    pub fn region(&self) -> &str {
        &self.client.config().region_code
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn create_waiter(&self) -> Waiter {
        Waiter::new(self.settings.create_timeout, self.settings.poll_interval)
    }

    pub(crate) fn delete_waiter(&self) -> Waiter {
        Waiter::new(self.settings.delete_timeout, self.settings.poll_interval)
    }

    /// Guard for VPC-only resource types.
    pub(crate) fn require_vpc(&self, resource: &'static str) -> Result<()> {
        if self.platform().supports_vpc() {
            Ok(())
        } else {
            Err(ProviderError::UnsupportedPlatform {
                resource,
                platform: "classic",
            })
        }
    }
}
