//! Shared test utilities: a mock cloud API gateway served by axum.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use nimbus_provider::{Provider, Settings};
use nimbus_sdk::{Config, Platform};
use tokio::net::TcpListener;

/// Mock API gateway bound to an ephemeral local port.
pub struct MockCloud {
    pub addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl MockCloud {
    /// Serve the given routes on an unused local port.
    pub async fn spawn(router: Router) -> Self {
        let port = portpicker::pick_unused_port().expect("No available port");
        let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
        let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
        let actual_addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        // Small delay to ensure the server is ready
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr: actual_addr,
            shutdown_tx,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Build a provider pointed at this mock with fast poll/retry timing.
    pub fn provider(&self, platform: Platform) -> Provider {
        let config =
            Config::new("test-access", "test-secret", "KR", platform).with_base_url(self.base_url());
        Provider::with_settings(config, test_settings()).expect("Failed to build provider")
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Timing shrunk so lifecycle polls settle in milliseconds.
pub fn test_settings() -> Settings {
    Settings {
        create_timeout: Duration::from_secs(2),
        delete_timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(10),
        retry_delay: Duration::from_millis(10),
    }
}
