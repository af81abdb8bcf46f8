//! Serve command implementation

use crate::adapters::postgres::{PostgresClient, PostgresStore};
use crate::config::load_config;
use crate::core::{AccountService, CustomFieldService, PatientService};
use crate::http::{router, AppState};
use clap::Args;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = load_config(config_path)?;
        if let Some(port) = self.port {
            config.server.port = port;
        }

        tracing::info!(
            environment = %config.environment,
            "Starting Carebase API server"
        );

        let client = PostgresClient::new(config.database.clone()).await?;
        client.test_connection().await?;
        client.ensure_schema().await?;
        tracing::info!(
            database = %client.connection_string_safe(),
            "Database ready"
        );

        let store = Arc::new(PostgresStore::new(client));
        let state = AppState {
            accounts: Arc::new(AccountService::new(
                store.clone(),
                config.auth.bcrypt_cost,
                config.auth.min_password_length,
            )),
            custom_fields: Arc::new(CustomFieldService::new(store.clone())),
            patients: Arc::new(PatientService::new(store.clone(), store.clone())),
        };

        let app = router(state, &config.server.cors_allowed_origins);

        let addr = config.server.listen_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        println!("🚀 Carebase listening on {addr}");
        tracing::info!(address = %addr, "Server started");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        });

        let mut graceful_rx = shutdown_rx.clone();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = graceful_rx.wait_for(|armed| *armed).await;
        });

        drain_with_timeout(
            server.into_future(),
            shutdown_rx,
            Duration::from_secs(config.server.shutdown_timeout_secs),
        )
        .await?;

        tracing::info!("Server shut down cleanly");
        Ok(0)
    }
}

/// Runs the server future, bounding the graceful drain after shutdown
///
/// Once the shutdown signal arrives, in-flight requests get at most
/// `timeout` to finish; after that the server is abandoned and the process
/// exits.
async fn drain_with_timeout<F>(
    server: F,
    mut shutdown_rx: watch::Receiver<bool>,
    timeout: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(server);
    tokio::select! {
        result = &mut server => result,
        _ = async {
            if shutdown_rx.wait_for(|armed| *armed).await.is_err() {
                // Signal sender gone without firing; let the server decide.
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(timeout).await;
        } => {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "Shutdown grace period elapsed, abandoning in-flight requests"
            );
            Ok(())
        }
    }
}

/// Resolves when SIGINT or SIGTERM is received
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT, shutting down");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received Ctrl+C, shutting down");
    }
}
