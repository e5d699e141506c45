//! Shared gateway serve entrypoint, used by the binary and the tests.

use crate::{
    config::{GatewayConfig, ServerConfig},
    router::router,
    state::AppState,
};
use anyhow::Result;
use inference::{Backend, Registry, Role};
use tokio::sync::oneshot;

/// Handle returned by [`serve`]: holds the bound port and shutdown trigger.
pub struct ServeHandle {
    /// The port the gateway is listening on.
    pub port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Resolve the hosted providers and start serving on `bind`.
///
/// Fails before binding when a role has no available provider.
pub async fn serve(config: &GatewayConfig, bind: &str) -> Result<ServeHandle> {
    let registry = provider::build_registry(&config.models).await?;
    serve_registry(registry, &config.server, bind).await
}

/// Serve an already-resolved registry.
///
/// The server runs in a spawned task; call `handle.shutdown()` to stop it.
pub async fn serve_registry<B: Backend>(
    registry: Registry<B>,
    server: &ServerConfig,
    bind: &str,
) -> Result<ServeHandle> {
    for role in [Role::Summarizer, Role::Captioner, Role::SpeechSynthesizer] {
        let info = registry.info(role);
        tracing::info!(%role, model = %info.model, candidate = info.candidate, "serving");
    }

    let app = router(AppState::new(registry), server);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("gateway listening on {bind} (port {port})");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
