//! Miscellaneous helper utilities.

use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Start listening for Ctrl-C now and return a future that resolves once it
/// arrives. Call before startup work so an early Ctrl-C is not lost.
pub fn listen_for_shutdown() -> impl Future<Output = ()> + Send + 'static {
    shutdown_on(tokio::signal::ctrl_c())
}

/// Drive `signal` on its own task. If it fails the returned future never
/// resolves and the process is left to external termination.
fn shutdown_on<F>(signal: F) -> impl Future<Output = ()> + Send + 'static
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => {
                tracing::warn!(error = %e, "[INIT] cannot listen for Ctrl-C");
                // keep the sender alive so the receiver stays pending
                let _tx = tx;
                std::future::pending::<()>().await;
            }
        }
    });
    async move {
        if rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
