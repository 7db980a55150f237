use anyhow::{Context, Result, anyhow};
use std::{future::Future, time::Duration};
use tokio::{net::TcpListener, sync::oneshot};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Router;
use tracing::{error, info, warn};

use crate::health::HealthResponder;

/// Serves `router` on `listener` until `signal` resolves, then stops accepting
/// calls and waits up to `drain_timeout` for in-flight ones.
pub async fn run_grpc_server<F>(
    router: Router,
    listener: TcpListener,
    health: HealthResponder,
    drain_timeout: Duration,
    signal: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let addr = listener
        .local_addr()
        .context("failed to read listener address")?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let incoming = TcpListenerStream::new(listener);

    let mut server = tokio::spawn(router.serve_with_incoming_shutdown(incoming, async move {
        let _ = stop_rx.await;
        info!("gRPC server received shutdown signal");
    }));

    health.set_serving();
    info!("📡 gRPC server listening on {addr}");

    tokio::select! {
        result = &mut server => {
            health.set_not_serving();
            return match result {
                Ok(Ok(())) => Err(anyhow!("gRPC server on {addr} stopped unexpectedly")),
                Ok(Err(e)) => Err(e).with_context(|| format!("gRPC server failed on {addr}")),
                Err(e) => Err(anyhow!(e)).context("gRPC server task panicked"),
            };
        }
        _ = signal => {}
    }

    health.set_not_serving();
    info!("🛑 Draining in-flight calls (up to {drain_timeout:?})...");

    if stop_tx.send(()).is_err() {
        warn!("gRPC server already stopped before shutdown was requested");
    }

    match tokio::time::timeout(drain_timeout, server).await {
        Ok(Ok(Ok(()))) => info!("✅ gRPC server stopped gracefully"),
        Ok(Ok(Err(e))) => error!("gRPC server error during shutdown: {e}"),
        Ok(Err(e)) => error!("gRPC server task failed during shutdown: {e}"),
        Err(_) => warn!("⚠️  Shutdown timeout reached, abandoning in-flight calls"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use genproto::health::{
        HealthCheckRequest, health_check_response::ServingStatus,
        health_client::HealthClient,
    };
    use tonic::transport::Server;

    #[tokio::test]
    async fn test_serves_health_then_drains_on_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let health = HealthResponder::new(["hipstershop.EmailService"]);
        let router = Server::builder().add_service(health.clone().into_server());

        let (signal_tx, signal_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(run_grpc_server(
            router,
            listener,
            health.clone(),
            Duration::from_secs(5),
            async move {
                let _ = signal_rx.await;
            },
        ));

        let mut client = HealthClient::connect(format!("http://{addr}")).await.unwrap();
        let response = client
            .check(HealthCheckRequest::default())
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.status(), ServingStatus::Serving);

        drop(client);
        signal_tx.send(()).unwrap();

        server.await.unwrap().unwrap();
        assert_eq!(health.status(), ServingStatus::NotServing);
    }
}
