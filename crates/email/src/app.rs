use anyhow::{Context, Result};
use genproto::hipstershop::email_service_server::EmailServiceServer;
use shared::{
    health::HealthResponder,
    server::run_grpc_server,
    utils::{Telemetry, shutdown_signal},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tonic::transport::Server;
use tracing::info;

use crate::{
    EMAIL_SERVICE_NAME, config::EmailConfig, handler::EmailServiceImpl, renderer::EmailRenderer,
    service::dispatcher_for,
};

pub struct EmailServiceApp {
    config: EmailConfig,
}

impl EmailServiceApp {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub async fn run(self, telemetry: &Telemetry) -> Result<()> {
        let dispatcher = dispatcher_for(self.config.mode, &self.config.smtp)
            .context("failed to initialize email backend")?;

        let handler = EmailServiceImpl::new(Arc::new(EmailRenderer::new()), dispatcher);
        let health = HealthResponder::new([EMAIL_SERVICE_NAME]);

        let router = Server::builder()
            .concurrency_limit_per_connection(self.config.server.concurrency_limit)
            .add_service(health.clone().into_server())
            .add_service(EmailServiceServer::with_interceptor(
                handler,
                telemetry.interceptor(EMAIL_SERVICE_NAME),
            ));

        let addr = self.config.server.grpc_addr();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind gRPC port {addr}"))?;

        info!("🚀 Starting Email Service in {} mode on port {}", self.config.mode, self.config.server.port);

        run_grpc_server(
            router,
            listener,
            health,
            self.config.server.shutdown_timeout,
            shutdown_signal(),
        )
        .await
    }
}
