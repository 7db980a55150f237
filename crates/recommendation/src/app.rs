use anyhow::{Context, Result};
use genproto::hipstershop::recommendation_service_server::RecommendationServiceServer;
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
    RECOMMENDATION_SERVICE_NAME, config::RecommendationConfig, grpc_client::GrpcCatalogClient,
    handler::RecommendationServiceImpl, selector::RecommendationSelector,
};

pub struct RecommendationServiceApp {
    config: RecommendationConfig,
}

impl RecommendationServiceApp {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    pub async fn run(self, telemetry: &Telemetry) -> Result<()> {
        let catalog =
            GrpcCatalogClient::connect_lazy(&self.config.catalog_addr, self.config.catalog_timeout)
                .context("failed to set up product catalog client")?;

        let handler = RecommendationServiceImpl::new(RecommendationSelector::new(Arc::new(catalog)));
        let health = HealthResponder::new([RECOMMENDATION_SERVICE_NAME]);

        let router = Server::builder()
            .concurrency_limit_per_connection(self.config.server.concurrency_limit)
            .add_service(health.clone().into_server())
            .add_service(RecommendationServiceServer::with_interceptor(
                handler,
                telemetry.interceptor(RECOMMENDATION_SERVICE_NAME),
            ));

        let addr = self.config.server.grpc_addr();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind gRPC port {addr}"))?;

        info!("🚀 Starting Recommendation Service on port {}", self.config.server.port);

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

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::server::NamedService;

    #[test]
    fn test_service_name_matches_contract() {
        assert_eq!(
            <RecommendationServiceServer<RecommendationServiceImpl> as NamedService>::NAME,
            RECOMMENDATION_SERVICE_NAME
        );
    }
}
