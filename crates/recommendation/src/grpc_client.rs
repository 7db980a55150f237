use anyhow::{Context as _, Result};
use async_trait::async_trait;
use genproto::hipstershop::{
    Empty, product_catalog_service_client::ProductCatalogServiceClient,
};
use opentelemetry::{Context, global};
use shared::{errors::ServiceError, utils::MetadataInjector};
use std::time::Duration;
use tonic::{
    Request,
    transport::{Channel, Endpoint},
};
use tracing::{error, info};

use crate::abstract_trait::CatalogClient;

/// Catalog access over one long-lived channel. The channel multiplexes
/// concurrent calls, so each call works on a cheap clone of the client.
#[derive(Clone)]
pub struct GrpcCatalogClient {
    client: ProductCatalogServiceClient<Channel>,
    timeout: Duration,
}

impl GrpcCatalogClient {
    /// The connection is established on first use; an unreachable catalog
    /// surfaces as a per-call dependency error.
    pub fn connect_lazy(addr: &str, timeout: Duration) -> Result<Self> {
        let uri = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{addr}")
        };

        let endpoint = Endpoint::from_shared(uri.clone())
            .with_context(|| format!("Invalid gRPC address for product catalog: {uri}"))?
            .connect_timeout(Duration::from_secs(3))
            .timeout(timeout)
            .http2_keep_alive_interval(Duration::from_secs(30))
            .keep_alive_while_idle(true);

        info!("product catalog address: {uri}");

        Ok(Self {
            client: ProductCatalogServiceClient::new(endpoint.connect_lazy()),
            timeout,
        })
    }

    fn inject_trace_context<T>(cx: &Context, request: &mut Request<T>) {
        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(cx, &mut MetadataInjector(request.metadata_mut()))
        });
    }
}

#[async_trait]
impl CatalogClient for GrpcCatalogClient {
    async fn list_product_ids(&self, cx: &Context) -> Result<Vec<String>, ServiceError> {
        let mut request = Request::new(Empty {});
        request.set_timeout(self.timeout);
        Self::inject_trace_context(cx, &mut request);

        let mut client = self.client.clone();

        let response = tokio::time::timeout(self.timeout, client.list_products(request))
            .await
            .map_err(|_| {
                error!("❌ Product catalog did not answer within {:?}", self.timeout);
                ServiceError::Timeout(self.timeout)
            })?
            .map_err(|status| {
                error!("❌ Product catalog call failed: {status}");
                ServiceError::from(status)
            })?;

        Ok(response
            .into_inner()
            .products
            .into_iter()
            .map(|product| product.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_address() {
        assert!(GrpcCatalogClient::connect_lazy("http://bad host:3550", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_dependency_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GrpcCatalogClient::connect_lazy(&addr.to_string(), Duration::from_secs(2)).unwrap();
        let err = client.list_product_ids(&Context::new()).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Dependency(_) | ServiceError::Timeout(_)
        ));
    }
}
