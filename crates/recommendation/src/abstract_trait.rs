use async_trait::async_trait;
use opentelemetry::Context;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynCatalogClient = Arc<dyn CatalogClient>;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Every product id the catalog currently lists. `cx` is propagated to
    /// the upstream call.
    async fn list_product_ids(&self, cx: &Context) -> Result<Vec<String>, ServiceError>;
}
