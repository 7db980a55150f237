use genproto::hipstershop::{
    ListRecommendationsRequest, ListRecommendationsResponse,
    recommendation_service_server::RecommendationService,
};
use shared::{
    errors::AppErrorGrpc,
    utils::{TracingContext, finish_span},
};
use tonic::{Request, Response, Status};
use tracing::info;

use crate::selector::RecommendationSelector;

#[derive(Clone)]
pub struct RecommendationServiceImpl {
    selector: RecommendationSelector,
}

impl RecommendationServiceImpl {
    pub fn new(selector: RecommendationSelector) -> Self {
        Self { selector }
    }
}

#[tonic::async_trait]
impl RecommendationService for RecommendationServiceImpl {
    async fn list_recommendations(
        &self,
        request: Request<ListRecommendationsRequest>,
    ) -> Result<Response<ListRecommendationsResponse>, Status> {
        let tracing_ctx = TracingContext::from_request(&request, "ListRecommendations");
        let req = request.into_inner();

        info!(
            "Handling gRPC request: ListRecommendations user_id={} seen={}",
            req.user_id,
            req.product_ids.len()
        );

        let cx = tracing_ctx
            .as_ref()
            .map(|ctx| ctx.cx.clone())
            .unwrap_or_default();

        let result = self.selector.list_recommendations(&req.product_ids, &cx).await;
        finish_span(tracing_ctx.as_ref(), &result, "Recommendations listed");

        let product_ids = result.map_err(AppErrorGrpc::from)?;

        Ok(Response::new(ListRecommendationsResponse { product_ids }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        RECOMMENDATION_SERVICE_NAME,
        selector::tests::{FakeCatalog, ids},
    };
    use genproto::health::{
        HealthCheckRequest, health_check_response::ServingStatus, health_server::Health,
    };
    use shared::{errors::DEPENDENCY_FAILED_MESSAGE, health::HealthResponder};
    use std::{collections::BTreeSet, sync::Arc};
    use tonic::Code;

    fn handler_over(catalog: FakeCatalog) -> RecommendationServiceImpl {
        RecommendationServiceImpl::new(RecommendationSelector::new(Arc::new(catalog)))
    }

    fn request(seen: &[&str]) -> Request<ListRecommendationsRequest> {
        Request::new(ListRecommendationsRequest {
            user_id: "user-1".to_string(),
            product_ids: ids(seen),
        })
    }

    #[tokio::test]
    async fn test_recommends_unseen_products() {
        let handler = handler_over(FakeCatalog::listing(&["1", "2", "3", "4", "5", "6", "7"]));

        let response = handler
            .list_recommendations(request(&["1", "2"]))
            .await
            .unwrap()
            .into_inner();

        let picked: BTreeSet<&str> = response.product_ids.iter().map(String::as_str).collect();
        assert_eq!(response.product_ids.len(), 5);
        assert_eq!(picked, BTreeSet::from(["3", "4", "5", "6", "7"]));
    }

    #[tokio::test]
    async fn test_all_seen_is_empty_success() {
        let handler = handler_over(FakeCatalog::listing(&["1", "2"]));

        let response = handler
            .list_recommendations(request(&["1", "2"]))
            .await
            .unwrap()
            .into_inner();

        assert!(response.product_ids.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_is_internal() {
        let handler = handler_over(FakeCatalog::unavailable());

        let status = handler
            .list_recommendations(request(&[]))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), DEPENDENCY_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_same_set_in_varying_order_across_calls() {
        let handler = handler_over(FakeCatalog::listing(&["1", "2", "3", "4", "5", "6", "7"]));
        let expected = BTreeSet::from(["3", "4", "5", "6", "7"]);
        let mut orderings = BTreeSet::new();

        for _ in 0..30 {
            let response = handler
                .list_recommendations(request(&["1", "2"]))
                .await
                .unwrap()
                .into_inner();

            let picked: BTreeSet<&str> = response.product_ids.iter().map(String::as_str).collect();
            assert_eq!(response.product_ids.len(), 5);
            assert_eq!(picked, expected);

            orderings.insert(response.product_ids);
        }

        assert!(orderings.len() > 1);
    }

    #[tokio::test]
    async fn test_health_stays_serving_after_failed_calls() {
        let health = HealthResponder::new([RECOMMENDATION_SERVICE_NAME]);
        health.set_serving();
        let handler = handler_over(FakeCatalog::unavailable());

        for _ in 0..3 {
            assert!(handler.list_recommendations(request(&["1"])).await.is_err());
        }

        let response = health
            .check(Request::new(HealthCheckRequest {
                service: RECOMMENDATION_SERVICE_NAME.to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.status(), ServingStatus::Serving);
    }
}
