use genproto::health::{
    HealthCheckRequest, HealthCheckResponse,
    health_check_response::ServingStatus,
    health_server::{Health, HealthServer},
};
use std::{
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicI32, Ordering},
    },
};
use tokio_stream::Stream;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

pub type HealthWatchStream =
    Pin<Box<dyn Stream<Item = Result<HealthCheckResponse, Status>> + Send + 'static>>;

/// Process-wide health state shared by every clone. Only the lifecycle writes
/// it; probes read it without locking.
#[derive(Debug, Clone)]
pub struct HealthResponder {
    status: Arc<AtomicI32>,
    services: Arc<Vec<String>>,
}

impl HealthResponder {
    pub fn new<I, S>(services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: Arc::new(AtomicI32::new(ServingStatus::NotServing as i32)),
            services: Arc::new(services.into_iter().map(Into::into).collect()),
        }
    }

    pub fn status(&self) -> ServingStatus {
        ServingStatus::try_from(self.status.load(Ordering::Acquire))
            .unwrap_or(ServingStatus::Unknown)
    }

    pub fn set_serving(&self) {
        self.set_status(ServingStatus::Serving);
    }

    pub fn set_not_serving(&self) {
        self.set_status(ServingStatus::NotServing);
    }

    fn set_status(&self, status: ServingStatus) {
        self.status.store(status as i32, Ordering::Release);
        info!("Health status set to {}", status.as_str_name());
    }

    pub fn into_server(self) -> HealthServer<Self> {
        HealthServer::new(self)
    }
}

#[tonic::async_trait]
impl Health for HealthResponder {
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let service = request.into_inner().service;

        if !service.is_empty() && !self.services.iter().any(|s| *s == service) {
            return Err(Status::not_found(format!("unknown service: {service}")));
        }

        let status = self.status();
        debug!("Health check for '{service}': {}", status.as_str_name());

        let mut response = HealthCheckResponse::default();
        response.set_status(status);

        Ok(Response::new(response))
    }

    type WatchStream = HealthWatchStream;

    async fn watch(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        Err(Status::unimplemented("health watch is not supported"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    fn check_request(service: &str) -> Request<HealthCheckRequest> {
        Request::new(HealthCheckRequest {
            service: service.to_string(),
        })
    }

    #[tokio::test]
    async fn test_not_serving_until_started() {
        let health = HealthResponder::new(["hipstershop.EmailService"]);

        let response = health.check(check_request("")).await.unwrap().into_inner();
        assert_eq!(response.status(), ServingStatus::NotServing);

        health.clone().set_serving();

        let response = health.check(check_request("")).await.unwrap().into_inner();
        assert_eq!(response.status(), ServingStatus::Serving);
    }

    #[tokio::test]
    async fn test_named_service_check() {
        let health = HealthResponder::new(["hipstershop.RecommendationService"]);
        health.set_serving();

        let response = health
            .check(check_request("hipstershop.RecommendationService"))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.status(), ServingStatus::Serving);

        let err = health
            .check(check_request("hipstershop.CartService"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn test_watch_is_unimplemented() {
        let health = HealthResponder::new(["hipstershop.RecommendationService"]);
        health.set_serving();

        let err = match health.watch(check_request("")).await {
            Ok(_) => panic!("watch should not stream"),
            Err(e) => e,
        };
        assert_eq!(err.code(), Code::Unimplemented);
    }
}
