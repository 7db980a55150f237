use genproto::hipstershop::{
    Empty, SendOrderConfirmationRequest, email_service_server::EmailService,
};
use shared::{
    errors::{AppErrorGrpc, ServiceError},
    utils::{TracingContext, finish_span},
};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::info;

use crate::{abstract_trait::DynEmailDispatcher, renderer::EmailRenderer};

#[derive(Clone)]
pub struct EmailServiceImpl {
    renderer: Arc<EmailRenderer>,
    dispatcher: DynEmailDispatcher,
}

impl EmailServiceImpl {
    pub fn new(renderer: Arc<EmailRenderer>, dispatcher: DynEmailDispatcher) -> Self {
        Self {
            renderer,
            dispatcher,
        }
    }

    /// Render, then dispatch. A render failure returns before the dispatcher
    /// is touched.
    async fn send_confirmation(&self, req: &SendOrderConfirmationRequest) -> Result<(), ServiceError> {
        let order = req
            .order
            .as_ref()
            .ok_or_else(|| ServiceError::Render("request carries no order".to_string()))?;

        let confirmation = self.renderer.render(order)?;

        self.dispatcher.send(&req.email, &confirmation).await?;

        Ok(())
    }
}

#[tonic::async_trait]
impl EmailService for EmailServiceImpl {
    async fn send_order_confirmation(
        &self,
        request: Request<SendOrderConfirmationRequest>,
    ) -> Result<Response<Empty>, Status> {
        let tracing_ctx = TracingContext::from_request(&request, "SendOrderConfirmation");
        let req = request.into_inner();

        info!("Handling gRPC request: SendOrderConfirmation to {}", req.email);

        let result = self.send_confirmation(&req).await;
        finish_span(tracing_ctx.as_ref(), &result, "Order confirmation sent");

        result.map_err(AppErrorGrpc::from)?;

        info!("Order confirmation for {} handled", req.email);
        Ok(Response::new(Empty {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::EmailDispatcher, errors::DispatchError, renderer::tests::sample_order,
        service::DummyDispatcher,
    };
    use async_trait::async_trait;
    use crate::EMAIL_SERVICE_NAME;
    use genproto::health::{
        HealthCheckRequest, health_check_response::ServingStatus, health_server::Health,
    };
    use shared::{
        errors::{DISPATCH_FAILED_MESSAGE, RENDER_FAILED_MESSAGE},
        health::HealthResponder,
    };
    use std::sync::Mutex;
    use tonic::Code;

    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailDispatcher for RecordingDispatcher {
        async fn send(&self, email_address: &str, content: &str) -> Result<(), DispatchError> {
            self.sent
                .lock()
                .unwrap()
                .push((email_address.to_string(), content.to_string()));

            if self.fail {
                Err(DispatchError::Transport("relay refused connection".into()))
            } else {
                Ok(())
            }
        }
    }

    fn service_with(dispatcher: Arc<RecordingDispatcher>) -> EmailServiceImpl {
        EmailServiceImpl::new(Arc::new(EmailRenderer::new()), dispatcher)
    }

    fn confirmation_request(order: Option<genproto::hipstershop::OrderResult>) -> Request<SendOrderConfirmationRequest> {
        Request::new(SendOrderConfirmationRequest {
            email: "someone@example.com".to_string(),
            order,
        })
    }

    #[tokio::test]
    async fn test_well_formed_order_is_rendered_and_dispatched() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let service = service_with(dispatcher.clone());

        service
            .send_order_confirmation(confirmation_request(Some(sample_order())))
            .await
            .unwrap();

        let sent = dispatcher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "someone@example.com");
        assert!(sent[0].1.contains("a7b3c9d1-order"));
    }

    #[tokio::test]
    async fn test_dummy_backend_always_succeeds() {
        let service = EmailServiceImpl::new(
            Arc::new(EmailRenderer::new()),
            Arc::new(DummyDispatcher::new()),
        );

        for _ in 0..3 {
            let response = service
                .send_order_confirmation(confirmation_request(Some(sample_order())))
                .await;
            assert!(response.is_ok());
        }
    }

    #[tokio::test]
    async fn test_render_failure_never_dispatches() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let service = service_with(dispatcher.clone());

        let mut order = sample_order();
        order.shipping_cost = None;

        let status = service
            .send_order_confirmation(confirmation_request(Some(order)))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), RENDER_FAILED_MESSAGE);
        assert!(dispatcher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_order_is_render_failure() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let service = service_with(dispatcher.clone());

        let status = service
            .send_order_confirmation(confirmation_request(None))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Internal);
        assert!(dispatcher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_internal() {
        let dispatcher = Arc::new(RecordingDispatcher {
            fail: true,
            ..Default::default()
        });
        let service = service_with(dispatcher.clone());

        let status = service
            .send_order_confirmation(confirmation_request(Some(sample_order())))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), DISPATCH_FAILED_MESSAGE);
        assert!(!status.message().contains("relay refused"));
    }

    #[tokio::test]
    async fn test_health_stays_serving_after_failed_calls() {
        let health = HealthResponder::new([EMAIL_SERVICE_NAME]);
        health.set_serving();

        let dispatcher = Arc::new(RecordingDispatcher {
            fail: true,
            ..Default::default()
        });
        let service = service_with(dispatcher);

        let mut broken = sample_order();
        broken.shipping_address = None;

        for order in [sample_order(), broken] {
            assert!(
                service
                    .send_order_confirmation(confirmation_request(Some(order)))
                    .await
                    .is_err()
            );
        }

        let response = health
            .check(Request::new(HealthCheckRequest {
                service: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.status(), ServingStatus::Serving);
    }
}
