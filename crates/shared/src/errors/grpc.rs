use crate::errors::service::ServiceError;
use thiserror::Error;
use tonic::Status;
use tracing::error;

pub const RENDER_FAILED_MESSAGE: &str = "An error occurred when preparing the confirmation mail.";
pub const DISPATCH_FAILED_MESSAGE: &str = "An error occurred when sending the email.";
pub const DEPENDENCY_FAILED_MESSAGE: &str = "failed to fetch products from the catalog";
pub const INTERNAL_MESSAGE: &str = "internal error";

#[derive(Debug, Error)]
pub enum AppErrorGrpc {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
    #[error("Unhandled: {0}")]
    Unhandled(String),
}

// The detailed cause goes to the log; callers only ever see the fixed message.
impl From<AppErrorGrpc> for Status {
    fn from(err: AppErrorGrpc) -> Self {
        error!(error = %err, "❌ Request failed");

        match err {
            AppErrorGrpc::Service(service_err) => match service_err {
                ServiceError::Render(_) => Status::internal(RENDER_FAILED_MESSAGE),
                ServiceError::Dispatch(_) => Status::internal(DISPATCH_FAILED_MESSAGE),
                ServiceError::Dependency(_) | ServiceError::Timeout(_) => {
                    Status::internal(DEPENDENCY_FAILED_MESSAGE)
                }
                ServiceError::Internal(_) => Status::internal(INTERNAL_MESSAGE),
            },

            AppErrorGrpc::Unhandled(_) => Status::internal(INTERNAL_MESSAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tonic::Code;

    #[test]
    fn test_render_error_hides_details() {
        let status: Status =
            AppErrorGrpc::from(ServiceError::Render("missing field `order_id`".into())).into();

        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), RENDER_FAILED_MESSAGE);
        assert!(!status.message().contains("order_id"));
    }

    #[test]
    fn test_dependency_and_timeout_are_internal() {
        for err in [
            ServiceError::Dependency("connection refused".into()),
            ServiceError::Timeout(Duration::from_millis(50)),
        ] {
            let status: Status = AppErrorGrpc::from(err).into();
            assert_eq!(status.code(), Code::Internal);
            assert_eq!(status.message(), DEPENDENCY_FAILED_MESSAGE);
        }
    }

    #[test]
    fn test_upstream_status_becomes_dependency_error() {
        let err = ServiceError::from(Status::unavailable("catalog down"));
        assert!(matches!(err, ServiceError::Dependency(ref msg) if msg.contains("catalog down")));
    }
}
