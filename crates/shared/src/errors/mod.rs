mod grpc;
mod service;

pub use self::grpc::{
    AppErrorGrpc, DEPENDENCY_FAILED_MESSAGE, DISPATCH_FAILED_MESSAGE, INTERNAL_MESSAGE,
    RENDER_FAILED_MESSAGE,
};
pub use self::service::ServiceError;
