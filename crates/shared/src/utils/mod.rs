mod gracefullshutdown;
mod interceptor;
mod logs;
mod metadata;
mod otel;

pub use self::gracefullshutdown::shutdown_signal;
pub use self::interceptor::{TracingContext, TracingInterceptor, finish_span};
pub use self::logs::{LogConfig, init_logger};
pub use self::metadata::{MetadataExtractor, MetadataInjector};
pub use self::otel::{ExporterBackend, SkipReason, Telemetry};
