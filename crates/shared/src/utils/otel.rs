//! Best-effort trace export.
//!
//! Backends are tried in preference order. Each one is gated by a disable flag
//! and an address variable; the first backend whose gate opens and whose
//! exporter builds is installed globally. When none does, RPCs still run and
//! no spans leave the process.

use anyhow::{Result, anyhow};
use opentelemetry::{global, trace::TracerProvider as _};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource, propagation::TraceContextPropagator, trace::SdkTracerProvider,
};
use opentelemetry_zipkin::ZipkinExporter;
use std::fmt;
use tracing::{info, warn};

use crate::{config::EnvLookup, utils::interceptor::TracingInterceptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExporterBackend {
    /// OTLP over gRPC, as accepted by the Jaeger collector.
    Jaeger,
    Zipkin,
}

impl ExporterBackend {
    pub const PREFERENCE: [ExporterBackend; 2] = [ExporterBackend::Jaeger, ExporterBackend::Zipkin];

    pub fn disable_var(self) -> &'static str {
        match self {
            ExporterBackend::Jaeger => "DISABLE_JAEGER",
            ExporterBackend::Zipkin => "DISABLE_ZIPKIN",
        }
    }

    pub fn address_var(self) -> &'static str {
        match self {
            ExporterBackend::Jaeger => "JAEGER_SERVICE_ADDR",
            ExporterBackend::Zipkin => "ZIPKIN_SERVICE_ADDR",
        }
    }

    /// Returns the collector endpoint when this backend may be used.
    pub fn guard(self, lookup: EnvLookup<'_>) -> Result<String, SkipReason> {
        if lookup(self.disable_var()).is_some() {
            return Err(SkipReason::Disabled(self.disable_var()));
        }

        lookup(self.address_var())
            .map(|addr| addr.trim().to_string())
            .filter(|addr| !addr.is_empty())
            .ok_or(SkipReason::MissingAddress(self.address_var()))
    }

    fn build_provider(self, endpoint: &str, resource: Resource) -> Result<SdkTracerProvider> {
        let provider = match self {
            ExporterBackend::Jaeger => {
                let exporter = SpanExporter::builder()
                    .with_tonic()
                    .with_endpoint(endpoint.to_string())
                    .build()
                    .map_err(|e| anyhow!("failed to create OTLP span exporter: {e}"))?;
                SdkTracerProvider::builder()
                    .with_resource(resource)
                    .with_batch_exporter(exporter)
                    .build()
            }
            ExporterBackend::Zipkin => {
                // The Zipkin exporter owns a blocking HTTP client, which must
                // not be created or dropped on an async worker.
                let endpoint = endpoint.to_string();
                std::thread::Builder::new()
                    .name("zipkin-exporter-init".to_string())
                    .spawn(move || -> Result<SdkTracerProvider> {
                        let exporter = ZipkinExporter::builder()
                            .with_collector_endpoint(endpoint)
                            .build()
                            .map_err(|e| anyhow!("failed to create Zipkin exporter: {e}"))?;
                        Ok(SdkTracerProvider::builder()
                            .with_resource(resource)
                            .with_batch_exporter(exporter)
                            .build())
                    })
                    .map_err(|e| anyhow!("failed to spawn Zipkin exporter thread: {e}"))?
                    .join()
                    .map_err(|_| anyhow!("Zipkin exporter construction panicked"))??
            }
        };

        Ok(provider)
    }
}

impl fmt::Display for ExporterBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExporterBackend::Jaeger => write!(f, "Jaeger"),
            ExporterBackend::Zipkin => write!(f, "Zipkin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Disabled(&'static str),
    MissingAddress(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled(var) => write!(f, "{var} is set"),
            SkipReason::MissingAddress(var) => write!(f, "{var} is not set"),
        }
    }
}

pub struct Telemetry {
    service_name: String,
    backend: Option<ExporterBackend>,
    provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    /// Walks the backends in preference order. Never fails: every problem is
    /// logged and the chain moves on, ending in a no-op tracer.
    pub fn init(service_name: impl Into<String>, lookup: EnvLookup<'_>) -> Self {
        let service_name = service_name.into();

        for backend in ExporterBackend::PREFERENCE {
            let endpoint = match backend.guard(lookup) {
                Ok(endpoint) => endpoint,
                Err(reason) => {
                    info!("{backend} disabled: {reason}");
                    continue;
                }
            };

            let resource = Resource::builder()
                .with_service_name(service_name.clone())
                .build();

            match backend.build_provider(&endpoint, resource) {
                Ok(provider) => {
                    global::set_text_map_propagator(TraceContextPropagator::new());
                    global::set_tracer_provider(provider.clone());
                    info!("{backend} enabled, exporting spans to {endpoint}");

                    return Self {
                        service_name,
                        backend: Some(backend),
                        provider: Some(provider),
                    };
                }
                Err(e) => warn!("{backend} disabled: {e:#}"),
            }
        }

        info!("No trace exporter configured, tracing is a no-op");
        Self::disabled(service_name)
    }

    pub fn disabled(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            backend: None,
            provider: None,
        }
    }

    pub fn backend(&self) -> Option<ExporterBackend> {
        self.backend
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Interceptor for the named gRPC service, e.g. `hipstershop.EmailService`.
    pub fn interceptor(&self, rpc_service: &'static str) -> TracingInterceptor {
        match &self.provider {
            Some(provider) => {
                TracingInterceptor::new(provider.tracer(self.service_name.clone()), rpc_service)
            }
            None => TracingInterceptor::noop(rpc_service),
        }
    }

    pub fn shutdown(self) -> Result<()> {
        if let Some(provider) = self.provider {
            provider
                .shutdown()
                .map_err(|e| anyhow!("failed to shutdown tracer provider: {e}"))?;
        }
        Ok(())
    }
}
