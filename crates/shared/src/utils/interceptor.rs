use opentelemetry::{
    Context, KeyValue, global,
    trace::{SpanKind, Status as SpanStatus, TraceContextExt, Tracer},
};
use opentelemetry_sdk::trace::SdkTracer;
use tokio::time::Instant;
use tonic::{Request, Status, service::Interceptor};

use crate::utils::metadata::MetadataExtractor;

/// Span context carried from the interceptor to the handler through request
/// extensions.
#[derive(Clone)]
pub struct TracingContext {
    pub cx: Context,
    pub start_time: Instant,
}

impl TracingContext {
    /// Takes the context attached by [`TracingInterceptor`], naming the span
    /// after the RPC method.
    pub fn from_request<T>(request: &Request<T>, method: &'static str) -> Option<Self> {
        let tracing_ctx = request.extensions().get::<TracingContext>()?.clone();

        let span = tracing_ctx.cx.span();
        span.update_name(method);
        span.set_attribute(KeyValue::new("rpc.method", method));

        Some(tracing_ctx)
    }

    pub fn finish(&self, outcome: Result<&str, &str>) {
        let span = self.cx.span();
        let elapsed = self.start_time.elapsed().as_secs_f64();

        span.set_attribute(KeyValue::new("duration_secs", elapsed));

        match outcome {
            Ok(message) => {
                span.add_event(
                    "Operation completed",
                    vec![KeyValue::new("message", message.to_string())],
                );
                span.set_status(SpanStatus::Ok);
            }
            Err(message) => {
                span.set_status(SpanStatus::error(message.to_string()));
            }
        }

        span.end();
    }
}

/// Starts a server span per inbound call. Without a tracer it passes requests
/// through untouched.
#[derive(Clone)]
pub struct TracingInterceptor {
    tracer: Option<SdkTracer>,
    rpc_service: &'static str,
}

impl TracingInterceptor {
    pub fn new(tracer: SdkTracer, rpc_service: &'static str) -> Self {
        Self {
            tracer: Some(tracer),
            rpc_service,
        }
    }

    pub fn noop(rpc_service: &'static str) -> Self {
        Self {
            tracer: None,
            rpc_service,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.tracer.is_some()
    }
}

impl Interceptor for TracingInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let Some(tracer) = &self.tracer else {
            return Ok(request);
        };

        let parent_cx = global::get_text_map_propagator(|propagator| {
            propagator.extract(&MetadataExtractor(request.metadata()))
        });

        let span = tracer
            .span_builder(self.rpc_service)
            .with_kind(SpanKind::Server)
            .with_attributes(vec![
                KeyValue::new("rpc.system", "grpc"),
                KeyValue::new("rpc.service", self.rpc_service),
            ])
            .start_with_context(tracer, &parent_cx);

        request.extensions_mut().insert(TracingContext {
            cx: parent_cx.with_span(span),
            start_time: Instant::now(),
        });

        Ok(request)
    }
}

/// Finishes the span of a call, if one was started.
pub fn finish_span<T, E: std::fmt::Display>(
    tracing_ctx: Option<&TracingContext>,
    result: &Result<T, E>,
    success_message: &str,
) {
    let Some(tracing_ctx) = tracing_ctx else {
        return;
    };

    match result {
        Ok(_) => tracing_ctx.finish(Ok(success_message)),
        Err(e) => tracing_ctx.finish(Err(&e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::SdkTracerProvider;

    #[test]
    fn test_noop_interceptor_passes_through() {
        let mut interceptor = TracingInterceptor::noop("hipstershop.EmailService");
        let request = interceptor.call(Request::new(())).unwrap();

        assert!(request.extensions().get::<TracingContext>().is_none());
        assert!(TracingContext::from_request(&request, "SendOrderConfirmation").is_none());
    }

    #[test]
    fn test_recording_interceptor_attaches_span() {
        let provider = SdkTracerProvider::builder().build();
        let mut interceptor = TracingInterceptor::new(
            provider.tracer("recommendationservice"),
            "hipstershop.RecommendationService",
        );

        let request = interceptor.call(Request::new(())).unwrap();
        let tracing_ctx = TracingContext::from_request(&request, "ListRecommendations")
            .expect("span context attached");

        assert!(tracing_ctx.cx.span().span_context().is_valid());
        finish_span(Some(&tracing_ctx), &Ok::<(), String>(()), "done");
    }
}
