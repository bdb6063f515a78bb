//! Response encoder metrics
//!
//! OpenTelemetry instruments recording what the response encoder does. They
//! are exported through whatever meter provider is installed globally (see
//! `sockrpc_core::init_observability`); without one they are no-ops.
//!
//! # Metrics Collected
//!
//! - **responses_total**: envelopes produced, by service, method and form (counter)
//! - **response_size**: size of encoded envelopes in bytes (histogram)
//! - **failures_total**: encoder failures, by error kind (counter)

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Instruments for the response encoder
///
/// All metrics are prefixed with `sockrpc.encoder.*`.
pub struct EncoderMetrics {
    /// Number of envelopes produced
    pub responses_total: Counter<u64>,
    /// Encoded envelope size in bytes
    pub response_size: Histogram<u64>,
    /// Number of failed encoding attempts
    pub failures_total: Counter<u64>,
}

impl EncoderMetrics {
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            responses_total: meter
                .u64_counter("sockrpc.encoder.responses.total")
                .with_description("Total number of response envelopes encoded")
                .build(),
            response_size: meter
                .u64_histogram("sockrpc.encoder.response.size")
                .with_description("Encoded response envelope size in bytes")
                .with_unit("By")
                .build(),
            failures_total: meter
                .u64_counter("sockrpc.encoder.failures.total")
                .with_description("Total number of failed response encodings")
                .build(),
        }
    }

    /// Record an encoded envelope; `form` is "success" or "error"
    pub fn record_response(&self, rpc: &str, form: &'static str, size: usize) {
        let attributes = &[
            KeyValue::new("rpc", rpc.to_string()),
            KeyValue::new("form", form),
        ];
        self.responses_total.add(1, attributes);
        self.response_size.record(size as u64, attributes);
    }

    pub fn record_failure(&self, rpc: &str, kind: &'static str) {
        let attributes = &[
            KeyValue::new("rpc", rpc.to_string()),
            KeyValue::new("error_kind", kind),
        ];
        self.failures_total.add(1, attributes);
    }
}
