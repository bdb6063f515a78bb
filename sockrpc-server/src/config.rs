//! Response encoder configuration
//!
//! # Environment Variables
//!
//! - `SOCKRPC_CODEC`: wire codec, "binary" (default) or "json"
//!
//! An unparseable `SOCKRPC_CODEC` falls back to the default codec with a
//! warning rather than failing server startup.

use sockrpc_core::Codec;

/// Settings for a `ResponseEncoder`
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    /// Codec for response messages and the envelope
    pub codec: Codec,
    /// Service name used as the metrics meter name
    pub service_name: String,
    /// Record OpenTelemetry metrics for each response
    pub enable_metrics: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            codec: codec_from_env(),
            service_name: "sockrpc".to_string(),
            enable_metrics: false,
        }
    }
}

fn codec_from_env() -> Codec {
    match std::env::var("SOCKRPC_CODEC") {
        Ok(value) => value.parse().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Ignoring SOCKRPC_CODEC");
            Codec::default()
        }),
        Err(_) => Codec::default(),
    }
}

impl EncoderConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }
}
