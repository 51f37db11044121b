//! Logging and optional OpenTelemetry export for the command-line tool.
//!
//! Logs go to stderr so that command output on stdout stays machine-readable.
//! The level is taken from `RUST_LOG` and defaults to `info`. With the
//! `telemetry` feature and any `OTEL_EXPORTER_OTLP_*` variable set, spans are
//! also exported over OTLP.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[cfg(feature = "telemetry")]
use opentelemetry::trace::TracerProvider as _;
#[cfg(feature = "telemetry")]
use opentelemetry_sdk::trace::SdkTracerProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg(feature = "telemetry")]
enum TelemetryProtocol {
    Http,
    Grpc,
}

#[cfg(feature = "telemetry")]
impl TelemetryProtocol {
    fn from_env() -> Option<Self> {
        let enabled = ["OTEL_EXPORTER_OTLP_ENDPOINT", "OTEL_EXPORTER_OTLP_HEADERS", "OTEL_EXPORTER_OTLP_PROTOCOL"]
            .iter()
            .any(|name| std::env::var(name).is_ok());
        if !enabled {
            return None;
        }
        match std::env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref() {
            Ok("grpc") => Some(TelemetryProtocol::Grpc),
            _ => Some(TelemetryProtocol::Http),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[cfg(feature = "telemetry")]
    #[error("Failed to build OTLP span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Builder for the global subscriber.
#[derive(Debug, Clone)]
pub struct TelemetryBuilder {
    name: &'static str,
    version: &'static str,
    default_directive: &'static str,
}

impl TelemetryBuilder {
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    /// Filter used when `RUST_LOG` is not set.
    pub fn with_default_directive(mut self, directive: &'static str) -> Self {
        self.default_directive = directive;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive))
    }

    #[cfg(not(feature = "telemetry"))]
    pub fn register(self) -> Result<Telemetry, TelemetryError> {
        tracing_subscriber::registry()
            .with(self.env_filter())
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
        tracing::debug!(name = self.name, version = self.version, "Logging initialised");
        Ok(Telemetry {})
    }

    #[cfg(feature = "telemetry")]
    pub fn register(self) -> Result<Telemetry, TelemetryError> {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        match TelemetryProtocol::from_env() {
            Some(protocol) => {
                let tracer_provider = self.tracer_provider(protocol)?;
                let tracer = tracer_provider.tracer(self.name);
                tracing_subscriber::registry()
                    .with(self.env_filter())
                    .with(fmt_layer)
                    .with(tracing_opentelemetry::OpenTelemetryLayer::new(tracer))
                    .try_init()?;
                tracing::debug!(?protocol, "OpenTelemetry span export is enabled");
                Ok(Telemetry {
                    tracer_provider: Some(tracer_provider),
                })
            }
            None => {
                tracing_subscriber::registry()
                    .with(self.env_filter())
                    .with(fmt_layer)
                    .try_init()?;
                Ok(Telemetry {
                    tracer_provider: None,
                })
            }
        }
    }

    #[cfg(feature = "telemetry")]
    fn tracer_provider(&self, protocol: TelemetryProtocol) -> Result<SdkTracerProvider, TelemetryError> {
        use opentelemetry::KeyValue;
        use opentelemetry_sdk::Resource;
        use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};
        use opentelemetry_semantic_conventions::SCHEMA_URL;
        use opentelemetry_semantic_conventions::attribute::{
            DEPLOYMENT_ENVIRONMENT_NAME, SERVICE_VERSION,
        };

        let deployment_env =
            std::env::var("DEPLOYMENT_ENV").unwrap_or_else(|_| "develop".to_string());
        let resource = Resource::builder()
            .with_service_name(self.name)
            .with_schema_url(
                [
                    KeyValue::new(SERVICE_VERSION, self.version),
                    KeyValue::new(DEPLOYMENT_ENVIRONMENT_NAME, deployment_env),
                ],
                SCHEMA_URL,
            )
            .build();

        let exporter = opentelemetry_otlp::SpanExporter::builder();
        let exporter = match protocol {
            TelemetryProtocol::Http => exporter.with_http().build()?,
            TelemetryProtocol::Grpc => exporter.with_tonic().build()?,
        };

        Ok(SdkTracerProvider::builder()
            .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
            .with_id_generator(RandomIdGenerator::default())
            .with_resource(resource)
            .with_batch_exporter(exporter)
            .build())
    }
}

/// Installed telemetry. Pending spans are flushed when this is dropped.
pub struct Telemetry {
    #[cfg(feature = "telemetry")]
    tracer_provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> TelemetryBuilder {
        TelemetryBuilder {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            default_directive: "info",
        }
    }
}

#[cfg(feature = "telemetry")]
impl Drop for Telemetry {
    fn drop(&mut self) {
        if let Some(tracer_provider) = self.tracer_provider.as_ref() {
            if let Err(err) = tracer_provider.shutdown() {
                eprintln!("{err:?}");
            }
        }
    }
}
