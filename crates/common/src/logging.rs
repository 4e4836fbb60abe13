//! Sets up the `tracing` subscriber: compact stdout logs filtered by `RUST_LOG` and, optionally,
//! an OpenTelemetry span exporter.
use std::env;

use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use thiserror::Error;
use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable holding the OTLP collector endpoint.
pub const OTLP_URL_ENVVAR: &str = "STAKE_MIRROR_OTLP_URL";

/// Environment variable holding a label that distinguishes instances of the same service.
pub const SVC_LABEL_ENVVAR: &str = "STAKE_MIRROR_SVC_LABEL";

/// Setting this to `1` adds the source file to every log line.
pub const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// Setting this to `1` adds the source line number to every log line.
pub const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The span exporter could not be built.
    #[error("could not build OTLP exporter: {0}")]
    Exporter(String),

    /// A global subscriber is already installed.
    #[error("could not install subscriber: {0}")]
    Install(String),
}

/// How the service identifies itself and where its spans go.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    whoami: String,
    otlp_url: Option<String>,
}

impl LoggerConfig {
    /// A config for the service `base`, labelled from [`SVC_LABEL_ENVVAR`] and exporting to
    /// [`OTLP_URL_ENVVAR`] when those are set.
    pub fn with_base_name(base: &str) -> Self {
        Self {
            whoami: whoami(base, env::var(SVC_LABEL_ENVVAR).ok().as_deref()),
            otlp_url: env::var(OTLP_URL_ENVVAR).ok(),
        }
    }

    /// Exports spans to `url`.
    pub fn with_otlp_url(mut self, url: impl Into<String>) -> Self {
        self.otlp_url = Some(url.into());
        self
    }

    /// The name the service reports.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

/// Flushes pending spans when dropped. Keep it alive for as long as the service runs.
#[derive(Debug)]
#[must_use = "spans are only flushed while the guard is alive"]
pub struct LoggingGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to flush spans: {e}");
            }
        }
    }
}

/// Installs the global subscriber.
pub fn init(config: LoggerConfig) -> Result<LoggingGuard, LoggingError> {
    let flag = |name| env::var(name).is_ok_and(|v| v == "1");

    let stdout = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(flag(LOG_FILE_ENVVAR))
                .with_line_number(flag(LOG_LINE_NUM_ENVVAR)),
        )
        .with_filter(EnvFilter::from_default_env());

    let registry = tracing_subscriber::registry().with(stdout);

    let provider = match &config.otlp_url {
        Some(url) => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(url)
                .build()
                .map_err(|e| LoggingError::Exporter(e.to_string()))?;

            let provider = SdkTracerProvider::builder()
                .with_resource(
                    Resource::builder()
                        .with_attribute(KeyValue::new("service.name", config.whoami.clone()))
                        .build(),
                )
                .with_batch_exporter(exporter)
                .build();

            registry
                .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("stake-mirror")))
                .try_init()
                .map_err(|e| LoggingError::Install(e.to_string()))?;

            Some(provider)
        }
        None => {
            registry
                .try_init()
                .map_err(|e| LoggingError::Install(e.to_string()))?;

            None
        }
    };

    info!(whoami = %config.whoami, otlp = %config.otlp_url.is_some(), "logging started");

    Ok(LoggingGuard { provider })
}

fn whoami(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
