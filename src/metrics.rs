//! Query metrics and tracing spans.
//!
//! With the `metrics` feature, [`METRICS`] holds OpenTelemetry instruments
//! backed by a Prometheus registry that applications can scrape:
//!
//! ```rust,no_run
//! use joinery::metrics::METRICS;
//! use prometheus::{Encoder, TextEncoder};
//!
//! let mut out = Vec::new();
//! TextEncoder::new().encode(&METRICS.registry.gather(), &mut out).unwrap();
//! ```
//!
//! With the `tracing` feature, [`tracing_helpers`] provides the spans entered
//! around query execution, connection acquisition and column introspection.

#[cfg(feature = "metrics")]
pub use self::instruments::{OrmMetrics, METRICS};

#[cfg(feature = "metrics")]
mod instruments {
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider as _};
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::Registry;
    use std::time::Duration;

    pub static METRICS: Lazy<OrmMetrics> = Lazy::new(OrmMetrics::init);

    pub struct OrmMetrics {
        pub registry: Registry,
        pub queries_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub query_errors_total: Counter<u64>,
        pub connection_wait: Histogram<f64>,
        _provider: SdkMeterProvider,
    }

    impl OrmMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let exporter = opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build();

            let provider = match exporter {
                Ok(exporter) => SdkMeterProvider::builder().with_reader(exporter).build(),
                Err(err) => {
                    log::warn!("prometheus exporter unavailable, metrics will not be exported: {err}");
                    SdkMeterProvider::builder().build()
                }
            };
            let meter = provider.meter("joinery");

            let queries_total = meter
                .u64_counter("joinery_queries_total")
                .with_description("Total queries executed")
                .build();

            let query_duration = meter
                .f64_histogram("joinery_query_duration_seconds")
                .with_description("Duration of queries")
                .with_unit("s")
                .build();

            let query_errors_total = meter
                .u64_counter("joinery_query_errors_total")
                .with_description("Queries that returned an error")
                .build();

            let connection_wait = meter
                .f64_histogram("joinery_connection_wait_seconds")
                .with_description("Time spent acquiring a pooled connection")
                .with_unit("s")
                .build();

            Self {
                registry,
                queries_total,
                query_duration,
                query_errors_total,
                connection_wait,
                _provider: provider,
            }
        }

        pub fn record_query_duration(&self, elapsed: Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        pub fn record_connection_wait(&self, waited: Duration) {
            self.connection_wait.record(waited.as_secs_f64(), &[]);
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    pub fn execute_query_span(sql: &str) -> Span {
        tracing::info_span!("joinery.query", sql = %sql)
    }

    pub fn acquire_connection_span() -> Span {
        tracing::info_span!("joinery.acquire_connection")
    }

    pub fn introspect_span(table: &str) -> Span {
        tracing::debug_span!("joinery.introspect", table = %table)
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn recording_does_not_panic() {
        METRICS.record_query_duration(Duration::from_millis(3));
        METRICS.record_query_error();
        METRICS.record_connection_wait(Duration::from_micros(250));
    }
}
