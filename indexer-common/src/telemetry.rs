// This file is part of codechain-indexer.
// Copyright (C) 2025 Kodebox, Inc.
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Telemetry: logging, tracing and metrics.
//!
//! ## Logging
//!
//! - Use the `log` crate with the `kv` feature for structured logging.
//! - Fields are separated by comma and separated from the message by a single trailing semicolon:
//!   `info!(height, hash:% = block.hash; "block indexed")`
//! - Use `:?` to use `Debug` and `:%` to use `Display` to "render" field values.
//! - For errors, include the error chain: `error!(error:% = error.as_chain(); "message")`.
//!
//! ## Tracing
//!
//! - Use the `#[trace]` attribute to instrument functions/methods.
//! - Each sync cycle runs in a root span: `Span::root("sync", SpanContext::random())`.
//!
//! ## Metrics
//!
//! - Metrics are exposed via Prometheus at the configured address and port.

use fastrace_opentelemetry::OpenTelemetryReporter;
use logforth::{
    append::{FastraceEvent, Stdout},
    diagnostic::FastraceDiagnostic,
    filter::EnvFilter,
    layout::JsonLayout,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::{InstrumentationScope, trace::SpanKind};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use serde::Deserialize;
use std::{
    borrow::Cow,
    net::{IpAddr, Ipv4Addr},
};

/// Telemetry (tracing, metrics) configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(rename = "tracing", default)]
    pub tracing_config: TracingConfig,

    #[serde(rename = "metrics", default)]
    pub metrics_config: MetricsConfig,
}

/// Tracing configuration.
///
/// All fields have deserialization defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Defaults to false.
    #[serde(default)]
    pub enabled: bool,

    /// Defaults to OTLP gRPC: "http://localhost:4317".
    #[serde(default = "otlp_exporter_endpoint_default")]
    pub otlp_exporter_endpoint: String,

    /// Defaults to the package name.
    #[serde(default = "package_name")]
    pub service_name: String,

    /// Defaults to the package version.
    #[serde(default = "package_version")]
    pub service_version: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: Default::default(),
            otlp_exporter_endpoint: otlp_exporter_endpoint_default(),
            service_name: package_name(),
            service_version: package_version(),
        }
    }
}

/// Metrics configuration.
///
/// All fields have deserialization defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Defaults to false.
    #[serde(default)]
    pub enabled: bool,

    /// Defaults to `"0.0.0.0"`.
    #[serde(default = "metrics_address_default")]
    pub address: IpAddr,

    /// Defaults to `9,000`.
    #[serde(default = "metrics_port_default")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: Default::default(),
            address: metrics_address_default(),
            port: metrics_port_default(),
        }
    }
}

/// Initialize logging with [Logforth](https://github.com/fast/logforth).
///
/// Log levels are filtered based on the `RUST_LOG` environment variable and log records are
/// formatted as JSON. Log records emitted within a span are attached to that span as events.
///
/// # Panics
///
/// If logging has already been initialized.
pub fn init_logging() {
    logforth::builder()
        .dispatch(|dispatch| {
            dispatch
                .filter(EnvFilter::from_default_env())
                .diagnostic(FastraceDiagnostic::default())
                .append(Stdout::default().with_layout(JsonLayout::default()))
                .append(FastraceEvent::default())
        })
        .apply();
}

/// Initialize tracing with [fastrace](https://github.com/fast/fastrace), reporting spans to an
/// OTLP collector via gRPC, if enabled.
///
/// # Panics
///
/// Panics if the OTLP exporter cannot be built.
pub fn init_tracing(config: TracingConfig) {
    let TracingConfig {
        enabled,
        otlp_exporter_endpoint,
        service_name,
        service_version,
    } = config;

    if !enabled {
        return;
    }

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_exporter_endpoint)
        .build()
        .expect("OTLP exporter can be built");

    let resource = Resource::builder()
        .with_service_name(service_name.clone())
        .build();

    let instrumentation_scope = InstrumentationScope::builder(service_name)
        .with_version(service_version)
        .build();

    let reporter = OpenTelemetryReporter::new(
        exporter,
        SpanKind::Internal,
        Cow::Owned(resource),
        instrumentation_scope,
    );

    fastrace::set_reporter(reporter, fastrace::collector::Config::default());
}

/// Initialize metrics by installing a Prometheus exporter, if enabled.
///
/// # Panics
///
/// Panics if the Prometheus exporter cannot be installed.
pub fn init_metrics(config: MetricsConfig) {
    let MetricsConfig {
        enabled,
        address,
        port,
    } = config;

    if enabled {
        PrometheusBuilder::new()
            .with_http_listener((address, port))
            .install()
            .expect("Prometheus exporter can be installed");
    }
}

fn otlp_exporter_endpoint_default() -> String {
    "http://localhost:4317".to_string()
}

fn package_name() -> String {
    env!("CARGO_PKG_NAME").to_owned()
}

fn package_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

fn metrics_address_default() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn metrics_port_default() -> u16 {
    9_000
}

#[cfg(test)]
mod tests {
    use crate::telemetry::Config;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_config_defaults() {
        let config = serde_json::from_str::<Config>("{}").expect("config can be deserialized");
        assert!(!config.tracing_config.enabled);
        assert_eq!(
            config.tracing_config.otlp_exporter_endpoint,
            "http://localhost:4317"
        );
        assert!(!config.metrics_config.enabled);
        assert_eq!(
            config.metrics_config.address,
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
        assert_eq!(config.metrics_config.port, 9_000);
    }
}
