//! Metrics infrastructure for the Souliss telemetry decoder.
//!
//! This crate describes all metrics emitted by the decoder. It re-exports the
//! `metrics` crate for convenience and defines every metric as a structured
//! [`Metric`] constant to avoid typos and carry metadata.
//!
//! # Example
//!
//! ```rust,ignore
//! use souliss_metrics::{metric_defs, describe_metrics, gateway_labels};
//!
//! // Initialize metrics descriptions at startup
//! describe_metrics();
//!
//! metrics::counter!(metric_defs::FRAMES_RECEIVED.name, &gateway_labels(77)).increment(1);
//! ```
//!
//! # Metric Type
//!
//! ```rust
//! use souliss_metrics::{Metric, MetricKind};
//! use metrics::Unit;
//!
//! const MY_COUNTER: Metric = Metric::counter("my.counter")
//!     .with_description("A counter metric")
//!     .with_unit(Unit::Count)
//!     .with_labels(&["gateway"]);
//!
//! assert_eq!(MY_COUNTER.kind, MetricKind::Counter);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// Use the const constructors to declare metrics at compile time.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "souliss.frames.received").
    pub name: &'static str,
    /// The kind of metric (counter, gauge, histogram).
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    ///
    /// This should be called once at startup for each metric.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for the decoder.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Frames
    // ========================================================================

    /// Frames handed to the decoder.
    ///
    /// Labels: gateway, function
    pub const FRAMES_RECEIVED: Metric = Metric::counter("souliss.frames.received")
        .with_description("Frames handed to the decoder")
        .with_unit(Unit::Count)
        .with_labels(&["gateway", "function"]);

    /// Frames that produced no effect.
    ///
    /// Labels: gateway, reason (malformed, unknown_function, topology_unlearned)
    pub const FRAMES_DROPPED: Metric = Metric::counter("souliss.frames.dropped")
        .with_description("Frames dropped before routing")
        .with_unit(Unit::Count)
        .with_labels(&["gateway", "reason"]);

    /// Size of received MaCaCo frames.
    ///
    /// Labels: gateway
    pub const FRAME_SIZE: Metric = Metric::histogram("souliss.frames.size_bytes")
        .with_description("Size of received MaCaCo frames in bytes")
        .with_unit(Unit::Bytes)
        .with_labels(&["gateway"]);

    // ========================================================================
    // Routing
    // ========================================================================

    /// Values delivered to registered devices and topics.
    ///
    /// Labels: gateway, kind
    pub const VALUES_DELIVERED: Metric = Metric::counter("souliss.values.delivered")
        .with_description("Decoded values delivered to devices and topics")
        .with_unit(Unit::Count)
        .with_labels(&["gateway", "kind"]);

    /// Health values applied to devices.
    ///
    /// Labels: gateway
    pub const HEALTH_UPDATES: Metric = Metric::counter("souliss.health.updates")
        .with_description("Health values applied to devices")
        .with_unit(Unit::Count)
        .with_labels(&["gateway"]);

    /// Events raised on the discovery sink.
    ///
    /// Labels: gateway, kind (typical, topic, gateway, alive)
    pub const DISCOVERY_EVENTS: Metric = Metric::counter("souliss.discovery.events")
        .with_description("Events raised on the discovery sink")
        .with_unit(Unit::Count)
        .with_labels(&["gateway", "kind"]);

    // ========================================================================
    // Topology
    // ========================================================================

    /// Slots per node learned for a gateway.
    ///
    /// Labels: gateway
    pub const TOPOLOGY_TYPICALS_PER_NODE: Metric = Metric::gauge("souliss.topology.typicals_per_node")
        .with_description("Slots per node learned from the database structure")
        .with_labels(&["gateway"]);

    /// Nodes learned for a gateway.
    ///
    /// Labels: gateway
    pub const TOPOLOGY_NODES: Metric = Metric::gauge("souliss.topology.nodes")
        .with_description("Node count learned from the database structure")
        .with_unit(Unit::Count)
        .with_labels(&["gateway"]);

    /// Returns a slice of all defined metrics.
    pub const ALL: &[&Metric] = &[
        &FRAMES_RECEIVED,
        &FRAMES_DROPPED,
        &FRAME_SIZE,
        &VALUES_DELIVERED,
        &HEALTH_UPDATES,
        &DISCOVERY_EVENTS,
        &TOPOLOGY_TYPICALS_PER_NODE,
        &TOPOLOGY_NODES,
    ];
}

/// Labels identifying a gateway.
pub fn gateway_labels(gateway: u8) -> Vec<(&'static str, String)> {
    vec![("gateway", gateway.to_string())]
}

/// Gateway labels with additional key-value pairs.
pub fn gateway_labels_with(gateway: u8, extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, String)> {
    let mut labels = gateway_labels(gateway);
    labels.extend(extra.iter().map(|(key, value)| (*key, value.to_string())));
    labels
}

/// Describes all metrics used by the decoder.
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
