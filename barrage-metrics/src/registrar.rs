//! Binds catalog descriptors to registered Prometheus collectors

use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};
use tracing::{debug, info};

use crate::catalog::{self, MetricDescriptor, MetricId, MetricKind};
use crate::error::MetricsError;

/// A live collector for one descriptor
#[derive(Clone)]
pub enum Collector {
    Gauge(GaugeVec),
    Counter(CounterVec),
    Histogram(HistogramVec),
}

impl Collector {
    fn boxed(&self) -> Box<dyn prometheus::core::Collector> {
        match self {
            Collector::Gauge(c) => Box::new(c.clone()),
            Collector::Counter(c) => Box::new(c.clone()),
            Collector::Histogram(c) => Box::new(c.clone()),
        }
    }
}

/// Construct the collector described by `descriptor` under `subsystem`
pub fn build_collector(descriptor: &MetricDescriptor, subsystem: &str) -> Result<Collector, MetricsError> {
    let registration = |source| MetricsError::Registration {
        name: descriptor.name,
        source,
    };
    let opts = Opts::new(descriptor.name, descriptor.help).subsystem(subsystem);

    match &descriptor.kind {
        MetricKind::Gauge => GaugeVec::new(opts, descriptor.labels)
            .map(Collector::Gauge)
            .map_err(registration),
        MetricKind::Counter => CounterVec::new(opts, descriptor.labels)
            .map(Collector::Counter)
            .map_err(registration),
        MetricKind::Histogram { buckets } => {
            let opts = HistogramOpts::from(opts).buckets(buckets.to_vec());
            HistogramVec::new(opts, descriptor.labels)
                .map(Collector::Histogram)
                .map_err(registration)
        }
        MetricKind::Summary { .. } => Err(MetricsError::UnsupportedKind {
            name: descriptor.name,
            kind: descriptor.kind.as_str(),
        }),
    }
}

/// Registers the metric catalog exactly once.
///
/// `register` consumes the registrar, so a second registration has to go
/// through a new registrar and is then rejected by the registry as a
/// duplicate.
pub struct MetricRegistrar {
    registry: Registry,
    subsystem: String,
}

impl MetricRegistrar {
    pub fn new(registry: Registry, subsystem: impl Into<String>) -> Self {
        Self {
            registry,
            subsystem: subsystem.into(),
        }
    }

    /// Register the standard catalog
    pub fn register(self) -> Result<AttackMetrics, MetricsError> {
        self.register_catalog(catalog::standard_metrics())
    }

    /// Register `descriptors` in order, stopping at the first failure
    pub fn register_catalog(
        self,
        descriptors: &'static [MetricDescriptor],
    ) -> Result<AttackMetrics, MetricsError> {
        let mut bound = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let collector = build_collector(descriptor, &self.subsystem)?;
            self.registry
                .register(collector.boxed())
                .map_err(|source| MetricsError::Registration {
                    name: descriptor.name,
                    source,
                })?;
            debug!(metric = descriptor.name, kind = descriptor.kind.as_str(), "Registered metric");
            bound.push((descriptor, collector));
        }
        info!(subsystem = %self.subsystem, count = bound.len(), "Metrics registered");

        Ok(AttackMetrics {
            registry: self.registry,
            subsystem: self.subsystem,
            bound,
        })
    }
}

/// Registered collectors, looked up by metric id
#[derive(Clone)]
pub struct AttackMetrics {
    registry: Registry,
    subsystem: String,
    bound: Vec<(&'static MetricDescriptor, Collector)>,
}

impl AttackMetrics {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    pub fn lookup(&self, id: MetricId) -> Option<(&'static MetricDescriptor, &Collector)> {
        self.bound
            .iter()
            .find(|(descriptor, _)| descriptor.id == id)
            .map(|(descriptor, collector)| (*descriptor, collector))
    }

    pub fn gauge(&self, id: MetricId) -> Result<&GaugeVec, MetricsError> {
        match self.lookup(id) {
            Some((_, Collector::Gauge(gauge))) => Ok(gauge),
            _ => Err(MetricsError::MissingCollector {
                id: id.as_str(),
                kind: "gauge",
            }),
        }
    }

    pub fn histogram(&self, id: MetricId) -> Result<&HistogramVec, MetricsError> {
        match self.lookup(id) {
            Some((_, Collector::Histogram(histogram))) => Ok(histogram),
            _ => Err(MetricsError::MissingCollector {
                id: id.as_str(),
                kind: "histogram",
            }),
        }
    }
}
