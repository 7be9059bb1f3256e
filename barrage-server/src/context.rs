//! Shared handler state

use std::sync::Arc;

use barrage_config::MetricsConfig;
use barrage_core::TaskStatus;
use barrage_execution::{AttackRunner, Dispatcher};
use barrage_interfaces::AttackEngine;
use barrage_metrics::{AttackMetrics, MetricRegistrar, MetricsError, ReportMetricsProjector};
use barrage_storage::InMemoryReportStore;
use prometheus::Registry;

/// Everything the handlers need, cheap to clone
#[derive(Clone)]
pub struct AppContext {
    pub dispatcher: Arc<Dispatcher>,
    pub reports: Arc<InMemoryReportStore>,
    pub metrics: AttackMetrics,
    pub projector: Arc<ReportMetricsProjector>,
    /// Status used when a scrape or list request names none
    pub default_status: TaskStatus,
}

impl AppContext {
    /// Wire the dispatcher, report store and metrics around `engine`.
    ///
    /// Registers the metric catalog in a fresh registry, so a failure here
    /// means the server must not start.
    pub fn new(engine: Arc<dyn AttackEngine>, config: &MetricsConfig) -> Result<Self, MetricsError> {
        let metrics = MetricRegistrar::new(Registry::new(), config.subsystem.as_str()).register()?;

        let reports = Arc::new(InMemoryReportStore::new());
        let runner = AttackRunner::new(engine).with_sink(reports.clone());
        let dispatcher = Arc::new(Dispatcher::new(runner));
        let projector = ReportMetricsProjector::new(dispatcher.clone(), reports.clone(), &metrics)?;

        Ok(Self {
            dispatcher,
            reports,
            metrics,
            projector: Arc::new(projector),
            default_status: config.default_status,
        })
    }
}
