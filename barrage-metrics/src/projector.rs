//! Projection of stored attack reports onto Prometheus collectors

use std::sync::Arc;
use std::time::Duration;

use barrage_core::{AttackInfo, AttackReport, AttackResult, TaskId};
use barrage_interfaces::{ReportStore, TaskFilter, TaskRegistry};
use prometheus::{GaugeVec, HistogramVec};
use tracing::debug;

use crate::catalog::MetricId;
use crate::error::MetricsError;
use crate::registrar::AttackMetrics;

/// Convert a duration to fractional milliseconds
pub fn milliseconds(d: Duration) -> f64 {
    d.as_millis() as f64 + f64::from(d.subsec_nanos() % 1_000_000) / 1e6
}

/// What one projection touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionSummary {
    pub tasks: usize,
    pub reports: usize,
    pub matched: usize,
    pub observations: usize,
}

struct Bindings {
    requests: GaugeVec,
    rate: GaugeVec,
    duration_total: GaugeVec,
    duration_attack: GaugeVec,
    duration_wait: GaugeVec,
    latency_mean: GaugeVec,
    latency_50th: GaugeVec,
    latency_95th: GaugeVec,
    latency_99th: GaugeVec,
    latency_max: GaugeVec,
    success_ratio: GaugeVec,
    status_codes: GaugeVec,
    histogram: HistogramVec,
}

impl Bindings {
    fn resolve(metrics: &AttackMetrics) -> Result<Self, MetricsError> {
        let gauge = |id| metrics.gauge(id).cloned();
        Ok(Self {
            requests: gauge(MetricId::ReqCnt)?,
            rate: gauge(MetricId::ReqRt)?,
            duration_total: gauge(MetricId::ReqDur)?,
            duration_attack: gauge(MetricId::ReqAttck)?,
            duration_wait: gauge(MetricId::ReqWait)?,
            latency_mean: gauge(MetricId::ReqLatMean)?,
            latency_50th: gauge(MetricId::ReqLat50th)?,
            latency_95th: gauge(MetricId::ReqLat95th)?,
            latency_99th: gauge(MetricId::ReqLat99th)?,
            latency_max: gauge(MetricId::ReqLatMax)?,
            success_ratio: gauge(MetricId::ResSuccessRatio)?,
            status_codes: gauge(MetricId::ReqStsCode)?,
            histogram: metrics.histogram(MetricId::Histogram)?.clone(),
        })
    }
}

/// Joins the task registry with the report store and pushes the result
/// into the registered collectors.
///
/// Scalar gauges are set, so projecting an unchanged report again leaves
/// them as they were. Histogram samples are observed on every projection
/// and therefore accumulate across scrapes of the same attack.
pub struct ReportMetricsProjector {
    tasks: Arc<dyn TaskRegistry>,
    reports: Arc<dyn ReportStore>,
    bindings: Bindings,
}

impl ReportMetricsProjector {
    pub fn new(
        tasks: Arc<dyn TaskRegistry>,
        reports: Arc<dyn ReportStore>,
        metrics: &AttackMetrics,
    ) -> Result<Self, MetricsError> {
        Ok(Self {
            tasks,
            reports,
            bindings: Bindings::resolve(metrics)?,
        })
    }

    /// Update collectors from the current tasks and reports.
    ///
    /// Any report that fails to decode aborts the projection. Gauges set
    /// for earlier pairs in the same call are not rolled back.
    pub async fn project(&self, filter: &TaskFilter) -> Result<ProjectionSummary, MetricsError> {
        let tasks = self.tasks.list_by_filter(filter).await?;
        let reports = self
            .reports
            .get_all()
            .await?
            .iter()
            .map(|raw| serde_json::from_slice::<AttackReport>(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let mut summary = ProjectionSummary {
            tasks: tasks.len(),
            reports: reports.len(),
            ..Default::default()
        };

        let mut last_matched: Option<&TaskId> = None;
        for task in &tasks {
            for report in reports.iter().filter(|report| report.id == task.id) {
                self.set_scalars(task, report);
                last_matched = Some(&report.id);
                summary.matched += 1;
            }
        }

        if let Some(id) = last_matched {
            summary.observations = self.observe_samples(id).await?;
        }

        debug!(
            tasks = summary.tasks,
            reports = summary.reports,
            matched = summary.matched,
            observations = summary.observations,
            "Projected attack reports"
        );
        Ok(summary)
    }

    fn set_scalars(&self, task: &AttackInfo, report: &AttackReport) {
        let b = &self.bindings;
        let rate = task.params.rate.to_string();
        let labels = [task.id.as_str(), rate.as_str(), task.params.duration.as_str()];

        b.requests.with_label_values(&labels).set(report.requests as f64);
        b.rate.with_label_values(&labels).set(report.rate);
        b.duration_total
            .with_label_values(&labels)
            .set(milliseconds(report.duration + report.wait));
        b.duration_attack
            .with_label_values(&labels)
            .set(milliseconds(report.duration));
        b.duration_wait.with_label_values(&labels).set(milliseconds(report.wait));
        b.latency_mean
            .with_label_values(&labels)
            .set(milliseconds(report.latencies.mean));
        b.latency_50th
            .with_label_values(&labels)
            .set(milliseconds(report.latencies.p50));
        b.latency_95th
            .with_label_values(&labels)
            .set(milliseconds(report.latencies.p95));
        b.latency_99th
            .with_label_values(&labels)
            .set(milliseconds(report.latencies.p99));
        b.latency_max
            .with_label_values(&labels)
            .set(milliseconds(report.latencies.max));
        b.success_ratio.with_label_values(&labels).set(report.success);

        for (code, count) in &report.status_codes {
            b.status_codes
                .with_label_values(&[labels[0], labels[1], labels[2], code.as_str()])
                .set(*count as f64);
        }
    }

    async fn observe_samples(&self, id: &TaskId) -> Result<usize, MetricsError> {
        let histogram = self.bindings.histogram.with_label_values(&[id.as_str()]);
        let mut observed = 0;
        for raw in self.reports.get_histogram_samples(id).await? {
            match serde_json::from_slice::<AttackResult>(&raw) {
                Ok(sample) => {
                    histogram.observe(milliseconds(sample.latency));
                    observed += 1;
                }
                Err(e) => debug!(task_id = %id, error = %e, "Skipping undecodable sample"),
            }
        }
        Ok(observed)
    }
}
