//! In-memory report store

use std::collections::HashMap;

use async_trait::async_trait;
use barrage_core::{AttackReport, AttackResult, TaskId};
use barrage_interfaces::{ReportStore, ResultSink, StoreError};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::aggregate::build_report;

struct StoredAttack {
    report: Vec<u8>,
    samples: Vec<Vec<u8>>,
}

#[derive(Default)]
struct StoreTable {
    by_id: HashMap<TaskId, StoredAttack>,
    order: Vec<TaskId>,
}

/// Keeps reports and per-request samples of finished attacks in memory.
///
/// As a [`ResultSink`] it accepts newline-delimited JSON results, builds the
/// report and keeps every result line as a histogram sample.
#[derive(Default)]
pub struct InMemoryReportStore {
    inner: RwLock<StoreTable>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a report and its samples directly, replacing any previous entry
    pub fn insert(&self, report: &AttackReport, samples: &[AttackResult]) -> Result<(), StoreError> {
        let encoded = encode(&report.id, report)?;
        let samples = samples
            .iter()
            .map(|sample| encode(&report.id, sample))
            .collect::<Result<Vec<_>, _>>()?;
        self.put(report.id.clone(), encoded, samples);
        Ok(())
    }

    /// Raw report of one attack
    pub fn get(&self, id: &TaskId) -> Result<Vec<u8>, StoreError> {
        self.inner
            .read()
            .by_id
            .get(id)
            .map(|stored| stored.report.clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the report and samples of one attack, returning whether any existed
    pub fn remove(&self, id: &TaskId) -> bool {
        let mut inner = self.inner.write();
        if inner.by_id.remove(id).is_none() {
            return false;
        }
        inner.order.retain(|other| other != id);
        true
    }

    fn put(&self, id: TaskId, report: Vec<u8>, samples: Vec<Vec<u8>>) {
        let mut inner = self.inner.write();
        if inner.by_id.insert(id.clone(), StoredAttack { report, samples }).is_none() {
            inner.order.push(id);
        }
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn get_all(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.by_id.get(id))
            .map(|stored| stored.report.clone())
            .collect())
    }

    async fn get_histogram_samples(&self, id: &TaskId) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self
            .inner
            .read()
            .by_id
            .get(id)
            .map(|stored| stored.samples.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ResultSink for InMemoryReportStore {
    async fn submit(&self, id: &TaskId, encoded: Vec<u8>) -> Result<(), StoreError> {
        let mut results = Vec::new();
        let mut samples = Vec::new();
        for line in encoded.split(|b| *b == b'\n').filter(|line| !line.is_empty()) {
            let result: AttackResult = serde_json::from_slice(line).map_err(|e| StoreError::Malformed {
                id: id.clone(),
                message: e.to_string(),
            })?;
            results.push(result);
            samples.push(line.to_vec());
        }
        debug!(task_id = %id, results = results.len(), "Aggregating attack results");

        let report = build_report(id, &results);
        let encoded_report = encode(id, &report)?;
        self.put(id.clone(), encoded_report, samples);
        info!(task_id = %id, requests = report.requests, success = report.success, "Report stored");
        Ok(())
    }

    async fn discard(&self, id: &TaskId) -> Result<(), StoreError> {
        if self.remove(id) {
            debug!(task_id = %id, "Report discarded");
        }
        Ok(())
    }
}

fn encode<T: serde::Serialize>(id: &TaskId, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Malformed {
        id: id.clone(),
        message: e.to_string(),
    })
}
