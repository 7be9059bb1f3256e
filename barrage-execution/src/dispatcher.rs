//! In-memory registry of submitted attacks

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use barrage_core::{AttackInfo, AttackParams, TaskError, TaskId};
use barrage_interfaces::{StoreError, TaskFilter, TaskRegistry};
use parking_lot::RwLock;
use tracing::info;

use crate::runner::AttackRunner;
use crate::task::Task;

#[derive(Default)]
struct TaskTable {
    by_id: HashMap<TaskId, Arc<Task>>,
    /// Submission order, oldest first
    order: Vec<TaskId>,
}

/// Creates, runs and tracks attack tasks.
///
/// Tasks stay registered until [`purge`](Self::purge) removes them.
pub struct Dispatcher {
    runner: AttackRunner,
    tasks: RwLock<TaskTable>,
}

impl Dispatcher {
    pub fn new(runner: AttackRunner) -> Self {
        Self {
            runner,
            tasks: RwLock::new(TaskTable::default()),
        }
    }

    /// Register a new task for `params` and start it
    pub fn dispatch(&self, params: AttackParams) -> Result<AttackInfo, TaskError> {
        let task = Arc::new(Task::new(params));
        {
            let mut tasks = self.tasks.write();
            tasks.order.push(task.id().clone());
            tasks.by_id.insert(task.id().clone(), Arc::clone(&task));
        }
        info!(task_id = %task.id(), target = %task.params().target.url, "Attack submitted");

        // the driver is detached, its outcome is visible through the task status
        drop(task.run(&self.runner)?);
        Ok(task.snapshot())
    }

    pub fn task(&self, id: &TaskId) -> Option<Arc<Task>> {
        self.tasks.read().by_id.get(id).cloned()
    }

    pub fn get(&self, id: &TaskId) -> Option<AttackInfo> {
        self.task(id).map(|task| task.snapshot())
    }

    pub fn cancel(&self, id: &TaskId) -> Result<AttackInfo, TaskError> {
        let task = self.task(id).ok_or_else(|| TaskError::NotFound(id.clone()))?;
        task.cancel()?;
        Ok(task.snapshot())
    }

    /// Tasks matching `filter`, in submission order
    pub fn list(&self, filter: &TaskFilter) -> Vec<AttackInfo> {
        let tasks = self.tasks.read();
        tasks
            .order
            .iter()
            .filter_map(|id| tasks.by_id.get(id))
            .map(|task| task.snapshot())
            .filter(|info| filter.matches(info))
            .collect()
    }

    /// Forget a finished task together with its stored results.
    /// Scheduled and running tasks are kept.
    pub async fn purge(&self, id: &TaskId) -> Result<AttackInfo, TaskError> {
        let task = {
            let mut tasks = self.tasks.write();
            let task = tasks
                .by_id
                .get(id)
                .cloned()
                .ok_or_else(|| TaskError::NotFound(id.clone()))?;
            let status = task.status();
            if !status.is_terminal() {
                return Err(TaskError::invalid_transition(id, "purge", status));
            }
            tasks.by_id.remove(id);
            tasks.order.retain(|other| other != id);
            task
        };
        self.runner.discard(id).await;
        info!(task_id = %id, "Attack purged");
        Ok(task.snapshot())
    }
}

#[async_trait]
impl TaskRegistry for Dispatcher {
    async fn list_by_filter(&self, filter: &TaskFilter) -> Result<Vec<AttackInfo>, StoreError> {
        Ok(self.list(filter))
    }
}
