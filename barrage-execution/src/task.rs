//! Attack task state machine
//!
//! ```text
//! Scheduled ──run──> Running ──complete──> Completed
//!     │                 │ └────fail──────> Failed
//!     └─────cancel──────┴────cancel──────> Canceled
//! ```
//!
//! Completed, Failed and Canceled are terminal. Every status change checks
//! and writes the status inside one exclusive section, so two concurrent
//! transitions on the same task can never both succeed.

use std::sync::Arc;

use barrage_core::{AttackInfo, AttackParams, TaskError, TaskId, TaskStatus};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::context::AttackContext;
use crate::runner::AttackRunner;

/// One attack execution unit
#[derive(Debug)]
pub struct Task {
    id: TaskId,
    params: AttackParams,
    ctx: AttackContext,
    status: RwLock<TaskStatus>,
}

impl Task {
    /// Create a scheduled task with a fresh id and cancellation handle
    pub fn new(params: AttackParams) -> Self {
        Self::with_id(TaskId::new(), params)
    }

    pub fn with_id(id: TaskId, params: AttackParams) -> Self {
        Self {
            id,
            params,
            ctx: AttackContext::new(),
            status: RwLock::new(TaskStatus::Scheduled),
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn params(&self) -> &AttackParams {
        &self.params
    }

    pub fn status(&self) -> TaskStatus {
        *self.status.read()
    }

    pub fn context(&self) -> &AttackContext {
        &self.ctx
    }

    pub fn snapshot(&self) -> AttackInfo {
        AttackInfo {
            id: self.id.clone(),
            status: self.status(),
            params: self.params.clone(),
        }
    }

    /// Start the attack.
    ///
    /// Moves the task to Running and spawns exactly one driver for it, then
    /// returns without waiting for the attack to finish. Fails unless the
    /// task is still Scheduled.
    pub fn run(self: &Arc<Self>, runner: &AttackRunner) -> Result<JoinHandle<()>, TaskError> {
        self.mark_running()?;
        info!(task_id = %self.id, rate = self.params.rate, duration = %self.params.duration, "Attack started");
        Ok(tokio::spawn(runner.clone().drive(Arc::clone(self))))
    }

    pub(crate) fn mark_running(&self) -> Result<(), TaskError> {
        self.transition("run", TaskStatus::Running, |status| {
            status == TaskStatus::Scheduled
        })
    }

    /// Mark a running attack as completed
    pub fn complete(&self) -> Result<(), TaskError> {
        self.transition("complete", TaskStatus::Completed, |status| {
            status == TaskStatus::Running
        })
    }

    /// Mark the task as failed.
    ///
    /// Never returns an error. A task that already completed or was canceled
    /// keeps its status, since terminal states are never left.
    pub fn fail(&self) -> Result<(), TaskError> {
        let mut status = self.status.write();
        match *status {
            TaskStatus::Completed | TaskStatus::Canceled => {
                debug!(task_id = %self.id, status = %*status, "Ignoring fail on terminal task");
            }
            _ => *status = TaskStatus::Failed,
        }
        Ok(())
    }

    /// Cancel a scheduled or running attack.
    ///
    /// Fires the cancellation handle, which makes the driver abandon the
    /// result stream. Canceling an already canceled task succeeds without
    /// firing the handle again.
    pub fn cancel(&self) -> Result<(), TaskError> {
        let mut status = self.status.write();
        match *status {
            TaskStatus::Completed | TaskStatus::Failed => {
                Err(TaskError::invalid_transition(&self.id, "cancel", *status))
            }
            TaskStatus::Canceled => Ok(()),
            TaskStatus::Scheduled | TaskStatus::Running => {
                self.ctx.cancel();
                *status = TaskStatus::Canceled;
                info!(task_id = %self.id, "Attack canceled");
                Ok(())
            }
        }
    }

    fn transition(
        &self,
        operation: &'static str,
        next: TaskStatus,
        allowed: impl FnOnce(TaskStatus) -> bool,
    ) -> Result<(), TaskError> {
        let mut status = self.status.write();
        if !allowed(*status) {
            return Err(TaskError::invalid_transition(&self.id, operation, *status));
        }
        *status = next;
        Ok(())
    }
}
