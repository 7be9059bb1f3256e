//! Task registry interface

use async_trait::async_trait;
use barrage_core::{AttackInfo, TaskStatus, ValidationError};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Filter applied when listing tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Build a filter from an optional `status` query value, using
    /// `default_status` when the caller supplied none.
    pub fn from_query(status: Option<&str>, default_status: TaskStatus) -> Result<Self, ValidationError> {
        match status {
            Some(value) => Ok(Self::with_status(value.parse()?)),
            None => Ok(Self::with_status(default_status)),
        }
    }

    pub fn matches(&self, info: &AttackInfo) -> bool {
        self.status.map_or(true, |status| status == info.status)
    }
}

/// Registry of known attack tasks
#[async_trait]
pub trait TaskRegistry: Send + Sync {
    /// List tasks matching the filter
    async fn list_by_filter(&self, filter: &TaskFilter) -> Result<Vec<AttackInfo>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_core::{AttackParams, TaskId};

    #[test]
    fn test_filter_defaults_to_given_status() {
        let filter = TaskFilter::from_query(None, TaskStatus::Completed).unwrap();
        assert_eq!(filter.status, Some(TaskStatus::Completed));

        let filter = TaskFilter::from_query(Some("running"), TaskStatus::Completed).unwrap();
        assert_eq!(filter.status, Some(TaskStatus::Running));

        assert!(TaskFilter::from_query(Some("bogus"), TaskStatus::Completed).is_err());
    }

    #[test]
    fn test_filter_matches() {
        let info = AttackInfo {
            id: TaskId::from("t1"),
            status: TaskStatus::Failed,
            params: AttackParams::new("http://localhost/", 1, "1s"),
        };
        assert!(TaskFilter::default().matches(&info));
        assert!(TaskFilter::with_status(TaskStatus::Failed).matches(&info));
        assert!(!TaskFilter::with_status(TaskStatus::Completed).matches(&info));
    }
}
