//! Task CRUD.
//!
//! Tasks are the raw input of the kanban board, the gantt layout and the
//! calendar projection. The service also acts as the mutation gateway for
//! optimistic kanban transitions.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use shared::{CreateTaskRequest, Task, TaskPatch};
use tracing::info;
use uuid::Uuid;

use super::kanban::TaskIntentGateway;
use crate::storage::{StoreError, TaskStorage};

/// Service handling task persistence.
pub struct TaskService<S> {
    store: Arc<S>,
}

impl<S> TaskService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: TaskStorage> TaskService<S> {
    /// Create a task, minting its id and creation timestamp.
    pub fn create_task(&self, request: CreateTaskRequest) -> Result<Task> {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            project_id: request.project_id,
            title: request.title,
            start_date: request.start_date,
            end_date: request.end_date,
            status: request.status,
            progress: request.progress.min(100),
            assignee: request.assignee,
            notes: request.notes,
            created_at: Utc::now().to_rfc3339(),
        };
        self.store.store_task(&task)?;
        info!("created task {} in project {}", task.id, task.project_id);
        Ok(task)
    }

    pub fn get_task(&self, task_id: &str) -> Result<Task> {
        self.store
            .get_task(task_id)?
            .ok_or_else(|| StoreError::NotFound("task").into())
    }

    /// Tasks of one project, start date ascending.
    pub fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        self.store.list_tasks(project_id)
    }

    /// Every task across projects, end date ascending.
    pub fn list_all_tasks(&self) -> Result<Vec<Task>> {
        self.store.list_all_tasks()
    }

    /// Apply a partial update. Absent fields are left untouched.
    pub fn update_task(&self, task_id: &str, patch: TaskPatch) -> Result<Task> {
        let mut task = self.get_task(task_id)?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(start_date) = patch.start_date {
            task.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            task.end_date = end_date;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(progress) = patch.progress {
            task.progress = progress.min(100);
        }
        if let Some(assignee) = patch.assignee {
            task.assignee = Some(assignee);
        }
        if let Some(notes) = patch.notes {
            task.notes = Some(notes);
        }
        self.store.update_task(&task)?;
        Ok(task)
    }

    pub fn delete_task(&self, task_id: &str) -> Result<()> {
        if !self.store.delete_task(task_id)? {
            return Err(StoreError::NotFound("task").into());
        }
        info!("deleted task {task_id}");
        Ok(())
    }
}

impl<S: TaskStorage> TaskIntentGateway for TaskService<S> {
    fn apply_patch(
        &self,
        task_id: &str,
        patch: TaskPatch,
    ) -> impl Future<Output = Result<Task>> + Send {
        let result = self.update_task(task_id, patch);
        async move { result }
    }
}
