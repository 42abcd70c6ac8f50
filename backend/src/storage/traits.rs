//! # Storage Traits
//!
//! These traits abstract away the specific storage implementation so the
//! domain layer works against any backend without modification. All
//! operations are synchronous; entities arrive fully formed (ids and
//! timestamps are minted by the domain services).

use anyhow::Result;
use shared::{Payment, Project, Task};

/// Interface for project storage operations.
pub trait ProjectStorage: Send + Sync {
    /// Store a new project.
    fn store_project(&self, project: &Project) -> Result<()>;

    /// Retrieve a specific project by id.
    fn get_project(&self, project_id: &str) -> Result<Option<Project>>;

    /// List projects ordered by `updated_at` descending, optionally
    /// filtered by archive state.
    fn list_projects(&self, archived: Option<bool>) -> Result<Vec<Project>>;

    /// Replace an existing project.
    fn update_project(&self, project: &Project) -> Result<()>;

    /// Delete a project by id. Returns whether it existed.
    fn delete_project(&self, project_id: &str) -> Result<bool>;
}

/// Interface for task storage operations.
pub trait TaskStorage: Send + Sync {
    /// Store a new task.
    fn store_task(&self, task: &Task) -> Result<()>;

    /// Retrieve a specific task by id.
    fn get_task(&self, task_id: &str) -> Result<Option<Task>>;

    /// List tasks of one project ordered by `start_date` ascending.
    fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>>;

    /// List every task across projects, `end_date` ascending. Used by the
    /// portfolio dashboard.
    fn list_all_tasks(&self) -> Result<Vec<Task>>;

    /// Replace an existing task.
    fn update_task(&self, task: &Task) -> Result<()>;

    /// Delete a task by id. Returns whether it existed.
    fn delete_task(&self, task_id: &str) -> Result<bool>;
}

/// Interface for payment event storage operations.
pub trait PaymentStorage: Send + Sync {
    /// Store a new payment event.
    fn store_payment(&self, payment: &Payment) -> Result<()>;

    /// Retrieve a specific payment by id.
    fn get_payment(&self, payment_id: &str) -> Result<Option<Payment>>;

    /// List payments of one project ordered by `event_date` descending.
    fn list_payments(&self, project_id: &str) -> Result<Vec<Payment>>;

    /// List every payment across projects. Used by the portfolio dashboard,
    /// which still reconciles per project before summing.
    fn list_all_payments(&self) -> Result<Vec<Payment>>;

    /// Replace an existing payment.
    fn update_payment(&self, payment: &Payment) -> Result<()>;

    /// Delete a payment by id. Returns whether it existed.
    fn delete_payment(&self, payment_id: &str) -> Result<bool>;
}
