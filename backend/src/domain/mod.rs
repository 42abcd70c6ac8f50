//! Domain layer: derived read models and the services that feed them.
//!
//! Every derived figure (reconciled totals, task metrics, gantt geometry,
//! calendar events, portfolio sums) is recomputed from raw collections on
//! demand. Nothing derived is persisted.

pub mod calendar;
pub mod dashboard;
pub mod gantt;
pub mod kanban;
pub mod payments;
pub mod projects;
pub mod reconciliation;
pub mod session;
pub mod task_metrics;
pub mod tasks;

pub use dashboard::ActiveProjectFilter;
pub use kanban::{KanbanController, TaskIntentGateway, TransitionOutcome};
pub use payments::PaymentService;
pub use projects::ProjectService;
pub use session::Session;
pub use tasks::TaskService;
