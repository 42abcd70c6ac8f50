//! Kanban transition controller.
//!
//! Maps a drag gesture between status columns onto a validated status
//! mutation with optimistic local apply and rollback. The board snapshot
//! is the miniature transaction target: snapshot, speculative apply, then
//! commit or revert once the mutation intent settles.
//!
//! Per-task ordering is last-intent-wins: a second drag issued before the
//! first settles discards the first drag's rollback target and adopts its
//! own. A failure report from a superseded intent must never clobber the
//! newer optimistic value.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use anyhow::{anyhow, Result};
use shared::{Task, TaskPatch, TaskStatus};
use tracing::{debug, warn};

/// Collaborator that carries a task mutation intent to the outside world.
///
/// Network-bound in production (the task REST endpoint); tests substitute
/// scripted stubs. Failures propagate back so the controller can roll back.
pub trait TaskIntentGateway: Send + Sync {
    fn apply_patch(
        &self,
        task_id: &str,
        patch: TaskPatch,
    ) -> impl Future<Output = Result<Task>> + Send;
}

/// Local optimistic snapshot of one project's tasks.
///
/// Refreshed wholesale from the collaborator on each fetch; mutated only
/// through the controller's speculative apply/revert.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    /// Tasks of one kanban column, in board order.
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.status == status)
            .collect()
    }
}

/// Outcome of a requested transition.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// Target equals the current status; no mutation intent was issued.
    NoChange,
    /// The collaborator accepted the intent; the optimistic value stands.
    Applied(Task),
    /// The collaborator rejected the intent and the pre-drag status was
    /// restored.
    RolledBack(anyhow::Error),
    /// The intent settled after a newer drag took over this task; the
    /// newer optimistic value was left untouched.
    Superseded,
    /// The board was torn down while the intent was in flight; settling
    /// became a no-op.
    Detached,
}

struct PendingIntent {
    generation: u64,
    rollback_to: TaskStatus,
}

/// Controller for drag-initiated status changes on one board.
///
/// Holds only a weak handle to the board so a view that navigates away
/// mid-flight drops it, and the settle step quietly does nothing.
pub struct KanbanController<G> {
    board: Weak<Mutex<TaskBoard>>,
    gateway: Arc<G>,
    pending: Mutex<HashMap<String, PendingIntent>>,
    next_generation: AtomicU64,
}

impl<G: TaskIntentGateway> KanbanController<G> {
    pub fn new(board: &Arc<Mutex<TaskBoard>>, gateway: Arc<G>) -> Self {
        Self {
            board: Arc::downgrade(board),
            gateway,
            pending: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Request a status change for one task.
    ///
    /// Any status may move to any other; there are no illegal transitions
    /// on this board. Applies the target optimistically, issues the intent,
    /// and reverts the snapshot if the collaborator fails while this is
    /// still the newest intent for the task.
    pub async fn request_status_change(
        &self,
        task_id: &str,
        target: TaskStatus,
    ) -> Result<TransitionOutcome> {
        let previous = {
            let Some(board) = self.board.upgrade() else {
                return Ok(TransitionOutcome::Detached);
            };
            let mut board = board.lock().unwrap();
            let task = board
                .task_mut(task_id)
                .ok_or_else(|| anyhow!("task {task_id} not on board"))?;
            if task.status == target {
                debug!(task_id, "transition to current status, nothing to do");
                return Ok(TransitionOutcome::NoChange);
            }
            let previous = task.status;
            task.status = target;
            previous
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().unwrap().insert(
            task_id.to_string(),
            PendingIntent {
                generation,
                rollback_to: previous,
            },
        );

        let patch = TaskPatch {
            status: Some(target),
            ..TaskPatch::default()
        };
        let result = self.gateway.apply_patch(task_id, patch).await;

        match result {
            Ok(task) => {
                if !self.settle(task_id, generation) {
                    return Ok(TransitionOutcome::Superseded);
                }
                Ok(TransitionOutcome::Applied(task))
            }
            Err(error) => {
                if !self.settle(task_id, generation) {
                    warn!(task_id, %error, "superseded intent failed, keeping newer value");
                    return Ok(TransitionOutcome::Superseded);
                }
                let Some(board) = self.board.upgrade() else {
                    return Ok(TransitionOutcome::Detached);
                };
                let mut board = board.lock().unwrap();
                if let Some(task) = board.task_mut(task_id) {
                    task.status = previous;
                }
                warn!(task_id, %error, "mutation intent failed, rolled back");
                Ok(TransitionOutcome::RolledBack(error))
            }
        }
    }

    /// Remove this intent's pending entry if it is still the newest for
    /// the task. Returns false when a later drag took over.
    fn settle(&self, task_id: &str, generation: u64) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match pending.get(task_id) {
            Some(intent) if intent.generation == generation => {
                pending.remove(task_id);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: format!("Tarea {id}"),
            start_date: "2025-01-01".to_string(),
            end_date: "2025-01-05".to_string(),
            status,
            progress: 0,
            assignee: None,
            notes: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn board(tasks: Vec<Task>) -> Arc<Mutex<TaskBoard>> {
        Arc::new(Mutex::new(TaskBoard::new(tasks)))
    }

    /// Gateway that records every intent and always succeeds.
    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<(String, TaskPatch)>>,
    }

    impl TaskIntentGateway for RecordingGateway {
        fn apply_patch(
            &self,
            task_id: &str,
            patch: TaskPatch,
        ) -> impl Future<Output = Result<Task>> + Send {
            let updated = task(task_id, patch.status.unwrap_or(TaskStatus::Todo));
            self.calls
                .lock()
                .unwrap()
                .push((task_id.to_string(), patch));
            async move { Ok(updated) }
        }
    }

    /// Gateway that always fails.
    struct FailingGateway;

    impl TaskIntentGateway for FailingGateway {
        fn apply_patch(
            &self,
            _task_id: &str,
            _patch: TaskPatch,
        ) -> impl Future<Output = Result<Task>> + Send {
            async { Err(anyhow!("502 desde el servidor")) }
        }
    }

    /// Gateway whose first call blocks until released and then fails;
    /// later calls succeed immediately.
    struct StalledFirstCallGateway {
        calls: AtomicUsize,
        release: Notify,
    }

    impl StalledFirstCallGateway {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                release: Notify::new(),
            }
        }
    }

    impl TaskIntentGateway for StalledFirstCallGateway {
        fn apply_patch(
            &self,
            task_id: &str,
            patch: TaskPatch,
        ) -> impl Future<Output = Result<Task>> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let task_id = task_id.to_string();
            async move {
                if call == 0 {
                    self.release.notified().await;
                    Err(anyhow!("timeout"))
                } else {
                    Ok(task(&task_id, patch.status.unwrap()))
                }
            }
        }
    }

    #[tokio::test]
    async fn test_same_status_issues_no_intent() {
        let board = board(vec![task("t1", TaskStatus::Todo)]);
        let gateway = Arc::new(RecordingGateway::default());
        let controller = KanbanController::new(&board, gateway.clone());

        let outcome = controller
            .request_status_change("t1", TaskStatus::Todo)
            .await
            .unwrap();

        assert!(matches!(outcome, TransitionOutcome::NoChange));
        assert!(gateway.calls.lock().unwrap().is_empty());
        assert_eq!(board.lock().unwrap().task("t1").unwrap().status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_successful_transition_keeps_optimistic_value() {
        let board = board(vec![task("t1", TaskStatus::Todo)]);
        let gateway = Arc::new(RecordingGateway::default());
        let controller = KanbanController::new(&board, gateway.clone());

        let outcome = controller
            .request_status_change("t1", TaskStatus::Done)
            .await
            .unwrap();

        assert!(matches!(outcome, TransitionOutcome::Applied(_)));
        assert_eq!(board.lock().unwrap().task("t1").unwrap().status, TaskStatus::Done);

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "t1");
        assert_eq!(calls[0].1.status, Some(TaskStatus::Done));
        // The intent is a pure status patch; nothing else travels with it.
        assert_eq!(calls[0].1.title, None);
        assert_eq!(calls[0].1.progress, None);
    }

    #[tokio::test]
    async fn test_failed_intent_restores_previous_status_exactly() {
        let board = board(vec![task("t1", TaskStatus::Blocked)]);
        let before = board.lock().unwrap().task("t1").unwrap().clone();
        let controller = KanbanController::new(&board, Arc::new(FailingGateway));

        let outcome = controller
            .request_status_change("t1", TaskStatus::Done)
            .await
            .unwrap();

        assert!(matches!(outcome, TransitionOutcome::RolledBack(_)));
        // Optimistic apply then rollback is the identity on the board.
        assert_eq!(*board.lock().unwrap().task("t1").unwrap(), before);
    }

    #[tokio::test]
    async fn test_any_status_reaches_any_other() {
        for from in TaskStatus::all() {
            for to in TaskStatus::all() {
                if from == to {
                    continue;
                }
                let board = board(vec![task("t1", from)]);
                let controller =
                    KanbanController::new(&board, Arc::new(RecordingGateway::default()));
                let outcome = controller.request_status_change("t1", to).await.unwrap();
                assert!(matches!(outcome, TransitionOutcome::Applied(_)));
                assert_eq!(board.lock().unwrap().task("t1").unwrap().status, to);
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_task_is_an_error() {
        let board = board(vec![]);
        let controller = KanbanController::new(&board, Arc::new(RecordingGateway::default()));
        let result = controller.request_status_change("nope", TaskStatus::Done).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_clobber_newer_drag() {
        let board = board(vec![task("t1", TaskStatus::Todo)]);
        let gateway = Arc::new(StalledFirstCallGateway::new());
        let controller = Arc::new(KanbanController::new(&board, gateway.clone()));

        // First drag stalls inside the gateway.
        let first = {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller
                    .request_status_change("t1", TaskStatus::Doing)
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(board.lock().unwrap().task("t1").unwrap().status, TaskStatus::Doing);

        // Second drag settles first and wins.
        let second = controller
            .request_status_change("t1", TaskStatus::Done)
            .await
            .unwrap();
        assert!(matches!(second, TransitionOutcome::Applied(_)));

        // Now let the first drag fail; its rollback target was discarded.
        gateway.release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, TransitionOutcome::Superseded));
        assert_eq!(board.lock().unwrap().task("t1").unwrap().status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_settle_after_board_teardown_is_noop() {
        let board = board(vec![task("t1", TaskStatus::Todo)]);
        let gateway = Arc::new(StalledFirstCallGateway::new());
        let controller = Arc::new(KanbanController::new(&board, gateway.clone()));

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller
                    .request_status_change("t1", TaskStatus::Doing)
                    .await
            })
        };
        tokio::task::yield_now().await;

        // User navigates away: the board is dropped mid-flight.
        drop(board);
        gateway.release.notify_one();

        let outcome = pending.await.unwrap().unwrap();
        assert!(matches!(outcome, TransitionOutcome::Detached));
    }

    #[tokio::test]
    async fn test_detached_controller_never_issues_intents() {
        let gateway = Arc::new(RecordingGateway::default());
        let controller = {
            let board = board(vec![task("t1", TaskStatus::Todo)]);
            KanbanController::new(&board, gateway.clone())
        };
        let outcome = controller
            .request_status_change("t1", TaskStatus::Done)
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Detached));
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_board_columns() {
        let board = TaskBoard::new(vec![
            task("t1", TaskStatus::Todo),
            task("t2", TaskStatus::Doing),
            task("t3", TaskStatus::Todo),
        ]);
        assert_eq!(board.column(TaskStatus::Todo).len(), 2);
        assert_eq!(board.column(TaskStatus::Doing).len(), 1);
        assert!(board.column(TaskStatus::Done).is_empty());
    }
}
