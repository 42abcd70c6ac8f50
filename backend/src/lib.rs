//! # ObraTrack Backend
//!
//! Derived-state backend for the project tracking app: raw projects,
//! tasks and payment events live in storage; every figure shown to a
//! client (reconciled totals, task metrics, gantt geometry, calendar
//! events, portfolio sums) is recomputed on demand.

use std::sync::Arc;

use anyhow::Result;
use shared::{PortfolioSummary, ProjectStatusRow};

use crate::domain::ActiveProjectFilter;
use crate::storage::memory::MemoryStore;

pub mod domain;
pub mod rest;
pub mod storage;

/// Main backend struct that orchestrates all services over one store.
pub struct Backend {
    pub project_service: domain::ProjectService<MemoryStore>,
    pub task_service: Arc<domain::TaskService<MemoryStore>>,
    pub payment_service: domain::PaymentService<MemoryStore>,
    pub session: domain::Session,
}

impl Backend {
    /// Create a new backend instance with all services sharing one
    /// in-memory store.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            project_service: domain::ProjectService::new(Arc::clone(&store)),
            task_service: Arc::new(domain::TaskService::new(Arc::clone(&store))),
            payment_service: domain::PaymentService::new(store),
            session: domain::Session::new(),
        }
    }

    /// Portfolio summary cards across the active project set, recomputed
    /// from every stored project, payment and task.
    pub fn portfolio(&self, filter: &ActiveProjectFilter) -> Result<PortfolioSummary> {
        let projects = self.project_service.list_projects(None)?;
        let payments = self.payment_service.list_all_payments()?;
        let tasks = self.task_service.list_all_tasks()?;
        Ok(domain::dashboard::portfolio(
            &projects, &payments, &tasks, filter,
        ))
    }

    /// Project-status table rows for the dashboard.
    pub fn project_status_rows(
        &self,
        filter: &ActiveProjectFilter,
    ) -> Result<Vec<ProjectStatusRow>> {
        let projects = self.project_service.list_projects(None)?;
        let payments = self.payment_service.list_all_payments()?;
        Ok(domain::dashboard::project_status_rows(
            &projects, &payments, filter,
        ))
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        CreatePaymentRequest, CreateProjectRequest, CreateTaskRequest, PaymentKind, ProjectPatch,
        TaskStatus,
    };

    fn seed_project(backend: &Backend, name: &str, budget: i64) -> String {
        backend
            .project_service
            .create_project(CreateProjectRequest {
                name: name.to_string(),
                mandante: None,
                status: None,
                budget: Some(budget),
                start_date: None,
                end_date: None,
            })
            .unwrap()
            .id
    }

    fn seed_payment(backend: &Backend, project_id: &str, kind: PaymentKind, amount: i64) {
        backend
            .payment_service
            .create_payment(CreatePaymentRequest {
                project_id: project_id.to_string(),
                kind,
                amount,
                event_date: "2025-03-01".to_string(),
                reference: None,
                note: None,
                currency: "CLP".to_string(),
            })
            .unwrap();
    }

    #[test]
    fn test_portfolio_spans_every_stored_project() {
        let backend = Backend::new();
        let first = seed_project(&backend, "Casa Vitacura", 5_000_000);
        let second = seed_project(&backend, "Bodega Lampa", 3_000_000);

        seed_payment(&backend, &first, PaymentKind::Invoice, 1000);
        seed_payment(&backend, &first, PaymentKind::Payment, 400);
        seed_payment(&backend, &second, PaymentKind::Invoice, 2000);
        backend
            .task_service
            .create_task(CreateTaskRequest {
                project_id: second.clone(),
                title: "Galpon".to_string(),
                start_date: "2025-03-01".to_string(),
                end_date: "2025-03-10".to_string(),
                status: TaskStatus::Done,
                progress: 100,
                assignee: None,
                notes: None,
            })
            .unwrap();

        let summary = backend.portfolio(&ActiveProjectFilter::default()).unwrap();
        assert_eq!(summary.active_projects, 2);
        assert_eq!(summary.total_budget, 8_000_000);
        assert_eq!(summary.facturado, 3000);
        assert_eq!(summary.pagado, 400);
        assert_eq!(summary.saldo, 2600);
        assert_eq!(summary.total_tasks, 1);
        assert_eq!(summary.completed_tasks, 1);

        let rows = backend
            .project_status_rows(&ActiveProjectFilter::default())
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_portfolio_drops_archived_projects() {
        let backend = Backend::new();
        let kept = seed_project(&backend, "Activo", 100);
        let archived = seed_project(&backend, "Archivado", 900);
        seed_payment(&backend, &archived, PaymentKind::Invoice, 5000);
        backend
            .project_service
            .patch_project(
                &archived,
                ProjectPatch {
                    is_archived: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        let summary = backend.portfolio(&ActiveProjectFilter::default()).unwrap();
        assert_eq!(summary.active_projects, 1);
        assert_eq!(summary.total_budget, 100);
        assert_eq!(summary.facturado, 0);

        let rows = backend
            .project_status_rows(&ActiveProjectFilter::default())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].project_id, kept);
    }
}
