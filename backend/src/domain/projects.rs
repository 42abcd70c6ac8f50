//! Project CRUD and the composite project detail.
//!
//! The detail response recomputes its metrics and important dates from the
//! raw task and payment collections on every request; nothing derived is
//! ever read back from storage.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use shared::{
    parse_iso_date, CreateProjectRequest, ImportantDates, Payment, Project, ProjectDetail,
    ProjectMetrics, ProjectPatch, ProjectStatus, ProjectWithTotals, Task, TaskStatus,
};
use tracing::info;
use uuid::Uuid;

use super::reconciliation::reconcile;
use crate::storage::{PaymentStorage, ProjectStorage, StoreError, TaskStorage};

/// Key dates for the project detail header. Task-derived fields take the
/// earliest parseable date; unparseable dates are skipped rather than
/// propagated.
pub fn important_dates(project: &Project, tasks: &[Task]) -> ImportantDates {
    let next_task_start = tasks
        .iter()
        .filter_map(|task| parse_iso_date(&task.start_date).map(|date| (date, &task.start_date)))
        .min_by_key(|(date, _)| *date)
        .map(|(_, raw)| raw.clone());
    let next_task_due = tasks
        .iter()
        .filter_map(|task| parse_iso_date(&task.end_date).map(|date| (date, &task.end_date)))
        .min_by_key(|(date, _)| *date)
        .map(|(_, raw)| raw.clone());
    ImportantDates {
        start_date: project.start_date.clone(),
        end_date: project.end_date.clone(),
        next_task_start,
        next_task_due,
    }
}

/// Metrics block of the project detail, recomputed from raw collections.
pub fn project_metrics(project: &Project, tasks: &[Task], payments: &[Payment]) -> ProjectMetrics {
    ProjectMetrics {
        total_tasks: tasks.len(),
        completed_tasks: tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Done)
            .count(),
        budget: project.budget,
        payments: reconcile(payments),
    }
}

/// Stitch a project and its raw collections into the detail response.
pub fn assemble_detail(project: Project, tasks: Vec<Task>, payments: Vec<Payment>) -> ProjectDetail {
    let metrics = project_metrics(&project, &tasks, &payments);
    let important_dates = important_dates(&project, &tasks);
    ProjectDetail {
        project,
        tasks,
        payments,
        metrics,
        important_dates,
    }
}

/// Service handling project persistence and derived read models.
pub struct ProjectService<S> {
    store: Arc<S>,
}

impl<S> ProjectService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: ProjectStorage> ProjectService<S> {
    /// Create a project, minting its id and timestamps.
    pub fn create_project(&self, request: CreateProjectRequest) -> Result<Project> {
        let now = Utc::now().to_rfc3339();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            mandante: request.mandante,
            status: request.status.unwrap_or(ProjectStatus::Draft),
            budget: request.budget.unwrap_or(0),
            start_date: request.start_date,
            end_date: request.end_date,
            is_archived: false,
            created_at: now.clone(),
            updated_at: now,
        };
        self.store.store_project(&project)?;
        info!("created project {} ({})", project.id, project.name);
        Ok(project)
    }

    pub fn get_project(&self, project_id: &str) -> Result<Project> {
        self.store
            .get_project(project_id)?
            .ok_or_else(|| StoreError::NotFound("project").into())
    }

    pub fn list_projects(&self, archived: Option<bool>) -> Result<Vec<Project>> {
        self.store.list_projects(archived)
    }

    /// Apply a partial update. Absent fields are left untouched; any applied
    /// patch refreshes `updated_at`.
    pub fn patch_project(&self, project_id: &str, patch: ProjectPatch) -> Result<Project> {
        let mut project = self.get_project(project_id)?;
        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(mandante) = patch.mandante {
            project.mandante = Some(mandante);
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(budget) = patch.budget {
            project.budget = budget;
        }
        if let Some(start_date) = patch.start_date {
            project.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            project.end_date = Some(end_date);
        }
        if let Some(is_archived) = patch.is_archived {
            project.is_archived = is_archived;
        }
        project.updated_at = Utc::now().to_rfc3339();
        self.store.update_project(&project)?;
        Ok(project)
    }

    pub fn delete_project(&self, project_id: &str) -> Result<()> {
        if !self.store.delete_project(project_id)? {
            return Err(StoreError::NotFound("project").into());
        }
        info!("deleted project {project_id}");
        Ok(())
    }
}

impl<S: ProjectStorage + TaskStorage + PaymentStorage> ProjectService<S> {
    /// Full detail for one project, metrics recomputed on the way out.
    pub fn project_detail(&self, project_id: &str) -> Result<ProjectDetail> {
        let project = self.get_project(project_id)?;
        let tasks = self.store.list_tasks(project_id)?;
        let payments = self.store.list_payments(project_id)?;
        Ok(assemble_detail(project, tasks, payments))
    }

    /// Every project with its reconciled totals stitched on, most recently
    /// updated first.
    pub fn projects_with_totals(&self, archived: Option<bool>) -> Result<Vec<ProjectWithTotals>> {
        let projects = self.store.list_projects(archived)?;
        projects
            .into_iter()
            .map(|project| {
                let payments = self.store.list_payments(&project.id)?;
                let summary = reconcile(&payments);
                Ok(ProjectWithTotals {
                    project,
                    payments_facturado: summary.facturado,
                    payments_pagado: summary.pagado,
                    payments_saldo: summary.saldo,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payments::PaymentService;
    use crate::domain::tasks::TaskService;
    use crate::storage::memory::MemoryStore;
    use shared::{CreatePaymentRequest, CreateTaskRequest, PaymentKind};

    fn service() -> ProjectService<MemoryStore> {
        ProjectService::new(Arc::new(MemoryStore::new()))
    }

    fn task(id: &str, project_id: &str, start: &str, end: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            project_id: project_id.to_string(),
            title: format!("Tarea {id}"),
            start_date: start.to_string(),
            end_date: end.to_string(),
            status,
            progress: 0,
            assignee: None,
            notes: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_create_mints_id_and_timestamps() {
        let service = service();
        let project = service
            .create_project(CreateProjectRequest {
                name: "Casa Lo Barnechea".to_string(),
                mandante: Some("Familia Pérez".to_string()),
                status: None,
                budget: Some(45_000_000),
                start_date: Some("2025-03-01".to_string()),
                end_date: None,
            })
            .unwrap();
        assert!(!project.id.is_empty());
        assert_eq!(project.status, ProjectStatus::Draft);
        assert_eq!(project.created_at, project.updated_at);
        assert!(!project.is_archived);

        let fetched = service.get_project(&project.id).unwrap();
        assert_eq!(fetched, project);
    }

    #[test]
    fn test_patch_applies_present_fields_only() {
        let service = service();
        let project = service
            .create_project(CreateProjectRequest {
                name: "Original".to_string(),
                mandante: None,
                status: None,
                budget: Some(100),
                start_date: None,
                end_date: None,
            })
            .unwrap();
        let patched = service
            .patch_project(
                &project.id,
                ProjectPatch {
                    status: Some(ProjectStatus::InDesign),
                    is_archived: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(patched.name, "Original");
        assert_eq!(patched.budget, 100);
        assert_eq!(patched.status, ProjectStatus::InDesign);
        assert!(patched.is_archived);
    }

    #[test]
    fn test_missing_project_maps_to_not_found() {
        let service = service();
        let err = service.get_project("nope").unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::NotFound("project"))
        );
        let err = service.delete_project("nope").unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::NotFound("project"))
        );
    }

    #[test]
    fn test_important_dates_take_earliest_task_dates() {
        let project = Project {
            id: "p1".to_string(),
            name: "Obra".to_string(),
            mandante: None,
            status: ProjectStatus::InDesign,
            budget: 0,
            start_date: Some("2025-01-01".to_string()),
            end_date: Some("2025-12-31".to_string()),
            is_archived: false,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let tasks = vec![
            task("t1", "p1", "2025-03-10", "2025-03-20", TaskStatus::Todo),
            task("t2", "p1", "2025-02-01", "2025-04-01", TaskStatus::Doing),
            task("t3", "p1", "no es fecha", "2025-01-15", TaskStatus::Todo),
        ];
        let dates = important_dates(&project, &tasks);
        assert_eq!(dates.start_date.as_deref(), Some("2025-01-01"));
        assert_eq!(dates.next_task_start.as_deref(), Some("2025-02-01"));
        assert_eq!(dates.next_task_due.as_deref(), Some("2025-01-15"));
    }

    #[test]
    fn test_important_dates_empty_tasks() {
        let project = Project {
            id: "p1".to_string(),
            name: "Obra".to_string(),
            mandante: None,
            status: ProjectStatus::Draft,
            budget: 0,
            start_date: None,
            end_date: None,
            is_archived: false,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let dates = important_dates(&project, &[]);
        assert_eq!(dates, ImportantDates::default());
    }

    #[test]
    fn test_detail_recomputes_metrics() {
        let store = Arc::new(MemoryStore::new());
        let projects = ProjectService::new(Arc::clone(&store));
        let tasks = TaskService::new(Arc::clone(&store));
        let payments = PaymentService::new(Arc::clone(&store));

        let project = projects
            .create_project(CreateProjectRequest {
                name: "Obra".to_string(),
                mandante: None,
                status: None,
                budget: Some(10_000),
                start_date: None,
                end_date: None,
            })
            .unwrap();
        tasks
            .create_task(CreateTaskRequest {
                project_id: project.id.clone(),
                title: "Fundaciones".to_string(),
                start_date: "2025-02-01".to_string(),
                end_date: "2025-02-10".to_string(),
                status: TaskStatus::Done,
                progress: 100,
                assignee: None,
                notes: None,
            })
            .unwrap();
        payments
            .create_payment(CreatePaymentRequest {
                project_id: project.id.clone(),
                kind: PaymentKind::Invoice,
                amount: 4000,
                event_date: "2025-02-05".to_string(),
                reference: None,
                note: None,
                currency: "CLP".to_string(),
            })
            .unwrap();

        let detail = projects.project_detail(&project.id).unwrap();
        assert_eq!(detail.metrics.total_tasks, 1);
        assert_eq!(detail.metrics.completed_tasks, 1);
        assert_eq!(detail.metrics.budget, 10_000);
        assert_eq!(detail.metrics.payments.facturado, 4000);
        assert_eq!(detail.metrics.payments.saldo, 4000);
        assert_eq!(detail.important_dates.next_task_due.as_deref(), Some("2025-02-10"));
    }

    #[test]
    fn test_projects_with_totals_flattens_summary() {
        let store = Arc::new(MemoryStore::new());
        let projects = ProjectService::new(Arc::clone(&store));
        let payments = PaymentService::new(Arc::clone(&store));

        let project = projects
            .create_project(CreateProjectRequest {
                name: "Obra".to_string(),
                mandante: None,
                status: None,
                budget: None,
                start_date: None,
                end_date: None,
            })
            .unwrap();
        payments
            .create_payment(CreatePaymentRequest {
                project_id: project.id.clone(),
                kind: PaymentKind::Invoice,
                amount: 700,
                event_date: "2025-02-05".to_string(),
                reference: None,
                note: None,
                currency: "CLP".to_string(),
            })
            .unwrap();
        payments
            .create_payment(CreatePaymentRequest {
                project_id: project.id.clone(),
                kind: PaymentKind::Payment,
                amount: 200,
                event_date: "2025-02-10".to_string(),
                reference: None,
                note: None,
                currency: "CLP".to_string(),
            })
            .unwrap();

        let listed = projects.projects_with_totals(None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].payments_facturado, 700);
        assert_eq!(listed[0].payments_pagado, 200);
        assert_eq!(listed[0].payments_saldo, 500);
    }
}
