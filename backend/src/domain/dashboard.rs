//! Portfolio dashboard aggregation.
//!
//! Composes the per-project reconciliation and task metrics into the
//! portfolio summary cards and the project-status table. Aggregation is
//! strictly sum-of-sums over already-reconciled per-project outputs; the
//! raw events of different projects are never pooled, so per-project
//! clamping survives into the totals.

use std::collections::HashSet;

use shared::{
    format_clp, Payment, PaymentSummary, PortfolioSummary, Project, ProjectStatusRow, Task,
    TaskStatus,
};

use super::reconciliation::reconcile;

/// Predicate selecting the projects that count toward the portfolio.
/// Defaults to the working set: not archived, not delivered.
#[derive(Debug, Clone, Copy)]
pub struct ActiveProjectFilter {
    pub include_archived: bool,
    pub include_delivered: bool,
}

impl Default for ActiveProjectFilter {
    fn default() -> Self {
        Self {
            include_archived: false,
            include_delivered: false,
        }
    }
}

impl ActiveProjectFilter {
    pub fn is_active(&self, project: &Project) -> bool {
        if !self.include_archived && project.is_archived {
            return false;
        }
        if !self.include_delivered && project.status == shared::ProjectStatus::Delivered {
            return false;
        }
        true
    }
}

/// Portfolio-wide summary across the active project set.
///
/// Totals are sum-of-sums over per-project reconciliations. Events of
/// different projects are never pooled before clamping, so one project's
/// overpayment cannot offset another's outstanding balance.
pub fn portfolio(
    projects: &[Project],
    payments: &[Payment],
    tasks: &[Task],
    filter: &ActiveProjectFilter,
) -> PortfolioSummary {
    let active: Vec<&Project> = projects
        .iter()
        .filter(|project| filter.is_active(project))
        .collect();

    let mut totals = PaymentSummary::default();
    for project in &active {
        let events: Vec<Payment> = payments
            .iter()
            .filter(|payment| payment.project_id == project.id)
            .cloned()
            .collect();
        totals.add(&reconcile(&events));
    }

    let active_ids: HashSet<&str> = active.iter().map(|p| p.id.as_str()).collect();
    let mut total_tasks = 0;
    let mut completed_tasks = 0;
    for task in tasks {
        if active_ids.contains(task.project_id.as_str()) {
            total_tasks += 1;
            if task.status == TaskStatus::Done {
                completed_tasks += 1;
            }
        }
    }

    PortfolioSummary {
        active_projects: active.len(),
        total_budget: active.iter().map(|project| project.budget).sum(),
        facturado: totals.facturado,
        pagado: totals.pagado,
        saldo: totals.saldo,
        total_tasks,
        completed_tasks,
    }
}

/// Project-status table rows, one per active project, in the input
/// (most-recently-updated-first) order.
pub fn project_status_rows(
    projects: &[Project],
    payments: &[Payment],
    filter: &ActiveProjectFilter,
) -> Vec<ProjectStatusRow> {
    projects
        .iter()
        .filter(|project| filter.is_active(project))
        .map(|project| {
            let events: Vec<Payment> = payments
                .iter()
                .filter(|payment| payment.project_id == project.id)
                .cloned()
                .collect();
            let summary = reconcile(&events);
            ProjectStatusRow {
                project_id: project.id.clone(),
                name: project.name.clone(),
                status_label: project.status.label().to_string(),
                start_date: project.start_date.clone(),
                end_date: project.end_date.clone(),
                budget: project.budget,
                facturado: summary.facturado,
                pagado: summary.pagado,
                saldo: summary.saldo,
                budget_clp: format_clp(project.budget),
                facturado_clp: format_clp(summary.facturado),
                pagado_clp: format_clp(summary.pagado),
                saldo_clp: format_clp(summary.saldo),
            }
        })
        .collect()
}
