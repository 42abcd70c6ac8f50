use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    InDesign,
    InReview,
    Delivered,
}

impl ProjectStatus {
    /// Human-readable label as shown on dashboard cards.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "Planificacion",
            ProjectStatus::InDesign => "Diseno en curso",
            ProjectStatus::InReview => "En revision",
            ProjectStatus::Delivered => "Entregado",
        }
    }
}

/// Workflow status of a task. Any status may transition directly to any
/// other (structural project tasks can jump e.g. from blocked to done).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Doing,
    Blocked,
    Done,
}

impl TaskStatus {
    /// All statuses in kanban column order.
    pub fn all() -> [TaskStatus; 4] {
        [
            TaskStatus::Todo,
            TaskStatus::Doing,
            TaskStatus::Blocked,
            TaskStatus::Done,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Por iniciar",
            TaskStatus::Doing => "En curso",
            TaskStatus::Blocked => "Bloqueada",
            TaskStatus::Done => "Completada",
        }
    }
}

/// Kind of payment event recorded against a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Invoice,
    Advance,
    Payment,
    CreditNote,
    Refund,
}

impl PaymentKind {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentKind::Invoice => "Factura emitida",
            PaymentKind::Advance => "Anticipo",
            PaymentKind::Payment => "Pago recibido",
            PaymentKind::CreditNote => "Nota de credito",
            PaymentKind::Refund => "Reembolso",
        }
    }
}

/// A structural-engineering project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Client name.
    pub mandante: Option<String>,
    pub status: ProjectStatus,
    /// Agreed budget in CLP.
    pub budget: i64,
    /// ISO 8601 date (YYYY-MM-DD).
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_archived: bool,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub updated_at: String,
}

/// A project task, rendered on the kanban board, calendar and gantt chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    /// ISO 8601 date (YYYY-MM-DD).
    pub start_date: String,
    pub end_date: String,
    pub status: TaskStatus,
    /// Completion percentage, 0 to 100.
    pub progress: u8,
    pub assignee: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A payment event. The ledger (facturado/pagado/saldo) is never stored;
/// it is always recomputed from the full event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub project_id: String,
    pub kind: PaymentKind,
    /// Amount in CLP, non-negative by convention.
    pub amount: i64,
    /// ISO 8601 date (YYYY-MM-DD).
    pub event_date: String,
    /// Invoice number, purchase order, etc.
    pub reference: Option<String>,
    pub note: Option<String>,
    pub currency: String,
    pub created_at: String,
}

fn default_currency() -> String {
    "CLP".to_string()
}

fn default_task_status() -> TaskStatus {
    TaskStatus::Todo
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub mandante: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Body of `PATCH /projects/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub mandante: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_archived: Option<bool>,
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub project_id: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_task_status")]
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u8,
    pub assignee: Option<String>,
    pub notes: Option<String>,
}

/// Body of `PATCH /tasks/{id}`. Also the shape of the mutation intent
/// issued by the kanban board (`{ status: Some(..) }`, everything else
/// absent).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
    pub assignee: Option<String>,
    pub notes: Option<String>,
}

/// Body of `POST /payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub project_id: String,
    pub kind: PaymentKind,
    pub amount: i64,
    pub event_date: String,
    pub reference: Option<String>,
    pub note: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Body of `PATCH /payments/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentPatch {
    pub kind: Option<PaymentKind>,
    pub amount: Option<i64>,
    pub event_date: Option<String>,
    pub reference: Option<String>,
    pub note: Option<String>,
}

/// Reconciled payment totals for one project, all clamped non-negative.
///
/// `saldo` is clamped independently of the other two, so
/// `facturado - pagado == saldo` does not hold when a project is overpaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    /// Total invoiced, net of credit notes.
    pub facturado: i64,
    /// Total received (payments plus advances), net of refunds.
    pub pagado: i64,
    /// Outstanding balance owed.
    pub saldo: i64,
}

impl PaymentSummary {
    /// Field-wise accumulation, used by the portfolio sum-of-sums.
    pub fn add(&mut self, other: &PaymentSummary) {
        self.facturado += other.facturado;
        self.pagado += other.pagado;
        self.saldo += other.saldo;
    }
}

/// Position of reconciled totals against the project budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPosition {
    /// Budget not yet invoiced.
    pub por_facturar: i64,
    /// Invoiced but not yet collected.
    pub por_cobrar: i64,
}

/// Per-status task counts. Every status is always present so consumers can
/// render one card per column unconditionally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub todo: usize,
    pub doing: usize,
    pub blocked: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::Doing => self.doing,
            TaskStatus::Blocked => self.blocked,
            TaskStatus::Done => self.done,
        }
    }

    pub fn increment(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Todo => self.todo += 1,
            TaskStatus::Doing => self.doing += 1,
            TaskStatus::Blocked => self.blocked += 1,
            TaskStatus::Done => self.done += 1,
        }
    }
}

/// Aggregated task counts for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetrics {
    pub total: usize,
    pub by_status: StatusCounts,
    pub completed: usize,
}

/// A pending task with an upcoming delivery date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingDelivery {
    pub task_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub end_date: String,
}

/// Schedule indicators shown next to the gantt chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleHealth {
    /// Tasks not yet done.
    pub pending: usize,
    /// Pending tasks whose end date has passed.
    pub overdue: usize,
    /// Next pending deliveries, soonest first (at most ten).
    pub upcoming: Vec<UpcomingDelivery>,
    /// Mean progress across all tasks, one decimal.
    pub average_progress: f64,
}

/// One row of the gantt grid. The bar occupies day columns
/// `[offset, offset + duration)` within the shared grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttRow {
    pub task: Task,
    /// Days from grid start to bar start.
    pub offset: usize,
    /// Inclusive day span of the bar, at least one.
    pub duration: usize,
}

/// Normalized day grid shared by every gantt row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GanttLayout {
    /// One entry per day column, earliest first.
    pub days: Vec<NaiveDate>,
    /// Rows sorted by start date, input order preserved on ties.
    pub rows: Vec<GanttRow>,
}

impl GanttLayout {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_days(&self) -> usize {
        self.days.len()
    }
}

/// Color semantics for calendar events; the concrete palette is a
/// presentation concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTone {
    Success,
    Info,
    Warning,
    Neutral,
}

impl EventTone {
    /// Default hex color for widgets that want one.
    pub fn color(&self) -> &'static str {
        match self {
            EventTone::Success => "#22c55e",
            EventTone::Info => "#0ea5e9",
            EventTone::Warning => "#f97316",
            EventTone::Neutral => "#64748b",
        }
    }
}

/// Event descriptor consumed by the calendar widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// ISO 8601 date (YYYY-MM-DD).
    pub start: String,
    /// Exclusive end boundary: one day past the last covered day, because
    /// the calendar widget treats `end` as exclusive. The adjustment lives
    /// here at the boundary, never in stored data.
    pub end: String,
    pub tone: EventTone,
}

/// Portfolio-wide summary cards across the active project set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub active_projects: usize,
    pub total_budget: i64,
    pub facturado: i64,
    pub pagado: i64,
    pub saldo: i64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
}

/// One row of the dashboard project-status table, raw amounts plus
/// CLP-formatted strings for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatusRow {
    pub project_id: String,
    pub name: String,
    pub status_label: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub budget: i64,
    pub facturado: i64,
    pub pagado: i64,
    pub saldo: i64,
    pub budget_clp: String,
    pub facturado_clp: String,
    pub pagado_clp: String,
    pub saldo_clp: String,
}

/// Key dates surfaced on the project detail header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportantDates {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub next_task_start: Option<String>,
    pub next_task_due: Option<String>,
}

/// Recomputed metrics block of `GET /projects/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub budget: i64,
    pub payments: PaymentSummary,
}

/// Response of `GET /projects/{id}`. `metrics` and `important_dates` are
/// always recomputed from the raw collections so clients can verify them
/// against their own recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub tasks: Vec<Task>,
    pub payments: Vec<Payment>,
    pub metrics: ProjectMetrics,
    pub important_dates: ImportantDates,
}

/// Project list entry with reconciled totals stitched on, as returned by
/// `GET /projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectWithTotals {
    #[serde(flatten)]
    pub project: Project,
    pub payments_facturado: i64,
    pub payments_pagado: i64,
    pub payments_saldo: i64,
}

/// Parse an ISO 8601 calendar date, tolerating a trailing time component
/// (`2025-06-13T09:00:00-04:00` parses as 2025-06-13). Returns `None` for
/// anything malformed; callers degrade gracefully instead of failing.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Format a CLP amount with dot thousands separators ("1.234.567").
pub fn format_clp(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Validation outcome for a dialog form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormValidation<E> {
    pub is_valid: bool,
    pub errors: Vec<E>,
}

impl<E> FormValidation<E> {
    pub fn from_errors(errors: Vec<E>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Form state for the task create/edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskForm {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub status: Option<TaskStatus>,
    pub progress: u8,
    pub assignee: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskFormError {
    EmptyTitle,
    InvalidStartDate,
    InvalidEndDate,
    /// End date earlier than start date. Rejected here rather than snapped
    /// silently, so the data layer never sees an inverted range.
    EndBeforeStart,
    ProgressOutOfRange(u8),
}

impl fmt::Display for TaskFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFormError::EmptyTitle => write!(f, "La tarea debe tener un titulo"),
            TaskFormError::InvalidStartDate => write!(f, "Fecha de inicio invalida"),
            TaskFormError::InvalidEndDate => write!(f, "Fecha de termino invalida"),
            TaskFormError::EndBeforeStart => {
                write!(f, "La fecha de termino no puede ser anterior al inicio")
            }
            TaskFormError::ProgressOutOfRange(value) => {
                write!(f, "Progreso fuera de rango: {value}")
            }
        }
    }
}

impl TaskForm {
    pub fn validate(&self) -> FormValidation<TaskFormError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(TaskFormError::EmptyTitle);
        }
        let start = parse_iso_date(&self.start_date);
        let end = parse_iso_date(&self.end_date);
        if start.is_none() {
            errors.push(TaskFormError::InvalidStartDate);
        }
        if end.is_none() {
            errors.push(TaskFormError::InvalidEndDate);
        }
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.push(TaskFormError::EndBeforeStart);
            }
        }
        if self.progress > 100 {
            errors.push(TaskFormError::ProgressOutOfRange(self.progress));
        }
        FormValidation::from_errors(errors)
    }
}

/// Form state for the payment registration dialog. The amount is kept as
/// the raw input string until validation cleans it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub kind: Option<PaymentKind>,
    pub amount_input: String,
    pub event_date: String,
    pub reference: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFormError {
    MissingKind,
    EmptyAmount,
    InvalidAmount(String),
    NegativeAmount,
    InvalidEventDate,
}

impl fmt::Display for PaymentFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentFormError::MissingKind => write!(f, "Selecciona un tipo de movimiento"),
            PaymentFormError::EmptyAmount => write!(f, "Ingresa un monto"),
            PaymentFormError::InvalidAmount(raw) => write!(f, "Monto invalido: {raw}"),
            PaymentFormError::NegativeAmount => write!(f, "El monto no puede ser negativo"),
            PaymentFormError::InvalidEventDate => write!(f, "Fecha invalida"),
        }
    }
}

/// Validation outcome for the payment form, carrying the cleaned amount
/// when parsing succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFormValidation {
    pub is_valid: bool,
    pub errors: Vec<PaymentFormError>,
    pub cleaned_amount: Option<i64>,
}

impl PaymentForm {
    pub fn validate(&self) -> PaymentFormValidation {
        let mut errors = Vec::new();
        if self.kind.is_none() {
            errors.push(PaymentFormError::MissingKind);
        }
        let trimmed = self.amount_input.trim().replace('.', "");
        let cleaned_amount = if trimmed.is_empty() {
            errors.push(PaymentFormError::EmptyAmount);
            None
        } else {
            match trimmed.parse::<i64>() {
                Ok(amount) if amount < 0 => {
                    errors.push(PaymentFormError::NegativeAmount);
                    None
                }
                Ok(amount) => Some(amount),
                Err(_) => {
                    errors.push(PaymentFormError::InvalidAmount(
                        self.amount_input.trim().to_string(),
                    ));
                    None
                }
            }
        };
        if parse_iso_date(&self.event_date).is_none() {
            errors.push(PaymentFormError::InvalidEventDate);
        }
        PaymentFormValidation {
            is_valid: errors.is_empty(),
            errors,
            cleaned_amount,
        }
    }
}

/// Form state for the project create/edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectForm {
    pub name: String,
    pub mandante: String,
    pub budget_input: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectFormError {
    EmptyName,
    InvalidBudget(String),
    NegativeBudget,
    InvalidStartDate,
    InvalidEndDate,
    EndBeforeStart,
}

impl fmt::Display for ProjectFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectFormError::EmptyName => write!(f, "El proyecto debe tener un nombre"),
            ProjectFormError::InvalidBudget(raw) => write!(f, "Presupuesto invalido: {raw}"),
            ProjectFormError::NegativeBudget => {
                write!(f, "El presupuesto no puede ser negativo")
            }
            ProjectFormError::InvalidStartDate => write!(f, "Fecha de inicio invalida"),
            ProjectFormError::InvalidEndDate => write!(f, "Fecha de termino invalida"),
            ProjectFormError::EndBeforeStart => {
                write!(f, "La fecha de termino no puede ser anterior al inicio")
            }
        }
    }
}

impl ProjectForm {
    /// Dates and budget are optional; when present they must parse, and a
    /// date range must not be inverted.
    pub fn validate(&self) -> FormValidation<ProjectFormError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ProjectFormError::EmptyName);
        }
        let budget_raw = self.budget_input.trim();
        if !budget_raw.is_empty() {
            match budget_raw.replace('.', "").parse::<i64>() {
                Ok(budget) if budget < 0 => errors.push(ProjectFormError::NegativeBudget),
                Ok(_) => {}
                Err(_) => errors.push(ProjectFormError::InvalidBudget(budget_raw.to_string())),
            }
        }
        let start = if self.start_date.trim().is_empty() {
            None
        } else {
            let parsed = parse_iso_date(&self.start_date);
            if parsed.is_none() {
                errors.push(ProjectFormError::InvalidStartDate);
            }
            parsed
        };
        let end = if self.end_date.trim().is_empty() {
            None
        } else {
            let parsed = parse_iso_date(&self.end_date);
            if parsed.is_none() {
                errors.push(ProjectFormError::InvalidEndDate);
            }
            parsed
        };
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.push(ProjectFormError::EndBeforeStart);
            }
        }
        FormValidation::from_errors(errors)
    }
}
