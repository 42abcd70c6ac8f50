//! REST surface over the domain services.
//!
//! Handlers stay thin: decode, delegate to a service, map errors. Storage
//! misses surface as 404, rejected inputs as 400, anything else as 500.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    CreatePaymentRequest, CreateProjectRequest, CreateTaskRequest, PaymentPatch, ProjectForm,
    ProjectPatch, TaskForm, TaskPatch,
};
use tracing::info;

use crate::storage::StoreError;
use crate::Backend;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Backend>,
}

impl AppState {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

/// Build the full router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project_detail)
                .patch(patch_project)
                .delete(delete_project),
        )
        .route("/tasks", post(create_task))
        .route("/tasks/:id", get(list_project_tasks).patch(patch_task).delete(delete_task))
        .route("/payments", post(create_payment))
        .route(
            "/payments/:id",
            get(list_project_payments)
                .patch(patch_payment)
                .delete(delete_payment),
        )
        .with_state(state)
}

/// Map a service error: storage misses become 404, the rest 500.
fn error_response(context: &str, err: anyhow::Error) -> Response {
    if let Some(StoreError::NotFound(entity)) = err.downcast_ref::<StoreError>() {
        return (StatusCode::NOT_FOUND, format!("{entity} not found")).into_response();
    }
    tracing::error!("{context}: {err:?}");
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string()).into_response()
}

#[derive(Deserialize, Debug)]
pub struct ProjectListQuery {
    pub archived: Option<bool>,
}

/// Axum handler for GET /projects
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> impl IntoResponse {
    info!("GET /projects - query: {:?}", query);

    match state
        .backend
        .project_service
        .projects_with_totals(query.archived)
    {
        Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
        Err(e) => error_response("Error listing projects", e),
    }
}

/// Axum handler for POST /projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    info!("POST /projects - name: {}", request.name);

    if request.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "El proyecto debe tener un nombre").into_response();
    }
    if request.budget.is_some_and(|budget| budget < 0) {
        return (StatusCode::BAD_REQUEST, "El presupuesto no puede ser negativo").into_response();
    }

    match state.backend.project_service.create_project(request) {
        Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(e) => error_response("Error creating project", e),
    }
}

/// Axum handler for GET /projects/:id
pub async fn get_project_detail(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /projects/{}", project_id);

    match state.backend.project_service.project_detail(&project_id) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => error_response("Error loading project detail", e),
    }
}

/// Axum handler for PATCH /projects/:id
pub async fn patch_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> impl IntoResponse {
    info!("PATCH /projects/{}", project_id);

    // Same post-patch validation as tasks: the merged project must still
    // satisfy the creation-time checks.
    let current = match state.backend.project_service.get_project(&project_id) {
        Ok(project) => project,
        Err(e) => return error_response("Error updating project", e),
    };
    let form = ProjectForm {
        name: patch.name.clone().unwrap_or_else(|| current.name.clone()),
        mandante: String::new(),
        budget_input: patch.budget.unwrap_or(current.budget).to_string(),
        start_date: patch
            .start_date
            .clone()
            .or_else(|| current.start_date.clone())
            .unwrap_or_default(),
        end_date: patch
            .end_date
            .clone()
            .or_else(|| current.end_date.clone())
            .unwrap_or_default(),
    };
    let validation = form.validate();
    if !validation.is_valid {
        let message = validation
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return (StatusCode::BAD_REQUEST, message).into_response();
    }

    match state
        .backend
        .project_service
        .patch_project(&project_id, patch)
    {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(e) => error_response("Error updating project", e),
    }
}

/// Axum handler for DELETE /projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /projects/{}", project_id);

    match state.backend.project_service.delete_project(&project_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Error deleting project", e),
    }
}

/// Axum handler for GET /tasks/:project_id
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /tasks/{}", project_id);

    match state.backend.task_service.list_tasks(&project_id) {
        Ok(tasks) => (StatusCode::OK, Json(tasks)).into_response(),
        Err(e) => error_response("Error listing tasks", e),
    }
}

/// Axum handler for POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    info!("POST /tasks - project: {}", request.project_id);

    let form = TaskForm {
        title: request.title.clone(),
        start_date: request.start_date.clone(),
        end_date: request.end_date.clone(),
        status: Some(request.status),
        progress: request.progress,
        assignee: request.assignee.clone().unwrap_or_default(),
        notes: request.notes.clone().unwrap_or_default(),
    };
    let validation = form.validate();
    if !validation.is_valid {
        let message = validation
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return (StatusCode::BAD_REQUEST, message).into_response();
    }
    if state
        .backend
        .project_service
        .get_project(&request.project_id)
        .is_err()
    {
        return (StatusCode::BAD_REQUEST, "Proyecto desconocido").into_response();
    }

    match state.backend.task_service.create_task(request) {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => error_response("Error creating task", e),
    }
}

/// Axum handler for PATCH /tasks/:id
pub async fn patch_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> impl IntoResponse {
    info!("PATCH /tasks/{}", task_id);

    // Validate the task as it would look after the patch, so a partial
    // update cannot sneak an inverted or unparseable date range past the
    // checks that guard creation.
    let current = match state.backend.task_service.get_task(&task_id) {
        Ok(task) => task,
        Err(e) => return error_response("Error updating task", e),
    };
    let form = TaskForm {
        title: patch.title.clone().unwrap_or_else(|| current.title.clone()),
        start_date: patch
            .start_date
            .clone()
            .unwrap_or_else(|| current.start_date.clone()),
        end_date: patch
            .end_date
            .clone()
            .unwrap_or_else(|| current.end_date.clone()),
        status: patch.status.or(Some(current.status)),
        progress: patch.progress.unwrap_or(current.progress),
        assignee: String::new(),
        notes: String::new(),
    };
    let validation = form.validate();
    if !validation.is_valid {
        let message = validation
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return (StatusCode::BAD_REQUEST, message).into_response();
    }

    match state.backend.task_service.update_task(&task_id, patch) {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => error_response("Error updating task", e),
    }
}

/// Axum handler for DELETE /tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /tasks/{}", task_id);

    match state.backend.task_service.delete_task(&task_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Error deleting task", e),
    }
}

/// Axum handler for GET /payments/:project_id
pub async fn list_project_payments(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /payments/{}", project_id);

    match state.backend.payment_service.list_payments(&project_id) {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(e) => error_response("Error listing payments", e),
    }
}

/// Axum handler for POST /payments
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    info!(
        "POST /payments - project: {}, amount: {}",
        request.project_id, request.amount
    );

    if request.amount < 0 {
        return (StatusCode::BAD_REQUEST, "El monto no puede ser negativo").into_response();
    }
    if state
        .backend
        .project_service
        .get_project(&request.project_id)
        .is_err()
    {
        return (StatusCode::BAD_REQUEST, "Proyecto desconocido").into_response();
    }

    match state.backend.payment_service.create_payment(request) {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => error_response("Error recording payment", e),
    }
}

/// Axum handler for PATCH /payments/:id
pub async fn patch_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    Json(patch): Json<PaymentPatch>,
) -> impl IntoResponse {
    info!("PATCH /payments/{}", payment_id);

    if patch.amount.is_some_and(|amount| amount < 0) {
        return (StatusCode::BAD_REQUEST, "El monto no puede ser negativo").into_response();
    }

    match state
        .backend
        .payment_service
        .update_payment(&payment_id, patch)
    {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(e) => error_response("Error updating payment", e),
    }
}

/// Axum handler for DELETE /payments/:id
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /payments/{}", payment_id);

    match state.backend.payment_service.delete_payment(&payment_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Error deleting payment", e),
    }
}
