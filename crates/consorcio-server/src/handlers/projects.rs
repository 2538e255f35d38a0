//! One-off project ("gasto puntual") handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_json_body;
use crate::{AppError, AppState, SuccessResponse};
use consorcio_core::{AmountInput, NewProject, Project, ProjectPatch, QueryKey};

#[derive(Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

/// GET /api/projects - List projects with provider name/category and
/// building address resolved
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let store = state.store.clone();
    let projects = state
        .cache
        .get_or_fetch(&QueryKey::ProjectList, move || async move {
            store.list_projects().await
        })
        .await?;
    Ok(Json(ProjectListResponse { projects }))
}

#[derive(Serialize)]
pub struct ProjectResponse {
    pub project: Project,
}

/// GET /api/projects/:id - Fetch one project
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, AppError> {
    let key = QueryKey::ProjectDetail { id: id.clone() };
    let store = state.store.clone();
    let project = state
        .cache
        .get_or_fetch(&key, move || async move { store.get_project(&id).await })
        .await?;
    Ok(Json(ProjectResponse { project }))
}

/// Request body for creating a project
#[derive(Debug, Deserialize)]
pub struct AddProjectRequest {
    pub cost: Option<AmountInput>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
    pub provider_id: Option<String>,
    pub building_id: Option<String>,
}

impl AddProjectRequest {
    fn into_new_project(self) -> Result<NewProject, AppError> {
        let cost = self
            .cost
            .as_ref()
            .and_then(AmountInput::as_finite)
            .ok_or_else(|| AppError::bad_request("Missing or non-numeric cost"))?;
        Ok(NewProject {
            cost,
            description: self.description,
            status: self.status.unwrap_or(true),
            provider_id: self.provider_id,
            building_id: self.building_id,
        })
    }
}

#[derive(Serialize)]
pub struct AddProjectResponse {
    pub success: bool,
    pub message: String,
    pub project: Project,
}

/// POST /api/projects/add - Insert one project
pub async fn add_project(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AddProjectResponse>, AppError> {
    let req: AddProjectRequest = read_json_body(request).await?;
    let project = state.store.insert_project(&req.into_new_project()?).await?;

    state.cache.invalidate_resource("projects").await;

    Ok(Json(AddProjectResponse {
        success: true,
        message: "Project recorded".to_string(),
        project,
    }))
}

#[derive(Serialize)]
pub struct AddProjectsBulkResponse {
    pub success: bool,
    pub message: String,
    pub projects: Vec<Project>,
}

/// POST /api/projects/add-bulk - Insert N projects
pub async fn add_projects_bulk(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AddProjectsBulkResponse>, AppError> {
    let reqs: Vec<AddProjectRequest> = read_json_body(request).await?;
    if reqs.is_empty() {
        return Err(AppError::bad_request("No projects submitted"));
    }

    let rows = reqs
        .into_iter()
        .map(AddProjectRequest::into_new_project)
        .collect::<Result<Vec<_>, _>>()?;

    let projects = state.store.insert_projects(&rows).await?;
    state.cache.invalidate_resource("projects").await;

    Ok(Json(AddProjectsBulkResponse {
        success: true,
        message: format!("{} projects recorded", projects.len()),
        projects,
    }))
}

/// Request body for partially updating a project
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub cost: Option<AmountInput>,
    pub description: Option<String>,
    pub status: Option<bool>,
    pub provider_id: Option<String>,
    pub building_id: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateProjectResponse {
    pub success: bool,
    pub message: String,
    pub project: Project,
}

/// PATCH /api/projects/:id - Partial update
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<UpdateProjectResponse>, AppError> {
    let req: UpdateProjectRequest = read_json_body(request).await?;

    let cost = match &req.cost {
        Some(input) => Some(
            input
                .as_finite()
                .ok_or_else(|| AppError::bad_request("Non-numeric cost"))?,
        ),
        None => None,
    };
    let patch = ProjectPatch {
        cost,
        description: req.description,
        status: req.status,
        provider_id: req.provider_id,
        building_id: req.building_id,
    };

    let project = state.store.update_project(&id, &patch).await?;
    state.cache.invalidate_resource("projects").await;

    Ok(Json(UpdateProjectResponse {
        success: true,
        message: "Project updated".to_string(),
        project,
    }))
}

/// DELETE /api/projects/:id - Delete (idempotent: succeeds even when
/// the id never existed)
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.delete_project(&id).await?;
    state.cache.invalidate_resource("projects").await;

    Ok(Json(SuccessResponse {
        success: true,
        message: "Project deleted".to_string(),
    }))
}
