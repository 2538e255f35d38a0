//! One-off project ("gasto puntual") operations
//!
//! Projects carry the full lifecycle: create (single or bulk), read,
//! partial update, delete. Provider and building references are
//! resolved by an application-side merge, not by a store-side join.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{NewProject, Project, ProjectPatch};

use super::StoreClient;

const TABLE: &str = "projects";

impl StoreClient {
    /// List all projects with provider name/category and building
    /// address resolved.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let query = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        let mut projects: Vec<Project> = self.select(TABLE, &query).await?;
        if projects.is_empty() {
            return Ok(projects);
        }

        let providers = self.list_providers().await?;
        let by_provider: HashMap<&str, _> = providers
            .iter()
            .map(|p| (p.id.as_str(), p))
            .collect();
        let buildings = self.list_buildings(None).await?;
        let by_building: HashMap<&str, &str> = buildings
            .iter()
            .map(|b| (b.id.as_str(), b.address.as_str()))
            .collect();

        for project in &mut projects {
            if let Some(provider) = project
                .provider_id
                .as_deref()
                .and_then(|id| by_provider.get(id))
            {
                project.provider_name = Some(provider.name.clone());
                project.provider_category = provider.category_name.clone();
            }
            project.building_address = project
                .building_id
                .as_deref()
                .and_then(|id| by_building.get(id))
                .map(|a| a.to_string());
        }
        Ok(projects)
    }

    /// Fetch one project by id.
    pub async fn get_project(&self, id: &str) -> Result<Project> {
        let query = vec![
            ("select", "*".to_string()),
            ("id", format!("eq.{}", id)),
        ];
        let mut rows: Vec<Project> = self.select(TABLE, &query).await?;
        rows.pop()
            .ok_or_else(|| Error::NotFound(format!("Project {} not found", id)))
    }

    /// Insert one project.
    pub async fn insert_project(&self, project: &NewProject) -> Result<Project> {
        let mut created = self.insert_projects(std::slice::from_ref(project)).await?;
        created
            .pop()
            .ok_or_else(|| Error::Store {
                status: 500,
                message: "Store returned no representation for inserted project".to_string(),
            })
    }

    /// Bulk-insert projects after validating every row's cost.
    pub async fn insert_projects(&self, rows: &[NewProject]) -> Result<Vec<Project>> {
        if rows.is_empty() {
            return Err(Error::InvalidData("No projects to insert".to_string()));
        }
        for (index, row) in rows.iter().enumerate() {
            if !row.cost.is_finite() {
                return Err(Error::InvalidData(format!(
                    "Project {}: cost is not a finite number",
                    index + 1
                )));
            }
        }
        self.insert(TABLE, rows).await
    }

    /// Partially update a project.
    ///
    /// The target is looked up first so that patching a missing id
    /// fails with not-found rather than silently matching zero rows.
    pub async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
        if patch.is_empty() {
            return Err(Error::InvalidData(
                "Update contains no fields to change".to_string(),
            ));
        }
        if let Some(cost) = patch.cost {
            if !cost.is_finite() {
                return Err(Error::InvalidData(
                    "Cost is not a finite number".to_string(),
                ));
            }
        }

        self.get_project(id).await?;

        let mut rows: Vec<Project> = self.update_by_id(TABLE, id, patch).await?;
        rows.pop()
            .ok_or_else(|| Error::NotFound(format!("Project {} not found", id)))
    }

    /// Delete a project by id.
    ///
    /// Delete-by-filter semantics: deleting an id that does not exist
    /// succeeds without error.
    pub async fn delete_project(&self, id: &str) -> Result<()> {
        self.delete_by_id(TABLE, id).await
    }
}
