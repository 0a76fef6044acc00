use uuid::Uuid;

use super::Workflow;
use crate::errors::AppError;
use crate::models::project::Project;

impl Workflow<'_> {
    /// Resolve a client link token to its project.
    ///
    /// The token must match a stored `project_token` exactly. Tokens never
    /// expire and cannot be revoked.
    pub async fn resolve_token(&self, token: Option<&str>) -> Result<Project, AppError> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AppError::InvalidToken),
        };

        match self.store.find_project_by_token(token).await? {
            Some(project) => {
                tracing::debug!(project_id = %project.project_id, "token resolved");
                Ok(project)
            }
            None => {
                tracing::warn!("rejected unknown project token");
                Err(AppError::InvalidToken)
            }
        }
    }

    /// Admin selection by id.
    pub async fn resolve_project(&self, project_id: Uuid) -> Result<Project, AppError> {
        self.store
            .get_project(project_id)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }
}
