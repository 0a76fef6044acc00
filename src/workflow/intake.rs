use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

use super::{present, Workflow};
use crate::errors::AppError;
use crate::models::project::{NewProject, Project, ProjectInput};
use crate::notification::webhook::{NotificationReport, WebhookEvent};

/// Random bytes behind each project token, before encoding.
pub const TOKEN_BYTES: usize = 32;

/// A fresh URL-safe project token (43 characters).
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `{base_url}?token={token}`
pub fn secure_link(base_url: &str, token: &str) -> String {
    format!(
        "{}?token={}",
        base_url.trim_end_matches('?'),
        urlencoding::encode(token)
    )
}

/// Check the two required names and normalize empty optional fields to `None`.
pub fn validate(input: &ProjectInput, project_token: String) -> Result<NewProject, AppError> {
    let project_name = present(input.project_name.as_deref());
    let company_name = present(input.company_name.as_deref());

    let (Some(project_name), Some(company_name)) = (project_name, company_name) else {
        return Err(AppError::Validation(
            "Project Name and Company Name are required".to_string(),
        ));
    };

    Ok(NewProject {
        project_name,
        company_name,
        hubspot_url: present(input.hubspot_url.as_deref()),
        notes: present(input.notes.as_deref()),
        key_contact: present(input.key_contact.as_deref()),
        meeting_type: present(input.meeting_type.as_deref()),
        meeting_id: present(input.meeting_id.as_deref()),
        meeting_number: present(input.meeting_number.as_deref()),
        project_token,
        folder_url: present(input.folder_url.as_deref()),
    })
}

#[derive(Debug, Serialize)]
pub struct CreatedProject {
    pub project: Project,
    /// The link to hand to the client.
    pub secure_link: String,
    pub notification: NotificationReport,
    pub message: String,
}

/// One row of the admin overview.
#[derive(Debug, Serialize)]
pub struct ProjectOverview {
    #[serde(flatten)]
    pub project: Project,
    pub secure_link: String,
}

impl Workflow<'_> {
    /// Create a project and announce it on the creation webhook.
    ///
    /// The project is committed before the webhook is attempted; a failed
    /// notification only adds a warning to the result.
    pub async fn create_project(&self, input: ProjectInput) -> Result<CreatedProject, AppError> {
        let new_project = validate(&input, generate_token())?;

        let project = self
            .store
            .insert_project(&new_project)
            .await?
            .ok_or_else(|| anyhow::anyhow!("insert into projects returned no row"))?;

        tracing::info!(
            project_id = %project.project_id,
            company = %project.company_name,
            "project created"
        );

        let secure_link = secure_link(&self.config.public_base_url, &project.project_token);

        let notification = self
            .webhook
            .notify(
                self.config.creation_webhook_url.as_deref(),
                &WebhookEvent::project_created(&project),
            )
            .await;

        let mut message = format!("Project '{}' created successfully!", project.project_name);
        if let NotificationReport::Failed { warning } = &notification {
            message.push_str(&format!(" Warning: {}.", warning));
        }

        Ok(CreatedProject {
            project,
            secure_link,
            notification,
            message,
        })
    }

    /// Every project, newest first, with its share link.
    pub async fn overview(&self) -> Result<Vec<ProjectOverview>, AppError> {
        let projects = self.store.list_projects().await?;
        Ok(projects
            .into_iter()
            .map(|project| ProjectOverview {
                secure_link: secure_link(&self.config.public_base_url, &project.project_token),
                project,
            })
            .collect())
    }
}
