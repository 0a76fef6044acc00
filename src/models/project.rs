use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client project created through the intake form.
///
/// `project_token` is the shared secret behind the client link. It is never
/// serialized on its own; responses carry the derived link instead.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    pub project_id: Uuid,
    pub project_name: String,
    pub company_name: String,
    pub hubspot_url: Option<String>,
    pub notes: Option<String>,
    pub key_contact: Option<String>,
    pub meeting_type: Option<String>,
    pub meeting_id: Option<String>,
    pub meeting_number: Option<String>,
    #[serde(skip_serializing)]
    pub project_token: String,
    pub folder_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// "Company - Project", the label used in listings.
    pub fn label(&self) -> String {
        format!("{} - {}", self.company_name, self.project_name)
    }
}

/// Intake form submission. Only the two names are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectInput {
    pub project_name: Option<String>,
    pub company_name: Option<String>,
    pub hubspot_url: Option<String>,
    pub notes: Option<String>,
    pub key_contact: Option<String>,
    pub meeting_type: Option<String>,
    pub meeting_id: Option<String>,
    pub meeting_number: Option<String>,
    pub folder_url: Option<String>,
}

/// A validated project ready for insertion. The store assigns
/// `project_id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub project_name: String,
    pub company_name: String,
    pub hubspot_url: Option<String>,
    pub notes: Option<String>,
    pub key_contact: Option<String>,
    pub meeting_type: Option<String>,
    pub meeting_id: Option<String>,
    pub meeting_number: Option<String>,
    pub project_token: String,
    pub folder_url: Option<String>,
}

/// The subset of a project shown to a client holding the link.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub project_name: String,
    pub company_name: String,
    pub folder_url: Option<String>,
}

impl From<&Project> for ProjectSummary {
    fn from(p: &Project) -> Self {
        Self {
            project_id: p.project_id,
            project_name: p.project_name.clone(),
            company_name: p.company_name.clone(),
            folder_url: p.folder_url.clone(),
        }
    }
}
