//! User project entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use ym_core::onboarding::record::{Designation, ProjectEntry, Tenure};
use ym_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProject {
    pub id: DbId,
    pub user_id: DbId,
    pub project_type: Option<String>,
    pub project_type_custom: Option<String>,
    pub role: Option<String>,
    pub amir_user_id: Option<DbId>,
    pub amir_custom_name: Option<String>,
    pub start_month: Option<i32>,
    pub start_year: Option<i32>,
    pub end_month: Option<i32>,
    pub end_year: Option<i32>,
    pub is_current: bool,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserProject {
    pub fn into_entry(self) -> ProjectEntry {
        ProjectEntry {
            id: self.id.to_string(),
            project_type: Designation::from_columns(self.project_type, self.project_type_custom),
            role: self.role,
            amir: Designation::from_columns(self.amir_user_id, self.amir_custom_name),
            tenure: Tenure {
                start_month: self.start_month.and_then(|m| u32::try_from(m).ok()),
                start_year: self.start_year,
                end_month: self.end_month.and_then(|m| u32::try_from(m).ok()),
                end_year: self.end_year,
                is_current: self.is_current,
            },
            description: self.description,
        }
    }
}

/// User project joined with the amir's name for the profile viewer.
#[derive(Debug, Clone, FromRow)]
pub struct UserProjectWithNames {
    #[sqlx(flatten)]
    pub project: UserProject,
    pub amir_first_name: Option<String>,
    pub amir_last_name: Option<String>,
}

/// DTO for inserting a user project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserProject {
    pub project_type: Option<String>,
    pub project_type_custom: Option<String>,
    pub role: Option<String>,
    pub amir_user_id: Option<DbId>,
    pub amir_custom_name: Option<String>,
    pub start_month: Option<i32>,
    pub start_year: Option<i32>,
    pub end_month: Option<i32>,
    pub end_year: Option<i32>,
    pub is_current: bool,
    pub description: Option<String>,
}

impl From<&ProjectEntry> for CreateUserProject {
    fn from(entry: &ProjectEntry) -> Self {
        let (project_type, project_type_custom) = entry
            .project_type
            .clone()
            .map(Designation::into_columns)
            .unwrap_or((None, None));
        let (amir_user_id, amir_custom_name) =
            entry.amir.clone().map(Designation::into_columns).unwrap_or((None, None));
        let tenure = &entry.tenure;
        let (end_month, end_year) = if tenure.is_current {
            (None, None)
        } else {
            (tenure.end_month, tenure.end_year)
        };
        Self {
            project_type,
            project_type_custom,
            role: entry.role.clone(),
            amir_user_id,
            amir_custom_name,
            start_month: tenure.start_month.and_then(|m| i32::try_from(m).ok()),
            start_year: tenure.start_year,
            end_month: end_month.and_then(|m| i32::try_from(m).ok()),
            end_year,
            is_current: tenure.is_current,
            description: entry.description.clone(),
        }
    }
}
