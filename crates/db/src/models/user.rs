//! Member entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use ym_core::onboarding::record::{new_entry_id, Designation, EducationEntry};
use ym_core::types::{DbId, Timestamp};

/// Full row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub auth_id: Option<Uuid>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub personal_email: Option<String>,
    pub ethnicity: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub education_level: Option<String>,
    /// JSONB array of [`EducationJson`].
    pub education: serde_json::Value,
    pub skills: Vec<String>,
    pub claimed_at: Option<Timestamp>,
    pub onboarding_completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Decode the education column, dropping entries with no data.
    pub fn education_entries(&self) -> Vec<EducationEntry> {
        serde_json::from_value::<Vec<EducationJson>>(self.education.clone())
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = self.id, error = %e, "Unreadable education column");
                Vec::new()
            })
            .into_iter()
            .map(EducationEntry::from)
            .filter(|entry| !entry.is_blank())
            .collect()
    }
}

/// DTO for linking an identity to a member row on first sign-in.
#[derive(Debug, Deserialize)]
pub struct ClaimUser {
    pub auth_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// DTO for the personal-info step.
#[derive(Debug, Deserialize)]
pub struct UpdatePersonalInfo {
    pub phone: Option<String>,
    pub personal_email: Option<String>,
    pub ethnicity: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Stored shape of one education entry inside `users.education`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_custom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<i32>,
}

impl From<&EducationEntry> for EducationJson {
    fn from(entry: &EducationEntry) -> Self {
        let (school_name, school_custom) = entry
            .school
            .clone()
            .map(Designation::into_columns)
            .unwrap_or((None, None));
        Self {
            id: Some(entry.id.clone()),
            school_name,
            school_custom,
            degree_type: entry.degree_type.clone(),
            field_of_study: entry.field_of_study.clone(),
            graduation_year: entry.graduation_year,
        }
    }
}

impl From<EducationJson> for EducationEntry {
    fn from(json: EducationJson) -> Self {
        Self {
            id: json.id.unwrap_or_else(new_entry_id),
            school: Designation::from_columns(json.school_name, json.school_custom),
            degree_type: json.degree_type,
            field_of_study: json.field_of_study,
            graduation_year: json.graduation_year,
        }
    }
}

/// Encode entries for the `users.education` column.
pub fn education_to_json(entries: &[EducationEntry]) -> serde_json::Value {
    let rows: Vec<EducationJson> = entries.iter().map(EducationJson::from).collect();
    serde_json::to_value(rows).unwrap_or_else(|_| serde_json::Value::Array(Vec::new()))
}
