//! Role assignment entity model and DTOs.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use ym_core::onboarding::record::{Designation, RoleEntry, Tenure};
use ym_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleAssignment {
    pub id: DbId,
    pub user_id: DbId,
    pub role_type_id: Option<DbId>,
    pub role_type_custom: Option<String>,
    pub amir_user_id: Option<DbId>,
    pub amir_custom_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RoleAssignment {
    pub fn into_entry(self) -> RoleEntry {
        RoleEntry {
            id: self.id.to_string(),
            role: Designation::from_columns(self.role_type_id, self.role_type_custom),
            amir: Designation::from_columns(self.amir_user_id, self.amir_custom_name),
            tenure: Tenure::from_dates(self.start_date, self.end_date, self.is_active),
            description: self.notes,
        }
    }
}

/// Role assignment joined with the names the profile viewer shows.
#[derive(Debug, Clone, FromRow)]
pub struct RoleAssignmentWithNames {
    #[sqlx(flatten)]
    pub assignment: RoleAssignment,
    pub role_type_name: Option<String>,
    pub amir_first_name: Option<String>,
    pub amir_last_name: Option<String>,
}

/// Active role joined with its role type, for directory and home listings.
#[derive(Debug, Clone, FromRow)]
pub struct ActiveRole {
    pub user_id: DbId,
    pub role_type_id: Option<DbId>,
    pub role_type_name: Option<String>,
    pub role_type_category: Option<String>,
    pub role_type_custom: Option<String>,
}

/// DTO for inserting a role assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleAssignment {
    pub role_type_id: Option<DbId>,
    pub role_type_custom: Option<String>,
    pub amir_user_id: Option<DbId>,
    pub amir_custom_name: Option<String>,
    /// First day of the start month.
    pub start_date: Option<NaiveDate>,
    /// First day of the end month; always `None` for current roles.
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub notes: Option<String>,
}

impl From<&RoleEntry> for CreateRoleAssignment {
    fn from(entry: &RoleEntry) -> Self {
        let (role_type_id, role_type_custom) =
            entry.role.clone().map(Designation::into_columns).unwrap_or((None, None));
        let (amir_user_id, amir_custom_name) =
            entry.amir.clone().map(Designation::into_columns).unwrap_or((None, None));
        Self {
            role_type_id,
            role_type_custom,
            amir_user_id,
            amir_custom_name,
            start_date: entry.tenure.start_date(),
            end_date: entry.tenure.end_date(),
            is_active: entry.tenure.is_current,
            notes: entry.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_role_drops_end_date() {
        let entry = RoleEntry {
            role: Some(Designation::Existing(3)),
            amir: Some(Designation::Custom("Br. Khalid".into())),
            tenure: Tenure {
                start_month: Some(9),
                start_year: Some(2022),
                end_month: Some(1),
                end_year: Some(2023),
                is_current: true,
            },
            ..RoleEntry::empty()
        };
        let row = CreateRoleAssignment::from(&entry);
        assert_eq!(row.role_type_id, Some(3));
        assert_eq!(row.amir_custom_name.as_deref(), Some("Br. Khalid"));
        assert_eq!(row.start_date, NaiveDate::from_ymd_opt(2022, 9, 1));
        assert_eq!(row.end_date, None);
        assert!(row.is_active);
    }
}
