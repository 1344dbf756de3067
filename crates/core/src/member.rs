//! Read-only member views: the profile viewer and the home-page context card.

use chrono::NaiveDate;
use serde::Serialize;

use crate::onboarding::record::{EducationEntry, ProjectEntry, RoleEntry};
use crate::types::DbId;

/// Shown when a member has no usable name or role label.
pub const FALLBACK_LABEL: &str = "Member";

/// `"First Last"` trimmed, or `None` when both parts are blank.
pub fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let name = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""));
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Role type name, else the custom name, else the fallback label.
pub fn role_display_name(type_name: Option<&str>, custom: Option<&str>) -> String {
    [type_name, custom]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(FALLBACK_LABEL)
        .to_string()
}

/// Summary shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserContext {
    pub name: String,
    pub roles: Vec<String>,
    pub neighbor_net_name: Option<String>,
    pub subregion_name: Option<String>,
}

impl UserContext {
    pub fn new(
        first_name: Option<&str>,
        last_name: Option<&str>,
        roles: Vec<String>,
        neighbor_net_name: Option<String>,
        subregion_name: Option<String>,
    ) -> Self {
        Self {
            name: join_name(first_name, last_name).unwrap_or_else(|| FALLBACK_LABEL.to_string()),
            roles,
            neighbor_net_name,
            subregion_name,
        }
    }
}

/// A role entry with its referenced names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRole {
    #[serde(flatten)]
    pub entry: RoleEntry,
    pub role_name: Option<String>,
    pub amir_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileProject {
    #[serde(flatten)]
    pub entry: ProjectEntry,
    pub amir_name: Option<String>,
}

/// Everything the read-only profile viewer shows for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonProfile {
    pub id: DbId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub personal_email: Option<String>,
    pub ethnicity: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub subregion_id: Option<DbId>,
    pub neighbor_net_id: Option<DbId>,
    pub roles: Vec<ProfileRole>,
    pub projects: Vec<ProfileProject>,
    pub education_level: Option<String>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_falls_back() {
        let ctx = UserContext::new(Some("  "), None, vec![], None, None);
        assert_eq!(ctx.name, "Member");
        let ctx = UserContext::new(Some("Hamza"), None, vec![], None, None);
        assert_eq!(ctx.name, "Hamza");
        let ctx = UserContext::new(Some("Hamza"), Some("Idris"), vec![], None, None);
        assert_eq!(ctx.name, "Hamza Idris");
    }

    #[test]
    fn role_name_precedence() {
        assert_eq!(role_display_name(Some("Amir"), Some("Lead")), "Amir");
        assert_eq!(role_display_name(None, Some("Lead")), "Lead");
        assert_eq!(role_display_name(Some(""), None), "Member");
    }
}
