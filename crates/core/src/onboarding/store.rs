//! Persistence boundary for onboarding data.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::onboarding::record::{EducationEntry, OnboardingRecord, ProjectEntry, RoleEntry};
use crate::onboarding::steps::Step;
use crate::types::{AuthId, DbId, Timestamp};

/// The slice of the record a single step persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepPayload {
    PersonalInfo {
        phone: Option<String>,
        personal_email: Option<String>,
        ethnicity: Option<String>,
        date_of_birth: Option<NaiveDate>,
    },
    Location {
        subregion_id: Option<DbId>,
        neighbor_net_id: Option<DbId>,
    },
    Roles {
        ym_roles: Vec<RoleEntry>,
    },
    Projects {
        ym_projects: Vec<ProjectEntry>,
    },
    Education {
        education_level: Option<String>,
        education: Vec<EducationEntry>,
    },
    Skills {
        skills: Vec<String>,
    },
}

impl StepPayload {
    /// Extract the slice owned by `step`. The terminal step owns nothing.
    pub fn from_record(step: Step, record: &OnboardingRecord) -> Option<Self> {
        let payload = match step {
            Step::PersonalInfo => Self::PersonalInfo {
                phone: record.phone.clone(),
                personal_email: record.personal_email.clone(),
                ethnicity: record.ethnicity.clone(),
                date_of_birth: record.date_of_birth,
            },
            Step::Location => Self::Location {
                subregion_id: record.subregion_id,
                neighbor_net_id: record.neighbor_net_id,
            },
            Step::Roles => Self::Roles {
                ym_roles: record.ym_roles.clone(),
            },
            Step::Projects => Self::Projects {
                ym_projects: record.ym_projects.clone(),
            },
            Step::Education => Self::Education {
                education_level: record.education_level.clone(),
                education: record.education.clone(),
            },
            Step::Skills => Self::Skills {
                skills: record.skills.clone(),
            },
            Step::Complete => return None,
        };
        Some(payload)
    }

    pub fn step(&self) -> Step {
        match self {
            Self::PersonalInfo { .. } => Step::PersonalInfo,
            Self::Location { .. } => Step::Location,
            Self::Roles { .. } => Step::Roles,
            Self::Projects { .. } => Step::Projects,
            Self::Education { .. } => Step::Education,
            Self::Skills { .. } => Step::Skills,
        }
    }
}

/// Where onboarding data is written and read back.
///
/// `cached_user_id` is the internal id returned by an earlier successful
/// save in the same session; implementations may use it to skip the
/// `auth_id` lookup. Errors are plain strings shown to the member as-is.
#[async_trait]
pub trait OnboardingStore: Send + Sync {
    /// Persist one step's slice. Returns the member's internal id.
    async fn save_step(
        &self,
        auth_id: AuthId,
        payload: &StepPayload,
        cached_user_id: Option<DbId>,
    ) -> Result<DbId, String>;

    /// Stamp the completion timestamp.
    async fn complete(&self, auth_id: AuthId, cached_user_id: Option<DbId>)
        -> Result<Timestamp, String>;

    /// Previously flushed onboarding data, or `None` for an unknown member.
    async fn load(&self, auth_id: AuthId) -> Result<Option<OnboardingRecord>, String>;
}
