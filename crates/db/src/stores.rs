//! PostgreSQL implementations of the `ym-core` persistence traits.

use async_trait::async_trait;
use sqlx::PgPool;
use ym_core::contact::format_phone_number;
use ym_core::onboarding::record::{distinct_skills, OnboardingRecord};
use ym_core::onboarding::store::{OnboardingStore, StepPayload};
use ym_core::reference::{NeighborNet, ReferenceSource, RoleType, Subregion, UserOption};
use ym_core::types::{AuthId, DbId, Timestamp};

use crate::models::role_assignment::{CreateRoleAssignment, RoleAssignment};
use crate::models::user::{education_to_json, UpdatePersonalInfo};
use crate::models::user_project::{CreateUserProject, UserProject};
use crate::repositories::{
    MembershipRepo, ReferenceRepo, RoleAssignmentRepo, UserProjectRepo, UserRepo,
};

const USER_NOT_FOUND: &str = "User not found";

fn db_error(context: &str, err: sqlx::Error) -> String {
    tracing::error!(error = %err, "{context}");
    format!("{context}: {err}")
}

// ---------------------------------------------------------------------------
// Onboarding store
// ---------------------------------------------------------------------------

/// Writes each onboarding step to its own tables.
#[derive(Clone)]
pub struct PgOnboardingStore {
    pool: PgPool,
}

impl PgOnboardingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn resolve_user_id(&self, auth_id: AuthId, cached: Option<DbId>) -> Result<DbId, String> {
        if let Some(id) = cached {
            return Ok(id);
        }
        UserRepo::find_id_by_auth_id(&self.pool, auth_id)
            .await
            .map_err(|e| db_error("Failed to look up user", e))?
            .ok_or_else(|| USER_NOT_FOUND.to_string())
    }
}

#[async_trait]
impl OnboardingStore for PgOnboardingStore {
    async fn save_step(
        &self,
        auth_id: AuthId,
        payload: &StepPayload,
        cached_user_id: Option<DbId>,
    ) -> Result<DbId, String> {
        let user_id = self.resolve_user_id(auth_id, cached_user_id).await?;
        let pool = &self.pool;

        match payload {
            StepPayload::PersonalInfo {
                phone,
                personal_email,
                ethnicity,
                date_of_birth,
            } => {
                let input = UpdatePersonalInfo {
                    phone: phone
                        .as_deref()
                        .map(format_phone_number)
                        .filter(|p| !p.is_empty()),
                    personal_email: personal_email.clone(),
                    ethnicity: ethnicity.clone(),
                    date_of_birth: *date_of_birth,
                };
                UserRepo::update_personal_info(pool, user_id, &input)
                    .await
                    .map_err(|e| db_error("Failed to update profile", e))?;
            }
            StepPayload::Location {
                neighbor_net_id, ..
            } => {
                if let Some(neighbor_net_id) = neighbor_net_id {
                    MembershipRepo::replace_active(pool, user_id, *neighbor_net_id)
                        .await
                        .map_err(|e| db_error("Failed to save membership", e))?;
                }
            }
            StepPayload::Roles { ym_roles } => {
                let rows: Vec<CreateRoleAssignment> = ym_roles.iter().map(Into::into).collect();
                RoleAssignmentRepo::replace_for_user(pool, user_id, &rows)
                    .await
                    .map_err(|e| db_error("Failed to save roles", e))?;
            }
            StepPayload::Projects { ym_projects } => {
                let rows: Vec<CreateUserProject> = ym_projects.iter().map(Into::into).collect();
                UserProjectRepo::replace_for_user(pool, user_id, &rows)
                    .await
                    .map_err(|e| db_error("Failed to save projects", e))?;
            }
            StepPayload::Education {
                education_level,
                education,
            } => {
                UserRepo::update_education(
                    pool,
                    user_id,
                    education_level.as_deref(),
                    &education_to_json(education),
                )
                .await
                .map_err(|e| db_error("Failed to save education", e))?;
            }
            StepPayload::Skills { skills } => {
                UserRepo::update_skills(pool, user_id, &distinct_skills(skills))
                    .await
                    .map_err(|e| db_error("Failed to save skills", e))?;
            }
        }

        tracing::debug!(user_id, step = payload.step().number(), "Onboarding step persisted");
        Ok(user_id)
    }

    async fn complete(&self, auth_id: AuthId, cached_user_id: Option<DbId>) -> Result<Timestamp, String> {
        let user_id = self.resolve_user_id(auth_id, cached_user_id).await?;
        UserRepo::mark_onboarding_complete(&self.pool, user_id)
            .await
            .map_err(|e| db_error("Failed to complete onboarding", e))?
            .ok_or_else(|| USER_NOT_FOUND.to_string())
    }

    async fn load(&self, auth_id: AuthId) -> Result<Option<OnboardingRecord>, String> {
        let pool = &self.pool;
        let Some(user) = UserRepo::find_by_auth_id(pool, auth_id)
            .await
            .map_err(|e| db_error("Failed to load user", e))?
        else {
            return Ok(None);
        };

        let location = MembershipRepo::find_active_location(pool, user.id)
            .await
            .map_err(|e| db_error("Failed to load membership", e))?;
        let roles = RoleAssignmentRepo::list_for_user(pool, user.id)
            .await
            .map_err(|e| db_error("Failed to load roles", e))?;
        let projects = UserProjectRepo::list_for_user(pool, user.id)
            .await
            .map_err(|e| db_error("Failed to load projects", e))?;

        let education = user.education_entries();
        Ok(Some(OnboardingRecord {
            phone: user.phone,
            personal_email: user.personal_email,
            ethnicity: user.ethnicity,
            date_of_birth: user.date_of_birth,
            subregion_id: location.as_ref().map(|l| l.subregion_id),
            neighbor_net_id: location.as_ref().map(|l| l.neighbor_net_id),
            ym_roles: roles.into_iter().map(RoleAssignment::into_entry).collect(),
            ym_projects: projects.into_iter().map(UserProject::into_entry).collect(),
            education_level: user.education_level,
            education,
            skills: user.skills,
            completed_at: user.onboarding_completed_at,
        }))
    }
}

// ---------------------------------------------------------------------------
// Reference source
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgReferenceSource {
    pool: PgPool,
}

impl PgReferenceSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceSource for PgReferenceSource {
    async fn subregions(&self) -> Result<Vec<Subregion>, String> {
        let rows = ReferenceRepo::list_subregions(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load subregions", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn neighbor_nets(&self, subregion_id: Option<DbId>) -> Result<Vec<NeighborNet>, String> {
        let rows = ReferenceRepo::list_neighbor_nets(&self.pool, subregion_id)
            .await
            .map_err(|e| db_error("Failed to load neighbor-nets", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn role_types(&self) -> Result<Vec<RoleType>, String> {
        let rows = ReferenceRepo::list_role_types(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load role types", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn selectable_users(&self) -> Result<Vec<UserOption>, String> {
        let rows = UserRepo::list_selectable(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load users", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
