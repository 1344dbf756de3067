//! Read-model assembly: joins repository rows into the `ym-core` views the
//! directory, profile viewer and home page consume.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;
use ym_core::directory::{years_in_ym, NamedRef, PersonListItem, RoleLabel};
use ym_core::member::{join_name, role_display_name, PersonProfile, ProfileProject, ProfileRole, UserContext};
use ym_core::types::{AuthId, DbId};

use crate::models::directory::MembershipGeography;
use crate::models::role_assignment::ActiveRole;
use crate::repositories::{
    DirectoryRepo, MembershipRepo, RoleAssignmentRepo, UserProjectRepo, UserRepo,
};

fn role_label(role: &ActiveRole) -> RoleLabel {
    RoleLabel {
        id: role.role_type_id,
        name: role_display_name(role.role_type_name.as_deref(), role.role_type_custom.as_deref()),
        category: role.role_type_category.clone(),
    }
}

/// Snapshot of every member for the directory, claimed members first.
pub async fn load_directory(pool: &PgPool, today: NaiveDate) -> Result<Vec<PersonListItem>, sqlx::Error> {
    let users = DirectoryRepo::list_users(pool).await?;
    let geography: HashMap<DbId, MembershipGeography> = MembershipRepo::list_active_geography(pool)
        .await?
        .into_iter()
        .map(|g| (g.user_id, g))
        .collect();

    let mut roles: HashMap<DbId, Vec<RoleLabel>> = HashMap::new();
    for role in RoleAssignmentRepo::list_active(pool, None).await? {
        roles.entry(role.user_id).or_default().push(role_label(&role));
    }

    let items: Vec<PersonListItem> = users
        .into_iter()
        .map(|user| {
            let geo = geography.get(&user.id);
            PersonListItem {
                id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                avatar_url: user.avatar_url,
                region: geo.and_then(|g| {
                    Some(NamedRef {
                        id: g.region_id?,
                        name: g.region_name.clone()?,
                    })
                }),
                subregion: geo.map(|g| NamedRef {
                    id: g.subregion_id,
                    name: g.subregion_name.clone(),
                }),
                neighbor_net: geo.map(|g| NamedRef {
                    id: g.neighbor_net_id,
                    name: g.neighbor_net_name.clone(),
                }),
                roles: roles.remove(&user.id).unwrap_or_default(),
                skills: user.skills,
                years_in_ym: geo.map(|g| years_in_ym(g.joined_at, today)),
                is_claimed: user.claimed_at.is_some(),
            }
        })
        .collect();

    tracing::debug!(count = items.len(), "Directory snapshot loaded");
    Ok(items)
}

/// Read-only profile for one member, or `None` if no such member exists.
pub async fn load_profile(pool: &PgPool, id: DbId) -> Result<Option<PersonProfile>, sqlx::Error> {
    let Some(user) = UserRepo::find_by_id(pool, id).await? else {
        return Ok(None);
    };

    let location = MembershipRepo::find_active_location(pool, id).await?;
    let roles = RoleAssignmentRepo::list_for_user_with_names(pool, id)
        .await?
        .into_iter()
        .map(|row| ProfileRole {
            amir_name: join_name(row.amir_first_name.as_deref(), row.amir_last_name.as_deref()),
            role_name: row.role_type_name,
            entry: row.assignment.into_entry(),
        })
        .collect();
    let projects = UserProjectRepo::list_for_user_with_names(pool, id)
        .await?
        .into_iter()
        .map(|row| ProfileProject {
            amir_name: join_name(row.amir_first_name.as_deref(), row.amir_last_name.as_deref()),
            entry: row.project.into_entry(),
        })
        .collect();

    let education = user.education_entries();
    Ok(Some(PersonProfile {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        avatar_url: user.avatar_url,
        phone: user.phone,
        personal_email: user.personal_email,
        ethnicity: user.ethnicity,
        date_of_birth: user.date_of_birth,
        subregion_id: location.as_ref().map(|l| l.subregion_id),
        neighbor_net_id: location.as_ref().map(|l| l.neighbor_net_id),
        roles,
        projects,
        education_level: user.education_level,
        education,
        skills: user.skills,
    }))
}

/// Home page card for the signed-in member.
pub async fn load_user_context(pool: &PgPool, auth_id: AuthId) -> Result<Option<UserContext>, sqlx::Error> {
    let Some(user) = UserRepo::find_by_auth_id(pool, auth_id).await? else {
        return Ok(None);
    };

    let roles = RoleAssignmentRepo::list_active(pool, Some(user.id))
        .await?
        .iter()
        .map(|r| role_display_name(r.role_type_name.as_deref(), r.role_type_custom.as_deref()))
        .collect();
    let geography = MembershipRepo::find_active_geography(pool, user.id).await?;

    Ok(Some(UserContext::new(
        user.first_name.as_deref(),
        user.last_name.as_deref(),
        roles,
        geography.as_ref().map(|g| g.neighbor_net_name.clone()),
        geography.map(|g| g.subregion_name),
    )))
}
