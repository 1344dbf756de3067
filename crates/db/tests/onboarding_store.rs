//! Integration tests for the Postgres onboarding store.
//!
//! Exercises each step's write path and checks that everything written
//! reloads into the same record:
//! - Member claim (new row, pre-imported row, re-linked subject)
//! - Personal info, roles, projects, education, skills
//! - Membership replacement
//! - Completion

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use ym_core::onboarding::record::{Designation, EducationEntry, ProjectEntry, RoleEntry, Tenure};
use ym_core::onboarding::store::{OnboardingStore, StepPayload};
use ym_db::models::user::ClaimUser;
use ym_db::repositories::{MembershipRepo, UserRepo};
use ym_db::stores::PgOnboardingStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn claim(pool: &PgPool, email: &str) -> (Uuid, i64) {
    let auth_id = Uuid::new_v4();
    let user = UserRepo::claim(
        pool,
        &ClaimUser {
            auth_id,
            email: email.to_string(),
            first_name: Some("Amina".to_string()),
            last_name: Some("Yusuf".to_string()),
        },
    )
    .await
    .unwrap();
    (auth_id, user.id)
}

async fn seed_geography(pool: &PgPool) -> (i64, i64, i64) {
    let (region_id,): (i64,) =
        sqlx::query_as("INSERT INTO regions (name) VALUES ('Northeast') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let (subregion_id,): (i64,) = sqlx::query_as(
        "INSERT INTO subregions (region_id, name) VALUES ($1, 'New Jersey') RETURNING id",
    )
    .bind(region_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let (first_net,): (i64,) = sqlx::query_as(
        "INSERT INTO neighbor_nets (subregion_id, name) VALUES ($1, 'Newark') RETURNING id",
    )
    .bind(subregion_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let (second_net,): (i64,) = sqlx::query_as(
        "INSERT INTO neighbor_nets (subregion_id, name) VALUES ($1, 'Paterson') RETURNING id",
    )
    .bind(subregion_id)
    .fetch_one(pool)
    .await
    .unwrap();
    (subregion_id, first_net, second_net)
}

async fn seed_role_type(pool: &PgPool, name: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO role_types (name, category) VALUES ($1, 'leadership') RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

fn tenure(start: (u32, i32), end: Option<(u32, i32)>) -> Tenure {
    Tenure {
        start_month: Some(start.0),
        start_year: Some(start.1),
        end_month: end.map(|e| e.0),
        end_year: end.map(|e| e.1),
        is_current: end.is_none(),
    }
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_links_pre_imported_member(pool: PgPool) {
    sqlx::query("INSERT INTO users (email, first_name) VALUES ('bilal@youngmuslims.com', 'Bilal')")
        .execute(&pool)
        .await
        .unwrap();

    let auth_id = Uuid::new_v4();
    let user = UserRepo::claim(
        &pool,
        &ClaimUser {
            auth_id,
            email: "Bilal@YoungMuslims.com".to_string(),
            first_name: Some("Someone Else".to_string()),
            last_name: Some("Khan".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(user.auth_id, Some(auth_id));
    assert_eq!(user.first_name.as_deref(), Some("Bilal"));
    assert_eq!(user.last_name.as_deref(), Some("Khan"));

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users").fetch_one(&pool).await.unwrap();
    assert_eq!(count.0, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_rebinds_email_to_new_subject(pool: PgPool) {
    let (old_auth_id, user_id) = claim(&pool, "amina@youngmuslims.com").await;
    let (new_auth_id, same_id) = claim(&pool, "amina@youngmuslims.com").await;
    assert_eq!(same_id, user_id);

    let store = PgOnboardingStore::new(pool.clone());
    store
        .save_step(new_auth_id, &StepPayload::Skills { skills: vec!["Design".into()] }, None)
        .await
        .unwrap();
    assert_eq!(store.load(new_auth_id).await.unwrap().unwrap().skills, vec!["Design".to_string()]);

    let err = store
        .save_step(old_auth_id, &StepPayload::Skills { skills: vec![] }, None)
        .await
        .unwrap_err();
    assert_eq!(err, "User not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_moves_subject_to_changed_email(pool: PgPool) {
    let (auth_id, old_row) = claim(&pool, "amina@youngmuslims.com").await;

    let user = UserRepo::claim(
        &pool,
        &ClaimUser {
            auth_id,
            email: "amina.yusuf@youngmuslims.com".to_string(),
            first_name: Some("Amina".to_string()),
            last_name: Some("Yusuf".to_string()),
        },
    )
    .await
    .unwrap();

    assert_ne!(user.id, old_row);
    assert_eq!(user.auth_id, Some(auth_id));
    let old = UserRepo::find_by_id(&pool, old_row).await.unwrap().unwrap();
    assert!(old.auth_id.is_none());
    assert_eq!(UserRepo::find_id_by_auth_id(&pool, auth_id).await.unwrap(), Some(user.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_member_cannot_save(pool: PgPool) {
    let store = PgOnboardingStore::new(pool);
    let err = store
        .save_step(Uuid::new_v4(), &StepPayload::Skills { skills: vec![] }, None)
        .await
        .unwrap_err();
    assert_eq!(err, "User not found");
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn personal_info_and_skills_reload(pool: PgPool) {
    let (auth_id, user_id) = claim(&pool, "amina@youngmuslims.com").await;
    let store = PgOnboardingStore::new(pool.clone());

    let saved_id = store
        .save_step(
            auth_id,
            &StepPayload::PersonalInfo {
                phone: Some("555.123.4567".to_string()),
                personal_email: Some("amina@example.com".to_string()),
                ethnicity: None,
                date_of_birth: NaiveDate::from_ymd_opt(2001, 4, 9),
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(saved_id, user_id);

    store
        .save_step(
            auth_id,
            &StepPayload::Skills {
                skills: vec!["Design".into(), "design ".into(), "Writing".into()],
            },
            Some(user_id),
        )
        .await
        .unwrap();

    let record = store.load(auth_id).await.unwrap().unwrap();
    // Stored in display format whatever the member typed.
    assert_eq!(record.phone.as_deref(), Some("(555) 123-4567"));
    assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(2001, 4, 9));
    assert_eq!(record.skills, vec!["Design".to_string(), "Writing".to_string()]);
    assert!(record.completed_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn phone_without_digits_is_cleared(pool: PgPool) {
    let (auth_id, _) = claim(&pool, "amina@youngmuslims.com").await;
    let store = PgOnboardingStore::new(pool.clone());

    store
        .save_step(
            auth_id,
            &StepPayload::PersonalInfo {
                phone: Some("n/a".to_string()),
                personal_email: None,
                ethnicity: None,
                date_of_birth: None,
            },
            None,
        )
        .await
        .unwrap();

    let record = store.load(auth_id).await.unwrap().unwrap();
    assert!(record.phone.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn roles_projects_and_education_round_trip(pool: PgPool) {
    let (auth_id, user_id) = claim(&pool, "amina@youngmuslims.com").await;
    let (_, amir_id) = claim(&pool, "omar@youngmuslims.com").await;
    let role_type_id = seed_role_type(&pool, "Amir").await;
    let store = PgOnboardingStore::new(pool.clone());

    let roles = vec![
        RoleEntry {
            id: "client-1".into(),
            role: Some(Designation::Existing(role_type_id)),
            amir: Some(Designation::Existing(amir_id)),
            tenure: tenure((9, 2022), None),
            description: Some("Weekly halaqa".into()),
        },
        RoleEntry {
            id: "client-2".into(),
            role: Some(Designation::Custom("Camp counselor".into())),
            amir: Some(Designation::Custom("Br. Hamza".into())),
            tenure: tenure((6, 2019), Some((8, 2020))),
            description: None,
        },
    ];
    let projects = vec![ProjectEntry {
        id: "client-3".into(),
        project_type: Some(Designation::Existing("convention".into())),
        role: Some("Logistics".into()),
        amir: None,
        tenure: tenure((1, 2023), Some((3, 2023))),
        description: None,
    }];
    let education = vec![EducationEntry {
        id: "edu-1".into(),
        school: Some(Designation::Custom("Rutgers".into())),
        degree_type: Some("BS".into()),
        field_of_study: Some("Biology".into()),
        graduation_year: Some(2024),
    }];

    store
        .save_step(auth_id, &StepPayload::Roles { ym_roles: roles.clone() }, Some(user_id))
        .await
        .unwrap();
    store
        .save_step(auth_id, &StepPayload::Projects { ym_projects: projects.clone() }, Some(user_id))
        .await
        .unwrap();
    store
        .save_step(
            auth_id,
            &StepPayload::Education {
                education_level: Some("bachelors".into()),
                education: education.clone(),
            },
            Some(user_id),
        )
        .await
        .unwrap();

    let record = store.load(auth_id).await.unwrap().unwrap();

    assert_eq!(record.ym_roles.len(), 2);
    let current = &record.ym_roles[0];
    assert_eq!(current.role, roles[0].role);
    assert_eq!(current.amir, roles[0].amir);
    assert_eq!(current.tenure, roles[0].tenure);
    assert_eq!(current.description, roles[0].description);
    let past = &record.ym_roles[1];
    assert_eq!(past.role, roles[1].role);
    assert_eq!(past.amir, roles[1].amir);
    assert_eq!(past.tenure, roles[1].tenure);

    assert_eq!(record.ym_projects.len(), 1);
    assert_eq!(record.ym_projects[0].project_type, projects[0].project_type);
    assert_eq!(record.ym_projects[0].role, projects[0].role);
    assert_eq!(record.ym_projects[0].tenure, projects[0].tenure);

    assert_eq!(record.education_level.as_deref(), Some("bachelors"));
    assert_eq!(record.education, education);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn saving_roles_replaces_previous_set(pool: PgPool) {
    let (auth_id, user_id) = claim(&pool, "amina@youngmuslims.com").await;
    let store = PgOnboardingStore::new(pool.clone());
    let role = RoleEntry {
        id: "r".into(),
        role: Some(Designation::Custom("Volunteer".into())),
        amir: None,
        tenure: tenure((1, 2020), None),
        description: None,
    };

    store
        .save_step(auth_id, &StepPayload::Roles { ym_roles: vec![role.clone(), role] }, Some(user_id))
        .await
        .unwrap();
    store
        .save_step(auth_id, &StepPayload::Roles { ym_roles: vec![] }, Some(user_id))
        .await
        .unwrap();

    let record = store.load(auth_id).await.unwrap().unwrap();
    assert!(record.ym_roles.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn location_replaces_active_membership(pool: PgPool) {
    let (auth_id, user_id) = claim(&pool, "amina@youngmuslims.com").await;
    let (subregion_id, first_net, second_net) = seed_geography(&pool).await;
    let store = PgOnboardingStore::new(pool.clone());

    for net in [first_net, second_net] {
        store
            .save_step(
                auth_id,
                &StepPayload::Location {
                    subregion_id: Some(subregion_id),
                    neighbor_net_id: Some(net),
                },
                Some(user_id),
            )
            .await
            .unwrap();
    }

    let location = MembershipRepo::find_active_location(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(location.neighbor_net_id, second_net);
    assert_eq!(location.subregion_id, subregion_id);

    let statuses: Vec<(String,)> =
        sqlx::query_as("SELECT status FROM memberships WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&pool)
            .await
            .unwrap();
    let statuses: Vec<&str> = statuses.iter().map(|(s,)| s.as_str()).collect();
    assert_eq!(statuses, vec!["inactive", "active"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn location_without_neighbor_net_is_a_no_op(pool: PgPool) {
    let (auth_id, user_id) = claim(&pool, "amina@youngmuslims.com").await;
    let store = PgOnboardingStore::new(pool.clone());

    store
        .save_step(
            auth_id,
            &StepPayload::Location {
                subregion_id: None,
                neighbor_net_id: None,
            },
            Some(user_id),
        )
        .await
        .unwrap();

    assert!(MembershipRepo::find_active_location(&pool, user_id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_stamps_completion_and_claim(pool: PgPool) {
    let (auth_id, _) = claim(&pool, "amina@youngmuslims.com").await;
    let store = PgOnboardingStore::new(pool.clone());

    assert_eq!(UserRepo::completion_status(&pool, auth_id).await.unwrap(), Some(None));

    let completed_at = store.complete(auth_id, None).await.unwrap();

    let user = UserRepo::find_by_auth_id(&pool, auth_id).await.unwrap().unwrap();
    assert_eq!(user.onboarding_completed_at, Some(completed_at));
    assert!(user.claimed_at.is_some());
    assert_eq!(
        UserRepo::completion_status(&pool, auth_id).await.unwrap(),
        Some(Some(completed_at))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_status_is_none_without_row(pool: PgPool) {
    assert_eq!(UserRepo::completion_status(&pool, Uuid::new_v4()).await.unwrap(), None);
}
