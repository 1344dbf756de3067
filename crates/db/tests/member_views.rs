//! Integration tests for the directory snapshot, profile and home context.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use ym_db::models::role_assignment::CreateRoleAssignment;
use ym_db::models::user::ClaimUser;
use ym_db::repositories::{MembershipRepo, RoleAssignmentRepo, UserRepo};
use ym_db::views::{load_directory, load_profile, load_user_context};

async fn seed_member(pool: &PgPool) -> (Uuid, i64, i64) {
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
    let (net_id,): (i64,) = sqlx::query_as(
        "INSERT INTO neighbor_nets (subregion_id, name) VALUES ($1, 'Newark') RETURNING id",
    )
    .bind(subregion_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let (role_type_id,): (i64,) = sqlx::query_as(
        "INSERT INTO role_types (name, category) VALUES ('Amir', 'leadership') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    let auth_id = Uuid::new_v4();
    let user = UserRepo::claim(
        pool,
        &ClaimUser {
            auth_id,
            email: "amina@youngmuslims.com".into(),
            first_name: Some("Amina".into()),
            last_name: Some("Yusuf".into()),
        },
    )
    .await
    .unwrap();
    UserRepo::mark_onboarding_complete(pool, user.id).await.unwrap();
    MembershipRepo::replace_active(pool, user.id, net_id).await.unwrap();
    RoleAssignmentRepo::replace_for_user(
        pool,
        user.id,
        &[
            CreateRoleAssignment {
                role_type_id: Some(role_type_id),
                role_type_custom: None,
                amir_user_id: None,
                amir_custom_name: None,
                start_date: NaiveDate::from_ymd_opt(2022, 9, 1),
                end_date: None,
                is_active: true,
                notes: None,
            },
            CreateRoleAssignment {
                role_type_id: None,
                role_type_custom: Some("Camp counselor".into()),
                amir_user_id: None,
                amir_custom_name: None,
                start_date: NaiveDate::from_ymd_opt(2021, 6, 1),
                end_date: None,
                is_active: true,
                notes: None,
            },
        ],
    )
    .await
    .unwrap();

    (auth_id, user.id, role_type_id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn directory_lists_claimed_members_first(pool: PgPool) {
    sqlx::query("INSERT INTO users (email) VALUES ('zaid@youngmuslims.com')")
        .execute(&pool)
        .await
        .unwrap();
    let (_, user_id, role_type_id) = seed_member(&pool).await;

    let today = chrono::Utc::now().date_naive();
    let people = load_directory(&pool, today).await.unwrap();
    assert_eq!(people.len(), 2);

    let amina = &people[0];
    assert_eq!(amina.id, user_id);
    assert!(amina.is_claimed);
    assert_eq!(amina.region.as_ref().map(|r| r.name.as_str()), Some("Northeast"));
    assert_eq!(amina.neighbor_net.as_ref().map(|n| n.name.as_str()), Some("Newark"));
    assert_eq!(amina.years_in_ym, Some(0));
    assert_eq!(amina.roles.len(), 2);
    assert!(amina.roles.iter().any(|r| r.id == Some(role_type_id) && r.name == "Amir"));
    assert!(amina.roles.iter().any(|r| r.id.is_none() && r.name == "Camp counselor"));

    let unclaimed = &people[1];
    assert!(!unclaimed.is_claimed);
    assert!(unclaimed.region.is_none());
    assert!(unclaimed.roles.is_empty());
    assert_eq!(unclaimed.years_in_ym, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_resolves_role_names(pool: PgPool) {
    let (_, user_id, _) = seed_member(&pool).await;

    let profile = load_profile(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(profile.email, "amina@youngmuslims.com");
    assert!(profile.neighbor_net_id.is_some());
    assert_eq!(profile.roles.len(), 2);
    assert_eq!(profile.roles[0].role_name.as_deref(), Some("Amir"));
    assert_eq!(profile.roles[1].role_name, None);

    assert!(load_profile(&pool, user_id + 1000).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_context_summarizes_member(pool: PgPool) {
    let (auth_id, _, _) = seed_member(&pool).await;

    let context = load_user_context(&pool, auth_id).await.unwrap().unwrap();
    assert_eq!(context.name, "Amina Yusuf");
    assert_eq!(context.roles, vec!["Amir".to_string(), "Camp counselor".to_string()]);
    assert_eq!(context.neighbor_net_name.as_deref(), Some("Newark"));
    assert_eq!(context.subregion_name.as_deref(), Some("New Jersey"));

    assert!(load_user_context(&pool, Uuid::new_v4()).await.unwrap().is_none());
}
