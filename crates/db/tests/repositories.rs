//! Repository tests against a migrated database.
//!
//! Exercises seed data, unique and foreign-key constraints, partial updates
//! and session bookkeeping.

use sitecrm_db::models::permission::CreatePermission;
use sitecrm_db::models::role::{CreateRole, UpdateRole};
use sitecrm_db::models::session::CreateSession;
use sitecrm_db::models::site::{CreateSite, UpdateSite};
use sitecrm_db::models::user::CreateUser;
use sitecrm_db::repositories::{PermissionRepo, RoleRepo, SessionRepo, SiteRepo, UserRepo};
use sqlx::MySqlPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(username: &str, role_id: i64) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: "$argon2id$placeholder".to_string(),
        role_id,
    }
}

fn new_site(name: &str, credentials: Option<(&str, &str)>) -> CreateSite {
    CreateSite {
        name: name.to_string(),
        url: format!("https://{}.example.com", name.to_lowercase()),
        username: credentials.map(|(u, _)| u.to_string()),
        app_password: credentials.map(|(_, p)| p.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

// ---------------------------------------------------------------------------
// Schema and seed data
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn migrations_seed_roles_and_permissions(pool: MySqlPool) {
    sitecrm_db::health_check(&pool).await.unwrap();

    let roles: Vec<String> = RoleRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(roles, ["admin", "manager", "sales_person", "seo_person", "client"]);

    let admin = PermissionRepo::list_for_role(&pool, 1).await.unwrap();
    assert_eq!(admin.len(), sitecrm_core::permissions::ALL.len());

    for name in sitecrm_core::permissions::ALL {
        let found = PermissionRepo::list(&pool)
            .await
            .unwrap()
            .into_iter()
            .any(|p| p.name == name);
        assert!(found, "permission {name} should be seeded");
    }

    let client: Vec<String> = PermissionRepo::list_for_role(&pool, 5)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(client, ["leads.read"]);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn user_create_find_and_count(pool: MySqlPool) {
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);

    let user = UserRepo::create(&pool, &new_user("alice", 3)).await.unwrap();
    assert!(user.is_active);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);

    let by_name = UserRepo::find_by_username(&pool, "alice").await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);
    assert_eq!(
        UserRepo::role_name(&pool, user.id).await.unwrap().as_deref(),
        Some("sales_person")
    );

    assert!(UserRepo::find_by_id(&pool, user.id + 1).await.unwrap().is_none());
    assert!(UserRepo::role_name(&pool, user.id + 1).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn user_constraints(pool: MySqlPool) {
    UserRepo::create(&pool, &new_user("alice", 3)).await.unwrap();

    let err = UserRepo::create(&pool, &new_user("alice", 3)).await.unwrap_err();
    assert!(is_unique_violation(&err));

    let err = UserRepo::create(&pool, &new_user("bob", 99)).await.unwrap_err();
    assert!(is_foreign_key_violation(&err));
}

// ---------------------------------------------------------------------------
// Roles and permissions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn role_update_and_lookup(pool: MySqlPool) {
    let role = RoleRepo::create(
        &pool,
        &CreateRole {
            name: "auditor".into(),
            description: Some("Reads everything".into()),
        },
    )
    .await
    .unwrap();

    let updated = RoleRepo::update(
        &pool,
        role.id,
        &UpdateRole {
            name: None,
            description: Some("Reads leads".into()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "auditor");
    assert_eq!(updated.description.as_deref(), Some("Reads leads"));

    let found = RoleRepo::find_by_name(&pool, "auditor").await.unwrap().unwrap();
    assert_eq!(found.id, role.id);
    assert_eq!(RoleRepo::resolve_name(&pool, role.id).await.unwrap(), "auditor");
    assert_eq!(RoleRepo::resolve_name(&pool, 9999).await.unwrap(), "unknown");

    let missing = UpdateRole {
        name: Some("x".into()),
        description: None,
    };
    assert!(RoleRepo::update(&pool, 9999, &missing).await.unwrap().is_none());

    assert!(RoleRepo::delete(&pool, role.id).await.unwrap());
    assert!(!RoleRepo::delete(&pool, role.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn role_with_users_cannot_be_deleted(pool: MySqlPool) {
    UserRepo::create(&pool, &new_user("alice", 2)).await.unwrap();

    let err = RoleRepo::delete(&pool, 2).await.unwrap_err();
    assert!(is_foreign_key_violation(&err));
}

#[sqlx::test(migrations = "./migrations")]
async fn set_for_role_replaces_grants_and_names_follow(pool: MySqlPool) {
    let user = UserRepo::create(&pool, &new_user("alice", 2)).await.unwrap();
    let custom = PermissionRepo::create(
        &pool,
        &CreatePermission {
            name: "reports.read".into(),
            description: None,
        },
    )
    .await
    .unwrap();

    PermissionRepo::set_for_role(&pool, 2, &[custom.id]).await.unwrap();
    assert_eq!(
        PermissionRepo::names_for_user(&pool, user.id).await.unwrap(),
        ["reports.read"]
    );

    assert!(PermissionRepo::delete(&pool, custom.id).await.unwrap());
    assert!(PermissionRepo::list_for_role(&pool, 2).await.unwrap().is_empty());
    assert!(PermissionRepo::names_for_user(&pool, user.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn set_for_role_is_atomic(pool: MySqlPool) {
    let before = PermissionRepo::list_for_role(&pool, 2).await.unwrap();

    let err = PermissionRepo::set_for_role(&pool, 2, &[9999]).await.unwrap_err();
    assert!(is_foreign_key_violation(&err));

    let after = PermissionRepo::list_for_role(&pool, 2).await.unwrap();
    assert_eq!(before.len(), after.len());
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn session_lifecycle(pool: MySqlPool) {
    let user = UserRepo::create(&pool, &new_user("alice", 3)).await.unwrap();
    let session = |hash: &str| CreateSession {
        user_id: user.id,
        token_hash: hash.repeat(64),
    };

    SessionRepo::create(&pool, &session("a")).await.unwrap();
    SessionRepo::create(&pool, &session("b")).await.unwrap();
    SessionRepo::create(&pool, &session("c")).await.unwrap();

    let a = "a".repeat(64);
    assert!(SessionRepo::is_active(&pool, &a).await.unwrap());
    assert!(!SessionRepo::is_active(&pool, &"z".repeat(64)).await.unwrap());

    assert!(SessionRepo::deactivate(&pool, &a).await.unwrap());
    assert!(!SessionRepo::deactivate(&pool, &a).await.unwrap());
    assert!(!SessionRepo::is_active(&pool, &a).await.unwrap());

    assert_eq!(SessionRepo::deactivate_all_for_user(&pool, user.id).await.unwrap(), 2);
    assert_eq!(SessionRepo::purge_inactive(&pool).await.unwrap(), 3);
}

// ---------------------------------------------------------------------------
// Sites
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn site_partial_update_keeps_unset_fields(pool: MySqlPool) {
    let site = SiteRepo::create(&pool, &new_site("Main", Some(("bot", "secret"))))
        .await
        .unwrap();
    assert!(site.is_active);
    assert!(site.stored_credential().is_some());

    let updated = SiteRepo::update(
        &pool,
        site.id,
        &UpdateSite {
            name: Some("Renamed".into()),
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.url, site.url);
    assert_eq!(updated.username.as_deref(), Some("bot"));
    assert!(!updated.is_active);

    assert!(SiteRepo::update(&pool, 9999, &UpdateSite::default())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn site_clear_credentials_nulls_both_columns(pool: MySqlPool) {
    let site = SiteRepo::create(&pool, &new_site("Main", Some(("bot", "secret"))))
        .await
        .unwrap();

    let cleared = SiteRepo::update(
        &pool,
        site.id,
        &UpdateSite {
            clear_credentials: true,
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(cleared.username.is_none());
    assert!(cleared.app_password.is_none());
    assert!(cleared.stored_credential().is_none());
    assert_eq!(cleared.name, "Main");

    let restored = SiteRepo::update(
        &pool,
        site.id,
        &UpdateSite {
            username: Some("bot2".into()),
            app_password: Some("secret2".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(restored.username.as_deref(), Some("bot2"));
}

#[sqlx::test(migrations = "./migrations")]
async fn site_list_is_ordered_by_name_and_delete_reports_rows(pool: MySqlPool) {
    let zeta = SiteRepo::create(&pool, &new_site("Zeta", None)).await.unwrap();
    SiteRepo::create(&pool, &new_site("Alpha", None)).await.unwrap();

    let names: Vec<String> = SiteRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, ["Alpha", "Zeta"]);

    assert!(SiteRepo::delete(&pool, zeta.id).await.unwrap());
    assert!(!SiteRepo::delete(&pool, zeta.id).await.unwrap());
    assert!(SiteRepo::find_by_id(&pool, zeta.id).await.unwrap().is_none());
}
