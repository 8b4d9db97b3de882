//! Admin registration, role gating and user management, end to end.

#![allow(clippy::unwrap_used)]

use ridgeline_client::{AdminRegistration, NewUser, UserUpdate};
use ridgeline_core::UserRole;
use ridgeline_integration_tests::TestPortal;

fn registration(email: &str) -> AdminRegistration {
    AdminRegistration {
        email: email.to_string(),
        password: "correct-horse".to_string(),
        full_name: "Admin".to_string(),
    }
}

#[tokio::test]
async fn test_first_admin_bootstrap_and_role_gating() {
    let portal = TestPortal::spawn().await;

    let first = portal.admin_client();
    first.register(&registration("first@fund.com")).await.unwrap();
    assert_eq!(first.me().await.unwrap().role, UserRole::SuperAdmin);

    let second = portal.admin_client();
    second.register(&registration("second@fund.com")).await.unwrap();
    assert_eq!(second.me().await.unwrap().role, UserRole::Admin);

    // A plain admin cannot manage users; a super admin can.
    let new_user = NewUser {
        email: "lp@fund.com".to_string(),
        full_name: "Limited Partner".to_string(),
        role: UserRole::User,
        permission_level_id: None,
        expires_at: None,
    };
    let err = second.create_user(&new_user).await.unwrap_err();
    assert_eq!(err.status(), 403);
    assert_eq!(err.to_string(), "Super admin access required");

    let created = first.create_user(&new_user).await.unwrap();
    assert_eq!(created.role, UserRole::User);
    assert_eq!(first.users().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_password_login_and_separate_sessions() {
    let portal = TestPortal::spawn().await;

    let admin = portal.admin_client();
    admin.register(&registration("admin@fund.com")).await.unwrap();

    // A second client logs into the same account independently.
    let other = portal.admin_client();
    other.login("admin@fund.com", "correct-horse").await.unwrap();
    assert_eq!(other.me().await.unwrap().email.as_str(), "admin@fund.com");

    let err = portal
        .admin_client()
        .login("admin@fund.com", "wrong-horse")
        .await
        .unwrap_err();
    assert_eq!(err.status(), 401);
}

#[tokio::test]
async fn test_deactivation_kills_live_tokens() {
    let portal = TestPortal::spawn().await;
    portal.seed_investor("lp@fund.com", "Limited Partner");

    let admin = portal.admin_client();
    admin.register(&registration("root@fund.com")).await.unwrap();

    let session = portal.signed_in_session("lp@fund.com").await;
    let investor_id = session.client().me().await.unwrap().id;

    admin.deactivate_user(investor_id).await.unwrap();

    // The investor's token stops resolving mid-session.
    let err = session.client().me().await.unwrap_err();
    assert_eq!(err.status(), 401);

    // Reactivation restores the account but not the dead session.
    let user = admin.activate_user(investor_id).await.unwrap();
    assert!(user.is_active);
    let err = session.client().me().await.unwrap_err();
    assert_eq!(err.status(), 401);
}

#[tokio::test]
async fn test_user_update_assigns_and_clears_levels() {
    let portal = TestPortal::spawn().await;

    let admin = portal.admin_client();
    admin.register(&registration("root@fund.com")).await.unwrap();

    let level = admin
        .create_permission_level(&ridgeline_client::PermissionLevelForm {
            name: "View Only".to_string(),
            description: "Read the room".to_string(),
            can_view: true,
            can_download: false,
            has_expiry: false,
            max_downloads: None,
        })
        .await
        .unwrap();

    let user = admin
        .create_user(&NewUser {
            email: "lp@fund.com".to_string(),
            full_name: "Limited Partner".to_string(),
            role: UserRole::User,
            permission_level_id: None,
            expires_at: None,
        })
        .await
        .unwrap();

    let updated = admin
        .update_user(
            user.id,
            &UserUpdate {
                permission_level_id: Some(Some(level.id)),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.permission_level_id, Some(level.id));

    // While referenced, the level cannot be deleted.
    let err = admin.delete_permission_level(level.id).await.unwrap_err();
    assert_eq!(err.status(), 409);

    // An explicit null clears the assignment; deletion then succeeds.
    let cleared = admin
        .update_user(
            user.id,
            &UserUpdate {
                permission_level_id: Some(None),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.permission_level_id, None);
    admin.delete_permission_level(level.id).await.unwrap();
}

#[tokio::test]
async fn test_profile_and_password_rotation() {
    let portal = TestPortal::spawn().await;

    let admin = portal.admin_client();
    admin.register(&registration("admin@fund.com")).await.unwrap();

    let renamed = admin.update_profile("Renamed Admin").await.unwrap();
    assert_eq!(renamed.full_name, "Renamed Admin");

    admin
        .change_password("correct-horse", "battery-staple")
        .await
        .unwrap();

    let fresh = portal.admin_client();
    fresh.login("admin@fund.com", "battery-staple").await.unwrap();
    let err = portal
        .admin_client()
        .login("admin@fund.com", "correct-horse")
        .await
        .unwrap_err();
    assert_eq!(err.status(), 401);
}
