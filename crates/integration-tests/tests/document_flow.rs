//! Document upload, filtered listing, download logging and deletion.

#![allow(clippy::unwrap_used)]

use ridgeline_client::{AdminClient, AdminRegistration, CategoryForm, DocumentFilter, DocumentUpload};
use ridgeline_core::{CategoryId, DocumentAction};
use ridgeline_integration_tests::TestPortal;

async fn super_admin(portal: &TestPortal) -> AdminClient {
    let admin = portal.admin_client();
    admin
        .register(&AdminRegistration {
            email: "root@fund.com".to_string(),
            password: "correct-horse".to_string(),
            full_name: "Root".to_string(),
        })
        .await
        .unwrap();
    admin
}

async fn seed_room(admin: &AdminClient) -> (CategoryId, ridgeline_core::Document) {
    let category = admin
        .create_category(&CategoryForm {
            name: "Financials".to_string(),
            parent_id: None,
            sort_order: 0,
        })
        .await
        .unwrap();

    let document = admin
        .upload_document(DocumentUpload {
            title: "Q3 Financial Statements".to_string(),
            description: Some("Unaudited quarterly results".to_string()),
            category_id: category.id,
            tags: vec!["financials".to_string(), "quarterly".to_string()],
            file_name: "q3.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4 fake quarterly".to_vec(),
        })
        .await
        .unwrap();
    (category.id, document)
}

#[tokio::test]
async fn test_upload_then_investor_listing_and_search() {
    let portal = TestPortal::spawn().await;
    let admin = super_admin(&portal).await;
    let (category_id, document) = seed_room(&admin).await;

    portal.seed_investor("lp@fund.com", "Limited Partner");
    let mut session = portal.signed_in_session("lp@fund.com").await;
    session.accept_nda("Limited Partner", true).await.unwrap();
    let client = session.client();

    let categories = client.categories(None).await.unwrap();
    assert_eq!(categories.len(), 1);

    let all = client
        .documents_in_category(category_id, &DocumentFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all.first().unwrap().id, document.id);

    let hits = client
        .documents_in_category(
            category_id,
            &DocumentFilter {
                search: Some("unaudited".to_string()),
                tag: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let misses = client
        .documents_in_category(
            category_id,
            &DocumentFilter {
                search: None,
                tag: Some("legal".to_string()),
            },
        )
        .await
        .unwrap();
    assert!(misses.is_empty());
}

#[tokio::test]
async fn test_download_roundtrip_is_logged() {
    let portal = TestPortal::spawn().await;
    let admin = super_admin(&portal).await;
    let (_, document) = seed_room(&admin).await;

    portal.seed_investor("lp@fund.com", "Limited Partner");
    let mut session = portal.signed_in_session("lp@fund.com").await;
    session.accept_nda("Limited Partner", true).await.unwrap();

    let bytes = session.client().download(document.id).await.unwrap();
    assert_eq!(bytes, b"%PDF-1.4 fake quarterly");
    session.client().view(document.id).await.unwrap();

    let logs = admin.document_access_logs(document.id).await.unwrap();
    assert_eq!(logs.len(), 2);
    let actions: Vec<_> = logs.iter().map(|l| l.action).collect();
    assert!(actions.contains(&DocumentAction::Download));
    assert!(actions.contains(&DocumentAction::View));

    let activity = admin.activity_logs(Some(10)).await.unwrap();
    assert_eq!(activity.len(), 2);
}

#[tokio::test]
async fn test_direct_url_resolves_to_the_document() {
    let portal = TestPortal::spawn().await;
    let admin = super_admin(&portal).await;
    let (_, document) = seed_room(&admin).await;

    portal.seed_investor("lp@fund.com", "Limited Partner");
    let mut session = portal.signed_in_session("lp@fund.com").await;
    session.accept_nda("Limited Partner", true).await.unwrap();

    let direct = session.client().document_url(document.id).await.unwrap();
    assert!(direct.url.starts_with(portal.base_url()));
    assert!(direct.url.ends_with(&format!("/api/documents/{}/view", document.id)));
    assert!(direct.expires_in_seconds > 0);
}

#[tokio::test]
async fn test_deletion_is_destructive() {
    let portal = TestPortal::spawn().await;
    let admin = super_admin(&portal).await;
    let (_, document) = seed_room(&admin).await;

    admin.delete_document(document.id).await.unwrap();

    portal.seed_investor("lp@fund.com", "Limited Partner");
    let mut session = portal.signed_in_session("lp@fund.com").await;
    session.accept_nda("Limited Partner", true).await.unwrap();

    let err = session.client().document(document.id).await.unwrap_err();
    assert_eq!(err.status(), 404);

    let err = admin.delete_document(document.id).await.unwrap_err();
    assert_eq!(err.status(), 404);
}

#[tokio::test]
async fn test_investors_cannot_upload_or_delete() {
    let portal = TestPortal::spawn().await;
    let admin = super_admin(&portal).await;
    let (category_id, document) = seed_room(&admin).await;

    // An investor's token presented on the admin surface is refused
    // server-side regardless of which client sent it.
    let investor = portal.seed_investor("lp@fund.com", "Limited Partner");
    let investor_token = {
        use chrono::{Duration, Utc};
        use ridgeline_portal::store::SessionRecord;
        let now = Utc::now();
        let token = "smuggled-investor-token".to_string();
        portal
            .state()
            .store()
            .insert_session(SessionRecord {
                token: token.clone(),
                user_id: investor.id,
                created_at: now,
                expires_at: now + Duration::hours(1),
            })
            .unwrap();
        token
    };

    let store = std::sync::Arc::new(ridgeline_client::MemoryTokenStore::new());
    {
        use ridgeline_client::{TokenKey, TokenStore};
        store.save(TokenKey::Admin, &investor_token).unwrap();
    }
    let investor_admin = AdminClient::new(portal.base_url(), store).unwrap();

    let err = investor_admin
        .upload_document(DocumentUpload {
            title: "Rogue".to_string(),
            description: None,
            category_id,
            tags: vec![],
            file_name: "rogue.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"rogue".to_vec(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), 403);

    let err = investor_admin.delete_document(document.id).await.unwrap_err();
    assert_eq!(err.status(), 403);
}
