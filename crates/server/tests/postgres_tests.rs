//! PostgreSQL integration tests using testcontainers.
//!
//! These tests require Docker to be running. Set SKIP_POSTGRES_TESTS=1 to skip.

mod common;

use axum::http::StatusCode;
use common::fixtures::{MultipartBuilder, lead_json};
use common::{TestServer, postgres_or_skip, run_metadata_test_both};
use leadline_core::{LeadChanges, NewLead};
use leadline_metadata::{LeadUpdate, NewLeadRow};
use serde_json::json;

fn new_row(name: &str) -> NewLeadRow {
    NewLeadRow::new(
        NewLead {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            business_name: None,
            message: "Hello".to_string(),
        },
        None,
    )
}

#[tokio::test]
async fn test_postgres_api_lifecycle() {
    let Some(metadata) = postgres_or_skip().await else {
        return;
    };
    let server = TestServer::with_metadata(metadata.store()).await;

    let id = server.create_lead(lead_json("Ada")).await;

    let (status, body) = server
        .multipart_request(
            "POST",
            &format!("/api/contacts/{id}?_method=PUT"),
            MultipartBuilder::new()
                .text("business_name", "Engines")
                .file("file", "notes.md", b"# notes"),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["business_name"], "Engines");
    assert!(body["data"]["file_url"].is_string());

    let (status, _) = server
        .json_request("DELETE", &format!("/api/contacts/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server
        .json_request("GET", &format!("/api/contacts/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_postgres_schema_is_idempotent() {
    let Some(metadata) = postgres_or_skip().await else {
        return;
    };

    metadata.store().migrate().await.unwrap();
    metadata.store().migrate().await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts")
        .fetch_one(metadata.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);

    let server = TestServer::with_metadata(metadata.store()).await;
    let (status, body) = server.json_request("GET", "/api/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_lead_repo_on_both_backends() {
    run_metadata_test_both(|store| async move {
        let first = store.create_lead(&new_row("First")).await.unwrap();
        let second = store.create_lead(&new_row("Second")).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(store.count_leads().await.unwrap(), 2);

        let listed = store.list_leads(0, 10).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let update = LeadUpdate::new(LeadChanges {
            phone: Some(Some("555".to_string())),
            ..Default::default()
        })
        .with_file_path("contacts/first.pdf");
        let updated = store.update_lead(first.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.name, "First");
        assert_eq!(updated.phone.as_deref(), Some("555"));
        assert_eq!(updated.file_path.as_deref(), Some("contacts/first.pdf"));
        assert_eq!(store.get_lead(first.id).await.unwrap(), Some(updated));

        assert!(store.delete_lead(first.id).await.unwrap());
        assert!(!store.delete_lead(first.id).await.unwrap());
        assert!(store.get_lead(first.id).await.unwrap().is_none());
        assert!(store.update_lead(first.id, &update).await.unwrap().is_none());
        assert!(store.list_leads(1, 10).await.unwrap().is_empty());
    })
    .await;
}
