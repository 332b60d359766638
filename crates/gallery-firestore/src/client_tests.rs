//! Tests for Firestore client functionality.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gallery_models::{GalleryRecord, ImageAsset, ImageId, ImageStatus, RecordField};

use crate::client::{FirestoreClient, FirestoreConfig};
use crate::error::FirestoreError;
use crate::gallery_repo::GalleryRepository;
use crate::store::MetadataStore;
use crate::types::{ToFirestoreValue, Value};

// =============================================================================
// Test Helpers
// =============================================================================

fn test_config() -> FirestoreConfig {
    FirestoreConfig {
        project_id: "test-project".to_string(),
        database_id: "(default)".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        emulator_host: None,
    }
}

fn test_client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::with_static_token(&test_config(), format!("{}/docs", server.uri()), "test-token")
        .unwrap()
}

const DOC_PATH: &str = "/docs/users/u1/gallery/image_42";

fn stored_document() -> serde_json::Value {
    json!({
        "name": "projects/test-project/databases/(default)/documents/users/u1/gallery/image_42",
        "fields": {
            "email": {"stringValue": "u1"},
            "user_data": {"stringValue": "image_42"},
            "status": {"stringValue": "open"},
            "s3link": {"stringValue": "https://signed/42"},
            "contributor_id": {"stringValue": "c1"},
            "description": {"stringValue": "sunset"},
            "image_type": {"stringValue": "photo"},
            "media_type": {"stringValue": "image"},
            "subclipCreated": {"booleanValue": false}
        },
        "createTime": "2024-01-01T00:00:00Z",
        "updateTime": "2024-01-01T00:00:00Z"
    })
}

// =============================================================================
// Error Type Tests
// =============================================================================

#[test]
fn test_error_from_http_status_429() {
    let err = FirestoreError::from_http_status(429, "rate limited");
    assert!(matches!(err, FirestoreError::RateLimited(_)));
    assert!(err.is_transient());
}

#[test]
fn test_error_from_http_status_503() {
    let err = FirestoreError::from_http_status(503, "service unavailable");
    assert!(matches!(err, FirestoreError::ServerError(503, _)));
    assert!(err.is_transient());
}

#[test]
fn test_error_from_http_status_400() {
    let err = FirestoreError::from_http_status(400, "bad request");
    assert!(matches!(err, FirestoreError::RequestFailed(_)));
    assert!(!err.is_transient());
}

#[test]
fn test_error_from_http_status_404() {
    let err = FirestoreError::from_http_status(404, "not found");
    assert!(err.is_not_found());
    assert!(!err.is_transient());
}

#[test]
fn test_error_from_http_status_auth() {
    assert!(matches!(
        FirestoreError::from_http_status(401, "nope"),
        FirestoreError::AuthError(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(403, "nope"),
        FirestoreError::PermissionDenied(_)
    ));
}

#[test]
fn test_error_http_status_getter() {
    assert_eq!(FirestoreError::RateLimited(1000).http_status(), Some(429));
    assert_eq!(
        FirestoreError::ServerError(502, "bad gateway".into()).http_status(),
        Some(502)
    );
    assert_eq!(FirestoreError::not_found("x").http_status(), Some(404));
    assert_eq!(FirestoreError::invalid_response("x").http_status(), None);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
#[serial]
fn test_config_from_env_validates_project_id() {
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("FIREBASE_PROJECT_ID");
    assert!(FirestoreConfig::from_env().is_err());
}

#[test]
#[serial]
fn test_config_default_values() {
    std::env::set_var("GCP_PROJECT_ID", "test-project");
    std::env::remove_var("FIRESTORE_DATABASE_ID");
    std::env::remove_var("FIRESTORE_TIMEOUT_SECS");
    std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
    std::env::remove_var("FIRESTORE_EMULATOR_HOST");

    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.database_id, "(default)");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert!(config.emulator_host.is_none());
    assert_eq!(
        config.documents_url(),
        "https://firestore.googleapis.com/v1/projects/test-project/databases/(default)/documents"
    );

    std::env::remove_var("GCP_PROJECT_ID");
}

#[test]
#[serial]
fn test_config_emulator_host() {
    std::env::set_var("FIREBASE_PROJECT_ID", "demo");
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::set_var("FIRESTORE_EMULATOR_HOST", "localhost:8080");

    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(
        config.documents_url(),
        "http://localhost:8080/v1/projects/demo/databases/(default)/documents"
    );

    std::env::remove_var("FIREBASE_PROJECT_ID");
    std::env::remove_var("FIRESTORE_EMULATOR_HOST");
}

// =============================================================================
// Client Tests
// =============================================================================

#[tokio::test]
async fn test_get_document_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_document()))
        .expect(1)
        .mount(&server)
        .await;

    let doc = test_client(&server)
        .get_document("users/u1/gallery", "image_42")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.field::<String>("s3link").as_deref(), Some("https://signed/42"));
}

#[tokio::test]
async fn test_get_document_missing_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": {"status": "NOT_FOUND"}})))
        .mount(&server)
        .await;

    let doc = test_client(&server)
        .get_document("users/u1/gallery", "image_42")
        .await
        .unwrap();
    assert!(doc.is_none());
}

#[tokio::test]
async fn test_server_error_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .get_document("users/u1/gallery", "image_42")
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::ServerError(503, _)));
}

#[tokio::test]
async fn test_unauthorized_without_expiry_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .get_document("users/u1/gallery", "image_42")
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::AuthError(_)));
}

#[tokio::test]
async fn test_update_document_sends_mask_and_precondition() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(DOC_PATH))
        .and(query_param("updateMask.fieldPaths", "subclipCreated"))
        .and(query_param("currentDocument.exists", "true"))
        .and(body_partial_json(json!({"fields": {"subclipCreated": {"booleanValue": true}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_document()))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = HashMap::new();
    fields.insert("subclipCreated".to_string(), true.to_firestore_value());

    test_client(&server)
        .update_document("users/u1/gallery", "image_42", fields, &["subclipCreated"], true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_missing_document_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "status": "NOT_FOUND", "message": "No document to update"}
        })))
        .mount(&server)
        .await;

    let mut fields = HashMap::new();
    fields.insert("status".to_string(), Value::StringValue("closed".into()));

    let err = test_client(&server)
        .update_document("users/u1/gallery", "image_42", fields, &["status"], true)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_failed_precondition_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "status": "FAILED_PRECONDITION"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .update_document("users/u1/gallery", "image_42", HashMap::new(), &["status"], true)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Repository Tests
// =============================================================================

#[tokio::test]
async fn test_repository_create_writes_initial_record() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(DOC_PATH))
        .and(body_partial_json(json!({"fields": {
            "email": {"stringValue": "u1"},
            "user_data": {"stringValue": "image_42"},
            "status": {"stringValue": "open"},
            "subclipCreated": {"booleanValue": false}
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_document()))
        .expect(1)
        .mount(&server)
        .await;

    let asset = ImageAsset::from_provider("42", "https://img/42.jpg", "c1", "sunset", "photo", "image");
    let mut record = GalleryRecord::open(&asset, "u1", "https://signed/42");
    record.status = ImageStatus::Closed;

    GalleryRepository::new(test_client(&server))
        .create(&record)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_repository_get_maps_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_document()))
        .mount(&server)
        .await;

    let record = GalleryRepository::new(test_client(&server))
        .get("u1", &ImageId::from("42"))
        .await
        .unwrap();
    assert_eq!(record.owner_id, "u1");
    assert_eq!(record.status, ImageStatus::Open);
    assert_eq!(record.storage_link, "https://signed/42");
    assert!(!record.subclip_created);
}

#[tokio::test]
async fn test_repository_get_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = GalleryRepository::new(test_client(&server))
        .get("u1", &ImageId::from("42"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_repository_update_field_is_conditional() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(DOC_PATH))
        .and(query_param("updateMask.fieldPaths", "status"))
        .and(query_param("currentDocument.exists", "true"))
        .and(body_partial_json(json!({"fields": {"status": {"stringValue": "closed"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_document()))
        .expect(1)
        .mount(&server)
        .await;

    GalleryRepository::new(test_client(&server))
        .update_field("u1", &ImageId::from("42"), RecordField::Status(ImageStatus::Closed))
        .await
        .unwrap();
}
