//! End-to-end tests against a real PostgreSQL instance.
//!
//! Run with a reachable database and the ignored filter:
//! `DATABASE_URL=postgres://localhost/persons_test cargo test -- --ignored`

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use persons_service::{
    app, apply_migrations, ensure_database_exists, AppState, Person, PersonStore,
};
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;

async fn test_state() -> AppState {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/persons_test".into());
    ensure_database_exists(&database_url).await.unwrap();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .unwrap();
    apply_migrations(&pool).await.unwrap();
    sqlx::query("TRUNCATE persons").execute(&pool).await.unwrap();
    AppState::new(PersonStore::new(pool))
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn method(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create_person(state: &AppState, firstname: &str, name: &str) -> Person {
    let uri = format!("/api/persons?firstname={}&name={}", firstname, name);
    let (status, body) = send(state, method("POST", &uri)).await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn empty_store_lists_as_404_even_with_filters() {
    let state = test_state().await;

    let (status, body) = send(&state, get("/api/persons")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"Users not found.");

    let (status, body) = send(&state, get("/api/persons?firstname=ad")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"Users not found.");
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn create_assigns_id_location_and_roundtrips() {
    let state = test_state().await;

    let response = app(state.clone())
        .oneshot(method("POST", "/api/persons?firstname=Grace&name=Hopper"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let created: Person = serde_json::from_slice(&body).unwrap();
    assert_eq!(location, format!("/api/persons/{}", created.id));
    assert_eq!(created.first_name, "Grace");
    assert_eq!(created.name, "Hopper");

    let (status, body) = send(&state, get(&location)).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Person = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn assigned_ids_are_unique_across_inserts() {
    let state = test_state().await;
    let a = create_person(&state, "Ada", "Lovelace").await;
    let b = create_person(&state, "Ada", "Lovelace").await;
    assert_ne!(a.id, b.id);
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn list_filters_are_case_insensitive_substrings_anded() {
    let state = test_state().await;
    let ada = create_person(&state, "Ada", "Lovelace").await;
    create_person(&state, "Grace", "Hopper").await;

    let (status, body) = send(&state, get("/api/persons?firstname=ad")).await;
    assert_eq!(status, StatusCode::OK);
    let matched: Vec<Person> = serde_json::from_slice(&body).unwrap();
    assert_eq!(matched, vec![ada.clone()]);

    // Case-insensitive on either field.
    let (status, body) = send(&state, get("/api/persons?name=LOVE")).await;
    assert_eq!(status, StatusCode::OK);
    let matched: Vec<Person> = serde_json::from_slice(&body).unwrap();
    assert_eq!(matched, vec![ada.clone()]);

    // Both filters must match the same record.
    let (status, body) = send(&state, get("/api/persons?firstname=ad&name=love")).await;
    assert_eq!(status, StatusCode::OK);
    let matched: Vec<Person> = serde_json::from_slice(&body).unwrap();
    assert_eq!(matched, vec![ada]);

    // Non-empty store with no match is 200 [], not 404.
    let (status, body) = send(&state, get("/api/persons?firstname=ad&name=hop")).await;
    assert_eq!(status, StatusCode::OK);
    let matched: Vec<Person> = serde_json::from_slice(&body).unwrap();
    assert!(matched.is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn unfiltered_list_returns_everything() {
    let state = test_state().await;
    create_person(&state, "Ada", "Lovelace").await;
    create_person(&state, "Grace", "Hopper").await;

    let (status, body) = send(&state, get("/api/persons")).await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<Person> = serde_json::from_slice(&body).unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn get_on_missing_id_is_404() {
    let state = test_state().await;
    create_person(&state, "Ada", "Lovelace").await;

    let uri = format!("/api/persons/{}", Uuid::new_v4());
    let (status, body) = send(&state, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"User not found.");
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn update_is_partial_and_idempotent() {
    let state = test_state().await;
    let person = create_person(&state, "Ada", "Lovelace").await;

    // Only the supplied field changes; empty params leave values alone.
    let uri = format!("/api/persons?id={}&firstname=Augusta&name=", person.id);
    let (status, _) = send(&state, method("PUT", &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&state, get(&format!("/api/persons/{}", person.id))).await;
    let updated: Person = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.first_name, "Augusta");
    assert_eq!(updated.name, "Lovelace");

    // Applying the same change again yields the same final state.
    let (status, _) = send(&state, method("PUT", &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&state, get(&format!("/api/persons/{}", person.id))).await;
    let repeated: Person = serde_json::from_slice(&body).unwrap();
    assert_eq!(repeated, updated);
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn update_on_missing_id_is_404() {
    let state = test_state().await;
    create_person(&state, "Ada", "Lovelace").await;

    let uri = format!("/api/persons?id={}&firstname=Grace", Uuid::new_v4());
    let (status, body) = send(&state, method("PUT", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"User not found.");
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn delete_removes_the_record() {
    let state = test_state().await;
    let person = create_person(&state, "Ada", "Lovelace").await;

    let uri = format!("/api/persons/{}", person.id);
    let (status, _) = send(&state, method("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&state, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"User not found.");

    let (status, body) = send(&state, method("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"User not found.");
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn update_of_a_removed_record_reports_not_found() {
    let state = test_state().await;
    let person = create_person(&state, "Ada", "Lovelace").await;

    let store = state.store.clone();
    let changes = persons_service::PersonChanges {
        first_name: Some("Augusta".into()),
        name: None,
    };
    store.update(person.id, &changes).await.unwrap();

    // A record removed before the next write reports NotFound, never
    // Conflict.
    store.delete(person.id).await.unwrap();
    let err = store.update(person.id, &changes).await.unwrap_err();
    assert!(matches!(err, persons_service::StoreError::NotFound));
}

#[tokio::test]
#[ignore = "requires database"]
#[serial]
async fn readiness_reflects_the_database() {
    let state = test_state().await;
    let (status, body) = send(&state, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["database"], "ok");
}
