//! Person CRUD handlers: list, read, create, update, delete.
//!
//! Each handler parses raw request fields into a typed input, makes one
//! gateway call, and maps the result to a status code. No state lives
//! here.

use crate::error::{ApiError, USERS_NOT_FOUND, USER_NOT_FOUND};
use crate::person::{parse_person_id, NewPerson, Person, PersonChanges, PersonFilter};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use uuid::Uuid;

/// List persons, optionally filtered by `firstname` / `name` substring.
///
/// The emptiness check runs before filtering: an entirely empty store
/// is 404 even when filters are supplied, while a non-empty store with
/// no filter matches is 200 with an empty array.
#[utoipa::path(
    get,
    path = "/api/persons",
    params(
        ("firstname" = Option<String>, Query, description = "case-insensitive substring filter on firstName"),
        ("name" = Option<String>, Query, description = "case-insensitive substring filter on name"),
    ),
    responses(
        (status = 200, description = "matching persons", body = [Person]),
        (status = 404, description = "store holds no persons at all"),
    )
)]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    if state.store.is_empty().await? {
        return Err(ApiError::NotFound(USERS_NOT_FOUND.into()));
    }
    let filter = PersonFilter::from_query(&params);
    let persons = state.store.find_all(&filter).await?;
    Ok(Json(persons))
}

/// Fetch one person by id. Non-UUID path segments never reach this
/// handler; the `Path<Uuid>` extractor rejects them first.
#[utoipa::path(
    get,
    path = "/api/persons/{id}",
    params(("id" = Uuid, Path, description = "person id")),
    responses(
        (status = 200, description = "the person", body = Person),
        (status = 404, description = "no person with this id"),
    )
)]
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let person = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.into()))?;
    Ok(Json(person))
}

/// Create a person from required `firstname` / `name` query parameters.
#[utoipa::path(
    post,
    path = "/api/persons",
    params(
        ("firstname" = String, Query, description = "required first name"),
        ("name" = String, Query, description = "required name"),
    ),
    responses(
        (status = 201, description = "created; Location points at the new resource", body = Person),
        (status = 400, description = "a required parameter is missing or empty"),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = NewPerson::from_query(&params)?;
    let person = state.store.insert(&draft).await?;
    let location = format!("/api/persons/{}", person.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(person),
    ))
}

/// Update a person identified by the `id` query parameter. Absent or
/// empty field parameters leave the stored value unchanged.
#[utoipa::path(
    put,
    path = "/api/persons",
    params(
        ("id" = Uuid, Query, description = "person id"),
        ("firstname" = Option<String>, Query, description = "replacement first name"),
        ("name" = Option<String>, Query, description = "replacement name"),
    ),
    responses(
        (status = 204, description = "updated"),
        (status = 400, description = "id missing or malformed"),
        (status = 404, description = "no person with this id"),
        (status = 409, description = "person was modified concurrently"),
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_person_id(&params)?;
    let changes = PersonChanges::from_query(&params);
    state.store.update(id, &changes).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a person by id.
#[utoipa::path(
    delete,
    path = "/api/persons/{id}",
    params(("id" = Uuid, Path, description = "person id")),
    responses(
        (status = 204, description = "deleted"),
        (status = 404, description = "no person with this id"),
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
