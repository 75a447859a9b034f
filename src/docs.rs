//! Machine-readable API description served at /api-docs/openapi.json.

use crate::handlers::persons;
use crate::person::Person;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        persons::list,
        persons::read,
        persons::create,
        persons::update,
        persons::delete,
    ),
    components(schemas(Person))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn docs_routes() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}
