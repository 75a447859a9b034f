//! Person CRUD REST service library: a thin axum handler layer over a
//! sqlx-backed persistence gateway.

pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod person;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ServiceConfig;
pub use error::{ApiError, StoreError};
pub use migration::{apply_migrations, ensure_database_exists};
pub use person::{NewPerson, Person, PersonChanges, PersonFilter};
pub use state::AppState;
pub use store::PersonStore;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full router: person CRUD under /api, plus the
/// operational routes and the OpenAPI document at the root.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::common_routes(state.clone()))
        .merge(docs::docs_routes())
        .nest("/api", routes::person_routes(state))
        .layer(TraceLayer::new_for_http())
}
