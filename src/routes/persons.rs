//! Person routes. Update binds its id from the query string, so PUT
//! lives on the collection path.

use crate::handlers::persons::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn person_routes(state: AppState) -> Router {
    Router::new()
        .route("/persons", get(list).post(create).put(update))
        .route("/persons/:id", get(read).delete(delete_handler))
        .with_state(state)
}
