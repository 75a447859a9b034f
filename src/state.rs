//! Shared application state for all routes.

use crate::store::PersonStore;

/// Carries the one storage handle. Built in `main`, injected at router
/// construction; handlers hold no state of their own.
#[derive(Clone)]
pub struct AppState {
    pub store: PersonStore,
}

impl AppState {
    pub fn new(store: PersonStore) -> Self {
        AppState { store }
    }
}
