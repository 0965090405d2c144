//! The `/api` surface: one collection per entity with a uniform verb
//! mapping, plus the two auth endpoints. Parameterized paths so handlers
//! resolve the entity by segment against the catalog.

use crate::handlers::auth::{ingreso, registro};
use crate::handlers::entity::{create, delete as delete_handler, list, update};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/ingreso", post(ingreso))
        .route("/registro", post(registro))
        .route("/:entidad", get(list).post(create))
        .route("/:entidad/:id", axum::routing::put(update).delete(delete_handler))
        .with_state(state)
}
