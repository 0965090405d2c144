//! Login and self-registration handlers.

use crate::catalog;
use crate::error::AppError;
use crate::handlers::entity::create_for_entity;
use crate::service::auth;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

fn credential(body: &Value, field: &str) -> Option<String> {
    match body.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// POST /api/ingreso: username + password in, minimal identity out. Any
/// credential mismatch is the same 401.
pub async fn ingreso(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let usuario = credential(&body, "usuario");
    let contrasena = credential(&body, "contrasena");
    let (Some(usuario), Some(contrasena)) = (usuario, contrasena) else {
        return Err(AppError::Validation(
            "faltan campos requeridos: usuario, contrasena".into(),
        ));
    };
    let identity = auth::login(&state.pool, &usuario, &contrasena).await?;
    Ok((StatusCode::OK, Json(identity)))
}

/// POST /api/registro: the usuarios create path under another name.
pub async fn registro(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let entity = catalog::entity_by_path("usuarios")
        .ok_or_else(|| AppError::Internal("usuarios entity missing from catalog".into()))?;
    create_for_entity(&state, entity, body).await
}
