//! Entity CRUD handlers: list, create, update, delete, resolved by path
//! segment against the catalog.

use crate::catalog::{self, EntityDef};
use crate::error::AppError;
use crate::response;
use crate::service::{auth, CrudService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

fn resolve_entity(path: &str) -> Result<&'static EntityDef, AppError> {
    catalog::entity_by_path(path)
        .ok_or_else(|| AppError::NotFound(format!("recurso desconocido: {}", path)))
}

fn parse_id(id: &str) -> Result<i64, AppError> {
    id.parse()
        .map_err(|_| AppError::BadRequest("id invalido".into()))
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest(
            "el cuerpo debe ser un objeto JSON".into(),
        )),
    }
}

/// Validate, coerce foreign keys and hash the secret column. Returns the map
/// ready for binding. Shared by create and update.
fn prepare_write(
    entity: &EntityDef,
    mut body: Map<String, Value>,
) -> Result<Map<String, Value>, AppError> {
    RequestValidator::validate(entity, &body)?;
    RequestValidator::coerce_foreign_keys(entity, &mut body)?;
    if let Some(secret) = entity.secret {
        if let Some(Value::String(plain)) = body.get(secret) {
            let hashed = auth::hash_password(plain)?;
            body.insert(secret.to_string(), Value::String(hashed));
        }
    }
    Ok(body)
}

pub async fn list(
    State(state): State<AppState>,
    Path(entidad): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&entidad)?;
    let rows = CrudService::list(&state.pool, entity).await?;
    Ok((StatusCode::OK, Json(Value::Array(rows))))
}

pub async fn create(
    State(state): State<AppState>,
    Path(entidad): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&entidad)?;
    create_for_entity(&state, entity, body).await
}

/// Create one row for a known entity. Also backs `/registro`, which is the
/// usuarios create path under another name.
pub async fn create_for_entity(
    state: &AppState,
    entity: &'static EntityDef,
    body: Value,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut body = body_to_map(body)?;

    // An invoice may carry its line items; they are written in the same
    // transaction as the invoice row.
    let detalles = if entity.table == "facturas" {
        take_detalles(&mut body)?
    } else {
        Vec::new()
    };

    let input = body.clone();
    let prepared = prepare_write(entity, body)?;

    let id = if detalles.is_empty() {
        CrudService::create(&state.pool, entity, &prepared).await?
    } else {
        let detail = resolve_entity("detalles_facturas")?;
        let mut items = Vec::with_capacity(detalles.len());
        for d in detalles {
            let mut d = d;
            RequestValidator::validate_without(detail, &d, "id_factura")?;
            RequestValidator::coerce_foreign_keys(detail, &mut d)?;
            items.push(d);
        }
        CrudService::create_with_children(&state.pool, entity, detail, &prepared, &items).await?
    };

    Ok((
        StatusCode::CREATED,
        Json(response::created_body(entity, id, &input)),
    ))
}

fn take_detalles(body: &mut Map<String, Value>) -> Result<Vec<Map<String, Value>>, AppError> {
    match body.remove("detalles") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.into_iter().map(body_to_map).collect(),
        Some(_) => Err(AppError::BadRequest(
            "detalles debe ser una lista de objetos".into(),
        )),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path((entidad, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&entidad)?;
    let id = parse_id(&id)?;
    let body = body_to_map(body)?;
    let prepared = prepare_write(entity, body)?;
    let matched = CrudService::update(&state.pool, entity, id, &prepared).await?;
    if !matched {
        return Err(AppError::NotFound(response::not_found_message(entity)));
    }
    Ok((StatusCode::OK, Json(response::updated_message(entity))))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((entidad, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&entidad)?;
    let id = parse_id(&id)?;
    let matched = CrudService::delete(&state.pool, entity, id).await?;
    if !matched {
        return Err(AppError::NotFound(response::not_found_message(entity)));
    }
    Ok((StatusCode::OK, Json(response::deleted_message(entity))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_entity_is_not_found() {
        assert!(matches!(
            resolve_entity("dinosaurios"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn the_invoice_alias_resolves() {
        assert!(resolve_entity("facturacion").is_ok());
    }

    #[test]
    fn non_numeric_id_is_a_bad_request() {
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest(_))));
        assert_eq!(parse_id("41").unwrap(), 41);
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(body_to_map(json!([1, 2])).is_err());
        assert!(body_to_map(json!({"nombre": "Rex"})).is_ok());
    }

    #[test]
    fn detalles_are_split_from_the_invoice_body() {
        let mut body = json!({
            "fecha_emision": "2024-05-01",
            "detalles": [{"id_servicio": 1, "cantidad": 2, "subtotal": 30}]
        })
        .as_object()
        .unwrap()
        .clone();
        let items = take_detalles(&mut body).unwrap();
        assert_eq!(items.len(), 1);
        assert!(body.get("detalles").is_none());
    }

    #[test]
    fn scalar_detalles_are_rejected() {
        let mut body = json!({"detalles": 3}).as_object().unwrap().clone();
        assert!(take_detalles(&mut body).is_err());
    }
}
