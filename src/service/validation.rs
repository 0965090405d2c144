//! Required-field presence checks and foreign-key coercion, run before any
//! database call.

use crate::catalog::EntityDef;
use crate::error::AppError;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Check every required catalog column. A field is missing when absent,
    /// JSON null, or a blank string; numeric zero is a present value. All
    /// missing fields are reported in one aggregate error.
    pub fn validate(entity: &EntityDef, body: &Map<String, Value>) -> Result<(), AppError> {
        Self::check(entity, body, None)
    }

    /// Same check, skipping one column. Used for child rows whose parent id
    /// is injected after the parent insert.
    pub fn validate_without(
        entity: &EntityDef,
        body: &Map<String, Value>,
        skip: &str,
    ) -> Result<(), AppError> {
        Self::check(entity, body, Some(skip))
    }

    fn check(
        entity: &EntityDef,
        body: &Map<String, Value>,
        skip: Option<&str>,
    ) -> Result<(), AppError> {
        let missing: Vec<&str> = entity
            .required_columns()
            .filter(|c| skip != Some(c.name))
            .filter(|c| is_missing(body.get(c.name)))
            .map(|c| c.name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "faltan campos requeridos: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Foreign-key fields received as text are coerced to integers before
    /// binding. Applies to every FK column, whatever the source endpoint did.
    pub fn coerce_foreign_keys(
        entity: &EntityDef,
        body: &mut Map<String, Value>,
    ) -> Result<(), AppError> {
        for c in entity.foreign_keys() {
            let Some(v) = body.get(c.name) else { continue };
            match v {
                Value::Null => {}
                Value::Number(n) => {
                    if n.as_i64().is_none() {
                        return Err(AppError::Validation(format!(
                            "{} debe ser un entero",
                            c.name
                        )));
                    }
                }
                Value::String(s) => {
                    let parsed: i64 = s.trim().parse().map_err(|_| {
                        AppError::Validation(format!("{} debe ser un entero", c.name))
                    })?;
                    body.insert(c.name.to_string(), Value::from(parsed));
                }
                _ => {
                    return Err(AppError::Validation(format!(
                        "{} debe ser un entero",
                        c.name
                    )))
                }
            }
        }
        Ok(())
    }
}

fn is_missing(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entity_by_path;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn missing_fields_are_reported_in_one_aggregate_error() {
        let e = entity_by_path("mascotas").unwrap();
        let err = RequestValidator::validate(e, &body(json!({"nombre": "Rex"}))).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("especie"));
        assert!(msg.contains("id_cliente"));
        assert!(!msg.contains("nombre,"));
    }

    #[test]
    fn null_and_blank_count_as_missing() {
        let e = entity_by_path("localidades").unwrap();
        assert!(RequestValidator::validate(e, &body(json!({"nombre": null}))).is_err());
        assert!(RequestValidator::validate(e, &body(json!({"nombre": "   "}))).is_err());
        assert!(RequestValidator::validate(e, &body(json!({"nombre": "Centro"}))).is_ok());
    }

    #[test]
    fn numeric_zero_is_present() {
        let e = entity_by_path("servicios").unwrap();
        let b = body(json!({"nombre": "Desparasitacion", "precio": 0}));
        assert!(RequestValidator::validate(e, &b).is_ok());
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let e = entity_by_path("clientes").unwrap();
        let b = body(json!({
            "nombre": "Ana", "apellido": "Diaz", "telefono": "300",
            "email": "a@b.co", "direccion": "Calle 1"
        }));
        assert!(RequestValidator::validate(e, &b).is_ok());
    }

    #[test]
    fn skipped_column_is_not_required() {
        let e = entity_by_path("detalles_facturas").unwrap();
        let b = body(json!({"id_servicio": 1, "cantidad": 2, "subtotal": 30}));
        assert!(RequestValidator::validate(e, &b).is_err());
        assert!(RequestValidator::validate_without(e, &b, "id_factura").is_ok());
    }

    #[test]
    fn fk_text_is_coerced_to_integer() {
        let e = entity_by_path("mascotas").unwrap();
        let mut b = body(json!({"id_cliente": " 12 "}));
        RequestValidator::coerce_foreign_keys(e, &mut b).unwrap();
        assert_eq!(b["id_cliente"], json!(12));
    }

    #[test]
    fn non_numeric_fk_text_is_rejected() {
        let e = entity_by_path("mascotas").unwrap();
        let mut b = body(json!({"id_cliente": "doce"}));
        assert!(RequestValidator::coerce_foreign_keys(e, &mut b).is_err());
    }

    #[test]
    fn fractional_fk_is_rejected() {
        let e = entity_by_path("citas").unwrap();
        let mut b = body(json!({"id_mascota": 1.5}));
        assert!(RequestValidator::coerce_foreign_keys(e, &mut b).is_err());
    }
}
