//! Response shapes for the entity endpoints: bare arrays for reads, the
//! generated id plus the echoed input for creates, and short Spanish
//! confirmation messages for updates and deletes.

use crate::catalog::{EntityDef, Genero};
use serde_json::{json, Map, Value};

/// Creation result: primary key first, then the echoed input. Keys outside
/// the catalog and the secret column are dropped from the echo.
pub fn created_body(entity: &EntityDef, id: i64, input: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    out.insert(entity.pk.to_string(), Value::from(id));
    for (k, v) in input {
        if entity.is_secret(k) {
            continue;
        }
        if entity.column(k).is_some() {
            out.insert(k.clone(), v.clone());
        }
    }
    Value::Object(out)
}

fn sufijo(genero: Genero) -> &'static str {
    match genero {
        Genero::Masculino => "o",
        Genero::Femenino => "a",
    }
}

pub fn updated_message(entity: &EntityDef) -> Value {
    json!({
        "message": format!(
            "{} actualizad{} correctamente",
            entity.display,
            sufijo(entity.genero)
        )
    })
}

pub fn deleted_message(entity: &EntityDef) -> Value {
    json!({
        "message": format!(
            "{} eliminad{} correctamente",
            entity.display,
            sufijo(entity.genero)
        )
    })
}

/// Message carried by the 404 body when an update/delete target is absent.
pub fn not_found_message(entity: &EntityDef) -> String {
    format!("{} no encontrad{}", entity.display, sufijo(entity.genero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entity_by_path;

    #[test]
    fn created_body_leads_with_the_generated_id() {
        let e = entity_by_path("mascotas").unwrap();
        let input = json!({"nombre": "Rex", "especie": "Perro"});
        let body = created_body(e, 7, input.as_object().unwrap());
        assert_eq!(body["id_mascota"], json!(7));
        assert_eq!(body["nombre"], json!("Rex"));
    }

    #[test]
    fn created_body_never_echoes_the_secret_column() {
        let e = entity_by_path("usuarios").unwrap();
        let input = json!({"usuario": "ana", "contrasena": "secreta"});
        let body = created_body(e, 1, input.as_object().unwrap());
        assert!(body.get("contrasena").is_none());
        assert_eq!(body["usuario"], json!("ana"));
    }

    #[test]
    fn created_body_drops_unknown_keys() {
        let e = entity_by_path("servicios").unwrap();
        let input = json!({"nombre": "Consulta", "precio": 10, "extra": true});
        let body = created_body(e, 3, input.as_object().unwrap());
        assert!(body.get("extra").is_none());
    }

    #[test]
    fn messages_agree_in_gender() {
        let mascotas = entity_by_path("mascotas").unwrap();
        assert_eq!(
            updated_message(mascotas)["message"],
            json!("Mascota actualizada correctamente")
        );
        let barrios = entity_by_path("barrios").unwrap();
        assert_eq!(
            deleted_message(barrios)["message"],
            json!("Barrio eliminado correctamente")
        );
        let clientes = entity_by_path("clientes").unwrap();
        assert_eq!(not_found_message(clientes), "Cliente no encontrado");
    }
}
