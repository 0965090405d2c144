//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from the entity
//! catalog.

use crate::catalog::{ColType, EntityDef, JoinKind, JoinLabel, ListOrder};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from the catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Alias of the main table in read queries.
const MAIN_ALIAS: &str = "t";

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Column expression on an aliased table. Numeric columns are projected as
/// text so row decoding sees a plain string.
fn column_expr(alias: &str, name: &str, ty: ColType) -> String {
    let q = format!("{}.{}", alias, quoted(name));
    match ty {
        ColType::Numeric => format!("{}::text AS {}", q, quoted(name)),
        _ => q,
    }
}

/// Joined SELECT resolving foreign keys to display labels. Secret columns
/// are never projected.
pub fn select_list(entity: &EntityDef) -> String {
    let mut parts = vec![format!("{}.{}", MAIN_ALIAS, quoted(entity.pk))];
    for c in entity.columns {
        if entity.is_secret(c.name) {
            continue;
        }
        parts.push(column_expr(MAIN_ALIAS, c.name, c.ty));
    }
    for j in entity.joins {
        let label = match j.label {
            JoinLabel::Column { column, alias } => {
                format!("{}.{} AS {}", j.table_alias, quoted(column), quoted(alias))
            }
            JoinLabel::FullName { alias } => format!(
                "{ja}.\"nombre\" || ' ' || {ja}.\"apellido\" AS {a}",
                ja = j.table_alias,
                a = quoted(alias)
            ),
        };
        parts.push(label);
    }

    let mut sql = format!(
        "SELECT {} FROM {} {}",
        parts.join(", "),
        quoted(entity.table),
        MAIN_ALIAS
    );
    for j in entity.joins {
        let kind = match j.kind {
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Inner => "INNER JOIN",
        };
        sql.push_str(&format!(
            " {} {} {} ON {}.{} = {}.{}",
            kind,
            quoted(j.table),
            j.table_alias,
            MAIN_ALIAS,
            quoted(j.on),
            j.table_alias,
            quoted(j.on_joined)
        ));
    }
    if entity.order == ListOrder::NewestFirst {
        sql.push_str(&format!(" ORDER BY {}.{} DESC", MAIN_ALIAS, quoted(entity.pk)));
    }
    sql
}

/// INSERT over the full catalog column list, binding NULL for absent
/// optional columns, RETURNING the generated primary key.
pub fn insert(entity: &EntityDef, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in entity.columns {
        let val = body.get(c.name).cloned().unwrap_or(Value::Null);
        let n = q.push_param(val);
        cols.push(quoted(c.name));
        placeholders.push(format!("${}::{}", n, c.ty.pg_name()));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(entity.table),
        cols.join(", "),
        placeholders.join(", "),
        quoted(entity.pk)
    );
    q
}

/// Full-record UPDATE by primary key: every catalog column is SET. The id
/// binds last.
pub fn update(entity: &EntityDef, id: i64, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in entity.columns {
        let val = body.get(c.name).cloned().unwrap_or(Value::Null);
        let n = q.push_param(val);
        sets.push(format!("{} = ${}::{}", quoted(c.name), n, c.ty.pg_name()));
    }
    let id_param = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::int4",
        quoted(entity.table),
        sets.join(", "),
        quoted(entity.pk),
        id_param
    );
    q
}

/// DELETE by primary key. The caller binds the id as the sole parameter.
pub fn delete(entity: &EntityDef) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1::int4",
        quoted(entity.table),
        quoted(entity.pk)
    )
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
    fn mascotas_select_resolves_the_owner_name() {
        let e = entity_by_path("mascotas").unwrap();
        let sql = select_list(e);
        assert!(sql.contains("INNER JOIN \"clientes\" c"));
        assert!(sql.contains("c.\"nombre\" || ' ' || c.\"apellido\" AS \"nombre_cliente\""));
        assert!(sql.ends_with("ORDER BY t.\"id_mascota\" DESC"));
    }

    #[test]
    fn lookup_entities_are_unordered() {
        let e = entity_by_path("localidades").unwrap();
        let sql = select_list(e);
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn usuarios_select_never_projects_contrasena() {
        let e = entity_by_path("usuarios").unwrap();
        let sql = select_list(e);
        assert!(!sql.contains("contrasena"));
        assert!(sql.contains("t.\"usuario\""));
        assert!(sql.contains("t.\"rol\""));
    }

    #[test]
    fn numeric_columns_project_as_text() {
        let e = entity_by_path("servicios").unwrap();
        let sql = select_list(e);
        assert!(sql.contains("t.\"precio\"::text AS \"precio\""));
    }

    #[test]
    fn citas_select_joins_both_targets() {
        let e = entity_by_path("citas").unwrap();
        let sql = select_list(e);
        assert!(sql.contains("LEFT JOIN \"mascotas\" m"));
        assert!(sql.contains("LEFT JOIN \"veterinarios\" v"));
        assert!(sql.contains("AS \"nombre_veterinario\""));
    }

    #[test]
    fn insert_binds_every_catalog_column() {
        let e = entity_by_path("mascotas").unwrap();
        let q = insert(
            e,
            &body(json!({
                "nombre": "Rex", "especie": "Perro", "raza": "Criollo",
                "edad": 4, "peso": 18.5, "id_cliente": 1
            })),
        );
        assert_eq!(q.params.len(), e.columns.len());
        assert!(q.sql.starts_with("INSERT INTO \"mascotas\""));
        assert!(q.sql.ends_with("RETURNING \"id_mascota\""));
        assert!(q.sql.contains("$6::int4"));
    }

    #[test]
    fn insert_binds_null_for_absent_optional_columns() {
        let e = entity_by_path("clientes").unwrap();
        let q = insert(
            e,
            &body(json!({
                "nombre": "Ana", "apellido": "Diaz", "telefono": "300",
                "email": "a@b.co", "direccion": "Calle 1"
            })),
        );
        // id_barrio is the last catalog column and was not provided.
        assert_eq!(q.params.last(), Some(&Value::Null));
    }

    #[test]
    fn update_binds_the_id_last() {
        let e = entity_by_path("servicios").unwrap();
        let q = update(
            e,
            9,
            &body(json!({"nombre": "Consulta", "descripcion": null, "precio": 0})),
        );
        assert_eq!(q.params.len(), e.columns.len() + 1);
        assert_eq!(q.params.last(), Some(&json!(9)));
        assert!(q.sql.contains("WHERE \"id_servicio\" = $4::int4"));
    }

    #[test]
    fn delete_targets_the_primary_key() {
        let e = entity_by_path("tratamientos").unwrap();
        assert_eq!(
            delete(e),
            "DELETE FROM \"tratamientos\" WHERE \"id_tratamiento\" = $1::int4"
        );
    }
}
