//! Generic CRUD execution against PostgreSQL.

use crate::catalog::EntityDef;
use crate::error::AppError;
use crate::sql::{self, PgBindValue};
use serde_json::{Map, Value};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

pub struct CrudService;

impl CrudService {
    /// List every row with resolved foreign-key labels, ordered per entity.
    pub async fn list(pool: &PgPool, entity: &EntityDef) -> Result<Vec<Value>, AppError> {
        let sql = sql::select_list(entity);
        tracing::debug!(entity = entity.path, sql = %sql, "query");
        let rows = sqlx::query(&sql)
            .fetch_all(pool)
            .await
            .map_err(|e| db_err(entity, "list", e))?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Insert one row and return the generated primary key.
    pub async fn create(
        pool: &PgPool,
        entity: &EntityDef,
        body: &Map<String, Value>,
    ) -> Result<i64, AppError> {
        let q = sql::insert(entity, body);
        tracing::debug!(entity = entity.path, sql = %q.sql, "insert");
        let row = bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_one(pool)
            .await
            .map_err(|e| db_err(entity, "create", e))?;
        pk_from_row(&row, entity.pk)
    }

    /// Full-record replace by primary key. `Ok(false)` means no row matched,
    /// which the caller reports as not-found.
    pub async fn update(
        pool: &PgPool,
        entity: &EntityDef,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<bool, AppError> {
        let q = sql::update(entity, id, body);
        tracing::debug!(entity = entity.path, id, sql = %q.sql, "update");
        let done = bind_params(sqlx::query(&q.sql), &q.params)
            .execute(pool)
            .await
            .map_err(|e| db_err(entity, "update", e))?;
        Ok(done.rows_affected() > 0)
    }

    /// Delete by primary key. `Ok(false)` means no row matched.
    pub async fn delete(pool: &PgPool, entity: &EntityDef, id: i64) -> Result<bool, AppError> {
        let sql = sql::delete(entity);
        tracing::debug!(entity = entity.path, id, sql = %sql, "delete");
        let done = sqlx::query(&sql)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_err(entity, "delete", e))?;
        Ok(done.rows_affected() > 0)
    }

    /// Insert a parent row plus its child rows in one transaction. The
    /// child's foreign key to the parent is filled from the generated id;
    /// any failure rolls back everything.
    pub async fn create_with_children(
        pool: &PgPool,
        parent: &EntityDef,
        child: &EntityDef,
        body: &Map<String, Value>,
        children: &[Map<String, Value>],
    ) -> Result<i64, AppError> {
        let link = child
            .foreign_keys()
            .find(|c| c.references == Some(parent.table))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "{} has no foreign key to {}",
                    child.table, parent.table
                ))
            })?;

        let mut tx = pool.begin().await?;
        let q = sql::insert(parent, body);
        tracing::debug!(entity = parent.path, sql = %q.sql, "insert (tx)");
        let row = bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_err(parent, "create", e))?;
        let id = pk_from_row(&row, parent.pk)?;

        for item in children {
            let mut item = item.clone();
            item.insert(link.name.to_string(), Value::from(id));
            let q = sql::insert(child, &item);
            tracing::debug!(entity = child.path, sql = %q.sql, "insert (tx)");
            bind_params(sqlx::query(&q.sql), &q.params)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| db_err(child, "create", e))?;
        }
        tx.commit().await?;
        Ok(id)
    }
}

fn db_err(entity: &EntityDef, op: &'static str, e: sqlx::Error) -> AppError {
    tracing::error!(entity = entity.path, op, error = %e, "statement failed");
    AppError::Db(e)
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = query.bind(PgBindValue::from_json(p));
    }
    query
}

fn pk_from_row(row: &sqlx::postgres::PgRow, pk: &str) -> Result<i64, AppError> {
    use sqlx::Row;
    if let Ok(n) = row.try_get::<i32, _>(pk) {
        return Ok(n as i64);
    }
    let n = row.try_get::<i64, _>(pk)?;
    Ok(n)
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(t)) = row.try_get::<Option<chrono::NaiveTime>, _>(name) {
        return Value::String(t.format("%H:%M:%S").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}
