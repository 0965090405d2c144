//! Wapoki: REST API for a veterinary clinic over PostgreSQL.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;

pub use catalog::{entity_by_path, EntityDef, ENTITIES};
pub use config::AppConfig;
pub use error::{AppError, ConfigError};
pub use routes::{common_routes, entity_routes};
pub use schema::ensure_schema;
pub use service::{CrudService, RequestValidator};
pub use state::AppState;
