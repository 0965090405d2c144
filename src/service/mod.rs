pub mod auth;
pub mod crud;
pub mod validation;

pub use auth::Identity;
pub use crud::CrudService;
pub use validation::RequestValidator;
