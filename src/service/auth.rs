//! Credential hashing and the login lookup.
//!
//! Passwords are stored as argon2id hashes. The login contract stays the
//! same as the legacy system (username + password in, minimal identity out)
//! and never reveals which of the two fields was wrong.

use crate::error::AppError;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use serde::Serialize;
use sqlx::{PgPool, Row};

/// Minimal identity projection returned on a successful login.
#[derive(Serialize, Debug, Clone)]
pub struct Identity {
    pub id_usuario: i32,
    pub usuario: String,
    pub rol: String,
}

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hash: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(stored: &str, plain: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Look up the user by exact username and verify the password hash. A
/// missing user and a wrong password are the same unauthorized error.
pub async fn login(pool: &PgPool, usuario: &str, contrasena: &str) -> Result<Identity, AppError> {
    let row = sqlx::query(
        "SELECT \"id_usuario\", \"usuario\", \"rol\", \"contrasena\" \
         FROM \"usuarios\" WHERE \"usuario\" = $1",
    )
    .bind(usuario)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(op = "login", error = %e, "statement failed");
        AppError::Db(e)
    })?;
    let Some(row) = row else {
        return Err(AppError::Unauthorized);
    };
    let stored: String = row.try_get("contrasena")?;
    if !verify_password(&stored, contrasena) {
        return Err(AppError::Unauthorized);
    }
    Ok(Identity {
        id_usuario: row.try_get("id_usuario")?,
        usuario: row.try_get("usuario")?,
        rol: row.try_get("rol")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_the_plaintext() {
        let h = hash_password("Tatiana123456").unwrap();
        assert_ne!(h, "Tatiana123456");
        assert!(h.starts_with("$argon2"));
    }

    #[test]
    fn verify_accepts_the_original_password() {
        let h = hash_password("secreta").unwrap();
        assert!(verify_password(&h, "secreta"));
    }

    #[test]
    fn verify_rejects_a_wrong_password() {
        let h = hash_password("secreta").unwrap();
        assert!(!verify_password(&h, "secret"));
    }

    #[test]
    fn verify_rejects_garbage_stored_values() {
        assert!(!verify_password("not-a-hash", "secreta"));
        assert!(!verify_password("", "secreta"));
    }

    #[test]
    fn two_hashes_of_one_password_differ() {
        let a = hash_password("secreta").unwrap();
        let b = hash_password("secreta").unwrap();
        assert_ne!(a, b);
    }
}
