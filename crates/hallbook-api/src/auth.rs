use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};

use hallbook_types::api::{LoginRequest, LoginResponse};
use hallbook_types::models::Role;

use crate::error::ApiError;
use crate::{AppState, parse_uuid};

/// Hash a password with Argon2id. Also used by the seed tool.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(format!("stored hash unreadable: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthorized)
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Lookup and argon2 verification both block; run them off the runtime.
    let account = tokio::task::spawn_blocking(move || {
        let account = state
            .db
            .account_by_username(&req.username)
            .map_err(ApiError::from)?
            .ok_or(ApiError::Unauthorized)?;
        verify_password(&req.password, &account.password)?;
        Ok::<_, ApiError>(account)
    })
    .await??;

    let role = Role::parse(&account.role)
        .ok_or_else(|| ApiError::Internal(format!("unknown role '{}'", account.role)))?;

    Ok(Json(LoginResponse {
        id: parse_uuid(&account.id, "account id"),
        username: account.username,
        role,
        name: account.name,
    }))
}
