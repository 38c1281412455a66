use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use hallbook_types::api::{CreateFacultyRequest, FacultyResponse};
use hallbook_types::models::{Account, Role};

use crate::auth::hash_password;
use crate::error::ApiError;
use crate::{AppState, parse_timestamp, parse_uuid};

/// Full account records minus the password hash, which never leaves the
/// database layer.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    let rows = tokio::task::spawn_blocking(move || state.db.list_faculty()).await??;
    let faculty = rows
        .into_iter()
        .map(|row| Account {
            id: parse_uuid(&row.id, "account id"),
            username: row.username,
            role: Role::parse(&row.role).unwrap_or(Role::Faculty),
            name: row.name,
            created_at: parse_timestamp(&row.created_at),
        })
        .collect();
    Ok(Json(faculty))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateFacultyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let faculty_id = Uuid::new_v4();

    // Hashing and the insert both block; the unique index on username turns
    // a duplicate into a typed conflict.
    let username = req.username.clone();
    let name = req.name.clone();
    tokio::task::spawn_blocking(move || {
        let password_hash = hash_password(&req.password)?;
        state
            .db
            .create_account(
                &faculty_id.to_string(),
                &req.username,
                &password_hash,
                Role::Faculty.as_str(),
                &req.name,
            )
            .map_err(ApiError::from)
    })
    .await??;

    Ok((
        StatusCode::CREATED,
        Json(FacultyResponse {
            id: faculty_id,
            username,
            name,
        }),
    ))
}

/// Deleting an unknown account is silently ignored. Bookings held by the
/// account are left behind as orphans.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    tokio::task::spawn_blocking(move || state.db.delete_account(&id.to_string())).await??;
    Ok(Json(json!({ "message": "Faculty deleted" })))
}
