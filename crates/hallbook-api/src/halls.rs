use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use hallbook_db::models::HallRow;
use hallbook_types::api::CreateHallRequest;
use hallbook_types::models::Hall;

use crate::error::ApiError;
use crate::{AppState, parse_timestamp, parse_uuid};

fn hall_from_row(row: HallRow) -> Hall {
    Hall {
        id: parse_uuid(&row.id, "hall id"),
        name: row.name,
        capacity: row.capacity.max(0) as u32,
        created_at: parse_timestamp(&row.created_at),
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Hall>>, ApiError> {
    let rows = tokio::task::spawn_blocking(move || state.db.list_halls()).await??;
    Ok(Json(rows.into_iter().map(hall_from_row).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateHallRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let hall_id = Uuid::new_v4();

    let row = tokio::task::spawn_blocking(move || {
        state
            .db
            .create_hall(&hall_id.to_string(), &req.name, i64::from(req.capacity))?;
        state.db.hall_by_id(&hall_id.to_string())
    })
    .await??
    .ok_or_else(|| ApiError::Internal("created hall vanished".into()))?;

    Ok((StatusCode::CREATED, Json(hall_from_row(row))))
}

/// Deleting an unknown hall is silently ignored. Bookings referencing the
/// hall are left behind as orphans.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    tokio::task::spawn_blocking(move || state.db.delete_hall(&id.to_string())).await??;
    Ok(Json(json!({ "message": "Hall deleted" })))
}
