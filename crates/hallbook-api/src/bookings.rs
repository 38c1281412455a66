use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use hallbook_db::models::BookingRow;
use hallbook_types::api::{
    BookingView, CreateBookingRequest, ExportRow, FacultySummary, HallSummary,
};
use hallbook_types::events::PortalEvent;

use crate::error::ApiError;
use crate::{AppState, parse_timestamp, parse_uuid};

const UNKNOWN: &str = "Unknown";

fn view_from_row(row: BookingRow) -> BookingView {
    let hall = row.hall_name.map(|name| HallSummary {
        id: parse_uuid(&row.hall_id, "hall id"),
        name,
        capacity: row.hall_capacity.unwrap_or(0).max(0) as u32,
    });
    let faculty = row.faculty_name.map(|name| FacultySummary {
        id: parse_uuid(&row.faculty_id, "faculty id"),
        name,
    });

    BookingView {
        id: parse_uuid(&row.id, "booking id"),
        hall,
        faculty,
        date: row.date,
        time_slot: row.time_slot,
        purpose: row.purpose,
        created_at: parse_timestamp(&row.created_at),
    }
}

/// Dates are stored as "YYYY-MM-DD"; summaries and the export render them
/// as "MM/DD/YYYY". Anything unparseable passes through untouched.
fn display_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn hall_name(view: &BookingView) -> &str {
    view.hall.as_ref().map_or(UNKNOWN, |h| h.name.as_str())
}

fn faculty_name(view: &BookingView) -> &str {
    view.faculty.as_ref().map_or(UNKNOWN, |f| f.name.as_str())
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BookingView>>, ApiError> {
    let rows = tokio::task::spawn_blocking(move || state.db.list_bookings()).await??;
    Ok(Json(rows.into_iter().map(view_from_row).collect()))
}

/// Booking admission. The slot-conflict and quota checks run atomically in
/// the store; only one error surfaces per attempt. On success every
/// connected viewer gets a `bookingCreated` event with the resolved booking.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking_id = Uuid::new_v4();

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.create_booking(
            &booking_id.to_string(),
            &req.hall.to_string(),
            &req.faculty.to_string(),
            &req.date,
            &req.time_slot,
            &req.purpose,
        )
    })
    .await??;

    let view = view_from_row(row);
    let message = format!(
        "{} has been booked by {} for {} on {}",
        hall_name(&view),
        faculty_name(&view),
        view.time_slot,
        display_date(&view.date),
    );

    state.dispatcher.broadcast(PortalEvent::BookingCreated {
        booking: view.clone(),
        message,
    });

    Ok((StatusCode::CREATED, Json(view)))
}

/// Booking cancellation. The row is resolved before deletion so the event
/// message can name the hall and faculty; references already deleted render
/// as "Unknown". No ownership check: any caller may cancel any booking.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.take_booking(&id.to_string()))
        .await??
        .ok_or_else(|| ApiError::NotFound("Booking not found".into()))?;

    let view = view_from_row(row);
    let message = format!(
        "{} booking for {} on {} has been cancelled by {}",
        hall_name(&view),
        view.time_slot,
        display_date(&view.date),
        faculty_name(&view),
    );

    state.dispatcher.broadcast(PortalEvent::BookingDeleted {
        booking_id: view.id,
        message,
    });

    Ok(Json(json!({ "message": "Booking cancelled" })))
}

/// Flattened snapshot of every booking for offline use. Read-only.
pub async fn export(State(state): State<AppState>) -> Result<Json<Vec<ExportRow>>, ApiError> {
    let rows = tokio::task::spawn_blocking(move || state.db.list_bookings()).await??;

    let export = rows
        .into_iter()
        .map(|row| ExportRow {
            hall: row.hall_name.unwrap_or_else(|| UNKNOWN.to_string()),
            faculty: row.faculty_name.unwrap_or_else(|| UNKNOWN.to_string()),
            date: display_date(&row.date),
            time_slot: row.time_slot,
            purpose: row.purpose,
            created_at: parse_timestamp(&row.created_at)
                .format("%m/%d/%Y %H:%M:%S")
                .to_string(),
        })
        .collect();

    Ok(Json(export))
}
