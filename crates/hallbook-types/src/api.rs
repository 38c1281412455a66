use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub name: String,
}

// -- Halls --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateHallRequest {
    pub name: String,
    pub capacity: u32,
}

// -- Faculty --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFacultyRequest {
    pub username: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FacultyResponse {
    pub id: Uuid,
    pub username: String,
    pub name: String,
}

// -- Bookings --

/// Wire names follow the original portal client (`timeSlot`, not `time_slot`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub hall: Uuid,
    pub date: String,
    pub time_slot: String,
    pub purpose: String,
    pub faculty: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallSummary {
    pub id: Uuid,
    pub name: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultySummary {
    pub id: Uuid,
    pub name: String,
}

/// A booking with its hall and faculty references resolved. References to a
/// deleted hall or account come through as `None` and render as "Unknown".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub hall: Option<HallSummary>,
    pub faculty: Option<FacultySummary>,
    pub date: String,
    pub time_slot: String,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
}

/// One flattened row of the offline export. All fields are display strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub hall: String,
    pub faculty: String,
    pub date: String,
    pub time_slot: String,
    pub purpose: String,
    pub created_at: String,
}
