use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The eight bookable hour slots of a day, in display order.
pub const TIME_SLOTS: [&str; 8] = [
    "9-10", "10-11", "11-12", "12-1", "1-2", "2-3", "3-4", "4-5",
];

/// Per-account booking limit for a single calendar day.
pub const DAILY_BOOKING_QUOTA: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "faculty" => Some(Role::Faculty),
            _ => None,
        }
    }
}

/// An account as exposed over the API. The password hash never leaves the
/// database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hall {
    pub id: Uuid,
    pub name: String,
    pub capacity: u32,
    pub created_at: DateTime<Utc>,
}
