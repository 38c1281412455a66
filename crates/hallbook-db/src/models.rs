/// Database row types — these map directly to SQLite rows.
/// Distinct from hallbook-types API models to keep the DB layer independent.

pub struct AccountRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub name: String,
    pub created_at: String,
}

pub struct HallRow {
    pub id: String,
    pub name: String,
    pub capacity: i64,
    pub created_at: String,
}

/// A booking joined against halls and users. The joined columns are `None`
/// when the referenced hall or account has been deleted.
#[derive(Debug)]
pub struct BookingRow {
    pub id: String,
    pub hall_id: String,
    pub faculty_id: String,
    pub date: String,
    pub time_slot: String,
    pub purpose: String,
    pub created_at: String,
    pub hall_name: Option<String>,
    pub hall_capacity: Option<i64>,
    pub faculty_name: Option<String>,
}
