use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL,
            name        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS halls (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            capacity    INTEGER NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- hall_id and faculty_id are plain text references, not foreign
        -- keys: deleting a hall or account leaves its bookings behind as
        -- orphans. The compound unique index is the double-booking guard.
        CREATE TABLE IF NOT EXISTS bookings (
            id          TEXT PRIMARY KEY,
            hall_id     TEXT NOT NULL,
            faculty_id  TEXT NOT NULL,
            date        TEXT NOT NULL,
            time_slot   TEXT NOT NULL,
            purpose     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(hall_id, date, time_slot)
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_faculty_date
            ON bookings(faculty_id, date);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
