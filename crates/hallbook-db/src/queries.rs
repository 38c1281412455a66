use rusqlite::Connection;

use crate::models::{AccountRow, BookingRow, HallRow};
use crate::{Database, StoreError, StoreResult};

use hallbook_types::models::DAILY_BOOKING_QUOTA;

impl Database {
    // -- Accounts --

    pub fn create_account(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
        role: &str,
        name: &str,
    ) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, role, name) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, username, password_hash, role, name),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::UsernameTaken
                } else {
                    e.into()
                }
            })?;
            Ok(())
        })
    }

    pub fn account_by_username(&self, username: &str) -> StoreResult<Option<AccountRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, role, name, created_at
                 FROM users WHERE username = ?1",
            )?;
            stmt.query_row([username], read_account).optional()
        })
    }

    pub fn list_faculty(&self) -> StoreResult<Vec<AccountRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, role, name, created_at
                 FROM users WHERE role = 'faculty' ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([], read_account)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Deleting an unknown id is a no-op, matching the endpoint contract.
    pub fn delete_account(&self, id: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Halls --

    pub fn create_hall(&self, id: &str, name: &str, capacity: i64) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO halls (id, name, capacity) VALUES (?1, ?2, ?3)",
                (id, name, capacity),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::HallNameTaken
                } else {
                    e.into()
                }
            })?;
            Ok(())
        })
    }

    pub fn list_halls(&self) -> StoreResult<Vec<HallRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, capacity, created_at FROM halls ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(HallRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        capacity: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn hall_by_id(&self, id: &str) -> StoreResult<Option<HallRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, capacity, created_at FROM halls WHERE id = ?1")?;
            stmt.query_row([id], |row| {
                Ok(HallRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    capacity: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })
            .optional()
        })
    }

    pub fn delete_hall(&self, id: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM halls WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Bookings --

    /// Admit a booking. The slot-conflict check, the daily-quota count and
    /// the insert run in a single transaction behind the connection mutex,
    /// so the quota invariant holds even for simultaneous requests. The
    /// compound unique index backstops the slot invariant: a racing insert
    /// that slips past the check still loses with `SlotTaken`.
    pub fn create_booking(
        &self,
        id: &str,
        hall_id: &str,
        faculty_id: &str,
        date: &str,
        time_slot: &str,
        purpose: &str,
    ) -> StoreResult<BookingRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let occupied: Option<String> = tx
                .query_row(
                    "SELECT id FROM bookings WHERE hall_id = ?1 AND date = ?2 AND time_slot = ?3",
                    (hall_id, date, time_slot),
                    |row| row.get(0),
                )
                .optional()?;
            if occupied.is_some() {
                return Err(StoreError::SlotTaken);
            }

            let held_today: u32 = tx.query_row(
                "SELECT COUNT(*) FROM bookings WHERE faculty_id = ?1 AND date = ?2",
                (faculty_id, date),
                |row| row.get(0),
            )?;
            if held_today >= DAILY_BOOKING_QUOTA {
                return Err(StoreError::QuotaExceeded);
            }

            tx.execute(
                "INSERT INTO bookings (id, hall_id, faculty_id, date, time_slot, purpose)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, hall_id, faculty_id, date, time_slot, purpose),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::SlotTaken
                } else {
                    e.into()
                }
            })?;

            let row = query_booking(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn list_bookings(&self) -> StoreResult<Vec<BookingRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{BOOKING_SELECT} ORDER BY b.created_at"
            ))?;
            let rows = stmt
                .query_map([], read_booking)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Fetch and delete a booking in one locked call. Returns the populated
    /// row, or `None` if the booking was already gone. Holding the
    /// connection for both steps means concurrent cancellations of the same
    /// id resolve to a single winner.
    pub fn take_booking(&self, id: &str) -> StoreResult<Option<BookingRow>> {
        self.with_conn(|conn| {
            let row = query_booking(conn, id)?;
            if row.is_some() {
                conn.execute("DELETE FROM bookings WHERE id = ?1", [id])?;
            }
            Ok(row)
        })
    }

    // -- Seed support --

    /// Wipe the directory tables (accounts and halls) ahead of reseeding.
    /// Bookings are left alone; existing rows simply become orphans.
    pub fn clear_directory(&self) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM users", [])?;
            conn.execute("DELETE FROM halls", [])?;
            Ok(())
        })
    }
}

// LEFT JOINs so bookings that outlived their hall or faculty still come back,
// with the joined columns NULL.
const BOOKING_SELECT: &str = "
    SELECT b.id, b.hall_id, b.faculty_id, b.date, b.time_slot, b.purpose, b.created_at,
           h.name, h.capacity, u.name
    FROM bookings b
    LEFT JOIN halls h ON b.hall_id = h.id
    LEFT JOIN users u ON b.faculty_id = u.id";

fn query_booking(conn: &Connection, id: &str) -> StoreResult<Option<BookingRow>> {
    let mut stmt = conn.prepare(&format!("{BOOKING_SELECT} WHERE b.id = ?1"))?;
    stmt.query_row([id], read_booking).optional()
}

fn read_account(row: &rusqlite::Row<'_>) -> Result<AccountRow, rusqlite::Error> {
    Ok(AccountRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        role: row.get(3)?,
        name: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn read_booking(row: &rusqlite::Row<'_>) -> Result<BookingRow, rusqlite::Error> {
    Ok(BookingRow {
        id: row.get(0)?,
        hall_id: row.get(1)?,
        faculty_id: row.get(2)?,
        date: row.get(3)?,
        time_slot: row.get(4)?,
        purpose: row.get(5)?,
        created_at: row.get(6)?,
        hall_name: row.get(7)?,
        hall_capacity: row.get(8)?,
        faculty_name: row.get(9)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
