//! Seed tool: wipes the account and hall directories and loads the demo
//! dataset. Existing bookings are left in place and become orphans.
//!
//! Run against the same HALLBOOK_DB_PATH the server uses.

use std::path::PathBuf;

use tracing::info;
use uuid::Uuid;

use hallbook_api::auth::hash_password;
use hallbook_db::Database;
use hallbook_types::models::Role;

const USERS: [(&str, &str, Role, &str); 6] = [
    ("admin", "admin123", Role::Admin, "Admin User"),
    ("faculty1", "faculty123", Role::Faculty, "Dr. John Smith"),
    ("faculty2", "faculty123", Role::Faculty, "Dr. Sarah Johnson"),
    ("faculty3", "faculty123", Role::Faculty, "Dr. Emily Davis"),
    ("faculty4", "faculty123", Role::Faculty, "Dr. Michael Brown"),
    ("faculty5", "faculty123", Role::Faculty, "Dr. Lisa Wilson"),
];

const HALLS: [(&str, i64); 4] = [
    ("Conference Hall A", 50),
    ("Seminar Room B", 30),
    ("Auditorium", 200),
    ("Meeting Room C", 20),
];

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hallbook=info".into()),
        )
        .init();

    let db_path = std::env::var("HALLBOOK_DB_PATH").unwrap_or_else(|_| "hallbook.db".into());
    let db = Database::open(&PathBuf::from(&db_path))?;

    db.clear_directory()?;

    for (username, password, role, name) in USERS {
        let hash = hash_password(password)?;
        db.create_account(
            &Uuid::new_v4().to_string(),
            username,
            &hash,
            role.as_str(),
            name,
        )?;
    }

    for (name, capacity) in HALLS {
        db.create_hall(&Uuid::new_v4().to_string(), name, capacity)?;
    }

    info!("Database seeded successfully");
    info!("Admin: username=admin, password=admin123");
    for (username, password, role, _) in USERS {
        if role == Role::Faculty {
            info!("Faculty: username={}, password={}", username, password);
        }
    }

    Ok(())
}
