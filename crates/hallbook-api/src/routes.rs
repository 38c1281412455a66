use axum::{
    Json, Router,
    routing::{delete, get, post},
};
use serde_json::json;

use crate::{AppState, auth, bookings, faculty, halls};

/// Assemble the HTTP API. The WebSocket route and the tower layers are added
/// by the server binary on top of this.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", post(auth::login))
        .route("/halls", get(halls::list).post(halls::create))
        .route("/halls/{id}", delete(halls::remove))
        .route("/faculty", get(faculty::list).post(faculty::create))
        .route("/faculty/{id}", delete(faculty::remove))
        .route("/bookings", get(bookings::list).post(bookings::create))
        .route("/bookings/export", get(bookings::export))
        .route("/bookings/{id}", delete(bookings::remove))
        .with_state(state)
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Hall Booking Portal API",
        "status": "Running",
        "endpoints": {
            "login": "POST /login",
            "halls": "GET /halls",
            "faculty": "GET /faculty",
            "bookings": "GET /bookings",
            "export": "GET /bookings/export",
            "events": "WS /ws"
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use hallbook_db::Database;
    use hallbook_gateway::dispatcher::Dispatcher;
    use hallbook_types::events::PortalEvent;

    use crate::{AppState, AppStateInner};

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            dispatcher: Dispatcher::new(),
        })
    }

    async fn send(
        app: &Router,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_hall(app: &Router, name: &str, capacity: u32) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/halls",
            Some(json!({ "name": name, "capacity": capacity })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_faculty(app: &Router, username: &str, name: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/faculty",
            Some(json!({ "username": username, "password": "faculty123", "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    fn booking_body(hall: &str, faculty: &str, date: &str, slot: &str) -> Value {
        json!({
            "hall": hall,
            "faculty": faculty,
            "date": date,
            "timeSlot": slot,
            "purpose": "Department seminar"
        })
    }

    #[tokio::test]
    async fn login_checks_credentials() {
        let app = super::router(test_state());
        create_faculty(&app, "f1", "Dr. John Smith").await;

        let (status, body) = send(
            &app,
            "POST",
            "/login",
            Some(json!({ "username": "f1", "password": "faculty123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "f1");
        assert_eq!(body["role"], "faculty");
        assert_eq!(body["name"], "Dr. John Smith");

        let (status, body) = send(
            &app,
            "POST",
            "/login",
            Some(json!({ "username": "f1", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");

        let (status, _) = send(
            &app,
            "POST",
            "/login",
            Some(json!({ "username": "ghost", "password": "faculty123" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn directory_listings_reflect_creates() {
        let app = super::router(test_state());
        create_hall(&app, "Room A", 10).await;
        create_faculty(&app, "f1", "Dr. One").await;

        let (status, halls) = send(&app, "GET", "/halls", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(halls.as_array().unwrap().len(), 1);
        assert_eq!(halls[0]["name"], "Room A");
        assert_eq!(halls[0]["capacity"], 10);

        let (status, faculty) = send(&app, "GET", "/faculty", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(faculty[0]["username"], "f1");
        assert_eq!(faculty[0]["role"], "faculty");
        assert_eq!(faculty[0]["name"], "Dr. One");
        assert!(faculty[0].get("password").is_none());
    }

    #[tokio::test]
    async fn duplicate_directory_names_conflict() {
        let app = super::router(test_state());
        create_hall(&app, "Room A", 10).await;
        create_faculty(&app, "f1", "Dr. One").await;

        let (status, body) = send(
            &app,
            "POST",
            "/halls",
            Some(json!({ "name": "Room A", "capacity": 99 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Hall name already exists");

        let (status, body) = send(
            &app,
            "POST",
            "/faculty",
            Some(json!({ "username": "f1", "password": "x", "name": "Dup" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username already exists");
    }

    // Full admission scenario: book, rival conflict, second slot, quota on
    // the third.
    #[tokio::test]
    async fn admission_enforces_slot_and_quota_rules() {
        let app = super::router(test_state());
        let hall = create_hall(&app, "Room A", 10).await;
        let f1 = create_faculty(&app, "f1", "Dr. One").await;
        let f2 = create_faculty(&app, "f2", "Dr. Two").await;

        let (status, body) = send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f1, "2024-01-01", "9-10")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["hall"]["name"], "Room A");
        assert_eq!(body["faculty"]["name"], "Dr. One");

        // Rival wants the same triple.
        let (status, body) = send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f2, "2024-01-01", "9-10")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "This time slot is already booked");

        // Second distinct slot for f1 on the same day is fine.
        let (status, _) = send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f1, "2024-01-01", "10-11")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // Third hits the daily quota.
        let (status, body) = send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f1, "2024-01-01", "11-12")),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "You can only book a maximum of 2 slots per day");
    }

    #[tokio::test]
    async fn create_broadcasts_one_resolved_event_per_session() {
        let state = test_state();
        let app = super::router(state.clone());
        let hall = create_hall(&app, "Room A", 10).await;
        let f1 = create_faculty(&app, "f1", "Dr. One").await;

        let mut rx1 = state.dispatcher.subscribe();
        let mut rx2 = state.dispatcher.subscribe();

        let (status, _) = send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f1, "2024-01-01", "9-10")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        for rx in [&mut rx1, &mut rx2] {
            match rx.try_recv().unwrap() {
                PortalEvent::BookingCreated { booking, message } => {
                    let hall = booking.hall.expect("hall resolved");
                    let faculty = booking.faculty.expect("faculty resolved");
                    assert_eq!(hall.name, "Room A");
                    assert_eq!(faculty.name, "Dr. One");
                    assert_eq!(
                        message,
                        "Room A has been booked by Dr. One for 9-10 on 01/01/2024"
                    );
                }
                other => panic!("unexpected event: {other:?}"),
            }
            assert!(rx.try_recv().is_err(), "exactly one event per session");
        }
    }

    #[tokio::test]
    async fn cancellation_removes_and_broadcasts() {
        let state = test_state();
        let app = super::router(state.clone());
        let hall = create_hall(&app, "Room A", 10).await;
        let f1 = create_faculty(&app, "f1", "Dr. One").await;

        let (_, created) = send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f1, "2024-01-01", "9-10")),
        )
        .await;
        let booking_id = created["id"].as_str().unwrap().to_string();

        // Subscribe after creation so only the delete event arrives.
        let mut rx = state.dispatcher.subscribe();

        // No ownership check: the request carries no identity at all.
        let (status, body) = send(&app, "DELETE", &format!("/bookings/{booking_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Booking cancelled");

        match rx.try_recv().unwrap() {
            PortalEvent::BookingDeleted {
                booking_id: id,
                message,
            } => {
                assert_eq!(id.to_string(), booking_id);
                assert_eq!(
                    message,
                    "Room A booking for 9-10 on 01/01/2024 has been cancelled by Dr. One"
                );
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());

        let (_, bookings) = send(&app, "GET", "/bookings", None).await;
        assert_eq!(bookings.as_array().unwrap().len(), 0);

        // Already gone.
        let (status, _) = send(&app, "DELETE", &format!("/bookings/{booking_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn export_flattens_every_booking() {
        let app = super::router(test_state());
        let hall = create_hall(&app, "Room A", 10).await;
        let f1 = create_faculty(&app, "f1", "Dr. One").await;
        let f2 = create_faculty(&app, "f2", "Dr. Two").await;

        send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f1, "2024-01-01", "9-10")),
        )
        .await;
        send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f2, "2024-01-02", "2-3")),
        )
        .await;

        let (status, rows) = send(&app, "GET", "/bookings/export", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = rows.as_array().unwrap().clone();
        assert_eq!(rows.len(), 2);

        let first = rows
            .iter()
            .find(|r| r["timeSlot"] == "9-10")
            .expect("exported row");
        assert_eq!(first["hall"], "Room A");
        assert_eq!(first["faculty"], "Dr. One");
        assert_eq!(first["date"], "01/01/2024");
        assert_eq!(first["purpose"], "Department seminar");
    }

    #[tokio::test]
    async fn orphaned_bookings_export_as_unknown() {
        let app = super::router(test_state());
        let hall = create_hall(&app, "Room A", 10).await;
        let f1 = create_faculty(&app, "f1", "Dr. One").await;

        send(
            &app,
            "POST",
            "/bookings",
            Some(booking_body(&hall, &f1, "2024-01-01", "9-10")),
        )
        .await;

        let (status, _) = send(&app, "DELETE", &format!("/halls/{hall}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, bookings) = send(&app, "GET", "/bookings", None).await;
        assert!(bookings[0]["hall"].is_null());

        let (_, rows) = send(&app, "GET", "/bookings/export", None).await;
        assert_eq!(rows[0]["hall"], "Unknown");
        assert_eq!(rows[0]["faculty"], "Dr. One");
    }

    #[tokio::test]
    async fn directory_deletes_ignore_unknown_ids() {
        let app = super::router(test_state());
        let ghost = uuid::Uuid::new_v4();

        let (status, _) = send(&app, "DELETE", &format!("/halls/{ghost}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "DELETE", &format!("/faculty/{ghost}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
