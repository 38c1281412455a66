use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::BookingView;

/// Events pushed to every connected viewer over the WebSocket channel.
/// Delivery is best-effort: a viewer that connects after an event was
/// published relies on its initial full-state fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum PortalEvent {
    /// A booking was admitted. Carries the fully resolved booking plus a
    /// ready-to-display summary line.
    BookingCreated {
        booking: BookingView,
        message: String,
    },

    /// A booking was cancelled. The booking itself is gone, so only its id
    /// and the summary assembled before deletion travel with the event.
    BookingDeleted { booking_id: Uuid, message: String },
}
