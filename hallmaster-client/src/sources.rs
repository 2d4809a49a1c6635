//! Collaborator traits for the remote scheduler
//!
//! [`HallmasterClient`](crate::client::HallmasterClient) implements all three
//! over HTTP. Tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hallmaster_common::{RawBookingEntry, Result, RoomDirectoryEntry, RoomFilter};

/// Source of the room directory (color -> room)
#[async_trait]
pub trait RoomDirectorySource: Send + Sync {
    async fn fetch_room_directory(&self) -> Result<Vec<RoomDirectoryEntry>>;
}

/// Source of raw per-room booking entries
#[async_trait]
pub trait BookingSource: Send + Sync {
    /// Entries overlapping the half-open range `[start, end)`
    async fn fetch_bookings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        rooms: RoomFilter,
    ) -> Result<Vec<RawBookingEntry>>;
}

/// On-demand booking description lookup
///
/// Implementations return [`EMPTY_DESCRIPTION`](hallmaster_common::models::EMPTY_DESCRIPTION)
/// when the booking has no description field.
#[async_trait]
pub trait DescriptionFetcher: Send + Sync {
    async fn fetch_description(&self, booking_id: i64) -> Result<String>;
}
