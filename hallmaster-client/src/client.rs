//! Hallmaster scheduler HTTP client
//!
//! Implements the room directory, booking source and description collaborator
//! traits against the public scheduler endpoints:
//! - `GET /Scheduler/View/{hall}` (room legend, HTML)
//! - `GET /api/Scheduler/GetBookings` (booking entries, JSON)
//! - `GET /Scheduler/ViewBooking/{id}` (booking details, HTML)
//!
//! Requests are plain and sequential. Timeouts come from the configured
//! reqwest client; nothing here retries.

use crate::markup::{parse_description, parse_room_directory};
use crate::sources::{BookingSource, DescriptionFetcher, RoomDirectorySource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hallmaster_common::config::ClientSettings;
use hallmaster_common::time::format_wire_time;
use hallmaster_common::{Error, RawBookingEntry, Result, RoomDirectoryEntry, RoomFilter};
use tracing::{debug, info};

/// Hallmaster API client for a single hall
#[derive(Debug, Clone)]
pub struct HallmasterClient {
    http_client: reqwest::Client,
    settings: ClientSettings,
}

impl HallmasterClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| Error::transport(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn hall_id(&self) -> u32 {
        self.settings.hall_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    /// Send `request` and return the body of a successful response
    async fn get_text(&self, request: reqwest::RequestBuilder, url: &str) -> Result<String> {
        debug!(url = %url, "Querying Hallmaster");

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), error_text));
        }

        response
            .text()
            .await
            .map_err(|e| Error::transport(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl RoomDirectorySource for HallmasterClient {
    async fn fetch_room_directory(&self) -> Result<Vec<RoomDirectoryEntry>> {
        let url = self.url(&format!("/Scheduler/View/{}", self.settings.hall_id));
        let html = self.get_text(self.http_client.get(&url), &url).await?;
        let rooms = parse_room_directory(&html)?;

        info!(
            hall_id = self.settings.hall_id,
            rooms = rooms.len(),
            "Retrieved room directory"
        );

        Ok(rooms)
    }
}

#[async_trait]
impl BookingSource for HallmasterClient {
    async fn fetch_bookings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        rooms: RoomFilter,
    ) -> Result<Vec<RawBookingEntry>> {
        let url = self.url("/api/Scheduler/GetBookings");
        let query = [
            ("roomId", rooms.wire_value().to_string()),
            ("custView", "false".to_string()),
            ("HallId", self.settings.hall_id.to_string()),
            ("start", format_wire_time(&start)),
            ("end", format_wire_time(&end)),
        ];

        let body = self
            .get_text(self.http_client.get(&url).query(&query), &url)
            .await?;
        let entries: Vec<RawBookingEntry> = serde_json::from_str(&body)?;

        info!(
            hall_id = self.settings.hall_id,
            room_id = rooms.wire_value(),
            entries = entries.len(),
            "Retrieved booking entries"
        );

        Ok(entries)
    }
}

#[async_trait]
impl DescriptionFetcher for HallmasterClient {
    async fn fetch_description(&self, booking_id: i64) -> Result<String> {
        let url = self.url(&format!("/Scheduler/ViewBooking/{}", booking_id));
        let html = self.get_text(self.http_client.get(&url), &url).await?;
        Ok(parse_description(&html))
    }
}
