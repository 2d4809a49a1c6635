//! Data model shared by the registry, collator and search matcher

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Description text the remote service yields when a booking has none
pub const EMPTY_DESCRIPTION: &str = " ";

/// Resolved room identity
///
/// Immutable once constructed; owned by the room registry and handed out by
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInfo {
    id: u32,
    name: String,
    color_key: String,
}

impl RoomInfo {
    pub fn new(id: u32, name: impl Into<String>, color_key: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color_key: color_key.into(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color_key(&self) -> &str {
        &self.color_key
    }
}

/// One row of the remote room directory, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDirectoryEntry {
    /// Room id as used by the `roomId` booking filter
    pub id: u32,
    /// Display name
    pub name: String,
    /// Display color, e.g. `#3a87ad`
    pub color_key: String,
}

/// Booking entry as returned by the scheduler API
///
/// One entry per room occupying a slot. Timestamps stay as wire strings until
/// collation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBookingEntry {
    #[serde(rename = "Id")]
    pub id: i64,
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(rename = "color")]
    pub color_key: String,
}

/// Lazily fetched booking description
///
/// Keeps "never fetched" distinct from "fetched, but empty".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum Description {
    #[default]
    Unfetched,
    Fetched(String),
}

impl Description {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Description::Fetched(_))
    }

    /// Text, if fetched
    pub fn text(&self) -> Option<&str> {
        match self {
            Description::Unfetched => None,
            Description::Fetched(text) => Some(text),
        }
    }
}

/// Deduplicated scheduled event spanning one or more rooms
///
/// Identified within one collation pass by `(title, start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Room names in first-encounter order
    pub rooms: Vec<String>,
    description: Description,
}

impl Booking {
    /// Create a booking occupying a single room
    pub fn new(
        id: i64,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            start,
            end,
            rooms: vec![room.into()],
            description: Description::Unfetched,
        }
    }

    /// Collation key: `(title, start, end)`
    pub fn key(&self) -> (&str, DateTime<Utc>, DateTime<Utc>) {
        (&self.title, self.start, self.end)
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Cache a fetched description. The first fetched value wins.
    pub fn attach_description(&mut self, text: String) -> &str {
        if let Description::Unfetched = self.description {
            self.description = Description::Fetched(text);
        }
        self.description.text().unwrap_or(EMPTY_DESCRIPTION)
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.id, self.title)?;
        writeln!(
            f,
            "    {} -> {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )?;
        write!(f, "    rooms: {}", self.rooms.join(", "))?;
        if let Some(text) = self.description.text() {
            let text = text.trim();
            if !text.is_empty() {
                write!(f, "\n    {}", text)?;
            }
        }
        Ok(())
    }
}

/// Room restriction for a booking query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoomFilter {
    #[default]
    All,
    Room(u32),
}

impl RoomFilter {
    /// Value of the `roomId` query parameter (0 = every room)
    pub fn wire_value(&self) -> u32 {
        match self {
            RoomFilter::All => 0,
            RoomFilter::Room(id) => *id,
        }
    }
}

impl From<Option<u32>> for RoomFilter {
    fn from(room: Option<u32>) -> Self {
        match room {
            Some(0) | None => RoomFilter::All,
            Some(id) => RoomFilter::Room(id),
        }
    }
}
