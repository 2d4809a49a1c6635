//! Booking collation
//!
//! The scheduler reports one entry per room occupying a slot. Entries sharing
//! `(title, start, end)` are the same event spread over several rooms and are
//! merged into a single [`Booking`] whose room list keeps first-seen order.

use crate::registry::RoomRegistry;
use chrono::{DateTime, Utc};
use hallmaster_common::time::parse_entry_time;
use hallmaster_common::{Booking, RawBookingEntry, Result};
use std::collections::HashMap;
use tracing::debug;

/// Titles the scheduler uses for opaque or blocked slots
pub const PLACEHOLDER_TITLES: [&str; 2] = ["Private Booking", "Provisional Booking"];

/// True when the title marks a blocked slot rather than a real event
pub fn is_placeholder(title: &str) -> bool {
    PLACEHOLDER_TITLES.contains(&title)
}

type CollationKey = (String, DateTime<Utc>, DateTime<Utc>);

/// Merge raw per-room entries into bookings
///
/// Output keeps the order in which distinct keys were first seen. Placeholder
/// entries are dropped before their color is resolved.
///
/// # Errors
/// - `NotFound` if an entry's color is not in the registry
/// - `Validation` if an entry's timestamps cannot be parsed
///
/// The first error aborts the pass; no partial result is returned.
pub fn collate<'a, I>(entries: I, registry: &RoomRegistry) -> Result<Vec<Booking>>
where
    I: IntoIterator<Item = &'a RawBookingEntry>,
{
    let mut bookings: Vec<Booking> = Vec::new();
    let mut index: HashMap<CollationKey, usize> = HashMap::new();
    let mut skipped = 0usize;
    let mut merged = 0usize;

    for entry in entries {
        if is_placeholder(&entry.title) {
            skipped += 1;
            continue;
        }

        let start = parse_entry_time(&entry.start)?;
        let end = parse_entry_time(&entry.end)?;
        let room = registry.lookup(&entry.color_key)?.name();

        let key = (entry.title.clone(), start, end);
        match index.get(&key) {
            Some(&position) => {
                bookings[position].rooms.push(room.to_string());
                merged += 1;
            }
            None => {
                index.insert(key, bookings.len());
                bookings.push(Booking::new(entry.id, entry.title.clone(), start, end, room));
            }
        }
    }

    debug!(
        bookings = bookings.len(),
        merged,
        placeholders = skipped,
        "Collated booking entries"
    );

    Ok(bookings)
}
