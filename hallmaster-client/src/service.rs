//! Caller-facing booking queries
//!
//! [`HallService`] owns the collaborators and the session's room registry.
//! The registry is built once in [`HallService::connect`]; every query after
//! that is an independent request/response cycle over a date range.

use crate::collator::collate;
use crate::matcher::{validate_terms, SearchMatcher, SearchOptions, SearchResults};
use crate::registry::RoomRegistry;
use crate::sources::{BookingSource, DescriptionFetcher, RoomDirectorySource};
use chrono::{DateTime, Utc};
use hallmaster_common::{Booking, Error, Result, RoomFilter};
use tracing::info;

/// Booking queries for one hall
pub struct HallService<C> {
    source: C,
    registry: RoomRegistry,
    search_options: SearchOptions,
}

impl<C> HallService<C>
where
    C: RoomDirectorySource + BookingSource + DescriptionFetcher,
{
    /// Fetch the room directory and build the session registry
    pub async fn connect(source: C) -> Result<Self> {
        let directory = source.fetch_room_directory().await?;
        let registry = RoomRegistry::build(directory)?;

        info!(rooms = registry.len(), "Room registry ready");

        Ok(Self {
            source,
            registry,
            search_options: SearchOptions::default(),
        })
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Collated bookings in `[start, end)`, descriptions not yet fetched
    ///
    /// # Errors
    /// `Validation` if `end` precedes `start`; otherwise the first error from
    /// the booking source or collation.
    pub async fn get_bookings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        rooms: RoomFilter,
    ) -> Result<Vec<Booking>> {
        if end < start {
            return Err(Error::Validation(format!(
                "Range end {} precedes start {}",
                end, start
            )));
        }

        let entries = self.source.fetch_bookings(start, end, rooms).await?;
        let bookings = collate(&entries, &self.registry)?;

        info!(
            entries = entries.len(),
            bookings = bookings.len(),
            "Collated bookings"
        );

        Ok(bookings)
    }

    /// Like [`get_bookings`](Self::get_bookings), with every description fetched
    pub async fn get_bookings_with_descriptions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        rooms: RoomFilter,
    ) -> Result<Vec<Booking>> {
        let mut bookings = self.get_bookings(start, end, rooms).await?;
        self.describe_all(&mut bookings).await?;
        Ok(bookings)
    }

    /// Fetch and cache one booking's description
    pub async fn describe<'b>(&self, booking: &'b mut Booking) -> Result<&'b str> {
        SearchMatcher::new(&self.source)
            .ensure_description(booking)
            .await
    }

    /// Fetch and cache every description not yet fetched
    pub async fn describe_all(&self, bookings: &mut [Booking]) -> Result<()> {
        let matcher = SearchMatcher::new(&self.source);
        for booking in bookings.iter_mut() {
            matcher.ensure_description(booking).await?;
        }
        Ok(())
    }

    /// Tiered search over the bookings in `[start, end)`
    pub async fn search<S: AsRef<str>>(
        &self,
        terms: &[S],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        rooms: RoomFilter,
    ) -> Result<SearchResults> {
        validate_terms(terms)?;
        let mut bookings = self.get_bookings(start, end, rooms).await?;
        SearchMatcher::new(&self.source)
            .with_options(self.search_options)
            .search(terms, &mut bookings)
            .await
    }
}
