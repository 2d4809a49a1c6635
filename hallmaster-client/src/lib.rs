//! hallmaster-client library interface
//!
//! Room registry, booking collation and tiered search over the Hallmaster
//! venue scheduler, plus the HTTP client that feeds them.

pub mod client;
pub mod collator;
pub mod markup;
pub mod matcher;
pub mod registry;
pub mod service;
pub mod sources;

pub use crate::client::HallmasterClient;
pub use crate::collator::collate;
pub use crate::matcher::{acronym, SearchHit, SearchMatcher, SearchOptions, SearchResults};
pub use crate::registry::RoomRegistry;
pub use crate::service::HallService;
pub use crate::sources::{BookingSource, DescriptionFetcher, RoomDirectorySource};
