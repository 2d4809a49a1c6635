//! # Hallmaster Common Library
//!
//! Shared code for the Hallmaster scheduler client including:
//! - Error taxonomy
//! - Room and booking data model
//! - Wire timestamp formatting
//! - Configuration loading

pub mod config;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{Booking, Description, RawBookingEntry, RoomDirectoryEntry, RoomFilter, RoomInfo};
