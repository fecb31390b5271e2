//! Project recruitment listings.
//!
//! Owners publish listings made of recruitment entries; other users apply, scrap and discover
//! them through search, filtering and ranking queries.

pub mod clock;
pub mod config;
pub mod error;
pub mod listings;
pub mod telemetry;
