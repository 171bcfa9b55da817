//! `erbeds` - Real-time emergency room bed availability
//!
//! This library fetches available ER beds from the national emergency medical
//! center open API, reshapes them into hospital records, optionally geocodes
//! them, and serves the results over a small HTTP API.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod beds;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod error;
pub mod geocode;
pub mod hospital;
pub mod logging;
pub mod region;
pub mod server;
pub mod view;

#[cfg(test)]
mod test_support;

pub use beds::{BedQuery, BedSource, PublicDataClient};
pub use config::Config;
pub use enrich::{locate_all, EnrichReport};
pub use error::{Error, Result};
pub use geocode::{Geocoder, KakaoClient, Location};
pub use hospital::{BedStatus, Hospital, Stats};
pub use logging::init_logging;
pub use region::RegionQuery;
