//! Sequential geocoding of hospital lists.
//!
//! The geocoding provider rate-limits by key, so lookups are issued one at a
//! time with a fixed pause between them. A failed lookup is logged and
//! counted; it never stops the rest of the list from being located.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::geocode::Geocoder;
use crate::hospital::{Hospital, NOT_AVAILABLE};

/// Outcome counts of one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichReport {
    /// Hospitals that received coordinates.
    pub located: usize,
    /// Hospitals that needed no lookup.
    pub skipped: usize,
    /// Lookups that returned no match.
    pub not_found: usize,
    /// Lookups that failed.
    pub failed: usize,
}

impl EnrichReport {
    /// Number of lookups issued.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.located + self.not_found + self.failed
    }

    /// Whether every issued lookup failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.failed > 0 && self.failed == self.lookups()
    }
}

/// Fill in missing coordinates, one lookup at a time.
///
/// Hospitals that already have a location, or have no usable name, are left
/// alone. `delay` is waited before every lookup except the first.
pub async fn locate_all(
    geocoder: &dyn Geocoder,
    hospitals: &mut [Hospital],
    delay: Duration,
) -> EnrichReport {
    let mut report = EnrichReport::default();
    let mut issued_any = false;

    for hospital in hospitals.iter_mut() {
        if hospital.location.is_some() || hospital.name == NOT_AVAILABLE {
            report.skipped += 1;
            continue;
        }

        if issued_any && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        issued_any = true;

        match geocoder.locate(&hospital.name).await {
            Ok(Some(location)) => {
                debug!(
                    hospital = %hospital.name,
                    lat = location.lat,
                    lon = location.lon,
                    "Located hospital"
                );
                hospital.set_location(location.lat, location.lon);
                report.located += 1;
            }
            Ok(None) => {
                warn!(hospital = %hospital.name, "No location found");
                report.not_found += 1;
            }
            Err(e) => {
                warn!(hospital = %hospital.name, error = %e, "Geocoding failed");
                report.failed += 1;
            }
        }
    }

    info!(
        located = report.located,
        skipped = report.skipped,
        not_found = report.not_found,
        failed = report.failed,
        "Geocoding pass finished"
    );
    report
}
