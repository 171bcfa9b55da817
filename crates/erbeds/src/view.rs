//! Presentation models built from [`Hospital`] records.
//!
//! These are what the JSON API and the CLI render: summary cards, a detail
//! view, list statistics and the map overlay.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::MapConfig;
use crate::hospital::{display_count, Availability, BedStatus, Coordinates, Hospital, Stats};
use crate::region::RegionQuery;

/// Keep only hospitals whose name contains `query`, ignoring case.
///
/// An empty query keeps everything.
#[must_use]
pub fn search(hospitals: Vec<Hospital>, query: &str) -> Vec<Hospital> {
    if query.trim().is_empty() {
        return hospitals;
    }
    hospitals
        .into_iter()
        .filter(|h| h.matches_name(query))
        .collect()
}

/// Summary card for one hospital.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalCard {
    /// Institution id.
    pub id: String,
    /// Institution name.
    pub name: String,
    /// ER phone number.
    pub phone: String,
    /// ER general beds.
    pub er_general: i64,
    /// ER pediatric beds.
    pub er_pediatric: i64,
    /// ER night beds.
    pub er_night: i64,
    /// Sum of the three ER counts.
    pub er_total: i64,
    /// Status derived from the total.
    pub status: BedStatus,
    /// Color tone of the status.
    pub tone: &'static str,
    /// Badge text: the bed count, or `Full`.
    pub badge: String,
    /// Neurological ICU, `N/A` when unknown.
    pub icu_neuro: String,
    /// General ICU, `N/A` when unknown.
    pub icu_general: String,
    /// CT availability.
    pub ct: Availability,
    /// MRI availability.
    pub mri: Availability,
    /// Ventilators.
    pub ventilators: i64,
    /// Ambulances.
    pub ambulances: i64,
}

impl From<&Hospital> for HospitalCard {
    fn from(h: &Hospital) -> Self {
        let er_total = h.er_total();
        let status = h.bed_status();
        Self {
            id: h.id.clone(),
            name: h.name.clone(),
            phone: h.phone.clone(),
            er_general: h.er_general,
            er_pediatric: h.er_pediatric,
            er_night: h.er_night,
            er_total,
            status,
            tone: status.tone(),
            badge: badge(er_total),
            icu_neuro: display_count(h.icu_neuro),
            icu_general: display_count(h.icu_general),
            ct: h.ct,
            mri: h.mri,
            ventilators: h.ventilators,
            ambulances: h.ambulances,
        }
    }
}

fn badge(total: i64) -> String {
    if total > 0 {
        format!("{total} beds")
    } else {
        BedStatus::Full.label().to_string()
    }
}

/// A filtered hospital list with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalList {
    /// Region the list was fetched for.
    pub region: RegionQuery,
    /// Name filter applied, if any.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    /// Statistics over the listed hospitals.
    pub stats: Stats,
    /// One card per hospital.
    pub hospitals: Vec<HospitalCard>,
}

impl HospitalList {
    /// Build the list view.
    #[must_use]
    pub fn new(region: RegionQuery, search: &str, hospitals: &[Hospital]) -> Self {
        Self {
            region,
            search: search.trim().to_string(),
            stats: Stats::from_hospitals(hospitals),
            hospitals: hospitals.iter().map(HospitalCard::from).collect(),
        }
    }
}

/// One labelled row in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    /// Row label.
    pub label: &'static str,
    /// Rendered value.
    pub value: String,
}

/// Equipment availability in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentRow {
    /// Equipment name.
    pub label: &'static str,
    /// Whether it is available.
    pub available: bool,
    /// `Available` or `Unavailable`.
    pub text: &'static str,
}

impl EquipmentRow {
    fn new(label: &'static str, available: bool) -> Self {
        Self {
            label,
            available,
            text: if available { "Available" } else { "Unavailable" },
        }
    }
}

/// Full view of a single hospital.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalDetail {
    /// The summary card.
    #[serde(flatten)]
    pub card: HospitalCard,
    /// Status label (`Full`, `Scarce`, `Available`).
    pub status_label: &'static str,
    /// Intensive care units.
    pub icu: Vec<DetailRow>,
    /// Operating rooms and wards.
    pub wards: Vec<DetailRow>,
    /// Equipment availability.
    pub equipment: Vec<EquipmentRow>,
    /// When the upstream data was last updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    /// Position, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

impl From<&Hospital> for HospitalDetail {
    fn from(h: &Hospital) -> Self {
        let row = |label, value: String| DetailRow { label, value };
        Self {
            card: HospitalCard::from(h),
            status_label: h.bed_status().label(),
            icu: vec![
                row("Neurological ICU", display_count(h.icu_neuro)),
                row("Neonatal ICU", display_count(h.icu_neonatal)),
                row("Thoracic ICU", display_count(h.icu_thoracic)),
                row("General ICU", display_count(h.icu_general)),
            ],
            wards: vec![
                row("Operating room", h.or_general.to_string()),
                row("Neurosurgery OR", display_count(h.or_neurosurgery)),
                row("Cardiovascular OR", h.or_cardiovascular.to_string()),
                row("Thoracic OR", display_count(h.or_thoracic)),
                row("Inpatient ward", h.inpatient.to_string()),
                row("Pediatric ward", h.inpatient_pediatric.to_string()),
            ],
            equipment: vec![
                EquipmentRow::new("CT", h.ct.is_available()),
                EquipmentRow::new("MRI", h.mri.is_available()),
                EquipmentRow::new("Ventilator", h.ventilators > 0),
                EquipmentRow::new("Ambulance", h.ambulances > 0),
            ],
            updated_at: h.updated_at,
            location: h.location,
        }
    }
}

/// A hospital pin on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Institution id.
    pub id: String,
    /// Name shown when hovering the pin.
    pub name: String,
    /// Position.
    pub position: Coordinates,
    /// Status of the hospital.
    pub status: BedStatus,
}

/// Rectangle covering a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    /// South-west corner.
    pub south_west: Coordinates,
    /// North-east corner.
    pub north_east: Coordinates,
}

impl Bounds {
    /// A zero-size rectangle at a point.
    #[must_use]
    pub fn at(point: Coordinates) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Grow the rectangle to include a point.
    pub fn extend(&mut self, point: Coordinates) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lon = self.south_west.lon.min(point.lon);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lon = self.north_east.lon.max(point.lon);
    }
}

/// The map overlay for a hospital list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// Initial center, used when there are no markers.
    pub center: Coordinates,
    /// Initial zoom level.
    pub level: u8,
    /// One marker per located hospital.
    pub markers: Vec<Marker>,
    /// Area to fit so every marker is visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl MapView {
    /// Build the overlay.
    ///
    /// A zero latitude or longitude is treated as "not located"; the upstream
    /// API fills unknown positions with zeros.
    #[must_use]
    pub fn new(config: &MapConfig, hospitals: &[Hospital]) -> Self {
        let markers: Vec<Marker> = hospitals
            .iter()
            .filter_map(|h| {
                let position = h.location?;
                (position.lat != 0.0 && position.lon != 0.0).then(|| Marker {
                    id: h.id.clone(),
                    name: h.name.clone(),
                    position,
                    status: h.bed_status(),
                })
            })
            .collect();

        let bounds = markers.split_first().map(|(first, rest)| {
            rest.iter().fold(Bounds::at(first.position), |mut b, m| {
                b.extend(m.position);
                b
            })
        });

        Self {
            center: Coordinates {
                lat: config.center_lat,
                lon: config.center_lon,
            },
            level: config.level,
            markers,
            bounds,
        }
    }
}
