//! Hospital records from the public bed-availability API.
//!
//! [`RawHospital`] mirrors one `item` of the upstream payload, with its terse
//! field codes (`hv1`, `hvec`, ...). [`Hospital`] is the reshaped record the
//! rest of the crate works with.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Placeholder shown for missing text and counts.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format of the upstream `hvidate` update timestamp.
const UPDATE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// One hospital as returned by the upstream API.
///
/// Numeric fields arrive either as JSON numbers or as numeric strings, so every
/// field is parsed leniently; anything unparseable is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawHospital {
    /// Institution name.
    #[serde(rename = "dutyName", default, deserialize_with = "lenient::text")]
    pub duty_name: Option<String>,
    /// ER direct phone number.
    #[serde(rename = "dutyTel3", default, deserialize_with = "lenient::text")]
    pub duty_tel3: Option<String>,
    /// Institution id.
    #[serde(default, deserialize_with = "lenient::text")]
    pub hpid: Option<String>,

    /// ER general beds.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv1: Option<i64>,
    /// ER pediatric beds.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv2: Option<i64>,
    /// ER night beds.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv3: Option<i64>,
    /// Operating room, general.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv4: Option<i64>,
    /// Operating room, neurosurgery.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv5: Option<i64>,
    /// Operating room, cardiovascular.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv6: Option<i64>,
    /// Operating room, thoracic.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv7: Option<i64>,
    /// Neurological ICU.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv10: Option<i64>,
    /// Neonatal ICU.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv11: Option<i64>,
    /// Thoracic ICU.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv12: Option<i64>,
    /// General ICU.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv13: Option<i64>,
    /// Inpatient ward.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv17: Option<i64>,
    /// Pediatric inpatient ward.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv18: Option<i64>,
    /// Ventilators.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv28: Option<i64>,
    /// Contrast imaging devices.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv29: Option<i64>,
    /// Ambulances.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hv30: Option<i64>,
    /// ER beds.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hvec: Option<i64>,
    /// Inpatient beds.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hvcc: Option<i64>,
    /// Operating room beds.
    #[serde(default, deserialize_with = "lenient::int")]
    pub hvoc: Option<i64>,

    /// CT availability flag (`Y`/`N`).
    #[serde(default, deserialize_with = "lenient::text")]
    pub hvctayn: Option<String>,
    /// MRI availability flag (`Y`/`N`).
    #[serde(default, deserialize_with = "lenient::text")]
    pub hvmriayn: Option<String>,
    /// Last update time, `YYYYMMDDHHMMSS`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub hvidate: Option<String>,

    /// Latitude (WGS84).
    #[serde(rename = "wgs84Lat", default, deserialize_with = "lenient::float")]
    pub wgs84_lat: Option<f64>,
    /// Longitude (WGS84).
    #[serde(rename = "wgs84Lon", default, deserialize_with = "lenient::float")]
    pub wgs84_lon: Option<f64>,
}

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Availability of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// The upstream flag is `Y`.
    Yes,
    /// The upstream flag is `N`.
    No,
    /// The flag is missing or unrecognized.
    Unknown,
}

impl Availability {
    /// Parse an upstream `Y`/`N` flag.
    #[must_use]
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("y") => Self::Yes,
            Some(f) if f.eq_ignore_ascii_case("n") => Self::No,
            _ => Self::Unknown,
        }
    }

    /// Whether the equipment is available.
    #[must_use]
    pub fn is_available(self) -> bool {
        self == Self::Yes
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "Y"),
            Self::No => write!(f, "N"),
            Self::Unknown => write!(f, "{NOT_AVAILABLE}"),
        }
    }
}

/// How crowded an emergency room is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedStatus {
    /// No ER beds left.
    Full,
    /// Between one and three ER beds left.
    Scarce,
    /// More than three ER beds left.
    Available,
}

impl BedStatus {
    /// Upper bound (inclusive) of the scarce range.
    pub const SCARCE_MAX: i64 = 3;

    /// Classify a total ER bed count.
    ///
    /// The upstream API reports negative counts when a room is over capacity;
    /// those are full.
    #[must_use]
    pub fn from_total(total: i64) -> Self {
        if total <= 0 {
            Self::Full
        } else if total <= Self::SCARCE_MAX {
            Self::Scarce
        } else {
            Self::Available
        }
    }

    /// Color tone used to display this status.
    #[must_use]
    pub fn tone(self) -> &'static str {
        match self {
            Self::Full => "red",
            Self::Scarce => "orange",
            Self::Available => "green",
        }
    }

    /// Short human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Scarce => "Scarce",
            Self::Available => "Available",
        }
    }
}

impl std::fmt::Display for BedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// A hospital with its bed availability, reshaped from [`RawHospital`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    /// Institution id (`hpid`).
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

    /// Operating room, general.
    pub or_general: i64,
    /// Operating room, neurosurgery.
    pub or_neurosurgery: Option<i64>,
    /// Operating room, cardiovascular.
    pub or_cardiovascular: i64,
    /// Operating room, thoracic.
    pub or_thoracic: Option<i64>,

    /// Neurological ICU.
    pub icu_neuro: Option<i64>,
    /// Neonatal ICU.
    pub icu_neonatal: Option<i64>,
    /// Thoracic ICU.
    pub icu_thoracic: Option<i64>,
    /// General ICU.
    pub icu_general: Option<i64>,

    /// Inpatient ward.
    pub inpatient: i64,
    /// Pediatric inpatient ward.
    pub inpatient_pediatric: i64,

    /// ER beds.
    pub er_beds: i64,
    /// Inpatient beds.
    pub inpatient_beds: i64,
    /// Operating room beds.
    pub or_beds: i64,

    /// CT availability.
    pub ct: Availability,
    /// MRI availability.
    pub mri: Availability,
    /// Ventilators.
    pub ventilators: i64,
    /// Contrast imaging devices.
    pub contrast_imaging: i64,
    /// Ambulances.
    pub ambulances: i64,

    /// When the upstream data was last updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,

    /// Position of the hospital, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

impl Hospital {
    /// Reshape an upstream record.
    #[must_use]
    pub fn from_raw(raw: RawHospital) -> Self {
        // The upstream API fills unknown positions with zeros
        let location = match (raw.wgs84_lat, raw.wgs84_lon) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => Some(Coordinates { lat, lon }),
            _ => None,
        };
        let updated_at = raw
            .hvidate
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), UPDATE_TIME_FORMAT).ok());

        Self {
            id: text_or_na(raw.hpid),
            name: text_or_na(raw.duty_name),
            phone: text_or_na(raw.duty_tel3),
            er_general: raw.hv1.unwrap_or(0),
            er_pediatric: raw.hv2.unwrap_or(0),
            er_night: raw.hv3.unwrap_or(0),
            or_general: raw.hv4.unwrap_or(0),
            or_neurosurgery: raw.hv5,
            or_cardiovascular: raw.hv6.unwrap_or(0),
            or_thoracic: raw.hv7,
            icu_neuro: raw.hv10,
            icu_neonatal: raw.hv11,
            icu_thoracic: raw.hv12,
            icu_general: raw.hv13,
            inpatient: raw.hv17.unwrap_or(0),
            inpatient_pediatric: raw.hv18.unwrap_or(0),
            er_beds: raw.hvec.unwrap_or(0),
            inpatient_beds: raw.hvcc.unwrap_or(0),
            or_beds: raw.hvoc.unwrap_or(0),
            ct: Availability::from_flag(raw.hvctayn.as_deref()),
            mri: Availability::from_flag(raw.hvmriayn.as_deref()),
            ventilators: raw.hv28.unwrap_or(0),
            contrast_imaging: raw.hv29.unwrap_or(0),
            ambulances: raw.hv30.unwrap_or(0),
            updated_at,
            location,
        }
    }

    /// Total available ER beds (general + pediatric + night).
    #[must_use]
    pub fn er_total(&self) -> i64 {
        self.er_general
            .saturating_add(self.er_pediatric)
            .saturating_add(self.er_night)
    }

    /// Status derived from the ER total.
    #[must_use]
    pub fn bed_status(&self) -> BedStatus {
        BedStatus::from_total(self.er_total())
    }

    /// Whether at least one ER bed is free.
    #[must_use]
    pub fn has_er_beds(&self) -> bool {
        self.er_total() > 0
    }

    /// Case-insensitive substring match on the name.
    #[must_use]
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }

    /// Set the hospital's position.
    pub fn set_location(&mut self, lat: f64, lon: f64) {
        self.location = Some(Coordinates { lat, lon });
    }
}

impl From<RawHospital> for Hospital {
    fn from(raw: RawHospital) -> Self {
        Self::from_raw(raw)
    }
}

/// Render an optional count, `N/A` when absent.
#[must_use]
pub fn display_count(count: Option<i64>) -> String {
    count.map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string())
}

fn text_or_na(value: Option<String>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Aggregate figures over a list of hospitals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of hospitals listed.
    pub total_hospitals: usize,
    /// Sum of ER beds over all hospitals.
    pub total_beds: i64,
    /// Number of hospitals with at least one ER bed.
    pub available_hospitals: usize,
}

impl Stats {
    /// Compute statistics for a list of hospitals.
    #[must_use]
    pub fn from_hospitals(hospitals: &[Hospital]) -> Self {
        hospitals.iter().fold(Self::default(), |mut stats, h| {
            stats.total_hospitals += 1;
            stats.total_beds = stats.total_beds.saturating_add(h.er_total());
            if h.has_er_beds() {
                stats.available_hospitals += 1;
            }
            stats
        })
    }
}

/// Lenient field deserializers for upstream payloads.
mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    pub(super) fn int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Int(n)) => Some(n),
            #[allow(clippy::cast_possible_truncation)]
            Some(Scalar::Float(f)) if f.is_finite() => Some(f.trunc() as i64),
            Some(Scalar::Text(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub(super) fn float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            #[allow(clippy::cast_precision_loss)]
            Some(Scalar::Int(n)) => Some(n as f64),
            Some(Scalar::Float(f)) if f.is_finite() => Some(f),
            Some(Scalar::Text(s)) => s.trim().parse().ok().filter(|f: &f64| f.is_finite()),
            _ => None,
        })
    }

    pub(super) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Text(s)) => Some(s),
            Some(Scalar::Int(n)) => Some(n.to_string()),
            Some(Scalar::Float(f)) => Some(f.to_string()),
            _ => None,
        })
    }
}
