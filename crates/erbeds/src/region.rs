//! Administrative regions used to filter the bed-availability API.
//!
//! The upstream API takes a province (`STAGE1`) and a district (`STAGE2`) by
//! their Korean names. A district only narrows a province, so a query without
//! a province never carries a district.

use serde::{Deserialize, Serialize};

/// A province/district filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionQuery {
    /// Province (`STAGE1`), empty for the whole country.
    pub stage1: String,
    /// District (`STAGE2`), empty for the whole province.
    pub stage2: String,
}

impl RegionQuery {
    /// Build a region filter, dropping the district when no province is given.
    #[must_use]
    pub fn new(stage1: impl Into<String>, stage2: impl Into<String>) -> Self {
        let stage1: String = stage1.into();
        let stage2: String = stage2.into();
        let stage1 = stage1.trim().to_string();
        let stage2 = if stage1.is_empty() {
            String::new()
        } else {
            stage2.trim().to_string()
        };
        Self { stage1, stage2 }
    }

    /// A filter that matches the whole country.
    #[must_use]
    pub fn nationwide() -> Self {
        Self::default()
    }

    /// Whether this filter matches the whole country.
    #[must_use]
    pub fn is_nationwide(&self) -> bool {
        self.stage1.is_empty()
    }
}

impl std::fmt::Display for RegionQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.stage1.is_empty(), self.stage2.is_empty()) {
            (true, _) => write!(f, "nationwide"),
            (false, true) => write!(f, "{}", self.stage1),
            (false, false) => write!(f, "{} {}", self.stage1, self.stage2),
        }
    }
}

/// A province and the districts offered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Province {
    /// Province name as the upstream API expects it.
    pub name: &'static str,
    /// Districts within the province.
    pub districts: &'static [&'static str],
}

static CATALOG: &[Province] = &[
    Province {
        name: "서울특별시",
        districts: &["강남구", "강동구", "강북구", "강서구", "관악구", "종로구", "중구"],
    },
    Province {
        name: "경기도",
        districts: &["수원시", "성남시", "고양시", "용인시", "부천시", "안산시", "안양시"],
    },
    Province {
        name: "인천광역시",
        districts: &["중구", "동구", "미추홀구", "연수구", "남동구", "부평구", "계양구"],
    },
    Province {
        name: "부산광역시",
        districts: &["중구", "서구", "동구", "영도구", "부산진구", "동래구", "남구"],
    },
    Province {
        name: "대구광역시",
        districts: &["중구", "동구", "서구", "남구", "북구", "수성구", "달서구"],
    },
];

/// The built-in list of selectable regions.
#[must_use]
pub fn catalog() -> &'static [Province] {
    CATALOG
}

/// Districts offered for a province, or `None` for an unknown province.
#[must_use]
pub fn districts(province: &str) -> Option<&'static [&'static str]> {
    CATALOG
        .iter()
        .find(|p| p.name == province)
        .map(|p| p.districts)
}

/// Whether the region is in the built-in catalog.
///
/// The upstream API accepts any name, so this is advisory only.
#[must_use]
pub fn is_known(region: &RegionQuery) -> bool {
    if region.is_nationwide() {
        return true;
    }
    match districts(&region.stage1) {
        Some(ds) => region.stage2.is_empty() || ds.contains(&region.stage2.as_str()),
        None => false,
    }
}
