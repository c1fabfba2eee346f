//! Land-use label catalog and the caller-facing tracked-class index.
//!
//! Labels follow the Dynamic World V1 `label` band. The catalog only
//! supplies defaults; the pipeline itself works on any [`ClassCode`]s the
//! caller tracks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ArabilityError, Result};
use crate::raster::ClassCode;

/// Dynamic World land-use labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUseClass {
    Water,
    Trees,
    Grass,
    FloodedVegetation,
    Crops,
    ShrubAndScrub,
    Built,
    Bare,
    SnowAndIce,
}

impl LandUseClass {
    pub const ALL: [LandUseClass; 9] = [
        LandUseClass::Water,
        LandUseClass::Trees,
        LandUseClass::Grass,
        LandUseClass::FloodedVegetation,
        LandUseClass::Crops,
        LandUseClass::ShrubAndScrub,
        LandUseClass::Built,
        LandUseClass::Bare,
        LandUseClass::SnowAndIce,
    ];

    pub fn code(self) -> ClassCode {
        ClassCode(self as u8)
    }

    pub fn from_code(code: ClassCode) -> Option<Self> {
        Self::ALL.get(code.0 as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            LandUseClass::Water => "water",
            LandUseClass::Trees => "trees",
            LandUseClass::Grass => "grass",
            LandUseClass::FloodedVegetation => "flooded_vegetation",
            LandUseClass::Crops => "crops",
            LandUseClass::ShrubAndScrub => "shrub_and_scrub",
            LandUseClass::Built => "built",
            LandUseClass::Bare => "bare",
            LandUseClass::SnowAndIce => "snow_and_ice",
        }
    }
}

/// Snow/ice carries no land-use signal and is masked before voting.
pub const SNOW_SENTINEL: ClassCode = ClassCode(8);

/// Mapping from output field name to tracked class code, kept sorted by
/// name. Results and JSON output follow the same order.
///
/// Classes outside the index still count toward the total area; they are
/// just never reported individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassIndex {
    entries: BTreeMap<String, ClassCode>,
}

impl ClassIndex {
    /// Rejects an empty index, blank names, and two names sharing a code
    /// (the shared area would be reported twice).
    pub fn new<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ClassCode)>,
        S: Into<String>,
    {
        let mut entries = BTreeMap::new();
        let mut by_code: BTreeMap<ClassCode, String> = BTreeMap::new();
        for (name, code) in pairs {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(ArabilityError::invalid("class index contains a blank name"));
            }
            if let Some(other) = by_code.get(&code) {
                if *other != name {
                    return Err(ArabilityError::invalid(format!(
                        "class code {code} is mapped by both {other:?} and {name:?}"
                    )));
                }
            }
            by_code.insert(code, name.clone());
            if let Some(prev) = entries.insert(name.clone(), code) {
                if prev != code {
                    return Err(ArabilityError::invalid(format!(
                        "class name {name:?} is mapped to both {prev} and {code}"
                    )));
                }
            }
        }
        if entries.is_empty() {
            return Err(ArabilityError::invalid("class index is empty"));
        }
        Ok(Self { entries })
    }

    /// Every Dynamic World label except the snow sentinel.
    pub fn dynamic_world() -> Self {
        let entries = LandUseClass::ALL
            .iter()
            .filter(|c| c.code() != SNOW_SENTINEL)
            .map(|c| (c.name().to_string(), c.code()))
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ClassCode)> + '_ {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn get(&self, name: &str) -> Option<ClassCode> {
        self.entries.get(name).copied()
    }

    pub fn tracks(&self, code: ClassCode) -> bool {
        self.entries.values().any(|&c| c == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ClassIndex {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, ClassCode>::deserialize(d)?;
        ClassIndex::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_codes_follow_band_order() {
        assert_eq!(LandUseClass::Water.code(), ClassCode(0));
        assert_eq!(LandUseClass::Crops.code(), ClassCode(4));
        assert_eq!(LandUseClass::SnowAndIce.code(), SNOW_SENTINEL);
        assert_eq!(LandUseClass::from_code(ClassCode(6)), Some(LandUseClass::Built));
        assert_eq!(LandUseClass::from_code(ClassCode(9)), None);
    }

    #[test]
    fn default_index_skips_snow() {
        let idx = ClassIndex::dynamic_world();
        assert_eq!(idx.len(), 8);
        assert_eq!(idx.get("crops"), Some(ClassCode(4)));
        assert!(!idx.tracks(SNOW_SENTINEL));
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let err = ClassIndex::new([("cropland", ClassCode(4)), ("farmland", ClassCode(4))]).unwrap_err();
        assert!(matches!(err, ArabilityError::InvalidRequest(_)));
    }

    #[test]
    fn empty_or_blank_index_is_rejected() {
        assert!(ClassIndex::new(Vec::<(String, ClassCode)>::new()).is_err());
        assert!(ClassIndex::new([(" ", ClassCode(1))]).is_err());
    }

    #[test]
    fn iterates_sorted_by_name_not_insertion_order() {
        let idx = ClassIndex::new([("water", ClassCode(0)), ("built", ClassCode(6)), ("crops", ClassCode(4))])
            .unwrap();
        let names: Vec<&str> = idx.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["built", "crops", "water"]);
        assert_eq!(serde_json::to_string(&idx).unwrap(), r#"{"built":6,"crops":4,"water":0}"#);
    }

    #[test]
    fn deserializes_from_name_code_table() {
        let idx: ClassIndex = serde_json::from_str(r#"{"cropland": 4, "forest": 1}"#).unwrap();
        assert_eq!(idx.get("forest"), Some(ClassCode(1)));
        assert!(serde_json::from_str::<ClassIndex>(r#"{"a": 4, "b": 4}"#).is_err());
    }
}
