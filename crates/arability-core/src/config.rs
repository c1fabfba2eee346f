//! Request configuration loaded from TOML.
//!
//! ```toml
//! sentinel = 8
//! area_unit = "acres"
//!
//! [classes]
//! cropland = 4
//! forest = 1
//! ```
//!
//! Every key is optional; omitted keys fall back to the Dynamic World
//! defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::classes::{ClassIndex, SNOW_SENTINEL};
use crate::error::{ArabilityError, Result};
use crate::pipeline::aggregate::AreaUnit;
use crate::raster::ClassCode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArabilityConfig {
    /// Class masked out before compositing.
    #[serde(default = "default_sentinel")]
    pub sentinel: ClassCode,
    /// Unit for the absolute areas in a report.
    #[serde(default)]
    pub area_unit: AreaUnit,
    /// Output field name → tracked class code.
    #[serde(default = "ClassIndex::dynamic_world")]
    pub classes: ClassIndex,
}

fn default_sentinel() -> ClassCode {
    SNOW_SENTINEL
}

impl Default for ArabilityConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            area_unit: AreaUnit::default(),
            classes: ClassIndex::dynamic_world(),
        }
    }
}

impl ArabilityConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ArabilityError::invalid(format!("failed to parse config: {e}")))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ArabilityError::invalid(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }
}
