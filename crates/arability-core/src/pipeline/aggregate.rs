//! Zonal area aggregation and percentage normalisation.
//!
//! Per-class areas are summed from raw per-pixel values. Percentages are
//! rounded once, per class, at the very end:
//!
//!   pct(class) = round_half_away(area(class) / total × 100, 2 dp)
//!
//! Rounding each class on its own can overshoot (50.005 + 49.995 → 100.01)
//! or undershoot (3 × 33.333… → 99.99). A largest-remainder pass over every
//! observed class, tracked or not, moves single hundredths so the observed
//! classes total exactly 100.00. Tracked percentages therefore never sum
//! past 100, and sum to exactly 100 when every observed class is tracked.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classes::ClassIndex;
use crate::geometry::BoundaryGeometry;
use crate::provider::RasterProvider;
use crate::raster::{ClassCode, CompositeRaster};

const FULL_HUNDREDTHS: i64 = 10_000;

/// Square metres of classified ground per class. Only classes with nonzero
/// area have an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AreaByClass {
    areas: BTreeMap<ClassCode, f64>,
}

impl AreaByClass {
    pub fn get(&self, code: ClassCode) -> f64 {
        self.areas.get(&code).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassCode, f64)> + '_ {
        self.areas.iter().map(|(c, a)| (*c, *a))
    }

    pub fn total(&self) -> f64 {
        self.areas.values().sum()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl FromIterator<(ClassCode, f64)> for AreaByClass {
    /// Accumulates repeated codes; drops non-positive and non-finite areas.
    fn from_iter<I: IntoIterator<Item = (ClassCode, f64)>>(iter: I) -> Self {
        let mut areas = BTreeMap::new();
        for (code, a) in iter {
            if a.is_finite() && a > 0.0 {
                *areas.entry(code).or_insert(0.0) += a;
            }
        }
        Self { areas }
    }
}

/// Sum provider-reported ground area per composite class.
pub fn area_by_class<P: RasterProvider + ?Sized>(
    composite: &CompositeRaster,
    boundary: &BoundaryGeometry,
    provider: &P,
) -> AreaByClass {
    composite
        .classified()
        .map(|(r, c, class)| (class, provider.pixel_area(&composite.grid, r, c, boundary)))
        .collect()
}

/// Round half away from zero to two decimal places.
pub fn round_percent(raw: f64) -> f64 {
    (raw * 100.0).round() / 100.0
}

/// Tracked name → percentage of total classified area (0–100, 2 dp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArabilityResult {
    values: BTreeMap<String, f64>,
}

impl ArabilityResult {
    /// Every tracked name at 0.
    pub fn zeroed(index: &ClassIndex) -> Self {
        Self { values: index.iter().map(|(n, _)| (n.to_string(), 0.0)).collect() }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of reported percentages, accumulated in whole hundredths.
    pub fn total_percent(&self) -> f64 {
        let h: i64 = self.values.values().map(|v| (v * 100.0).round() as i64).sum();
        h as f64 / 100.0
    }

    pub fn is_all_zero(&self) -> bool {
        self.values.values().all(|v| *v == 0.0)
    }
}

/// Normalise `area` into percentages for every tracked class.
///
/// A zero total short-circuits to all zeros before any division.
pub fn percentages(area: &AreaByClass, index: &ClassIndex) -> ArabilityResult {
    let total = area.total();
    if total <= 0.0 {
        return ArabilityResult::zeroed(index);
    }

    let raw: Vec<(ClassCode, f64)> = area.iter().map(|(c, a)| (c, a / total * 100.0)).collect();
    let hundredths = apportion(&raw);

    let values = index
        .iter()
        .map(|(name, code)| {
            let h = hundredths.get(&code).copied().unwrap_or(0);
            (name.to_string(), h as f64 / 100.0)
        })
        .collect();
    ArabilityResult { values }
}

/// Round each raw percentage to hundredths, then nudge single hundredths
/// until the whole set sums to 100.00.
///
/// Overshoot is taken back from the classes rounded up the most;
/// undershoot goes to the classes rounded down the most. Each class moves
/// by at most one hundredth in practice.
fn apportion(raw: &[(ClassCode, f64)]) -> BTreeMap<ClassCode, i64> {
    // (code, rounded hundredths, raw − rounded)
    let mut cells: Vec<(ClassCode, i64, f64)> = raw
        .iter()
        .map(|&(code, pct)| {
            let scaled = pct * 100.0;
            let h = scaled.round() as i64;
            (code, h, scaled - h as f64)
        })
        .collect();

    let diff = FULL_HUNDREDTHS - cells.iter().map(|c| c.1).sum::<i64>();
    if diff != 0 && !cells.is_empty() {
        let mut order: Vec<usize> = (0..cells.len()).collect();
        if diff > 0 {
            order.sort_by(|&a, &b| cells[b].2.total_cmp(&cells[a].2));
        } else {
            order.sort_by(|&a, &b| cells[a].2.total_cmp(&cells[b].2));
        }
        let step = diff.signum();
        let mut remaining = diff.unsigned_abs();
        for &i in order.iter().cycle().take(order.len() * 2) {
            if remaining == 0 {
                break;
            }
            if step < 0 && cells[i].1 == 0 {
                continue;
            }
            cells[i].1 += step;
            remaining -= 1;
        }
    }

    cells.into_iter().map(|(code, h, _)| (code, h)).collect()
}

/// Unit for reporting absolute areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    SquareMeters,
    Hectares,
    #[default]
    Acres,
}

impl AreaUnit {
    pub fn square_meters_per_unit(self) -> f64 {
        match self {
            AreaUnit::SquareMeters => 1.0,
            AreaUnit::Hectares => 10_000.0,
            AreaUnit::Acres => 4_046.856_422_4,
        }
    }

    pub fn convert_m2(self, m2: f64) -> f64 {
        m2 / self.square_meters_per_unit()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AreaUnit::SquareMeters => "m2",
            AreaUnit::Hectares => "ha",
            AreaUnit::Acres => "ac",
        }
    }
}
