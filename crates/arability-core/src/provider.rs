//! Raster time-series provider boundary.
//!
//! The pipeline talks to imagery through [`RasterProvider`] only. Catalog
//! search, resampling onto a common grid and projection handling live
//! behind it. [`InMemoryProvider`] serves frames already held in memory or
//! loaded from a JSON scene catalog.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ArabilityError, Result};
use crate::geometry::BoundaryGeometry;
use crate::raster::{RasterFrame, RasterGrid};
use crate::window::TimeWindow;

/// Authalic (equal-area) Earth radius in metres.
pub const EARTH_AUTHALIC_RADIUS_M: f64 = 6_371_007.2;

/// Source of classified frames and per-pixel ground area.
pub trait RasterProvider {
    /// Frames acquired inside `window` whose footprint touches `boundary`.
    /// An empty vector is a valid answer.
    fn query_frames(&self, window: &TimeWindow, boundary: &BoundaryGeometry) -> Result<Vec<RasterFrame>>;

    /// Ground area in m² that pixel `(row, col)` contributes inside
    /// `boundary`. Must be deterministic and side-effect free.
    fn pixel_area(&self, grid: &RasterGrid, row: usize, col: usize, boundary: &BoundaryGeometry) -> f64 {
        spherical_pixel_area(grid, row, col, boundary)
    }
}

/// Area of a lon/lat pixel on a sphere, counted only when the pixel centre
/// lies inside `boundary`.
///
/// `A = R² · Δλ · (sin φ_north − sin φ_south)`
pub fn spherical_pixel_area(grid: &RasterGrid, row: usize, col: usize, boundary: &BoundaryGeometry) -> f64 {
    let (lon, lat) = grid.pixel_center(row, col);
    if !boundary.contains(lon, lat) {
        return 0.0;
    }
    let b = grid.pixel_bounds(row, col);
    let d_lambda = (b.max_lon - b.min_lon).to_radians();
    let band = b.max_lat.to_radians().sin() - b.min_lat.to_radians().sin();
    (EARTH_AUTHALIC_RADIUS_M * EARTH_AUTHALIC_RADIUS_M * d_lambda * band).abs()
}

/// On-disk scene catalog: a list of frames in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCatalog {
    pub frames: Vec<RasterFrame>,
}

/// Provider over an in-memory frame catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    frames: Vec<RasterFrame>,
    outage: Option<String>,
}

impl InMemoryProvider {
    pub fn new(frames: Vec<RasterFrame>) -> Self {
        Self { frames, outage: None }
    }

    /// Validate every frame's pixel count against its grid.
    pub fn from_catalog(catalog: SceneCatalog) -> Result<Self> {
        let frames = catalog
            .frames
            .into_iter()
            .map(|f| RasterFrame::new(f.acquired, f.grid, f.pixels))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(frames))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let catalog: SceneCatalog = serde_json::from_str(s)
            .map_err(|e| ArabilityError::provider(format!("malformed scene catalog: {e}")))?;
        Self::from_catalog(catalog)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ArabilityError::provider(format!("cannot read scene catalog {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Make every subsequent query fail with `ProviderUnavailable`.
    pub fn with_outage(mut self, reason: impl Into<String>) -> Self {
        self.outage = Some(reason.into());
        self
    }

    pub fn push(&mut self, frame: RasterFrame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl RasterProvider for InMemoryProvider {
    fn query_frames(&self, window: &TimeWindow, boundary: &BoundaryGeometry) -> Result<Vec<RasterFrame>> {
        if let Some(reason) = &self.outage {
            return Err(ArabilityError::provider(reason.clone()));
        }
        let bbox = boundary.bbox();
        Ok(self
            .frames
            .iter()
            .filter(|f| window.contains(f.acquired) && f.grid.footprint().intersects(&bbox))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ClassCode;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn frame(day: u32, grid: RasterGrid) -> RasterFrame {
        let t = Utc.with_ymd_and_hms(2024, 6, day, 10, 30, 0).unwrap();
        RasterFrame::filled(t, grid, ClassCode(4))
    }

    #[test]
    fn equatorial_degree_cell_area() {
        // One 1°×1° cell straddling the equator: ≈ 12 364 km².
        let grid = RasterGrid::new(1, 1, 0.0, 1.0, -0.5, 0.5);
        let boundary = BoundaryGeometry::rectangle(-1.0, -1.0, 2.0, 1.0).unwrap();
        let a = spherical_pixel_area(&grid, 0, 0, &boundary);
        assert_relative_eq!(a, 1.2364e10, max_relative = 1e-3);
    }

    #[test]
    fn pixel_area_shrinks_toward_the_pole() {
        let boundary = BoundaryGeometry::rectangle(-1.0, -1.0, 2.0, 80.0).unwrap();
        let low = RasterGrid::new(1, 1, 0.0, 1.0, 0.0, 1.0);
        let high = RasterGrid::new(1, 1, 0.0, 1.0, 60.0, 61.0);
        let a_low = spherical_pixel_area(&low, 0, 0, &boundary);
        let a_high = spherical_pixel_area(&high, 0, 0, &boundary);
        assert!(a_high < a_low * 0.51 && a_high > a_low * 0.48);
    }

    #[test]
    fn pixel_outside_boundary_has_no_area() {
        let grid = RasterGrid::new(2, 1, 0.0, 2.0, 0.0, 1.0);
        let boundary = BoundaryGeometry::rectangle(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(spherical_pixel_area(&grid, 0, 0, &boundary) > 0.0);
        assert_eq!(spherical_pixel_area(&grid, 0, 1, &boundary), 0.0);
    }

    #[test]
    fn in_memory_query_filters_window_and_footprint() {
        let here = RasterGrid::new(2, 2, 10.0, 10.02, 45.0, 45.02);
        let elsewhere = RasterGrid::new(2, 2, 30.0, 30.02, 45.0, 45.02);
        let provider = InMemoryProvider::new(vec![frame(1, here), frame(20, here), frame(2, elsewhere)]);

        let boundary = BoundaryGeometry::rectangle(10.0, 45.0, 10.02, 45.02).unwrap();
        let window = TimeWindow::parse("2024-06-01", "2024-06-10").unwrap();
        let frames = provider.query_frames(&window, &boundary).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].grid, here);
    }

    #[test]
    fn outage_surfaces_as_provider_unavailable() {
        let provider = InMemoryProvider::default().with_outage("catalog endpoint timed out");
        let boundary = BoundaryGeometry::rectangle(0.0, 0.0, 1.0, 1.0).unwrap();
        let window = TimeWindow::parse("2024-01-01", "2024-01-02").unwrap();
        let err = provider.query_frames(&window, &boundary).unwrap_err();
        assert_eq!(err, ArabilityError::ProviderUnavailable("catalog endpoint timed out".into()));
    }

    #[test]
    fn scene_catalog_parses_and_validates() {
        let json = r#"{"frames":[{
            "acquired":"2024-06-01T10:00:00Z",
            "grid":{"width":2,"height":1,"min_lon":0.0,"max_lon":1.0,"min_lat":0.0,"max_lat":1.0},
            "pixels":[4,null]
        }]}"#;
        let p = InMemoryProvider::from_json_str(json).unwrap();
        assert_eq!(p.len(), 1);

        let short = json.replace("[4,null]", "[4]");
        let err = InMemoryProvider::from_json_str(&short).unwrap_err();
        assert!(matches!(err, ArabilityError::ProviderUnavailable(_)));
    }

    #[test]
    fn missing_scene_file_is_provider_failure() {
        let err = InMemoryProvider::from_file("/nonexistent/scenes.json").unwrap_err();
        assert!(matches!(err, ArabilityError::ProviderUnavailable(_)));
    }
}
