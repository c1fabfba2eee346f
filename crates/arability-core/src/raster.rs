use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ArabilityError, Result};
use crate::geometry::BBox;

/// Integer land-use label carried by one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCode(pub u8);

impl fmt::Display for ClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic layout of a row-major raster.
/// Row 0 is the northern edge (`max_lat`), column 0 the western edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterGrid {
    pub width: usize,
    pub height: usize,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl RasterGrid {
    pub fn new(width: usize, height: usize, min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self { width, height, min_lon, max_lon, min_lat, max_lat }
    }

    /// Zero-sized grid backing the empty composite.
    pub fn empty() -> Self {
        Self::new(0, 0, 0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    pub fn pixel_lon_size(&self) -> f64 {
        (self.max_lon - self.min_lon) / self.width as f64
    }

    pub fn pixel_lat_size(&self) -> f64 {
        (self.max_lat - self.min_lat) / self.height as f64
    }

    /// `(lon, lat)` of the pixel centre.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let lon = self.min_lon + (col as f64 + 0.5) * self.pixel_lon_size();
        let lat = self.max_lat - (row as f64 + 0.5) * self.pixel_lat_size();
        (lon, lat)
    }

    /// Lon/lat extent of a single pixel.
    pub fn pixel_bounds(&self, row: usize, col: usize) -> BBox {
        let dx = self.pixel_lon_size();
        let dy = self.pixel_lat_size();
        let west = self.min_lon + col as f64 * dx;
        let north = self.max_lat - row as f64 * dy;
        BBox { min_lon: west, min_lat: north - dy, max_lon: west + dx, max_lat: north }
    }

    pub fn footprint(&self) -> BBox {
        BBox {
            min_lon: self.min_lon,
            min_lat: self.min_lat,
            max_lon: self.max_lon,
            max_lat: self.max_lat,
        }
    }

    /// `(row, col)` of the pixel holding `(lon, lat)`. West and north edges
    /// belong to the grid, east and south edges to the neighbouring tile.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        if self.is_empty()
            || !(self.min_lon..self.max_lon).contains(&lon)
            || !(lat > self.min_lat && lat <= self.max_lat)
        {
            return None;
        }
        let col = ((lon - self.min_lon) / self.pixel_lon_size()) as usize;
        let row = ((self.max_lat - lat) / self.pixel_lat_size()) as usize;
        Some((row.min(self.height - 1), col.min(self.width - 1)))
    }
}

/// One timestamped classification raster. `None` marks an unclassified pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterFrame {
    pub acquired: DateTime<Utc>,
    pub grid: RasterGrid,
    pub pixels: Vec<Option<ClassCode>>,
}

impl RasterFrame {
    pub fn new(acquired: DateTime<Utc>, grid: RasterGrid, pixels: Vec<Option<ClassCode>>) -> Result<Self> {
        if pixels.len() != grid.len() {
            return Err(ArabilityError::provider(format!(
                "frame at {acquired} carries {} pixels for a {}x{} grid",
                pixels.len(),
                grid.width,
                grid.height
            )));
        }
        Ok(Self { acquired, grid, pixels })
    }

    /// Frame where every pixel holds the same class.
    pub fn filled(acquired: DateTime<Utc>, grid: RasterGrid, class: ClassCode) -> Self {
        Self { acquired, grid, pixels: vec![Some(class); grid.len()] }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<ClassCode> {
        self.pixels[self.grid.index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: Option<ClassCode>) {
        let i = self.grid.index(row, col);
        self.pixels[i] = val;
    }

    pub fn classified_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }
}

/// Single per-pixel classification collapsed from a frame stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeRaster {
    pub grid: RasterGrid,
    pub pixels: Vec<Option<ClassCode>>,
}

impl CompositeRaster {
    /// Composite of an empty observation set.
    pub fn empty() -> Self {
        Self { grid: RasterGrid::empty(), pixels: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<ClassCode> {
        self.pixels[self.grid.index(row, col)]
    }

    /// Iterate `(row, col, class)` over pixels that received a class.
    pub fn classified(&self) -> impl Iterator<Item = (usize, usize, ClassCode)> + '_ {
        let width = self.grid.width.max(1);
        self.pixels
            .iter()
            .enumerate()
            .filter_map(move |(i, p)| p.map(|c| (i / width, i % width, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pixel_center_is_north_up() {
        let g = RasterGrid::new(4, 2, 0.0, 4.0, 0.0, 2.0);
        assert_eq!(g.pixel_center(0, 0), (0.5, 1.5));
        assert_eq!(g.pixel_center(1, 3), (3.5, 0.5));

        let b = g.pixel_bounds(1, 3);
        assert_eq!((b.min_lon, b.max_lon, b.min_lat, b.max_lat), (3.0, 4.0, 0.0, 1.0));
    }

    #[test]
    fn locate_maps_positions_to_pixels() {
        let g = RasterGrid::new(4, 2, 0.0, 4.0, 0.0, 2.0);
        assert_eq!(g.locate(0.5, 1.5), Some((0, 0)));
        assert_eq!(g.locate(3.9, 0.1), Some((1, 3)));
        assert_eq!(g.locate(0.0, 2.0), Some((0, 0)));
        assert_eq!(g.locate(4.0, 1.0), None);
        assert_eq!(g.locate(1.0, 0.0), None);
        assert_eq!(g.locate(-0.1, 1.0), None);
        assert_eq!(RasterGrid::empty().locate(0.0, 0.0), None);
    }

    #[test]
    fn frame_rejects_wrong_pixel_count() {
        let g = RasterGrid::new(3, 3, 0.0, 1.0, 0.0, 1.0);
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let err = RasterFrame::new(t, g, vec![None; 8]).unwrap_err();
        assert!(matches!(err, ArabilityError::ProviderUnavailable(_)));
    }

    #[test]
    fn classified_iterates_only_assigned_pixels() {
        let grid = RasterGrid::new(2, 2, 0.0, 1.0, 0.0, 1.0);
        let c = CompositeRaster {
            grid,
            pixels: vec![Some(ClassCode(4)), None, None, Some(ClassCode(1))],
        };
        let cells: Vec<_> = c.classified().collect();
        assert_eq!(cells, vec![(0, 0, ClassCode(4)), (1, 1, ClassCode(1))]);
        assert!(CompositeRaster::empty().classified().next().is_none());
    }

    #[test]
    fn class_code_serializes_as_bare_integer() {
        let pixels = vec![Some(ClassCode(4)), None];
        assert_eq!(serde_json::to_string(&pixels).unwrap(), "[4,null]");
    }
}
