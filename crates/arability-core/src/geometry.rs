//! Boundary polygons in geographic coordinates.
//!
//! Coordinates are `[lon, lat]` pairs in degrees (EPSG:4326), the same
//! axis order GeoJSON uses. The pipeline only reads a boundary: bounding-box
//! tests against frame footprints and point containment for pixel centres.

use geo::{BoundingRect, Contains, LineString, MultiPolygon, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ArabilityError, Result};

/// Axis-aligned lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    /// Closed-interval overlap; boxes that only share an edge intersect.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }
}

impl From<Rect<f64>> for BBox {
    fn from(r: Rect<f64>) -> Self {
        BBox { min_lon: r.min().x, min_lat: r.min().y, max_lon: r.max().x, max_lat: r.max().y }
    }
}

fn validate_ring(ring: &LineString<f64>, what: &str) -> Result<()> {
    for c in ring.coords() {
        if !c.x.is_finite() || !c.y.is_finite() {
            return Err(ArabilityError::invalid(format!("{what} has a non-finite coordinate")));
        }
        if !(-180.0..=180.0).contains(&c.x) || !(-90.0..=90.0).contains(&c.y) {
            return Err(ArabilityError::invalid(format!(
                "{what} coordinate ({}, {}) is outside lon/lat range",
                c.x, c.y
            )));
        }
    }
    let mut distinct = Vec::with_capacity(3);
    for c in ring.coords() {
        if !distinct.contains(c) {
            distinct.push(*c);
        }
        if distinct.len() >= 3 {
            return Ok(());
        }
    }
    Err(ArabilityError::invalid(format!(
        "{what} needs at least 3 distinct vertices, got {}",
        distinct.len()
    )))
}

/// A polygon or multipolygon boundary. Always valid once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJsonGeometry", into = "GeoJsonGeometry")]
pub struct BoundaryGeometry {
    shape: MultiPolygon<f64>,
    bbox: BBox,
}

impl BoundaryGeometry {
    pub fn new(shape: MultiPolygon<f64>) -> Result<Self> {
        if shape.0.is_empty() {
            return Err(ArabilityError::invalid("boundary has no polygons"));
        }
        for (i, p) in shape.0.iter().enumerate() {
            validate_ring(p.exterior(), &format!("polygon {i} exterior ring"))?;
            for (k, h) in p.interiors().iter().enumerate() {
                validate_ring(h, &format!("polygon {i} hole {k}"))?;
            }
        }
        let bbox = shape
            .bounding_rect()
            .map(BBox::from)
            .ok_or_else(|| ArabilityError::invalid("boundary has no extent"))?;
        Ok(Self { shape, bbox })
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self> {
        Self::new(MultiPolygon::new(vec![polygon]))
    }

    /// Convenience constructor for a single ring without holes.
    pub fn from_ring(ring: Vec<[f64; 2]>) -> Result<Self> {
        Self::from_polygon(Polygon::new(LineString::from(ring), Vec::new()))
    }

    /// Axis-aligned rectangle, handy for tests and tile-shaped requests.
    pub fn rectangle(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        Self::from_ring(vec![
            [min_lon, min_lat],
            [max_lon, min_lat],
            [max_lon, max_lat],
            [min_lon, max_lat],
            [min_lon, min_lat],
        ])
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    /// Point-in-boundary test for a `(lon, lat)` position. Points on the
    /// outline are outside.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.bbox.min_lon
            && lon <= self.bbox.max_lon
            && lat >= self.bbox.min_lat
            && lat <= self.bbox.max_lat
            && self.shape.contains(&Point::new(lon, lat))
    }

    pub fn from_geojson_str(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| ArabilityError::invalid(format!("unreadable boundary: {e}")))
    }
}

// ── GeoJSON wire shape ────────────────────────────────────────────────────────

type Rings = Vec<Vec<[f64; 2]>>;

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonGeometry {
    Polygon { coordinates: Rings },
    MultiPolygon { coordinates: Vec<Rings> },
}

fn polygon_from_rings(rings: Rings) -> Result<Polygon<f64>> {
    let mut rings = rings.into_iter().map(LineString::from);
    let exterior = rings
        .next()
        .ok_or_else(|| ArabilityError::invalid("polygon has no rings"))?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn polygon_to_rings(p: &Polygon<f64>) -> Rings {
    std::iter::once(p.exterior())
        .chain(p.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

impl TryFrom<GeoJsonGeometry> for BoundaryGeometry {
    type Error = ArabilityError;

    fn try_from(g: GeoJsonGeometry) -> Result<Self> {
        let polygons = match g {
            GeoJsonGeometry::Polygon { coordinates } => vec![polygon_from_rings(coordinates)?],
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
                .into_iter()
                .map(polygon_from_rings)
                .collect::<Result<Vec<_>>>()?,
        };
        BoundaryGeometry::new(MultiPolygon::new(polygons))
    }
}

impl From<BoundaryGeometry> for GeoJsonGeometry {
    fn from(b: BoundaryGeometry) -> Self {
        match b.shape.0.as_slice() {
            [single] => GeoJsonGeometry::Polygon { coordinates: polygon_to_rings(single) },
            many => GeoJsonGeometry::MultiPolygon {
                coordinates: many.iter().map(polygon_to_rings).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_contains_interior_not_exterior() {
        let b = BoundaryGeometry::rectangle(10.0, 45.0, 11.0, 46.0).unwrap();
        assert!(b.contains(10.5, 45.5));
        assert!(!b.contains(11.5, 45.5));
        assert!(!b.contains(10.5, 44.0));
    }

    #[test]
    fn hole_is_excluded() {
        let b = BoundaryGeometry::from_polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]),
            vec![LineString::from(vec![(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)])],
        ))
        .unwrap();
        assert!(b.contains(0.5, 0.5));
        assert!(!b.contains(2.0, 2.0));
    }

    #[test]
    fn degenerate_rings_are_invalid() {
        let err = BoundaryGeometry::from_ring(vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, ArabilityError::InvalidRequest(_)));
        assert!(BoundaryGeometry::new(MultiPolygon::new(Vec::new())).is_err());
        assert!(BoundaryGeometry::from_ring(vec![[0.0, 0.0], [f64::NAN, 1.0], [1.0, 0.0]]).is_err());
        assert!(BoundaryGeometry::from_ring(vec![[0.0, 0.0], [200.0, 1.0], [1.0, 0.0]]).is_err());
    }

    #[test]
    fn parses_geojson_polygon_and_multipolygon() {
        let poly = BoundaryGeometry::from_geojson_str(
            r#"{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,2],[0,0]]]}"#,
        )
        .unwrap();
        assert_eq!(poly.shape().0.len(), 1);
        assert_eq!(poly.bbox().max_lon, 2.0);

        let multi = BoundaryGeometry::from_geojson_str(
            r#"{"type":"MultiPolygon","coordinates":[
                [[[0,0],[1,0],[1,1],[0,1],[0,0]]],
                [[[5,5],[6,5],[6,6],[5,6],[5,5]]]
            ]}"#,
        )
        .unwrap();
        assert!(multi.contains(0.5, 0.5));
        assert!(multi.contains(5.5, 5.5));
        assert!(!multi.contains(3.0, 3.0));
        assert_eq!(multi.bbox().min_lon, 0.0);
        assert_eq!(multi.bbox().max_lat, 6.0);
    }

    #[test]
    fn geojson_writes_back_the_same_shape() {
        let b = BoundaryGeometry::rectangle(1.0, 2.0, 3.0, 4.0).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.starts_with(r#"{"type":"Polygon""#));
        assert_eq!(BoundaryGeometry::from_geojson_str(&json).unwrap(), b);
    }

    #[test]
    fn unsupported_geojson_type_is_invalid_request() {
        let err = BoundaryGeometry::from_geojson_str(r#"{"type":"Point","coordinates":[0,0]}"#)
            .unwrap_err();
        assert!(matches!(err, ArabilityError::InvalidRequest(_)));
    }

    #[test]
    fn bbox_edge_contact_counts_as_intersection() {
        let a = BBox { min_lon: 0.0, min_lat: 0.0, max_lon: 1.0, max_lat: 1.0 };
        let b = BBox { min_lon: 1.0, min_lat: 0.5, max_lon: 2.0, max_lat: 2.0 };
        let c = BBox { min_lon: 1.5, min_lat: 0.5, max_lon: 2.0, max_lat: 2.0 };
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&c).max_lon, 2.0);
    }
}
