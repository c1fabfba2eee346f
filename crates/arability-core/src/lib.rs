//! Land-use breakdown of a boundary from a classified raster time series.
//!
//! Frames acquired in a [`TimeWindow`] over a [`BoundaryGeometry`] are
//! fetched from a [`RasterProvider`], the snow sentinel is masked, a
//! per-pixel temporal mode is taken, and classified ground area is
//! normalised into percentages per tracked class.

pub mod classes;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod provider;
pub mod raster;
pub mod window;

pub use classes::{ClassIndex, LandUseClass, SNOW_SENTINEL};
pub use config::ArabilityConfig;
pub use error::{ArabilityError, Result};
pub use geometry::{BBox, BoundaryGeometry};
pub use pipeline::aggregate::{AreaByClass, AreaUnit, ArabilityResult};
pub use pipeline::select::{ObservationSet, ObservationSummary};
pub use pipeline::{compute_arability, compute_arability_report, ArabilityReport};
pub use provider::{InMemoryProvider, RasterProvider, SceneCatalog};
pub use raster::{ClassCode, CompositeRaster, RasterFrame, RasterGrid};
pub use window::TimeWindow;
