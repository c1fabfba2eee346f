//! Arability pipeline: select → mask → composite → aggregate.
pub mod aggregate;
pub mod composite;
pub mod mask;
pub mod select;

use log::info;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::classes::ClassIndex;
use crate::config::ArabilityConfig;
use crate::error::Result;
use crate::geometry::BoundaryGeometry;
use crate::provider::RasterProvider;
use crate::raster::ClassCode;
use crate::window::TimeWindow;
use aggregate::{area_by_class, percentages, AreaByClass, AreaUnit, ArabilityResult};
use composite::composite_mode;
use mask::mask_frames;
use select::{select_observations, ObservationSummary};

/// Result plus the diagnostics gathered along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArabilityReport {
    pub window: TimeWindow,
    pub observations: ObservationSummary,
    /// Classified ground area per class, m².
    pub area_by_class: AreaByClass,
    pub total_area_m2: f64,
    pub area_unit: AreaUnit,
    /// Tracked name → area in `area_unit`.
    pub tracked_area: BTreeMap<String, f64>,
    pub arability: ArabilityResult,
}

/// Percentage of classified ground per tracked class inside `boundary`,
/// from frames acquired within `window`.
///
/// Pixels equal to `sentinel` are masked before voting. An empty frame
/// set or zero classified area is not an error; every tracked class is 0.
pub fn compute_arability<P: RasterProvider + ?Sized>(
    provider: &P,
    window: &TimeWindow,
    boundary: &BoundaryGeometry,
    index: &ClassIndex,
    sentinel: ClassCode,
) -> Result<ArabilityResult> {
    let (_, area) = run_stages(provider, window, boundary, sentinel)?;
    Ok(percentages(&area, index))
}

/// Same pipeline as [`compute_arability`], configured from `config` and
/// returning the full report.
pub fn compute_arability_report<P: RasterProvider + ?Sized>(
    provider: &P,
    window: &TimeWindow,
    boundary: &BoundaryGeometry,
    config: &ArabilityConfig,
) -> Result<ArabilityReport> {
    let (observations, area) = run_stages(provider, window, boundary, config.sentinel)?;
    let arability = percentages(&area, &config.classes);
    let tracked_area = config
        .classes
        .iter()
        .map(|(name, code)| (name.to_string(), config.area_unit.convert_m2(area.get(code))))
        .collect();

    Ok(ArabilityReport {
        window: *window,
        observations,
        total_area_m2: area.total(),
        area_by_class: area,
        area_unit: config.area_unit,
        tracked_area,
        arability,
    })
}

fn run_stages<P: RasterProvider + ?Sized>(
    provider: &P,
    window: &TimeWindow,
    boundary: &BoundaryGeometry,
    sentinel: ClassCode,
) -> Result<(ObservationSummary, AreaByClass)> {
    info!("arability request from {} to {}", window.start(), window.end());

    let observations = select_observations(provider, window, boundary)?;
    let summary = observations.summary();

    let frames = mask_frames(observations.into_frames(), sentinel);
    let composite = composite_mode(&frames)?;
    let area = area_by_class(&composite, boundary, provider);

    info!(
        "classified area {:.2} m2 over {} class(es) from {} frame(s)",
        area.total(),
        area.len(),
        summary.count
    );
    Ok((summary, area))
}
