//! Observation selection: frames inside the window that touch the boundary,
//! most recent first.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::geometry::BoundaryGeometry;
use crate::provider::RasterProvider;
use crate::raster::RasterFrame;
use crate::window::TimeWindow;

/// Count and acquisition range of a selected frame stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationSummary {
    pub count: usize,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

/// Frames ordered by acquisition time, descending.
#[derive(Debug, Clone, Default)]
pub struct ObservationSet {
    frames: Vec<RasterFrame>,
}

impl ObservationSet {
    /// Sort `frames` most recent first. The sort is stable, so frames with
    /// equal timestamps keep the order they arrived in.
    pub fn from_frames(mut frames: Vec<RasterFrame>) -> Self {
        frames.sort_by(|a, b| b.acquired.cmp(&a.acquired));
        Self { frames }
    }

    pub fn frames(&self) -> &[RasterFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<RasterFrame> {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn summary(&self) -> ObservationSummary {
        ObservationSummary {
            count: self.frames.len(),
            earliest: self.frames.last().map(|f| f.acquired),
            latest: self.frames.first().map(|f| f.acquired),
        }
    }
}

/// Query the provider and keep only frames that honour the request.
///
/// Frames the provider returns outside the window or away from the
/// boundary are dropped rather than trusted.
pub fn select_observations<P: RasterProvider + ?Sized>(
    provider: &P,
    window: &TimeWindow,
    boundary: &BoundaryGeometry,
) -> Result<ObservationSet> {
    let returned = provider.query_frames(window, boundary)?;
    let n_returned = returned.len();

    let bbox = boundary.bbox();
    let kept: Vec<RasterFrame> = returned
        .into_iter()
        .filter(|f| {
            let keep = window.contains(f.acquired) && f.grid.footprint().intersects(&bbox);
            if !keep {
                debug!("dropping frame acquired {} outside the request", f.acquired);
            }
            keep
        })
        .collect();
    if kept.len() < n_returned {
        warn!(
            "provider returned {} frame(s) outside window {window} or boundary",
            n_returned - kept.len()
        );
    }

    let set = ObservationSet::from_frames(kept);
    let s = set.summary();
    match (s.earliest, s.latest) {
        (Some(min), Some(max)) => info!(
            "there are {} images available on: {} - {}",
            s.count,
            min.format("%Y-%m-%dT%H:%M:%S"),
            max.format("%Y-%m-%dT%H:%M:%S")
        ),
        _ => info!("no images available for window {window}"),
    }
    Ok(set)
}
