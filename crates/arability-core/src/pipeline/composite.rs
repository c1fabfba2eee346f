//! Temporal mode compositing.
//!
//! Frames may come from different tiles. The output grid covers the union of
//! all footprints at the resolution of the most recent frame, and each output
//! pixel is the most frequent non-masked class among the frames whose
//! footprint holds its centre. The stack arrives most recent first; when
//! classes tie on count, the one seen earliest in the stack (the most recent
//! observation) wins. Pixels with no votes stay `None`.
//!
//! Cost is O(pixels × frames). Rows are independent, so the `threading`
//! feature composites them in parallel with identical output.

use crate::error::{ArabilityError, Result};
use crate::raster::{ClassCode, CompositeRaster, RasterFrame, RasterGrid};

/// Collapse a most-recent-first frame stack into one classification.
pub fn composite_mode(frames: &[RasterFrame]) -> Result<CompositeRaster> {
    check_frames(frames)?;
    let Some(grid) = mosaic_grid(frames) else {
        return Ok(CompositeRaster::empty());
    };

    let mut pixels: Vec<Option<ClassCode>> = vec![None; grid.len()];

    #[cfg(feature = "threading")]
    {
        use rayon::prelude::*;
        pixels
            .par_chunks_mut(grid.width)
            .enumerate()
            .for_each(|(r, row)| composite_row(frames, &grid, r, row));
    }
    #[cfg(not(feature = "threading"))]
    {
        for (r, row) in pixels.chunks_mut(grid.width).enumerate() {
            composite_row(frames, &grid, r, row);
        }
    }

    Ok(CompositeRaster { grid, pixels })
}

fn check_frames(frames: &[RasterFrame]) -> Result<()> {
    for f in frames {
        let g = &f.grid;
        if f.pixels.len() != g.len() {
            return Err(ArabilityError::provider(format!(
                "frame at {} carries {} pixels for a {}x{} grid over {}",
                f.acquired,
                f.pixels.len(),
                g.width,
                g.height,
                g.footprint()
            )));
        }
        let finite = [g.min_lon, g.max_lon, g.min_lat, g.max_lat].iter().all(|v| v.is_finite());
        if !g.is_empty() && !(finite && g.max_lon > g.min_lon && g.max_lat > g.min_lat) {
            return Err(ArabilityError::provider(format!(
                "frame at {} has a degenerate footprint {}",
                f.acquired,
                g.footprint()
            )));
        }
    }
    Ok(())
}

/// Grid spanning every footprint at the most recent frame's resolution.
/// Frames sharing one layout produce that layout unchanged.
fn mosaic_grid(frames: &[RasterFrame]) -> Option<RasterGrid> {
    let mut tiles = frames.iter().map(|f| f.grid).filter(|g| !g.is_empty());
    let first = tiles.next()?;
    let (dx, dy) = (first.pixel_lon_size(), first.pixel_lat_size());
    let extent = tiles.fold(first.footprint(), |acc, g| acc.union(&g.footprint()));

    let width = ((extent.max_lon - extent.min_lon) / dx).round().max(1.0) as usize;
    let height = ((extent.max_lat - extent.min_lat) / dy).round().max(1.0) as usize;
    Some(RasterGrid::new(width, height, extent.min_lon, extent.max_lon, extent.min_lat, extent.max_lat))
}

fn composite_row(frames: &[RasterFrame], grid: &RasterGrid, r: usize, out: &mut [Option<ClassCode>]) {
    let mut tally: Vec<(ClassCode, u32)> = Vec::new();
    for (c, slot) in out.iter_mut().enumerate() {
        let (lon, lat) = grid.pixel_center(r, c);
        *slot = vote(frames, lon, lat, &mut tally);
    }
}

/// Mode at one location. `tally` is scratch space reused across pixels.
///
/// Classes enter `tally` in order of their most recent occurrence, and only
/// a strictly larger count displaces the leader, so ties go to the class
/// observed most recently.
fn vote(frames: &[RasterFrame], lon: f64, lat: f64, tally: &mut Vec<(ClassCode, u32)>) -> Option<ClassCode> {
    tally.clear();
    for f in frames {
        let Some((row, col)) = f.grid.locate(lon, lat) else {
            continue;
        };
        if let Some(class) = f.get(row, col) {
            match tally.iter_mut().find(|(k, _)| *k == class) {
                Some((_, n)) => *n += 1,
                None => tally.push((class, 1)),
            }
        }
    }

    let mut best: Option<(ClassCode, u32)> = None;
    for &(class, n) in tally.iter() {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((class, n));
        }
    }
    best.map(|(class, _)| class)
}
