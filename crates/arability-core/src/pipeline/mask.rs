//! Sentinel masking. Runs before compositing so a masked pixel never votes.
use log::debug;

use crate::raster::{ClassCode, RasterFrame};

/// Replace every `sentinel` pixel with `None`.
pub fn mask_class(mut frame: RasterFrame, sentinel: ClassCode) -> RasterFrame {
    for p in frame.pixels.iter_mut() {
        if *p == Some(sentinel) {
            *p = None;
        }
    }
    frame
}

/// Mask every frame in the stack, preserving order.
pub fn mask_frames(frames: Vec<RasterFrame>, sentinel: ClassCode) -> Vec<RasterFrame> {
    let before: usize = frames.iter().map(RasterFrame::classified_count).sum();
    let masked: Vec<RasterFrame> = frames.into_iter().map(|f| mask_class(f, sentinel)).collect();
    let after: usize = masked.iter().map(RasterFrame::classified_count).sum();
    debug!("masked {} pixel(s) of class {sentinel} across {} frame(s)", before - after, masked.len());
    masked
}
