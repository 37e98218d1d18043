//! Text auto-fit engine.
//!
//! Given a text object confined to a fixed box, find the largest integer
//! font size whose rendered block height still fits. The engine only
//! supplies width/height constraints and reads back a scalar height from
//! the surface's measurement primitive; wrapping itself is the surface's
//! business.
//!
//! The box is shrunk by an internal padding that grows with bold weight,
//! and the probe width additionally by a few pixels for center/right
//! alignment. These are presentation-compensation heuristics tuned
//! against the production renderer — configuration, not typography.

use ads_canvas::{CanvasSurface, ObjectId, ObjectPatch};
use ads_core::model::TextAlign;
use serde::{Deserialize, Serialize};

/// Tunable constants of the fit search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Smallest candidate size; also the floor when nothing fits.
    pub min_size: u32,
    /// Largest candidate size.
    pub max_size: u32,
    /// Internal box padding, both axes.
    pub base_pad: f64,
    /// Extra padding when the text is bold.
    pub bold_pad: f64,
    /// Extra probe-width reduction for center/right alignment.
    pub align_pad: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_size: 8,
            max_size: 100,
            base_pad: 5.0,
            bold_pad: 3.0,
            align_pad: 5.0,
        }
    }
}

impl FitConfig {
    /// Internal padding for the given weight.
    pub fn padding(&self, bold: bool) -> f64 {
        self.base_pad + if bold { self.bold_pad } else { 0.0 }
    }

    /// Width given to the measurement primitive while probing.
    pub fn probe_width(&self, fixed_width: f64, bold: bool, align: TextAlign) -> f64 {
        let align_extra = match align {
            TextAlign::Left => 0.0,
            TextAlign::Center | TextAlign::Right => self.align_pad,
        };
        fixed_width - 2.0 * self.padding(bold) - align_extra
    }

    /// Height a probe must stay within.
    pub fn allowed_height(&self, fixed_height: f64, bold: bool) -> f64 {
        fixed_height - 2.0 * self.padding(bold)
    }
}

/// Outcome of a fit search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    /// Largest fitting integer size (or the floor).
    pub font_size: f64,
    /// Measured block height at the final size and full box width.
    pub height: f64,
}

/// Binary-search the largest fitting font size for a text object.
///
/// Probes mutate the object's font size and nominal width; afterwards the
/// winning size is committed and the full box width restored so final
/// wrapping uses the whole box. Returns `None` only if the surface cannot
/// measure the object (unknown id or not a text object).
pub fn fit_text<S: CanvasSurface>(
    surface: &mut S,
    obj: ObjectId,
    fixed_width: f64,
    fixed_height: f64,
    bold: bool,
    align: TextAlign,
    cfg: &FitConfig,
) -> Option<FitResult> {
    let probe_width = cfg.probe_width(fixed_width, bold, align);
    let allowed = cfg.allowed_height(fixed_height, bold);

    let mut low = cfg.min_size as i64;
    let mut high = cfg.max_size as i64;
    while low <= high {
        let mid = (low + high) / 2;
        surface.apply(
            obj,
            ObjectPatch {
                font_size: Some(mid as f64),
                width: Some(probe_width),
                ..ObjectPatch::default()
            },
        );
        let measured = surface.measure_text_height(obj)?;
        log::trace!("fit probe size={mid} measured={measured:.2} allowed={allowed:.2}");
        if measured <= allowed {
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }

    // `high` is the largest size proven to fit. When even the minimum
    // overflows the box, the engine floors there instead of failing; the
    // text may visibly overflow, which is accepted.
    let winner = high.max(i64::from(cfg.min_size)) as f64;

    surface.apply(
        obj,
        ObjectPatch {
            font_size: Some(winner),
            width: Some(fixed_width),
            height: Some(fixed_height),
            ..ObjectPatch::default()
        },
    );
    let height = surface.measure_text_height(obj)?;
    Some(FitResult {
        font_size: winner,
        height,
    })
}
