//! Pure calculation functions for target dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::gravity::CropSpec;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizingError {
    #[error("invalid dimensions {width}x{height}: cannot compute an aspect ratio")]
    InvalidDimensions { width: u32, height: u32 },
}

/// A concrete width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// `0×0`: no resize, the backend serves the original.
    pub const UNCHANGED: Dimensions = Dimensions {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_unchanged(self) -> bool {
        self == Self::UNCHANGED
    }
}

/// Width divided by height.
///
/// # Errors
/// [`SizingError::InvalidDimensions`] when `height` is zero.
pub fn aspect_ratio(width: u32, height: u32) -> Result<f64, SizingError> {
    if height == 0 {
        return Err(SizingError::InvalidDimensions { width, height });
    }
    Ok(width as f64 / height as f64)
}

/// Scale `current` down proportionally so it fits inside `max`.
///
/// A zero bound leaves that axis unconstrained; both zero returns `current`.
/// Results never drop below 1, and a dimension that rounds to one pixel
/// short of its bound is snapped onto the bound.
///
/// # Examples
/// ```
/// # use image_reformer::sizing::constrain_dimensions;
/// // 1600x1200 into a 400-wide box → 400x300
/// assert_eq!(constrain_dimensions((1600, 1200), (400, 0)), (400, 300));
///
/// // Already inside the box → unchanged
/// assert_eq!(constrain_dimensions((300, 200), (400, 400)), (300, 200));
/// ```
pub fn constrain_dimensions(current: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (cur_w, cur_h) = current;
    let (max_w, max_h) = max;

    if max_w == 0 && max_h == 0 {
        return current;
    }

    let did_width = max_w > 0 && cur_w > max_w;
    let did_height = max_h > 0 && cur_h > max_h;

    let width_ratio = if did_width {
        max_w as f64 / cur_w as f64
    } else {
        1.0
    };
    let height_ratio = if did_height {
        max_h as f64 / cur_h as f64
    } else {
        1.0
    };

    let smaller = width_ratio.min(height_ratio);
    let larger = width_ratio.max(height_ratio);

    // The larger ratio only wins when it still fits on both axes.
    let ratio = if (cur_w as f64 * larger).round() as u32 > max_w
        || (cur_h as f64 * larger).round() as u32 > max_h
    {
        smaller
    } else {
        larger
    };

    let mut w = ((cur_w as f64 * ratio).round() as u32).max(1);
    let mut h = ((cur_h as f64 * ratio).round() as u32).max(1);

    if did_width && w + 1 == max_w {
        w = max_w;
    }
    if did_height && h + 1 == max_h {
        h = max_h;
    }

    (w, h)
}

/// Resolve the dimensions to request for an original of `orig_w × orig_h`
/// against a `dest_w × dest_h` box (0 = unconstrained axis).
///
/// Returns [`Dimensions::UNCHANGED`] when the original is already small
/// enough:
/// - height unconstrained and the original is narrower than `dest_w`
/// - width unconstrained and the original is shorter than `dest_h`
/// - both set and the original fits inside both bounds
///
/// With a crop, each axis is clamped to the original and an unconstrained
/// axis follows the aspect ratio. Without one, the original is scaled to fit
/// the box ([`constrain_dimensions`]).
///
/// # Errors
/// [`SizingError::InvalidDimensions`] when a resize is needed but the
/// original has a zero axis.
pub fn resolve(
    orig_w: u32,
    orig_h: u32,
    dest_w: u32,
    dest_h: u32,
    crop: &CropSpec,
) -> Result<Dimensions, SizingError> {
    let already_fits = if dest_h == 0 {
        orig_w < dest_w
    } else if dest_w == 0 {
        orig_h < dest_h
    } else {
        orig_w <= dest_w && orig_h <= dest_h
    };

    if already_fits {
        return Ok(Dimensions::UNCHANGED);
    }

    if orig_w == 0 || orig_h == 0 {
        return Err(SizingError::InvalidDimensions {
            width: orig_w,
            height: orig_h,
        });
    }

    if crop.is_enabled() {
        let ratio = aspect_ratio(orig_w, orig_h)?;
        let mut width = dest_w.min(orig_w);
        let mut height = dest_h.min(orig_h);

        if width == 0 {
            width = (height as f64 * ratio).round() as u32;
        }
        if height == 0 {
            height = (width as f64 / ratio).round() as u32;
        }

        Ok(Dimensions::new(width, height))
    } else {
        let (width, height) = constrain_dimensions((orig_w, orig_h), (dest_w, dest_h));
        Ok(Dimensions::new(width, height))
    }
}
