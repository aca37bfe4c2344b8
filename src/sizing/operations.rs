//! High-level planning of URL parameters.
//!
//! These functions combine the dimension calculations with the gravity
//! mapper. They take a request, compute a [`ParameterBag`], and leave the
//! encoding to the builder.

use super::calculations::resolve;
use super::gravity::{CropSpec, map_crop};
use super::params::ParameterBag;
use crate::types::{SizeRecord, SizeSpec};
use tracing::{debug, warn};

/// Plan the parameters for a registered size of an original.
///
/// A missing spec means "no resize": the original dimensions are requested
/// with fit gravity. An original whose dimensions cannot be resolved
/// degrades the same way.
pub fn plan_named_size(original: (u32, u32), spec: Option<&SizeSpec>) -> ParameterBag {
    let (orig_w, orig_h) = original;

    let Some(spec) = spec else {
        debug!(orig_w, orig_h, "size not registered, serving original dimensions");
        return ParameterBag::sized(orig_w, orig_h).with_gravity(map_crop(&CropSpec::Disabled));
    };

    match resolve(orig_w, orig_h, spec.width, spec.height, &spec.crop) {
        Ok(dims) => ParameterBag::from(dims).with_gravity(map_crop(&spec.crop)),
        Err(err) => {
            warn!(size = %spec.name, %err, "cannot resolve size, serving original dimensions");
            ParameterBag::sized(orig_w, orig_h).with_gravity(map_crop(&CropSpec::Disabled))
        }
    }
}

/// Plan the parameters for an arbitrary box. No gravity is sent.
pub fn plan_explicit_size(width: Option<u32>, height: Option<u32>) -> ParameterBag {
    ParameterBag::sized(width.unwrap_or(0), height.unwrap_or(0))
}

/// Plan the parameters for one `srcset` candidate backed by a size record.
pub fn plan_srcset_entry(record: &SizeRecord, crop: &CropSpec) -> ParameterBag {
    ParameterBag::sized(record.width, record.height).with_gravity(map_crop(crop))
}
