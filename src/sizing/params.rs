//! Parameter bag handed to the URL builder.
//!
//! These structs describe *what* the backend should produce, not *how* the
//! URL is encoded. Planning code (see [`operations`](super::operations))
//! fills a [`ParameterBag`]; a [`UrlBuilder`](super::builder::UrlBuilder)
//! turns it into a URL.

use super::calculations::Dimensions;
use super::gravity::Gravity;
use serde::Serialize;

/// Normalized transformation parameters for one URL.
///
/// `0` on an axis means "leave it to the backend" (keep the original size on
/// that axis). A bag without gravity asks for a plain resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterBag {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Gravity>,
}

impl ParameterBag {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            gravity: None,
        }
    }

    pub fn with_gravity(self, gravity: Gravity) -> Self {
        Self {
            gravity: Some(gravity),
            ..self
        }
    }
}

impl From<Dimensions> for ParameterBag {
    fn from(dims: Dimensions) -> Self {
        Self::sized(dims.width, dims.height)
    }
}
