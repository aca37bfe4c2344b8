//! Size math and URL parameters. Pure: no image bytes involved.
//!
//! | Concern | Function |
//! |---|---|
//! | **Resolve** target box | [`resolve`] (crop or fit policy) |
//! | **Constrain** proportionally | [`constrain_dimensions`] |
//! | **Gravity** from crop | [`map_crop`] |
//! | **Plan** a request | [`plan_named_size`], [`plan_explicit_size`] |
//! | **Build** the URL | [`UrlBuilder`] + [`QueryStringBuilder`] |
//!
//! The module is split into:
//! - **Calculations**: dimension math (unit testable)
//! - **Gravity**: crop specification → backend gravity code
//! - **Parameters**: the [`ParameterBag`] handed to the URL builder
//! - **Builder**: [`UrlBuilder`] trait + [`QueryStringBuilder`]
//! - **Operations**: high-level planning combining calculations + gravity

pub mod builder;
mod calculations;
pub mod gravity;
pub mod operations;
mod params;

pub use builder::{QueryStringBuilder, UrlBuilder};
pub use calculations::{Dimensions, SizingError, aspect_ratio, constrain_dimensions, resolve};
pub use gravity::{CropSpec, Gravity, GravityCode, HorizontalAnchor, VerticalAnchor, map_crop};
pub use operations::{plan_explicit_size, plan_named_size, plan_srcset_entry};
pub use params::ParameterBag;
