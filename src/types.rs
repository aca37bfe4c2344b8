//! Shared types passed between the registry, the synthesizer and the rewriter.
//!
//! The serialized forms follow the CMS attachment metadata layout, so a
//! metadata record exported as JSON deserializes straight into
//! [`AttachmentMeta`] and a synthesized [`SizeMap`] serializes back into the
//! same shape (`file`, `width`, `height`, `mime-type`).

use crate::naming;
use crate::sizing::CropSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Size records keyed by size name, in deterministic order.
pub type SizeMap = BTreeMap<String, SizeRecord>;

/// An original upload as the core sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
    /// File name without directories (`photo.jpg`).
    pub file_base_name: String,
    pub media_type: String,
}

impl ImageDescriptor {
    pub fn new(width: u32, height: u32, file_base_name: &str, media_type: &str) -> Self {
        Self {
            width,
            height,
            file_base_name: file_base_name.to_string(),
            media_type: media_type.to_string(),
        }
    }

    /// Describe the original of a metadata record.
    pub fn from_meta(meta: &AttachmentMeta, media_type: &str) -> Self {
        Self::new(
            meta.width,
            meta.height,
            naming::basename(&meta.file),
            media_type,
        )
    }
}

/// A registered (or requested) target size. Zero means unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeSpec {
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub crop: CropSpec,
}

impl SizeSpec {
    pub fn new(name: &str, width: u32, height: u32, crop: CropSpec) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            crop,
        }
    }
}

/// One entry of an attachment's size catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRecord {
    /// Catalog key. Serialized as the map key only; [`AttachmentMeta`] copies
    /// it back into each record on load.
    #[serde(skip)]
    pub key: String,
    pub file: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "mime-type", default)]
    pub mime_type: String,
}

/// Attachment metadata as stored by the CMS.
///
/// Fields the core does not use (EXIF blocks, file size, ...) are kept in
/// `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub width: u32,
    pub height: u32,
    /// Path relative to the uploads directory (`2024/01/photo.jpg`).
    pub file: String,
    #[serde(default, deserialize_with = "deserialize_size_map")]
    pub sizes: SizeMap,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn deserialize_size_map<'de, D>(deserializer: D) -> Result<SizeMap, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut sizes = SizeMap::deserialize(deserializer)?;
    for (key, record) in sizes.iter_mut() {
        record.key = key.clone();
    }
    Ok(sizes)
}

/// An attachment handed to the rewriter.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: u64,
    /// Public URL of the original upload.
    pub url: String,
    pub mime_type: String,
    pub meta: AttachmentMeta,
}

/// One candidate of a `srcset` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrcsetSource {
    pub url: String,
    /// `w` or `x`.
    pub descriptor: String,
    pub value: u32,
}

/// What size of an attachment is being asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeRequest {
    /// A registered size name (`medium`, `image_512x512`).
    Named(String),
    /// An arbitrary box; `None` leaves the axis unconstrained.
    Explicit {
        width: Option<u32>,
        height: Option<u32>,
    },
}

/// Parses `300x200`, `300x`, `x200` as explicit boxes; anything else is a name.
impl FromStr for SizeRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("size must not be empty".to_string());
        }

        let axis = |part: &str| -> Option<Option<u32>> {
            if part.is_empty() {
                Some(None)
            } else if part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse().ok().map(Some)
            } else {
                None
            }
        };

        if let Some((w, h)) = s.split_once('x') {
            if let (Some(width), Some(height)) = (axis(w), axis(h)) {
                if width.is_some() || height.is_some() {
                    return Ok(Self::Explicit { width, height });
                }
            }
        }

        Ok(Self::Named(s.to_string()))
    }
}
