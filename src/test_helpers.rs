//! Shared test fixtures for the reformer test suite.
//!
//! Provides a config pointing at a CDN host, a sample attachment with a
//! couple of stored sizes, and small builders for descriptors and `srcset`
//! candidates.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let reformer = Reformer::new(test_config(), MockBuilder::new());
//! let meta = reformer.expand_metadata(&sample_attachment());
//! assert!(meta.sizes.contains_key("thumbnail"));
//! ```

use crate::config::ReformerConfig;
use crate::naming::derive_file_name;
use crate::types::{Attachment, AttachmentMeta, ImageDescriptor, SizeMap, SizeRecord, SrcsetSource};

/// Uploads base URL used by every fixture.
pub const UPLOADS: &str = "https://example.com/wp-content/uploads";

// =========================================================================
// Config
// =========================================================================

/// Default config with hosts rewritten to `https://cdn.example.com`.
pub fn test_config() -> ReformerConfig {
    ReformerConfig {
        site_host: Some("https://cdn.example.com".to_string()),
        uploads_base_url: UPLOADS.to_string(),
        ..ReformerConfig::default()
    }
}

// =========================================================================
// Images and attachments
// =========================================================================

/// `photo.jpg` as a JPEG of the given size.
pub fn descriptor(width: u32, height: u32) -> ImageDescriptor {
    ImageDescriptor::new(width, height, "photo.jpg", "image/jpeg")
}

/// Stored size record named after `photo.jpg`.
pub fn record(key: &str, width: u32, height: u32) -> SizeRecord {
    SizeRecord {
        key: key.to_string(),
        file: derive_file_name("photo.jpg", width, height),
        width,
        height,
        mime_type: "image/jpeg".to_string(),
    }
}

/// Attachment 42: a 2000×1000 JPEG at `2024/01/photo.jpg` with stored
/// `medium` (300×150) and `large` (1024×512) sizes.
pub fn sample_attachment() -> Attachment {
    let sizes: SizeMap = [record("medium", 300, 150), record("large", 1024, 512)]
        .into_iter()
        .map(|r| (r.key.clone(), r))
        .collect();

    Attachment {
        id: 42,
        url: format!("{UPLOADS}/2024/01/photo.jpg"),
        mime_type: "image/jpeg".to_string(),
        meta: AttachmentMeta {
            width: 2000,
            height: 1000,
            file: "2024/01/photo.jpg".to_string(),
            sizes,
            extra: Default::default(),
        },
    }
}

/// `srcset` candidate with a width descriptor.
pub fn srcset_source(url: &str, width: u32) -> SrcsetSource {
    SrcsetSource {
        url: url.to_string(),
        descriptor: "w".to_string(),
        value: width,
    }
}
