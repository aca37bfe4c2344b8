//! Virtual size synthesis.
//!
//! Builds the size catalog a CMS expects for an attachment without any file
//! on disk. The catalog is assembled from three layers:
//!
//! 1. one record per registered size, named with the `-{w}x{h}` convention;
//! 2. one record for the original, keyed `image_{w}x{h}`;
//! 3. a cascade of step-down widths for every record of (1) and (2).
//!
//! Layers are merged in that order and the first record written under a key
//! wins. The result is a [`SizeMap`], so iteration order does not depend on
//! the registry order and two calls on the same input are identical.

use crate::naming::{derive_file_name, virtual_size_key};
use crate::registry::SizeRegistry;
use crate::sizing::aspect_ratio;
use crate::types::{ImageDescriptor, SizeMap, SizeRecord, SizeSpec};
use tracing::debug;

/// Width decrement between cascade entries. Records narrower or shorter than
/// this get no cascade.
pub const CASCADE_STEP: u32 = 100;

/// Synthesize the full size catalog for an original.
pub fn synthesize(image: &ImageDescriptor, registry: &SizeRegistry) -> SizeMap {
    let mut records: Vec<SizeRecord> = registry
        .iter()
        .filter_map(|spec| registered_record(image, spec))
        .collect();
    records.push(original_record(image));

    // Every registered record and the original claim their keys before any cascade.
    let cascades: Vec<SizeRecord> = records
        .iter()
        .flat_map(|record| cascade_sizes(record, &image.file_base_name, &image.media_type))
        .collect();

    let mut sizes = SizeMap::new();
    for record in records.into_iter().chain(cascades) {
        sizes.entry(record.key.clone()).or_insert(record);
    }
    sizes
}

/// Step-down records for one size: widths `w, w-100, …` while above 100,
/// heights following the record's aspect ratio.
///
/// Returns nothing when either axis is below [`CASCADE_STEP`].
pub fn cascade_sizes(record: &SizeRecord, base_name: &str, media_type: &str) -> Vec<SizeRecord> {
    if record.width < CASCADE_STEP || record.height < CASCADE_STEP {
        return Vec::new();
    }
    let ratio = f64::from(record.width) / f64::from(record.height);

    let mut steps = Vec::new();
    let mut width = record.width;
    while width > CASCADE_STEP {
        let height = (f64::from(width) / ratio).round() as u32;
        steps.push(SizeRecord {
            key: virtual_size_key(width, height),
            file: derive_file_name(base_name, width, height),
            width,
            height,
            mime_type: media_type.to_string(),
        });
        width -= CASCADE_STEP;
    }
    steps
}

/// Record for a registered size, filling a missing axis from the original's
/// aspect ratio.
fn registered_record(image: &ImageDescriptor, spec: &SizeSpec) -> Option<SizeRecord> {
    let (mut width, mut height) = (spec.width, spec.height);

    if (width == 0) != (height == 0) {
        let ratio = match aspect_ratio(image.width, image.height) {
            Ok(ratio) if image.width > 0 => ratio,
            _ => {
                debug!(
                    size = %spec.name,
                    width = image.width,
                    height = image.height,
                    "skipping size of degenerate original"
                );
                return None;
            }
        };
        if height == 0 {
            height = (f64::from(image.width) / ratio).round() as u32;
        } else {
            width = (f64::from(image.height) * ratio).round() as u32;
        }
    }

    Some(SizeRecord {
        key: spec.name.clone(),
        file: derive_file_name(&image.file_base_name, width, height),
        width,
        height,
        mime_type: image.media_type.clone(),
    })
}

fn original_record(image: &ImageDescriptor) -> SizeRecord {
    SizeRecord {
        key: virtual_size_key(image.width, image.height),
        file: derive_file_name(&image.file_base_name, image.width, image.height),
        width: image.width,
        height: image.height,
        mime_type: image.media_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizesConfig;
    use crate::sizing::CropSpec;
    use crate::test_helpers::descriptor;

    fn record(width: u32, height: u32) -> SizeRecord {
        SizeRecord {
            key: virtual_size_key(width, height),
            file: derive_file_name("photo.jpg", width, height),
            width,
            height,
            mime_type: "image/jpeg".to_string(),
        }
    }

    // =========================================================================
    // cascade_sizes
    // =========================================================================

    #[test]
    fn cascade_1000x500_has_nine_steps() {
        let steps = cascade_sizes(&record(1000, 500), "photo.jpg", "image/jpeg");
        let widths: Vec<u32> = steps.iter().map(|s| s.width).collect();
        assert_eq!(widths, (2..=10).rev().map(|n| n * 100).collect::<Vec<_>>());
        for step in &steps {
            assert_eq!(step.height, (f64::from(step.width) * 0.5).round() as u32);
        }
        assert_eq!(steps[0].key, "image_1000x500");
        assert_eq!(steps[8].file, "photo-200x100.jpg");
    }

    #[test]
    fn cascade_rounds_heights() {
        let steps = cascade_sizes(&record(1024, 683), "photo.jpg", "image/jpeg");
        let second = &steps[1];
        assert_eq!(second.width, 924);
        assert_eq!(second.height, 616);
        assert_eq!(second.key, "image_924x616");
    }

    #[test]
    fn cascade_stops_above_step() {
        let steps = cascade_sizes(&record(250, 250), "photo.jpg", "image/jpeg");
        let widths: Vec<u32> = steps.iter().map(|s| s.width).collect();
        assert_eq!(widths, vec![250, 150]);
    }

    #[test]
    fn cascade_skips_small_records() {
        assert!(cascade_sizes(&record(99, 500), "photo.jpg", "image/jpeg").is_empty());
        assert!(cascade_sizes(&record(500, 99), "photo.jpg", "image/jpeg").is_empty());
        // Exactly one step wide: loop condition is strict
        assert!(cascade_sizes(&record(100, 100), "photo.jpg", "image/jpeg").is_empty());
    }

    #[test]
    fn cascade_carries_media_type() {
        let steps = cascade_sizes(&record(300, 300), "photo.webp", "image/webp");
        assert!(steps.iter().all(|s| s.mime_type == "image/webp"));
        assert_eq!(steps[0].file, "photo-300x300.webp");
    }

    // =========================================================================
    // synthesize
    // =========================================================================

    #[test]
    fn synthesize_includes_registered_original_and_cascade() {
        let registry: SizeRegistry =
            vec![SizeSpec::new("thumbnail", 150, 150, CropSpec::Enabled)]
                .into_iter()
                .collect();
        let sizes = synthesize(&descriptor(1000, 500), &registry);

        let thumb = &sizes["thumbnail"];
        assert_eq!((thumb.width, thumb.height), (150, 150));
        assert_eq!(thumb.file, "photo-150x150.jpg");

        let original = &sizes["image_1000x500"];
        assert_eq!(original.file, "photo-1000x500.jpg");

        // Thumbnail cascade: 150
        assert!(sizes.contains_key("image_150x150"));
        // Original cascade: 1000..=200
        assert!(sizes.contains_key("image_200x100"));
        assert!(!sizes.contains_key("image_100x50"));
    }

    #[test]
    fn synthesize_fills_missing_height_from_original() {
        let registry: SizeRegistry = vec![SizeSpec::new("wide", 768, 0, CropSpec::Disabled)]
            .into_iter()
            .collect();
        let sizes = synthesize(&descriptor(1000, 500), &registry);
        let wide = &sizes["wide"];
        assert_eq!(wide.width, 768);
        assert_eq!(wide.height, 500);
    }

    #[test]
    fn synthesize_fills_missing_width_from_original() {
        let registry: SizeRegistry = vec![SizeSpec::new("tall", 0, 300, CropSpec::Disabled)]
            .into_iter()
            .collect();
        let sizes = synthesize(&descriptor(1000, 500), &registry);
        assert_eq!(sizes["tall"].width, 1000);
    }

    #[test]
    fn synthesize_skips_half_set_sizes_of_degenerate_original() {
        let registry: SizeRegistry = vec![
            SizeSpec::new("wide", 768, 0, CropSpec::Disabled),
            SizeSpec::new("box", 300, 300, CropSpec::Enabled),
        ]
        .into_iter()
        .collect();
        let sizes = synthesize(&descriptor(1000, 0), &registry);
        assert!(!sizes.contains_key("wide"));
        assert!(sizes.contains_key("box"));
        assert!(sizes.contains_key("image_1000x0"));

        let sizes = synthesize(&descriptor(0, 800), &registry);
        assert!(!sizes.contains_key("wide"));
        assert!(sizes.contains_key("image_0x800"));
    }

    #[test]
    fn synthesize_keeps_unconstrained_size() {
        let registry: SizeRegistry = vec![SizeSpec::new("free", 0, 0, CropSpec::Disabled)]
            .into_iter()
            .collect();
        let sizes = synthesize(&descriptor(640, 480), &registry);
        assert_eq!((sizes["free"].width, sizes["free"].height), (0, 0));
    }

    #[test]
    fn synthesize_first_write_wins() {
        // A registered size keyed like a cascade entry keeps its own record
        let registry: SizeRegistry =
            vec![SizeSpec::new("image_900x450", 300, 300, CropSpec::Enabled)]
                .into_iter()
                .collect();
        let sizes = synthesize(&descriptor(1000, 500), &registry);
        let entry = &sizes["image_900x450"];
        assert_eq!((entry.width, entry.height), (300, 300));
        assert_eq!(entry.file, "photo-300x300.jpg");
        assert!(sizes.contains_key("image_800x400"));
    }

    #[test]
    fn synthesize_registered_sizes_beat_earlier_cascades() {
        // "big" cascades through image_900x450 before the second size is merged
        let registry: SizeRegistry = vec![
            SizeSpec::new("big", 1000, 500, CropSpec::Disabled),
            SizeSpec::new("image_900x450", 300, 300, CropSpec::Enabled),
        ]
        .into_iter()
        .collect();
        let sizes = synthesize(&descriptor(2000, 1000), &registry);
        let entry = &sizes["image_900x450"];
        assert_eq!((entry.width, entry.height), (300, 300));
        assert_eq!(entry.file, "photo-300x300.jpg");
    }

    #[test]
    fn synthesize_is_deterministic() {
        let registry = SizeRegistry::from_config(&SizesConfig::default());
        let image = descriptor(1920, 1080);
        let first = synthesize(&image, &registry);
        let second = synthesize(&image, &registry);
        assert_eq!(first, second);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            second.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn synthesize_keys_match_records() {
        let registry = SizeRegistry::from_config(&SizesConfig::default());
        let sizes = synthesize(&descriptor(1200, 800), &registry);
        for (key, record) in &sizes {
            assert_eq!(key, &record.key);
        }
    }
}
