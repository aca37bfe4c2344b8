//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each entity leads with its identity (size name, file name) followed by its
//! dimensions; secondary context such as the source file sits on indented
//! lines underneath.
//!
//! # Output Format
//!
//! ## Synthesize
//!
//! ```text
//! photo.jpg (2000×1000, image/jpeg)
//!     image_1000x500   1000×500   photo-1000x500.jpg
//!     large            1024×512   photo-1024x512.jpg
//!     thumbnail        150×150    photo-150x150.jpg
//! 3 sizes
//! ```
//!
//! ## Catalog
//!
//! ```text
//! photo.jpg (2000×1000) → 42 sizes
//!     Source: 2024/01/photo.json
//!
//! Cataloged 1 file, 42 sizes
//! ```
//!
//! ## Resolve
//!
//! ```text
//! Original:  1600×1200
//! Requested: 400×0 (crop: hard)
//! Resolved:  400×300
//! Gravity:   ce
//! ```
//!
//! ## Sizes
//!
//! ```text
//! 001 thumbnail 150×150 (crop: hard) [generated]
//! 002 medium 300×300 (crop: none) [generated]
//! 003 image_512x512 512×512 (crop: hard)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::registry::SizeRegistry;
use crate::sizing::{CropSpec, Dimensions, Gravity, SizingError};
use crate::types::{ImageDescriptor, SizeMap};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dims(width: u32, height: u32) -> String {
    format!("{}×{}", width, height)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// synthesize
// ============================================================================

/// Format a synthesized size catalog, one line per size in key order.
pub fn format_size_map(image: &ImageDescriptor, sizes: &SizeMap) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}, {})",
        image.file_base_name,
        dims(image.width, image.height),
        image.media_type
    )];

    let key_width = sizes.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    let dims_width = sizes
        .values()
        .map(|r| dims(r.width, r.height).chars().count())
        .max()
        .unwrap_or(0);

    for (key, record) in sizes {
        lines.push(format!(
            "{}{:<kw$}  {:<dw$}  {}",
            indent(1),
            key,
            dims(record.width, record.height),
            record.file,
            kw = key_width,
            dw = dims_width,
        ));
    }
    lines.push(plural(sizes.len(), "size", "sizes"));
    lines
}

pub fn print_size_map(image: &ImageDescriptor, sizes: &SizeMap) {
    for line in format_size_map(image, sizes) {
        println!("{}", line);
    }
}

// ============================================================================
// catalog
// ============================================================================

/// One metadata file of a catalog run.
pub fn format_catalog_entry(source: &Path, image: &ImageDescriptor, size_count: usize) -> Vec<String> {
    vec![
        format!(
            "{} ({}) → {}",
            image.file_base_name,
            dims(image.width, image.height),
            plural(size_count, "size", "sizes")
        ),
        format!("{}Source: {}", indent(1), source.display()),
    ]
}

/// Closing summary of a catalog run.
pub fn format_catalog_summary(files: usize, sizes: usize, failed: usize) -> Vec<String> {
    let mut summary = format!(
        "Cataloged {}, {}",
        plural(files, "file", "files"),
        plural(sizes, "size", "sizes")
    );
    if failed > 0 {
        summary.push_str(&format!(" ({failed} failed)"));
    }
    vec![String::new(), summary]
}

// ============================================================================
// resolve
// ============================================================================

/// Outcome of resolving one size request against an original.
pub fn format_resolution(
    original: (u32, u32),
    requested: (u32, u32),
    crop: &CropSpec,
    resolved: &Result<Dimensions, SizingError>,
    gravity: &Gravity,
) -> Vec<String> {
    let resolved_line = match resolved {
        Ok(d) if d.is_unchanged() => "original (no resize)".to_string(),
        Ok(d) => dims(d.width, d.height),
        Err(e) => format!("error: {e}"),
    };
    let gravity_line = match gravity.offsets {
        Some((x, y)) => format!("{} (offset {x},{y})", gravity.code),
        None => gravity.code.to_string(),
    };

    vec![
        format!("Original:  {}", dims(original.0, original.1)),
        format!("Requested: {} (crop: {})", dims(requested.0, requested.1), crop),
        format!("Resolved:  {}", resolved_line),
        format!("Gravity:   {}", gravity_line),
    ]
}

pub fn print_resolution(
    original: (u32, u32),
    requested: (u32, u32),
    crop: &CropSpec,
    resolved: &Result<Dimensions, SizingError>,
    gravity: &Gravity,
) {
    for line in format_resolution(original, requested, crop, resolved, gravity) {
        println!("{}", line);
    }
}

// ============================================================================
// sizes
// ============================================================================

/// Registered sizes in registration order, marking the ones rendered to disk.
pub fn format_registry(registry: &SizeRegistry, generated: &SizeRegistry) -> Vec<String> {
    registry
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let mut line = format!(
                "{} {} {} (crop: {})",
                format_index(i + 1),
                spec.name,
                dims(spec.width, spec.height),
                spec.crop
            );
            if generated.get(&spec.name).is_some() {
                line.push_str(" [generated]");
            }
            line
        })
        .collect()
}

pub fn print_registry(registry: &SizeRegistry, generated: &SizeRegistry) {
    for line in format_registry(registry, generated) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizesConfig;
    use crate::sizing::map_crop;
    use crate::test_helpers::{descriptor, record};

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(12), "012");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "size", "sizes"), "1 size");
        assert_eq!(plural(0, "size", "sizes"), "0 sizes");
    }

    // =========================================================================
    // synthesize
    // =========================================================================

    #[test]
    fn size_map_lines_are_aligned() {
        let sizes: SizeMap = [record("large", 1024, 512), record("thumbnail", 150, 150)]
            .into_iter()
            .map(|r| (r.key.clone(), r))
            .collect();
        let lines = format_size_map(&descriptor(2000, 1000), &sizes);

        assert_eq!(lines[0], "photo.jpg (2000×1000, image/jpeg)");
        assert_eq!(lines[1], "    large      1024×512  photo-1024x512.jpg");
        assert_eq!(lines[2], "    thumbnail  150×150   photo-150x150.jpg");
        assert_eq!(lines[3], "2 sizes");
    }

    #[test]
    fn empty_size_map() {
        let lines = format_size_map(&descriptor(10, 10), &SizeMap::new());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "0 sizes");
    }

    // =========================================================================
    // catalog
    // =========================================================================

    #[test]
    fn catalog_entry_shows_source() {
        let lines = format_catalog_entry(Path::new("meta/photo.json"), &descriptor(800, 600), 12);
        assert_eq!(lines[0], "photo.jpg (800×600) → 12 sizes");
        assert_eq!(lines[1], "    Source: meta/photo.json");
    }

    #[test]
    fn catalog_summary_mentions_failures() {
        assert_eq!(format_catalog_summary(2, 80, 0)[1], "Cataloged 2 files, 80 sizes");
        assert_eq!(
            format_catalog_summary(1, 40, 1)[1],
            "Cataloged 1 file, 40 sizes (1 failed)"
        );
    }

    // =========================================================================
    // resolve
    // =========================================================================

    #[test]
    fn resolution_lines() {
        let lines = format_resolution(
            (1600, 1200),
            (400, 0),
            &CropSpec::Enabled,
            &Ok(Dimensions::new(400, 300)),
            &map_crop(&CropSpec::Enabled),
        );
        assert_eq!(
            lines,
            vec![
                "Original:  1600×1200",
                "Requested: 400×0 (crop: hard)",
                "Resolved:  400×300",
                "Gravity:   ce",
            ]
        );
    }

    #[test]
    fn resolution_unchanged_and_offsets() {
        let lines = format_resolution(
            (640, 480),
            (1024, 1024),
            &CropSpec::Disabled,
            &Ok(Dimensions::UNCHANGED),
            &map_crop(&CropSpec::Disabled),
        );
        assert_eq!(lines[2], "Resolved:  original (no resize)");
        assert_eq!(lines[3], "Gravity:   ce (offset 0,0)");
    }

    #[test]
    fn resolution_error() {
        let err = SizingError::InvalidDimensions {
            width: 0,
            height: 100,
        };
        let lines = format_resolution(
            (0, 100),
            (50, 50),
            &CropSpec::Enabled,
            &Err(err),
            &map_crop(&CropSpec::Enabled),
        );
        assert!(lines[2].starts_with("Resolved:  error:"));
    }

    // =========================================================================
    // sizes
    // =========================================================================

    #[test]
    fn registry_marks_generated_sizes() {
        let config = SizesConfig::default();
        let lines = format_registry(
            &SizeRegistry::from_config(&config),
            &SizeRegistry::sizes_to_generate(&config),
        );
        assert_eq!(lines[0], "001 thumbnail 150×150 (crop: hard) [generated]");
        assert_eq!(lines[1], "002 medium 300×300 (crop: none) [generated]");
        assert_eq!(lines[3], "004 image_512x512 512×512 (crop: hard)");
    }
}
