//! File-name convention for virtual sizes.
//!
//! Every virtual size is named after the original upload with a `-{w}x{h}`
//! token inserted before the extension, the same way the CMS names the
//! intermediate files it would have generated:
//!
//! - `photo.jpg` at 300×200 → `photo-300x200.jpg`
//! - `my.holiday.PNG` at 150×150 → `my.holiday-150x150.PNG`
//!
//! Only the trailing extension is targeted, so dots in the stem survive.
//! The inverse, [`strip_size_suffix`], recovers the original name from a
//! sized one.
//!
//! ## Keys
//!
//! Synthesized entries that have no registered name are keyed
//! `image_{w}x{h}` (see [`virtual_size_key`]).

use regex::Regex;
use std::sync::LazyLock;

/// `-{digits}x{digits}` right before a 3–4 letter extension at the end.
static SIZE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(-\d+x\d+)\.[a-z]{3,4}$").expect("size suffix pattern is valid")
});

/// Insert `-{width}x{height}` before the final extension of `base`.
///
/// The extension keeps its original case. Names without an extension are
/// returned unchanged.
///
/// ```
/// # use image_reformer::naming::derive_file_name;
/// assert_eq!(derive_file_name("photo.JPG", 300, 200), "photo-300x200.JPG");
/// assert_eq!(derive_file_name("a.b.c.png", 10, 20), "a.b.c-10x20.png");
/// ```
pub fn derive_file_name(base: &str, width: u32, height: u32) -> String {
    let name_start = base.rfind('/').map_or(0, |pos| pos + 1);
    match base[name_start..].rfind('.') {
        Some(rel) if name_start + rel + 1 < base.len() => {
            let dot = name_start + rel;
            format!("{}-{}x{}{}", &base[..dot], width, height, &base[dot..])
        }
        _ => base.to_string(),
    }
}

/// Return the `-{w}x{h}` token of a sized file name, if it has one.
///
/// ```
/// # use image_reformer::naming::size_suffix;
/// assert_eq!(size_suffix("photo-300x200.jpg"), Some("-300x200"));
/// assert_eq!(size_suffix("photo.jpg"), None);
/// ```
pub fn size_suffix(name: &str) -> Option<&str> {
    SIZE_SUFFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Remove a trailing `-{w}x{h}` token from a file name or URL.
///
/// Returns the input unchanged when no token is present, so applying it
/// twice is the same as applying it once.
pub fn strip_size_suffix(name: &str) -> String {
    match SIZE_SUFFIX.captures(name).and_then(|caps| caps.get(1)) {
        Some(token) => format!("{}{}", &name[..token.start()], &name[token.end()..]),
        None => name.to_string(),
    }
}

/// Key used for synthesized entries: `image_{w}x{h}`.
pub fn virtual_size_key(width: u32, height: u32) -> String {
    format!("image_{}x{}", width, height)
}

/// Last path segment of a file path or URL, ignoring any query string.
pub fn basename(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.rsplit('/').next().unwrap_or(path)
}

/// Media type implied by a file extension, for metadata that does not
/// carry one. Unknown extensions fall back to `application/octet-stream`.
pub fn media_type_for(name: &str) -> &'static str {
    let ext = basename(name)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
