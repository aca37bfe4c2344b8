//! Rewriting `<img>` tags inside HTML content.
//!
//! Post bodies reference uploads directly, so their `src` attributes never
//! go through the size hooks. [`rewrite_content`] finds every `<img>` tag,
//! and for those pointing below the uploads directory replaces the `src`
//! value with a backend URL sized from the tag's own `width`/`height`
//! attributes. Everything outside the `src` value is left byte-for-byte as
//! it was.
//!
//! Tags are matched with regexes, one tag at a time and never across a `>`.

use crate::rewrite::Reformer;
use crate::sizing::{UrlBuilder, plan_explicit_size};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("img tag pattern is valid"));

static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| attribute_pattern("src"));
static WIDTH_ATTR: LazyLock<Regex> = LazyLock::new(|| attribute_pattern("width"));
static HEIGHT_ATTR: LazyLock<Regex> = LazyLock::new(|| attribute_pattern("height"));

/// `name="value"` or `name='value'`, preceded by whitespace so `data-src`
/// does not count as `src`.
fn attribute_pattern(name: &str) -> Regex {
    Regex::new(&format!(r#"(?i)\s{name}\s*=\s*(?:"([^"]*)"|'([^']*)')"#))
        .expect("attribute pattern is valid")
}

/// Rewrite the `src` of every upload `<img>` in `html`.
pub fn rewrite_content<B: UrlBuilder>(reformer: &Reformer<B>, html: &str) -> String {
    IMG_TAG
        .replace_all(html, |caps: &Captures| rewrite_tag(reformer, &caps[0]))
        .into_owned()
}

fn rewrite_tag<B: UrlBuilder>(reformer: &Reformer<B>, tag: &str) -> String {
    let Some(src) = SRC_ATTR.captures(tag).and_then(|c| c.get(1).or_else(|| c.get(2))) else {
        return tag.to_string();
    };
    let url = src.as_str();

    if !reformer.is_upload_url(url) {
        return tag.to_string();
    }
    if let Some(pattern) = reformer
        .config()
        .skip_srcs
        .iter()
        .find(|p| !p.is_empty() && url.contains(p.as_str()))
    {
        debug!(url, pattern = %pattern, "src matches skip list");
        return tag.to_string();
    }

    let params = plan_explicit_size(
        attribute_u32(&WIDTH_ATTR, tag),
        attribute_u32(&HEIGHT_ATTR, tag),
    );
    let rewritten = reformer.build(&params, &reformer.replace_host(url));

    format!("{}{}{}", &tag[..src.start()], rewritten, &tag[src.end()..])
}

/// Numeric attribute value; missing or non-numeric values read as unset.
fn attribute_u32(pattern: &Regex, tag: &str) -> Option<u32> {
    pattern
        .captures(tag)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .and_then(|m| m.as_str().trim().parse().ok())
}
