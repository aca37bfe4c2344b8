//! URL builder trait and the query-string reference implementation.
//!
//! The [`UrlBuilder`] trait is the boundary to the transformation backend:
//! it receives an already-normalized [`ParameterBag`] and a source URL whose
//! host has already been rewritten, and returns the URL to serve. Nothing
//! else in the crate knows how the backend encodes its parameters.
//!
//! [`QueryStringBuilder`] is the stock encoder: it appends the parameters as
//! a query string (`?w=300&h=200&g=ce`), which is what query-driven CDNs
//! expect.

use super::params::ParameterBag;
use url::form_urlencoded;

/// Turns a parameter bag and a source URL into a backend URL.
///
/// Implementations must be pure: same input, same output.
pub trait UrlBuilder: Sync {
    fn build(&self, params: &ParameterBag, source_url: &str) -> String;
}

/// Appends `w`, `h`, `g`, `gx`, `gy` query parameters to the source URL.
///
/// Zero axes are left out so the backend keeps the original extent. A bag
/// with nothing to say returns the source URL as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStringBuilder;

impl UrlBuilder for QueryStringBuilder {
    fn build(&self, params: &ParameterBag, source_url: &str) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());

        if params.width > 0 {
            query.append_pair("w", &params.width.to_string());
        }
        if params.height > 0 {
            query.append_pair("h", &params.height.to_string());
        }
        if let Some(gravity) = params.gravity {
            query.append_pair("g", gravity.code.as_str());
            if let Some((x, y)) = gravity.offsets {
                query.append_pair("gx", &x.to_string());
                query.append_pair("gy", &y.to_string());
            }
        }

        let query = query.finish();
        if query.is_empty() {
            return source_url.to_string();
        }

        let (base, fragment) = match source_url.find('#') {
            Some(pos) => source_url.split_at(pos),
            None => (source_url, ""),
        };
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}{query}{fragment}")
    }
}
