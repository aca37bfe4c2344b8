//! The rewriting pipeline.
//!
//! A [`Reformer`] owns the configuration, the size registry built from it,
//! and a [`UrlBuilder`]. Each CMS extension point maps to one method:
//!
//! | Extension point | Method |
//! |---|---|
//! | image `src` for a size | [`Reformer::rewrite_src`] |
//! | responsive `srcset` | [`Reformer::rewrite_srcset`] |
//! | attachment metadata | [`Reformer::expand_metadata`] |
//! | sizes to render on upload | [`Reformer::sizes_to_generate`] |
//! | post content | [`crate::content::rewrite_content`] |
//!
//! Every URL goes through [`Reformer::replace_host`] before it reaches the
//! builder. Attachments listed in `skip_ids` come back unchanged from every
//! method.
//!
//! The caller decides whether to call the pipeline at all for a request;
//! [`Reformer::is_active`] answers that from a [`RequestContext`].

use crate::config::ReformerConfig;
use crate::naming::basename;
use crate::registry::SizeRegistry;
use crate::sizing::{
    CropSpec, ParameterBag, UrlBuilder, plan_explicit_size, plan_named_size, plan_srcset_entry,
};
use crate::synthesize::synthesize;
use crate::types::{Attachment, AttachmentMeta, ImageDescriptor, SizeRequest, SrcsetSource};
use tracing::{debug, warn};
use url::Url;

/// What the pipeline knows about the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Request `action` parameter, if any.
    pub action: Option<String>,
    /// Admin screens always see the real files.
    pub is_admin: bool,
}

impl RequestContext {
    pub fn for_action(action: &str) -> Self {
        Self {
            action: Some(action.to_string()),
            is_admin: false,
        }
    }
}

pub struct Reformer<B: UrlBuilder> {
    config: ReformerConfig,
    registry: SizeRegistry,
    builder: B,
    /// `{scheme}://{host}` of the configured site host.
    target_origin: Option<String>,
    uploads_base_lower: String,
}

impl<B: UrlBuilder> Reformer<B> {
    pub fn new(config: ReformerConfig, builder: B) -> Self {
        let registry = SizeRegistry::from_config(&config.sizes);
        let target_origin = config.target_host().and_then(|host| match Url::parse(host) {
            Ok(url) => url
                .host_str()
                .map(|h| format!("{}://{}", url.scheme(), h)),
            Err(err) => {
                warn!(host, %err, "site_host is not a URL, hosts are left as they are");
                None
            }
        });
        let uploads_base_lower = config.uploads_base_url.to_lowercase();

        Self {
            config,
            registry,
            builder,
            target_origin,
            uploads_base_lower,
        }
    }

    pub fn config(&self) -> &ReformerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SizeRegistry {
        &self.registry
    }

    /// Whether URLs should be rewritten for this request at all.
    pub fn is_active(&self, request: &RequestContext) -> bool {
        if self.config.disable_conversion || request.is_admin {
            return false;
        }
        match &request.action {
            Some(action) => !self.config.excluded_actions.contains(action),
            None => true,
        }
    }

    pub fn is_skipped(&self, attachment_id: u64) -> bool {
        self.config.skip_ids.contains(&attachment_id)
    }

    /// Swap the `{scheme}://{host}` prefix of `url` for the configured one.
    ///
    /// Port, path and query stay as they are. The host is matched as written,
    /// so internationalized hosts keep working. Without a configured host, for
    /// a URL that does not parse, or one carrying userinfo, the input comes
    /// back unchanged.
    pub fn replace_host(&self, url: &str) -> String {
        let Some(target) = &self.target_origin else {
            return url.to_string();
        };
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(url, %err, "not an absolute URL, host left as is");
                return url.to_string();
            }
        };
        if parsed.host_str().is_none() {
            return url.to_string();
        }

        // The parsed host is punycode; match the host as written instead.
        let scheme_end = parsed.scheme().len() + "://".len();
        match url.get(..scheme_end) {
            Some(prefix) if prefix.eq_ignore_ascii_case(&format!("{}://", parsed.scheme())) => {
                match raw_host_end(&url[scheme_end..]) {
                    Some(host_len) => format!("{target}{}", &url[scheme_end + host_len..]),
                    None => url.to_string(),
                }
            }
            _ => url.to_string(),
        }
    }

    /// True when the URL points below the uploads directory (case-insensitive).
    pub fn is_upload_url(&self, url: &str) -> bool {
        url.to_lowercase().contains(&self.uploads_base_lower)
    }

    /// Backend URL for one size of an attachment.
    pub fn rewrite_src(&self, attachment: &Attachment, size: &SizeRequest) -> String {
        if self.is_skipped(attachment.id) {
            return attachment.url.clone();
        }

        let source = self.replace_host(&attachment.url);
        let params = match size {
            SizeRequest::Named(name) => plan_named_size(
                (attachment.meta.width, attachment.meta.height),
                self.registry.get(name),
            ),
            SizeRequest::Explicit { width, height } => plan_explicit_size(*width, *height),
        };
        self.build(&params, &source)
    }

    /// Rewrite the candidates of a `srcset`.
    ///
    /// Candidates that are not one of the attachment's size files are
    /// dropped. Matching candidates are served from the original file, sized
    /// like their record and cropped like the registered size matching
    /// `requested`.
    pub fn rewrite_srcset(
        &self,
        attachment: &Attachment,
        requested: (u32, u32),
        sources: &[SrcsetSource],
    ) -> Vec<SrcsetSource> {
        if self.is_skipped(attachment.id) {
            return sources.to_vec();
        }

        let origin = self.replace_host(&self.origin_file_url(&attachment.meta));
        let crop = self.srcset_crop(requested);

        sources
            .iter()
            .filter_map(|source| {
                let name = basename(&source.url);
                let Some(record) = attachment.meta.sizes.values().find(|r| r.file == name) else {
                    debug!(url = %source.url, "srcset candidate has no size record, dropped");
                    return None;
                };

                let mut source = source.clone();
                if record.width > 0 || record.height > 0 {
                    source.url = self.build(&plan_srcset_entry(record, &crop), &origin);
                }
                Some(source)
            })
            .collect()
    }

    /// Metadata with its size catalog replaced by the synthesized one.
    pub fn expand_metadata(&self, attachment: &Attachment) -> AttachmentMeta {
        let mut meta = attachment.meta.clone();
        if self.is_skipped(attachment.id) {
            return meta;
        }
        let image = ImageDescriptor::from_meta(&meta, &attachment.mime_type);
        meta.sizes = synthesize(&image, &self.registry);
        meta
    }

    /// Sizes the CMS should still render to disk on upload.
    pub fn sizes_to_generate(&self) -> SizeRegistry {
        SizeRegistry::sizes_to_generate(&self.config.sizes)
    }

    /// Hand a parameter bag and an already host-rewritten URL to the builder.
    pub(crate) fn build(&self, params: &ParameterBag, source: &str) -> String {
        self.builder.build(params, source)
    }

    fn origin_file_url(&self, meta: &AttachmentMeta) -> String {
        format!(
            "{}/{}",
            self.config.uploads_base_url.trim_end_matches('/'),
            meta.file.trim_start_matches('/')
        )
    }

    fn srcset_crop(&self, (width, height): (u32, u32)) -> CropSpec {
        self.registry
            .find_by_dimensions(width, height)
            .map(|spec| spec.crop)
            .unwrap_or(CropSpec::Enabled)
    }
}

/// Byte length of the host at the start of an authority, or `None` when the
/// authority carries userinfo or has no host.
fn raw_host_end(authority: &str) -> Option<usize> {
    let end = authority
        .find(['/', '\\', '?', '#'])
        .unwrap_or(authority.len());
    let authority = &authority[..end];
    if authority.contains('@') {
        return None;
    }
    let host_len = if authority.starts_with('[') {
        authority.find(']')? + 1
    } else {
        authority.find(':').unwrap_or(authority.len())
    };
    (host_len > 0).then_some(host_len)
}
