//! # Image Reformer
//!
//! Moves image delivery of a CMS to an image-transformation backend. Instead
//! of rendering every intermediate size to disk on upload, the CMS is handed
//! URLs that describe the size (`?w=300&h=200&g=ce`) and metadata that
//! claims the sizes exist.
//!
//! # Architecture: Pure Core, Thin Edges
//!
//! ```text
//! config ──► registry ──► synthesize ──► size catalog (metadata)
//!                │
//!                └──► sizing: resolve + gravity ──► ParameterBag ──► UrlBuilder ──► URL
//! ```
//!
//! Everything below [`rewrite`] is pure: no image bytes, no network, no
//! shared state. The same input always gives the same output, so each piece
//! is tested on its own and a [`rewrite::Reformer`] is `Send + Sync`
//! whenever its builder is.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sizing`] | Target-box resolution, crop → gravity mapping, parameter planning, URL builder trait |
//! | [`naming`] | `-{w}x{h}` file-name convention: derive, detect, strip |
//! | [`registry`] | Registered sizes: stock, additional, touch icons |
//! | [`synthesize`] | Virtual size catalog: registered + original + step-down cascade |
//! | [`rewrite`] | The pipeline: activation, host rewrite, `src`, `srcset`, metadata |
//! | [`content`] | `<img>` rewriting inside HTML content |
//! | [`config`] | `reformer.toml` loading, validation, and merging |
//! | [`types`] | Attachment, metadata and size records shared by all modules |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Virtual Sizes Over Generated Files
//!
//! The CMS only renders the stock sizes to disk
//! ([`rewrite::Reformer::sizes_to_generate`]); every other size exists in
//! metadata alone. Each record carries the file name the CMS would have
//! used, so `srcset` matching by file name keeps working, and the backend
//! receives the original file with the target box.
//!
//! ## Step-Down Cascade
//!
//! Themes ask for arbitrary widths. Every catalog entry therefore gets
//! companions every 100 pixels narrower (see [`synthesize::CASCADE_STEP`]),
//! so the CMS can always find a close match without a registered size.
//!
//! ## Explicit Configuration
//!
//! Every switch that decides whether and how URLs are rewritten lives in one
//! [`config::ReformerConfig`] passed in at construction. Nothing is read
//! from globals or the environment.

pub mod config;
pub mod content;
pub mod naming;
pub mod output;
pub mod registry;
pub mod rewrite;
pub mod sizing;
pub mod synthesize;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
