//! Link resolution for content imported from a crawled site.
//!
//! Imported pages still link to the old site's URL structure. Given the two
//! lookup tables built from the imported records (original URL → content id,
//! original URL → asset id), the [`Engine`] decides for each link found in
//! the content whether to leave it alone, rewrite it to a content reference,
//! rewrite it to an asset link, or record it as a failure.
//!
//! ```
//! use relink_engine::{AssetResolver, Context, Engine, EngineConfig, LookupTable, Resolution};
//!
//! struct NoAssets;
//! impl AssetResolver for NoAssets {
//!     fn asset_link(&self, _: u64) -> Option<String> { None }
//! }
//!
//! let content: LookupTable = [("http://example.com/about", 42)].into_iter().collect();
//! let mut engine = Engine::new(EngineConfig::new("http://example.com"), content, LookupTable::default());
//! let context = Context::new(1, "Home");
//!
//! let resolution = engine.resolve("/about#team", &context, &NoAssets);
//! assert_eq!(resolution.token("/about#team"), "[content_link,id=42]?ID=team");
//! assert_eq!(engine.resolve("mailto:x@y.com", &context, &NoAssets), Resolution::Ignored);
//! assert!(!engine.resolve("/never-imported", &context, &NoAssets).is_resolved());
//! assert_eq!(engine.failures().len(), 1);
//! ```

mod config;
mod consts;
mod engine;
pub mod error;
mod failure;
pub mod key;
mod lookup;
mod processor;
pub mod scheme;

pub use crate::config::EngineConfig;
pub use crate::consts::{CONTENT_LINK_SHORTCODE, DEFAULT_IGNORE_MARKER, DEFAULT_NON_HTTP_SCHEMES};
pub use crate::engine::{AssetResolver, Engine, Resolution};
pub use crate::failure::{Context, FailureCategory, FailureEntry, FailureLog};
pub use crate::lookup::LookupTable;
pub use crate::processor::{DropExtensions, NoopProcessor, ProcessedUrl, ProcessorKind, UrlProcessor};
