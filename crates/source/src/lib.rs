//! Imported content and asset records, and where they are kept.
//!
//! A [`Source`] is one crawled site's export: its base URL, the URL processor
//! its crawler applied, the content records and the asset records. A
//! [`ContentRepository`] lists those records and saves rewritten content.

pub mod error;
mod models;
pub mod repository;

pub use crate::models::{AssetRecord, ContentRecord, Source, SourceInfo};
#[cfg(feature = "mock")]
pub use crate::repository::MemoryRepository;
pub use crate::repository::{ContentRepository, JsonRepository, SourceAssets};
