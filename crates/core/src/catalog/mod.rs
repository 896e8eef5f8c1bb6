//! Card catalog discovery and caching.

/// Memoised catalog shared between callers.
pub mod cache;
/// Filesystem discovery of game folders.
pub mod loader;

pub use cache::CatalogCache;
pub use loader::{
    CardCatalog, CatalogScan, SkipReason, SkippedFolder, ALLOWED_EXTENSIONS, BACK_CARD_STEM,
};
