//! Error taxonomy for document generation.

use std::path::PathBuf;

/// Failures raised while turning a card selection into a printable document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No game was selected, or the selected game is not in the catalog.
    #[error("select a valid game before generating the document{}", describe_selection(.0))]
    InvalidSelection(Option<String>),
    /// Every requested quantity was zero or negative.
    #[error("select at least one card to generate the document")]
    EmptySelection,
    /// A card image could not be opened or decoded.
    #[error("failed to load card image {}", .path.display())]
    ImageLoad {
        /// File that failed to decode.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },
    /// Composition finished without a single page.
    #[error("no pages were produced for the requested document")]
    NoPagesProduced,
    /// Filesystem access failed while writing the document.
    #[error("failed to access {}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A finished page could not be re-encoded for embedding.
    #[error("failed to encode page {page}")]
    Encode {
        /// Zero-based page index.
        page: usize,
        /// Underlying encoder error.
        #[source]
        source: image::ImageError,
    },
    /// The paginated document could not be serialized.
    #[error("failed to serialize document")]
    Pdf(#[from] lopdf::Error),
}

impl Error {
    /// Whether the error stems from the caller's selection rather than the environment.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::InvalidSelection(_) | Error::EmptySelection)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

fn describe_selection(name: &Option<String>) -> String {
    match name.as_deref() {
        Some(name) => format!(" (unknown game '{name}')"),
        None => String::new(),
    }
}

/// Result alias used across the rendering pipeline.
pub type Result<T> = std::result::Result<T, Error>;
