#![warn(clippy::all, missing_docs)]

//! Core logic for laying out card faces on printable sheets.
//!
//! This crate hosts the card catalog, image normalization, page
//! composition and document assembly used by the command line
//! frontend and any future ones.

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod render;
pub mod request;

pub use catalog::{CardCatalog, CatalogCache, CatalogScan};
pub use config::AppConfig;
pub use document::{Document, DocumentAssembler};
pub use error::{Error, Result};
pub use models::{CardAsset, GameAssets, QuantityMap};
pub use request::{generate, GenerationRequest};
