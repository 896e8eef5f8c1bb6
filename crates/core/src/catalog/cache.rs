use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;

use super::loader::CardCatalog;
use crate::models::GameAssets;

/// Thread-safe, explicitly invalidated cache over [`CardCatalog::list_games`].
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    root_path: PathBuf,
    games: Option<BTreeMap<String, GameAssets>>,
}

impl CatalogCache {
    /// Build an empty cache rooted at `root_path`; nothing is read until first use.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                root_path: root_path.into(),
                games: None,
            })),
        }
    }

    /// Directory the catalog is read from.
    pub fn root_path(&self) -> PathBuf {
        self.inner.read().root_path.clone()
    }

    /// Point the cache at a new directory and drop any memoised result.
    pub fn refresh(&self, root_path: impl Into<PathBuf>) {
        let mut inner = self.inner.write();
        inner.root_path = root_path.into();
        inner.games = None;
    }

    /// Drop the memoised result so the next read hits the filesystem.
    pub fn invalidate(&self) {
        self.inner.write().games = None;
    }

    /// All games, populating the cache on first use.
    pub fn games(&self) -> BTreeMap<String, GameAssets> {
        if let Some(games) = self.inner.read().games.as_ref() {
            return games.clone();
        }

        let mut inner = self.inner.write();
        if inner.games.is_none() {
            debug!("reading catalog from {}", inner.root_path.display());
            let games = CardCatalog::list_games(&inner.root_path);
            inner.games = Some(games);
        }
        inner.games.clone().unwrap_or_default()
    }

    /// A single game by name.
    pub fn game(&self, name: &str) -> Option<GameAssets> {
        self.games().remove(name)
    }
}
