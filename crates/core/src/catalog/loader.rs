use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::models::{CardAsset, GameAssets};

/// File stem reserved for the back face of every game.
pub const BACK_CARD_STEM: &str = "parte_atras";

/// Image extensions recognised as card faces (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "bmp"];

/// Why a folder under the catalog root did not become a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The folder holds no file with an allowed image extension.
    NoImages,
    /// No file named after [`BACK_CARD_STEM`] was found.
    MissingBackCard,
    /// A back card exists but there is nothing to print on the front.
    NoFrontCards,
    /// The folder could not be listed.
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoImages => f.write_str("no card images"),
            SkipReason::MissingBackCard => write!(f, "missing '{BACK_CARD_STEM}' card"),
            SkipReason::NoFrontCards => f.write_str("no front cards"),
            SkipReason::Unreadable(err) => write!(f, "unreadable: {err}"),
        }
    }
}

/// A folder left out of the catalog, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFolder {
    /// Folder name under the catalog root.
    pub name: String,
    /// Why it was left out.
    pub reason: SkipReason,
}

/// Outcome of scanning a catalog root.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogScan {
    /// Valid games keyed by folder name.
    pub games: BTreeMap<String, GameAssets>,
    /// Folders that were silently dropped from `games`.
    pub skipped: Vec<SkippedFolder>,
}

/// Stateless reader that turns a directory of game folders into [`GameAssets`].
///
/// Every call re-reads the filesystem; see [`super::CatalogCache`] for a memoised wrapper.
pub struct CardCatalog;

impl CardCatalog {
    /// All valid games beneath `base_dir`, keyed by folder name.
    ///
    /// Invalid folders are dropped without an error; use [`CardCatalog::scan`] to see why.
    pub fn list_games(base_dir: impl AsRef<Path>) -> BTreeMap<String, GameAssets> {
        Self::scan(base_dir).games
    }

    /// Scan `base_dir`, reporting both the valid games and the skipped folders.
    pub fn scan(base_dir: impl AsRef<Path>) -> CatalogScan {
        let base_dir = base_dir.as_ref();
        let mut scan = CatalogScan::default();
        if !base_dir.is_dir() {
            debug!("catalog root {} does not exist", base_dir.display());
            return scan;
        }

        for folder in sorted_entries(base_dir, |path| path.is_dir()) {
            let name = match folder.file_name().and_then(|name| name.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            match load_game_assets(&folder, &name) {
                Ok(game) => {
                    scan.games.insert(name, game);
                }
                Err(reason) => {
                    warn!("Skipping {}: {}", name, reason);
                    scan.skipped.push(SkippedFolder { name, reason });
                }
            }
        }

        scan
    }
}

fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| keep(path))
        .collect()
}

fn load_game_assets(folder: &Path, name: &str) -> Result<GameAssets, SkipReason> {
    if let Err(err) = std::fs::read_dir(folder) {
        return Err(SkipReason::Unreadable(err.to_string()));
    }

    let images = sorted_entries(folder, |path| path.is_file() && has_allowed_extension(path));
    if images.is_empty() {
        return Err(SkipReason::NoImages);
    }

    let mut back_card = None;
    let mut front_cards = Vec::new();
    for path in images {
        let stem = match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        if stem.to_lowercase() == BACK_CARD_STEM {
            // Later matches win, e.g. `parte_atras.png` over `parte_atras.jpg`.
            back_card = Some(CardAsset::new(BACK_CARD_STEM, path));
            continue;
        }
        front_cards.push(CardAsset::new(stem, path));
    }

    let back_card = back_card.ok_or(SkipReason::MissingBackCard)?;
    if front_cards.is_empty() {
        return Err(SkipReason::NoFrontCards);
    }

    Ok(GameAssets {
        name: name.to_string(),
        front_cards,
        back_card,
    })
}

fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    fn touch(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, b"")?;
        Ok(())
    }

    #[test]
    fn discovers_valid_games() -> Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        touch(root.join("Foo/B.png"))?;
        touch(root.join("Foo/A.jpg"))?;
        touch(root.join("Foo/PARTE_ATRAS.webp"))?;
        touch(root.join("Foo/notes.txt"))?;
        touch(root.join("Foo/C.BMP"))?;
        touch(root.join("stray.png"))?;

        let games = CardCatalog::list_games(root);
        assert_eq!(games.len(), 1);
        let game = &games["Foo"];
        assert_eq!(game.name, "Foo");
        assert_eq!(game.card_names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(game.back_card.name, BACK_CARD_STEM);
        assert_eq!(game.back_card.path, root.join("Foo/PARTE_ATRAS.webp"));
        assert_eq!(game.front_card("B").map(|card| &card.path), Some(&root.join("Foo/B.png")));

        Ok(())
    }

    #[test]
    fn invalid_folders_are_reported_not_listed() -> Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        touch(root.join("OnlyBack/parte_atras.png"))?;
        touch(root.join("OnlyFronts/A.png"))?;
        touch(root.join("NoImages/readme.md"))?;
        fs::create_dir_all(root.join("Empty"))?;
        touch(root.join("Valid/A.png"))?;
        touch(root.join("Valid/parte_atras.png"))?;

        let scan = CardCatalog::scan(root);
        assert_eq!(scan.games.keys().collect::<Vec<_>>(), vec!["Valid"]);

        let reasons: Vec<(&str, &SkipReason)> = scan
            .skipped
            .iter()
            .map(|skipped| (skipped.name.as_str(), &skipped.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("Empty", &SkipReason::NoImages),
                ("NoImages", &SkipReason::NoImages),
                ("OnlyBack", &SkipReason::NoFrontCards),
                ("OnlyFronts", &SkipReason::MissingBackCard),
            ]
        );

        Ok(())
    }

    #[test]
    fn missing_root_yields_empty_catalog() -> Result<()> {
        let temp = tempdir()?;
        let games = CardCatalog::list_games(temp.path().join("absent"));
        assert!(games.is_empty());
        Ok(())
    }

    #[test]
    fn repeated_reads_see_new_folders() -> Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        touch(root.join("Foo/A.png"))?;
        touch(root.join("Foo/parte_atras.png"))?;
        assert_eq!(CardCatalog::list_games(root).len(), 1);

        touch(root.join("Bar/X.png"))?;
        touch(root.join("Bar/parte_atras.png"))?;
        let games = CardCatalog::list_games(root);
        assert_eq!(games.keys().collect::<Vec<_>>(), vec!["Bar", "Foo"]);
        Ok(())
    }
}
