//! Generation requests coming from a frontend.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    catalog::CardCatalog,
    document::DocumentAssembler,
    error::{Error, Result},
    models::{GameAssets, QuantityMap},
};

/// A game selection plus requested copies per front card.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Selected game, if any.
    pub game: Option<String>,
    /// Requested copies by card name.
    pub quantities: QuantityMap,
}

impl GenerationRequest {
    /// Request for `game` with no cards selected yet.
    pub fn new(game: impl Into<String>) -> Self {
        Self {
            game: Some(game.into()),
            quantities: QuantityMap::new(),
        }
    }

    /// Add or replace the count for `card`.
    pub fn with_count(mut self, card: impl Into<String>, count: i64) -> Self {
        self.quantities.set(card, count);
        self
    }

    /// Find the selected game in `games`.
    ///
    /// The name must match a catalog key exactly. A missing, blank or unknown game
    /// name is an [`Error::InvalidSelection`].
    pub fn resolve<'a>(&self, games: &'a BTreeMap<String, GameAssets>) -> Result<&'a GameAssets> {
        let name = self
            .game
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(Error::InvalidSelection(None))?;

        games
            .get(name)
            .ok_or_else(|| Error::InvalidSelection(Some(name.to_string())))
    }
}

/// Re-read the catalog under `games_dir` and write the requested document to `output_dir`.
pub fn generate(
    games_dir: impl AsRef<Path>,
    request: &GenerationRequest,
    output_dir: impl Into<PathBuf>,
) -> Result<PathBuf> {
    let games = CardCatalog::list_games(games_dir);
    let game = request.resolve(&games)?;
    DocumentAssembler::new(output_dir).assemble(game, &request.quantities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardAsset;

    fn game(name: &str) -> (String, GameAssets) {
        let game = GameAssets {
            name: name.to_string(),
            front_cards: vec![CardAsset::new("A", format!("{name}/A.png"))],
            back_card: CardAsset::new("parte_atras", format!("{name}/parte_atras.png")),
        };
        (name.to_string(), game)
    }

    fn catalog() -> BTreeMap<String, GameAssets> {
        BTreeMap::from([game("Foo"), game(" Padded ")])
    }

    #[test]
    fn resolves_known_game() {
        let games = catalog();
        let request = GenerationRequest::new("Foo").with_count("A", 1);
        assert_eq!(request.resolve(&games).map(|game| game.name.as_str()).ok(), Some("Foo"));
    }

    #[test]
    fn names_match_catalog_keys_exactly() {
        let games = catalog();

        let padded = GenerationRequest::new(" Padded ");
        assert_eq!(padded.resolve(&games).map(|game| game.name.as_str()).ok(), Some(" Padded "));

        match GenerationRequest::new(" Foo ").resolve(&games) {
            Err(Error::InvalidSelection(Some(name))) => assert_eq!(name, " Foo "),
            other => panic!("expected InvalidSelection, got {other:?}"),
        }
    }

    #[test]
    fn missing_or_unknown_game_is_invalid() {
        let games = catalog();

        let missing = GenerationRequest::default();
        assert!(matches!(missing.resolve(&games), Err(Error::InvalidSelection(None))));

        let blank = GenerationRequest::new("   ");
        assert!(matches!(blank.resolve(&games), Err(Error::InvalidSelection(None))));

        let unknown = GenerationRequest::new("Bar");
        match unknown.resolve(&games) {
            Err(Error::InvalidSelection(Some(name))) => assert_eq!(name, "Bar"),
            other => panic!("expected InvalidSelection, got {other:?}"),
        }
    }
}
