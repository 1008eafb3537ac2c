use include_dir::{include_dir, Dir};
use std::fs;
use std::path::{Path, PathBuf};

use crate::card::{Flashcard, TECHNOLOGIES};
use crate::error::ContentError;

static DECK_DIR: Dir = include_dir!("src/decks");

/// Supplies the initial catalog as an ordered list of cards
pub trait ContentProvider {
    fn load(&self) -> Result<Vec<Flashcard>, ContentError>;
}

/// Starter deck compiled into the binary, one JSON file per technology.
///
/// Files are concatenated in technology table order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledDeck;

impl ContentProvider for BundledDeck {
    fn load(&self) -> Result<Vec<Flashcard>, ContentError> {
        let mut cards = Vec::new();
        for tech in TECHNOLOGIES {
            if let Some(file) = DECK_DIR.get_file(format!("{}.json", tech.id)) {
                let text = file
                    .contents_utf8()
                    .ok_or_else(|| ContentError::MissingDeck(tech.id.to_string()))?;
                cards.extend(parse_deck(text)?);
            }
        }
        Ok(cards)
    }
}

/// A deck stored as a JSON array of cards on disk
#[derive(Debug, Clone)]
pub struct JsonDeckFile {
    path: PathBuf,
}

impl JsonDeckFile {
    pub fn new<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl ContentProvider for JsonDeckFile {
    fn load(&self) -> Result<Vec<Flashcard>, ContentError> {
        if !self.path.exists() {
            return Err(ContentError::MissingDeck(self.path.display().to_string()));
        }
        let text = fs::read_to_string(&self.path)?;
        parse_deck(&text)
    }
}

fn parse_deck(text: &str) -> Result<Vec<Flashcard>, ContentError> {
    Ok(serde_json::from_str(text)?)
}
