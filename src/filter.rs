use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::card::{Catalog, Flashcard};

pub const ALL: &str = "all";

/// A technology or category selection, either everything or one named value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(v) => v == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case(ALL) {
            Selection::All
        } else {
            Selection::Only(s.to_string())
        }
    }
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        Selection::from(s.as_str())
    }
}

impl From<Selection> for String {
    fn from(s: Selection) -> Self {
        s.to_string()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Only(v) => f.write_str(v),
        }
    }
}

/// Current technology and category filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub technology: Selection,
    pub category: Selection,
}

impl FilterState {
    pub fn new(technology: Selection, category: Selection) -> Self {
        Self {
            technology,
            category,
        }
    }

    /// Catalog cards passing the technology filter, in catalog order
    pub fn technology_cards<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Flashcard> {
        catalog
            .cards()
            .iter()
            .filter(|c| self.technology.matches(&c.technology))
            .collect()
    }

    /// Technology filter first, then category; catalog order is preserved
    pub fn active_set<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Flashcard> {
        catalog
            .cards()
            .iter()
            .filter(|c| self.technology.matches(&c.technology))
            .filter(|c| self.category.matches(&c.category))
            .collect()
    }

    pub fn active_len(&self, catalog: &Catalog) -> usize {
        self.active_set(catalog).len()
    }

    /// Unique categories under the current technology, first-seen order
    pub fn categories(&self, catalog: &Catalog) -> Vec<String> {
        self.technology_cards(catalog)
            .into_iter()
            .map(|c| c.category.clone())
            .unique()
            .collect()
    }
}
