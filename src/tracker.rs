use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn from_correct(is_correct: bool) -> Self {
        if is_correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        self == Outcome::Correct
    }
}

/// Per-card status as shown to the user
#[derive(Clone, Debug, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CardStatus {
    Unanswered,
    Correct,
    Incorrect,
}

impl From<Outcome> for CardStatus {
    fn from(o: Outcome) -> Self {
        match o {
            Outcome::Correct => CardStatus::Correct,
            Outcome::Incorrect => CardStatus::Incorrect,
        }
    }
}

/// Outcomes recorded in the current session, kept in first-answer order.
///
/// Re-answering a card replaces its outcome without moving it.
#[derive(Debug, Clone, Default)]
pub struct AnswerTracker {
    entries: Vec<(String, Outcome)>,
}

impl AnswerTracker {
    pub fn record(&mut self, card_id: &str, outcome: Outcome) {
        match self.entries.iter_mut().find(|(id, _)| id == card_id) {
            Some(entry) => entry.1 = outcome,
            None => self.entries.push((card_id.to_string(), outcome)),
        }
    }

    pub fn status(&self, card_id: &str) -> CardStatus {
        self.entries
            .iter()
            .find(|(id, _)| id == card_id)
            .map_or(CardStatus::Unanswered, |(_, o)| (*o).into())
    }

    pub fn remove(&mut self, card_id: &str) {
        self.entries.retain(|(id, _)| id != card_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outcomes in insertion order
    pub fn outcomes(&self) -> impl DoubleEndedIterator<Item = Outcome> + '_ {
        self.entries.iter().map(|(_, o)| *o)
    }
}
