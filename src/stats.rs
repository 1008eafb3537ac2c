use crate::card::Flashcard;
use crate::tracker::{AnswerTracker, Outcome};

/// Live statistics for the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudyStats {
    pub total_cards: usize,
    pub total_correct: usize,
    pub total_incorrect: usize,
    /// Rounded percentage, 0 when nothing has been answered
    pub accuracy: u8,
    pub streak: usize,
}

impl StudyStats {
    pub fn answered(&self) -> usize {
        self.total_correct + self.total_incorrect
    }
}

pub fn derive(tracker: &AnswerTracker, total_cards: usize) -> StudyStats {
    let total_correct = tracker.outcomes().filter(|o| o.is_correct()).count();
    let total_incorrect = tracker.len() - total_correct;

    StudyStats {
        total_cards,
        total_correct,
        total_incorrect,
        accuracy: accuracy(total_correct, total_incorrect),
        streak: streak(tracker),
    }
}

pub fn accuracy(correct: usize, incorrect: usize) -> u8 {
    let total = correct + incorrect;
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u8
}

/// Correct outcomes trailing the most recent insertion
pub fn streak(tracker: &AnswerTracker) -> usize {
    tracker
        .outcomes()
        .rev()
        .take_while(|o| *o == Outcome::Correct)
        .count()
}

/// Lifetime progress label for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Mastery {
    #[strum(serialize = "Not studied yet")]
    NotStudied,
    #[strum(serialize = "Needs work")]
    NeedsWork,
    Practicing,
    Learning,
    Mastered,
}

pub fn mastery(card: &Flashcard) -> Mastery {
    let total = card.times_correct + card.times_incorrect;
    if total == 0 {
        return Mastery::NotStudied;
    }
    let pct = card.times_correct as f64 / total as f64 * 100.0;
    match pct {
        p if p >= 80.0 => Mastery::Mastered,
        p if p >= 60.0 => Mastery::Learning,
        p if p >= 40.0 => Mastery::Practicing,
        _ => Mastery::NeedsWork,
    }
}
