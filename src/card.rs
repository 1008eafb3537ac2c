use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tracker::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A single question/answer card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    pub technology: String,
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub times_correct: u32,
    #[serde(default)]
    pub times_incorrect: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

/// Card content supplied by `add_card`; id and counters are assigned by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub question: String,
    pub answer: String,
    pub code_example: Option<String>,
    pub technology: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechnologyInfo {
    pub id: &'static str,
    pub name: &'static str,
}

const fn tech(id: &'static str, name: &'static str) -> TechnologyInfo {
    TechnologyInfo { id, name }
}

pub const TECHNOLOGIES: &[TechnologyInfo] = &[
    // Frameworks
    tech("angular", "Angular"),
    tech("react", "React"),
    tech("vue", "Vue.js"),
    // Languages
    tech("javascript", "JavaScript"),
    tech("typescript", "TypeScript"),
    tech("java", "Java"),
    tech("python", "Python"),
    // Web basics
    tech("css", "CSS/Tailwind"),
    tech("html", "HTML"),
    // Backend
    tech("node", "Node/Express"),
    tech("nestjs", "NestJS"),
    tech("django", "Django"),
    tech("dotnet", ".NET"),
    tech("springboot", "Spring Boot"),
    tech("mongodb", "MongoDB"),
    // Cloud
    tech("aws", "AWS"),
    tech("azure", "Azure"),
    // Design
    tech("figma", "Figma"),
    tech("uiux", "UI/UX"),
    tech("spline", "Spline"),
    tech("blender", "Blender"),
    // CS fundamentals
    tech("dsa", "DSA"),
];

/// Display name for a technology tag, falling back to the tag itself
pub fn technology_name(tag: &str) -> &str {
    TECHNOLOGIES
        .iter()
        .find(|t| t.id == tag)
        .map_or(tag, |t| t.name)
}

/// Ordered, owned list of every card loaded at startup.
///
/// Order is insertion order and is never re-sorted; the active set relies on it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<Flashcard>,
}

impl Catalog {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Flashcard> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Append a card with a fresh id and zeroed counters, returning the id
    pub fn add(&mut self, card: NewCard) -> String {
        let id = Uuid::new_v4().to_string();
        self.cards.push(Flashcard {
            id: id.clone(),
            question: card.question,
            answer: card.answer,
            code_example: card.code_example,
            technology: card.technology,
            category: card.category,
            difficulty: card.difficulty,
            version: card.version,
            times_correct: 0,
            times_incorrect: 0,
            last_reviewed: None,
        });
        id
    }

    /// Remove a card by id. Returns the removed card, if any.
    pub fn remove(&mut self, id: &str) -> Option<Flashcard> {
        let idx = self.cards.iter().position(|c| c.id == id)?;
        Some(self.cards.remove(idx))
    }

    /// Bump exactly one lifetime counter and stamp the review time.
    pub(crate) fn commit_outcome(
        &mut self,
        id: &str,
        outcome: Outcome,
        reviewed_at: DateTime<Utc>,
    ) -> bool {
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        match outcome {
            Outcome::Correct => card.times_correct += 1,
            Outcome::Incorrect => card.times_incorrect += 1,
        }
        card.last_reviewed = Some(reviewed_at);
        true
    }

    /// Known technologies that have at least one card, in table order
    pub fn technologies_with_counts(&self) -> Vec<(TechnologyInfo, usize)> {
        TECHNOLOGIES
            .iter()
            .map(|t| {
                let count = self.cards.iter().filter(|c| c.technology == t.id).count();
                (*t, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn card(id: &str, technology: &str, category: &str) -> Flashcard {
        Flashcard {
            id: id.to_string(),
            question: format!("question {id}"),
            answer: format!("answer {id}"),
            code_example: None,
            technology: technology.to_string(),
            category: category.to_string(),
            difficulty: Difficulty::Easy,
            version: None,
            times_correct: 0,
            times_incorrect: 0,
            last_reviewed: None,
        }
    }

    fn new_card() -> NewCard {
        NewCard {
            question: "What is a closure?".into(),
            answer: "A function bundled with its environment".into(),
            code_example: None,
            technology: "javascript".into(),
            category: "Functions".into(),
            difficulty: Difficulty::Medium,
            version: Some("ES2015".into()),
        }
    }

    #[test]
    fn test_add_assigns_unique_ids_and_zero_counters() {
        let mut catalog = Catalog::default();
        let a = catalog.add(new_card());
        let b = catalog.add(new_card());

        assert_ne!(a, b);
        assert_eq!(catalog.len(), 2);
        let added = catalog.get(&a).unwrap();
        assert_eq!(added.times_correct, 0);
        assert_eq!(added.times_incorrect, 0);
        assert!(added.last_reviewed.is_none());
        // appended, not sorted
        assert_eq!(catalog.cards()[1].id, b);
    }

    #[test]
    fn test_remove() {
        let mut catalog = Catalog::new(vec![card("a", "css", "x"), card("b", "css", "x")]);
        assert_eq!(catalog.remove("a").map(|c| c.id), Some("a".to_string()));
        assert!(catalog.remove("a").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_commit_outcome_touches_one_counter() {
        let mut catalog = Catalog::new(vec![card("a", "css", "x")]);
        let now = Utc::now();

        assert!(catalog.commit_outcome("a", Outcome::Correct, now));
        assert!(catalog.commit_outcome("a", Outcome::Incorrect, now));
        assert!(catalog.commit_outcome("a", Outcome::Correct, now));
        assert!(!catalog.commit_outcome("missing", Outcome::Correct, now));

        let a = catalog.get("a").unwrap();
        assert_eq!(a.times_correct, 2);
        assert_eq!(a.times_incorrect, 1);
        assert_eq!(a.last_reviewed, Some(now));
    }

    #[test]
    fn test_technologies_with_counts_skips_empty() {
        let catalog = Catalog::new(vec![
            card("1", "react", "Hooks"),
            card("2", "angular", "Signals"),
            card("3", "react", "Hooks"),
            card("4", "cobol", "Legacy"),
        ]);

        let techs = catalog.technologies_with_counts();
        let ids: Vec<_> = techs.iter().map(|(t, n)| (t.id, *n)).collect();
        assert_eq!(ids, vec![("angular", 1), ("react", 2)]);
    }

    #[test]
    fn test_technology_name() {
        assert_eq!(technology_name("dotnet"), ".NET");
        assert_eq!(technology_name("cobol"), "cobol");
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "id": "ng-1",
            "question": "What is ngOnInit?",
            "answer": "A lifecycle hook",
            "technology": "angular",
            "category": "Lifecycle Hooks",
            "difficulty": "easy",
            "timesCorrect": 3,
            "timesIncorrect": 1
        }"#;
        let card: Flashcard = serde_json::from_str(json).unwrap();
        assert_eq!(card.difficulty, Difficulty::Easy);
        assert_eq!(card.times_correct, 3);
        assert!(card.code_example.is_none());
        assert_eq!(card.difficulty.to_string(), "easy");
    }
}
