use chrono::{SecondsFormat, Utc};

use crate::card::{Catalog, Flashcard, NewCard, TechnologyInfo};
use crate::content::ContentProvider;
use crate::error::{ContentError, EngineError};
use crate::filter::{FilterState, Selection};
use crate::history::{HistoryStore, SessionSummary};
use crate::navigation::{Advance, Cursor};
use crate::stats::{self, StudyStats};
use crate::timer::{Clock, SessionTimer, TickSubscription};
use crate::tracker::{AnswerTracker, CardStatus, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Idle,
    Active,
    /// A session just closed and its summary is on screen
    Reviewing,
}

/// The study session context: catalog, filters, cursor, answers, timer and
/// history behind one owner. Construct once per running application and
/// pass it to whatever drives it.
///
/// Every mutating method takes `&mut self` and finishes all of its state
/// changes (including persistence) before returning, so no derived value
/// can observe a half-applied operation.
pub struct StudyEngine {
    catalog: Catalog,
    filter: FilterState,
    cursor: Cursor,
    tracker: AnswerTracker,
    timer: SessionTimer,
    phase: SessionPhase,
    clock: Box<dyn Clock>,
    subscription: Option<Box<dyn TickSubscription>>,
    history: HistoryStore,
    last_summary: Option<SessionSummary>,
}

impl StudyEngine {
    pub fn new(cards: Vec<Flashcard>, clock: Box<dyn Clock>, history: HistoryStore) -> Self {
        Self {
            catalog: Catalog::new(cards),
            filter: FilterState::default(),
            cursor: Cursor::default(),
            tracker: AnswerTracker::default(),
            timer: SessionTimer::default(),
            phase: SessionPhase::Idle,
            clock,
            subscription: None,
            history,
            last_summary: None,
        }
    }

    pub fn from_provider(
        provider: &dyn ContentProvider,
        clock: Box<dyn Clock>,
        history: HistoryStore,
    ) -> Result<Self, ContentError> {
        Ok(Self::new(provider.load()?, clock, history))
    }

    // ---- filters -------------------------------------------------------

    /// Switch technology. Always starts a fresh answer scope, even if the
    /// active set ends up identical.
    pub fn set_technology(&mut self, technology: impl Into<Selection>) {
        self.filter.technology = technology.into();
        self.filter.category = Selection::All;
        self.cursor.reset();
        self.tracker.clear();
        self.clamp_cursor();
        log::debug!(
            "technology set to {}, {} cards active",
            self.filter.technology,
            self.total_cards()
        );
    }

    pub fn set_category(&mut self, category: impl Into<Selection>) {
        self.filter.category = category.into();
        self.clamp_cursor();
        log::debug!(
            "category set to {}, {} cards active",
            self.filter.category,
            self.total_cards()
        );
    }

    pub fn selection(&self) -> &FilterState {
        &self.filter
    }

    fn clamp_cursor(&mut self) {
        let len = self.total_cards();
        self.cursor.clamp(len);
    }

    // ---- derived views -------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_set(&self) -> Vec<&Flashcard> {
        self.filter.active_set(&self.catalog)
    }

    pub fn total_cards(&self) -> usize {
        self.filter.active_len(&self.catalog)
    }

    pub fn current_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.active_set().get(self.cursor.index()).copied()
    }

    pub fn card_status(&self, card_id: &str) -> CardStatus {
        self.tracker.status(card_id)
    }

    pub fn stats(&self) -> StudyStats {
        stats::derive(&self.tracker, self.total_cards())
    }

    pub fn categories(&self) -> Vec<String> {
        self.filter.categories(&self.catalog)
    }

    pub fn technologies(&self) -> Vec<(TechnologyInfo, usize)> {
        self.catalog.technologies_with_counts()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session_history(&self) -> Vec<SessionSummary> {
        self.history.session_history()
    }

    /// Summary of the session that most recently closed
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    // ---- navigation ----------------------------------------------------

    /// Move to the next card. On the last card of an active session this
    /// closes the session instead of moving.
    pub fn advance(&mut self) -> Advance {
        let result = self.cursor.advance(self.total_cards());
        if result == Advance::Terminal && self.phase == SessionPhase::Active {
            self.end_session();
        }
        result
    }

    pub fn retreat(&mut self) {
        self.cursor.retreat();
    }

    // ---- answers -------------------------------------------------------

    /// Record the session outcome for a card and commit it to the card's
    /// lifetime counters in the same step.
    pub fn record_answer(&mut self, card_id: &str, outcome: Outcome) -> Result<(), EngineError> {
        if !self.catalog.commit_outcome(card_id, outcome, Utc::now()) {
            return Err(EngineError::UnknownCard(card_id.to_string()));
        }
        self.tracker.record(card_id, outcome);
        self.history.save_progress(card_id, outcome.is_correct());
        Ok(())
    }

    /// Answer whatever card is under the cursor
    pub fn answer_current(&mut self, outcome: Outcome) -> Result<(), EngineError> {
        let Some(id) = self.current_card().map(|c| c.id.clone()) else {
            return Ok(());
        };
        self.record_answer(&id, outcome)
    }

    // ---- catalog edits -------------------------------------------------

    pub fn add_card(&mut self, card: NewCard) -> String {
        self.catalog.add(card)
    }

    pub fn remove_card(&mut self, card_id: &str) -> Option<Flashcard> {
        let removed = self.catalog.remove(card_id)?;
        self.tracker.remove(card_id);
        self.clamp_cursor();
        Some(removed)
    }

    // ---- lifecycle -----------------------------------------------------

    pub fn start_session(&mut self) {
        self.cancel_clock();
        self.cursor.reset();
        self.tracker.clear();
        let generation = self.timer.start();
        self.subscription = Some(self.clock.subscribe(generation));
        self.phase = SessionPhase::Active;
        log::info!(
            "session {generation} started with {} cards ({})",
            self.total_cards(),
            self.filter.technology
        );
    }

    pub fn restart(&mut self) {
        self.start_session();
    }

    /// Close the active session and persist its summary. Outside an active
    /// session this does nothing and returns None.
    pub fn end_session(&mut self) -> Option<SessionSummary> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        self.cancel_clock();
        self.timer.stop();

        let stats = self.stats();
        let summary = SessionSummary {
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            cards_studied: self.tracker.len(),
            accuracy: stats.accuracy,
            time_spent: self.timer.elapsed_secs(),
        };
        self.history.save_session_stats(summary.clone());
        self.phase = SessionPhase::Reviewing;
        log::info!(
            "session {} ended: {} cards, {}% accuracy, {}s",
            self.timer.generation(),
            summary.cards_studied,
            summary.accuracy,
            summary.time_spent
        );
        self.last_summary = Some(summary.clone());
        Some(summary)
    }

    /// External abort signal. Safe to call in any phase, any number of times.
    pub fn interrupt(&mut self) -> Option<SessionSummary> {
        self.end_session()
    }

    /// Leave the review screen without starting a new session
    pub fn close_review(&mut self) {
        if self.phase == SessionPhase::Reviewing {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Count one clock second. Ticks for any other session are ignored.
    pub fn on_tick(&mut self, generation: u64) -> bool {
        self.phase == SessionPhase::Active && self.timer.tick(generation)
    }

    fn cancel_clock(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.cancel();
        }
    }
}

impl Drop for StudyEngine {
    fn drop(&mut self) {
        self.cancel_clock();
    }
}
