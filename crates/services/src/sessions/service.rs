use std::collections::HashSet;
use std::fmt;

use storage::repository::{CardStore, StorageError};
use tick8_core::Clock;
use tick8_core::model::{Answer, Card, CardId, PracticeOutcome, PracticeSettings, SessionStats};
use tick8_core::scheduler::apply_answer;

use super::plan::{SessionBuilder, SessionPlan};
use super::progress::SessionProgress;

//
// ─── RECORDED ANSWER ───────────────────────────────────────────────────────────
//

/// Captures the outcome of answering a card within a session.
///
/// `persist_warning` is set when the card store rejected the write. The
/// in-memory card was updated regardless.
#[derive(Debug)]
pub struct RecordedAnswer {
    pub card_id: CardId,
    pub outcome: PracticeOutcome,
    pub persist_warning: Option<StorageError>,
}

impl RecordedAnswer {
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.persist_warning.is_none()
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Practice session engine over an owned card collection.
///
/// `start` selects a batch of due cards; the caller then walks it one card at
/// a time with `current`, `record_answer` or `skip`, and `advance`. A card
/// counts as seen the moment `current` hands it out, and the session is
/// complete once every card in the batch has been seen.
///
/// Calls must be serialized by the caller.
pub struct SessionService {
    clock: Clock,
    settings: PracticeSettings,
    cards: Vec<Card>,
    batch: Vec<usize>,
    cursor: usize,
    seen: HashSet<CardId>,
    stats: SessionStats,
    active: bool,
}

impl SessionService {
    #[must_use]
    pub fn new(cards: Vec<Card>, settings: PracticeSettings, clock: Clock) -> Self {
        Self {
            clock,
            settings,
            cards,
            batch: Vec::new(),
            cursor: 0,
            seen: HashSet::new(),
            stats: SessionStats::default(),
            active: false,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// The whole collection, with any answers from this run applied.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }

    /// Number of cards due today across the whole collection.
    #[must_use]
    pub fn due_count(&self) -> usize {
        let today = self.clock.today();
        self.cards.iter().filter(|card| card.is_due_on(today)).count()
    }

    /// Preview the batch `start` would select right now.
    #[must_use]
    pub fn plan(&self) -> SessionPlan {
        let batch_size = usize::try_from(self.settings.cards_per_session()).unwrap_or(usize::MAX);
        SessionBuilder::new(batch_size).build(&self.cards, self.clock.today())
    }

    /// Start a session, or resume the active one.
    ///
    /// An active session with unseen cards is kept as is unless `force_new` is
    /// set. Returns `true` when a fresh batch was selected.
    pub fn start(&mut self, force_new: bool) -> bool {
        if self.active && !force_new && self.has_next() {
            tracing::debug!(cursor = self.cursor, "resuming active session");
            return false;
        }

        self.stats = SessionStats::default();
        self.cursor = 0;
        self.seen.clear();

        let plan = self.plan();
        self.batch = plan.picks.iter().map(|pick| pick.index).collect();
        self.active = true;

        tracing::debug!(
            batch = self.batch.len(),
            due = plan.due_total,
            "started practice session"
        );
        true
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Total number of cards in this session.
    #[must_use]
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Ids of the selected cards, in practice order.
    #[must_use]
    pub fn batch_ids(&self) -> Vec<CardId> {
        self.batch.iter().map(|&index| self.cards[index].id()).collect()
    }

    fn current_index(&mut self) -> Option<usize> {
        let index = *self.batch.get(self.cursor)?;
        self.seen.insert(self.cards[index].id());
        Some(index)
    }

    /// The card under the cursor, marking it seen.
    pub fn current(&mut self) -> Option<&Card> {
        let index = self.current_index()?;
        Some(&self.cards[index])
    }

    /// Whether there is still unseen work in this session.
    #[must_use]
    pub fn has_next(&self) -> bool {
        if self.seen.len() >= self.batch.len() {
            return false;
        }
        self.cursor < self.batch.len()
    }

    /// Move the cursor forward without bounds checks.
    pub fn advance(&mut self) {
        self.cursor = self.cursor.saturating_add(1);
    }

    /// Skip the current card for the rest of this session.
    ///
    /// A skipped card is seen and is not re-queued. Returns the skipped card's
    /// id, or `None` when there is no current card.
    pub fn skip(&mut self) -> Option<CardId> {
        let index = self.current_index()?;
        self.stats.record_skip();
        self.advance();
        Some(self.cards[index].id())
    }

    /// Record an answer for the current card and persist it.
    ///
    /// Does not advance the cursor. The in-memory card is updated even when the
    /// store rejects the write; the store error is logged and returned in
    /// [`RecordedAnswer::persist_warning`]. Returns `None` when there is no
    /// current card.
    pub async fn record_answer(
        &mut self,
        correct: bool,
        store: &dyn CardStore,
    ) -> Option<RecordedAnswer> {
        let index = self.current_index()?;
        let answer = Answer::from_correct(correct);
        match answer {
            Answer::Correct => self.stats.record_correct(),
            Answer::Incorrect => self.stats.record_incorrect(),
        }

        let applied = apply_answer(&self.cards[index], answer, self.clock.today());

        let persist_warning = match store.persist_outcome(&applied.outcome).await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(
                    card_id = %applied.outcome.card_id,
                    error = %err,
                    "failed to persist practice outcome; keeping local progress"
                );
                Some(err)
            }
        };

        let card_id = applied.card.id();
        self.cards[index] = applied.card;

        Some(RecordedAnswer {
            card_id,
            outcome: applied.outcome,
            persist_warning,
        })
    }

    /// End the session. Statistics stay readable until the next start.
    pub fn end(&mut self) {
        if self.active {
            tracing::debug!(seen = self.seen.len(), "ended practice session");
        }
        self.active = false;
        self.batch.clear();
        self.cursor = 0;
        self.seen.clear();
    }

    /// Swap in a freshly loaded collection, ending any active session.
    pub fn replace_cards(&mut self, cards: Vec<Card>) {
        self.end();
        self.cards = cards;
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.seen.len(), self.batch.len(), self.active)
    }
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("cards_len", &self.cards.len())
            .field("batch_len", &self.batch.len())
            .field("cursor", &self.cursor)
            .field("seen_len", &self.seen.len())
            .field("stats", &self.stats)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
