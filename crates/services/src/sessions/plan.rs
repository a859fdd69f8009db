use chrono::NaiveDate;

use tick8_core::model::{Card, CardId};

/// Base score for cards that were learned once and have fallen back to stage 0.
pub const LAPSED_BASE: u32 = 2000;
/// Base score for cards that have never been practiced.
pub const NEW_BASE: u32 = 1000;
/// Extra weight per recorded failure.
pub const FAILURE_WEIGHT: u32 = 50;

/// Priority of a due card; higher is practiced first.
///
/// Lapsed cards come first, then brand-new ones, then cards in progress with
/// lower stages ahead of higher ones. Every past failure adds on top of the
/// tier, so troublesome cards rise within it.
#[must_use]
pub fn priority_score(card: &Card) -> u32 {
    let stage = card.stage();
    let base = if stage.is_unlearned() && !card.is_new() {
        LAPSED_BASE
    } else if stage.is_unlearned() {
        NEW_BASE
    } else {
        (10 - u32::from(stage.value())) * 10
    };
    base.saturating_add(card.failed_count().saturating_mul(FAILURE_WEIGHT))
}

/// A selected card with its transient ranking score.
///
/// `index` points into the collection the plan was built from; the score is
/// never written back onto the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCard {
    pub index: usize,
    pub card_id: CardId,
    pub score: u32,
}

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub picks: Vec<ScoredCard>,
    pub due_total: usize,
}

impl SessionPlan {
    /// Total number of cards in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.picks.len()
    }

    /// Returns true when nothing is due.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    #[must_use]
    pub fn card_ids(&self) -> Vec<CardId> {
        self.picks.iter().map(|pick| pick.card_id).collect()
    }
}

/// Builds a bounded, priority-ordered batch of due cards.
pub struct SessionBuilder {
    batch_size: usize,
}

impl SessionBuilder {
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Pick up to `batch_size` cards due on `today`, highest priority first.
    ///
    /// Equal scores keep collection order. The batch size is taken as given;
    /// a size of 0 yields an empty plan.
    #[must_use]
    pub fn build(&self, cards: &[Card], today: NaiveDate) -> SessionPlan {
        let mut picks: Vec<ScoredCard> = cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_due_on(today))
            .map(|(index, card)| ScoredCard {
                index,
                card_id: card.id(),
                score: priority_score(card),
            })
            .collect();
        let due_total = picks.len();

        // stable: ties keep storage order
        picks.sort_by(|a, b| b.score.cmp(&a.score));
        picks.truncate(self.batch_size);

        SessionPlan { picks, due_total }
    }
}
