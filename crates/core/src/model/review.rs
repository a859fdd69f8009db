use chrono::NaiveDate;

use crate::model::card::Stage;
use crate::model::ids::CardId;

//
// ─── ANSWER ───────────────────────────────────────────────────────────────────
//

/// Binary outcome of a single recall attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Recalled correctly. The card moves one stage up.
    Correct,
    /// Failed to recall. The card drops back to stage 0.
    Incorrect,
}

impl Answer {
    #[must_use]
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

impl From<bool> for Answer {
    fn from(correct: bool) -> Self {
        Self::from_correct(correct)
    }
}

//
// ─── PRACTICE OUTCOME ────────────────────────────────────────────────────────
//

/// What the card store needs to persist after an answer.
///
/// `new_stage` is already computed by the Tick-8 rule; stores must not derive
/// it again. The failure counter is bumped by the store when `answer` is
/// `Incorrect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeOutcome {
    pub card_id: CardId,
    pub answer: Answer,
    pub new_stage: Stage,
    pub practiced_on: NaiveDate,
}

impl PracticeOutcome {
    #[must_use]
    pub fn new(card_id: CardId, answer: Answer, new_stage: Stage, practiced_on: NaiveDate) -> Self {
        Self {
            card_id,
            answer,
            new_stage,
            practiced_on,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
