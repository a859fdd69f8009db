use chrono::NaiveDate;
use thiserror::Error;

use crate::model::ids::CardId;
use crate::model::review::Answer;
use crate::scheduler::next_stage;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("stage must be between 0 and {max}, got {provided}")]
    InvalidStage { provided: u8, max: u8 },
}

//
// ─── STAGE ─────────────────────────────────────────────────────────────────────
//

/// Position of a card on the Tick-8 scale.
///
/// `0` means unlearned (or reset after a miss), `8` means mastered. A mastered
/// card is never scheduled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Stage(u8);

impl Stage {
    pub const UNLEARNED: Stage = Stage(0);
    pub const MASTERED: Stage = Stage(8);

    /// Creates a stage, rejecting values above mastery.
    ///
    /// # Errors
    ///
    /// Returns `CardError::InvalidStage` if `value > 8`.
    pub fn new(value: u8) -> Result<Self, CardError> {
        if value > Self::MASTERED.0 {
            return Err(CardError::InvalidStage {
                provided: value,
                max: Self::MASTERED.0,
            });
        }
        Ok(Self(value))
    }

    /// Lenient constructor for values read from loosely-typed stores.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(0, i64::from(Self::MASTERED.0));
        Self(u8::try_from(clamped).unwrap_or(Self::MASTERED.0))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// One step up the scale, saturating at mastery.
    #[must_use]
    pub fn promoted(self) -> Self {
        Self((self.0 + 1).min(Self::MASTERED.0))
    }

    #[must_use]
    pub fn is_unlearned(self) -> bool {
        self == Self::UNLEARNED
    }

    #[must_use]
    pub fn is_mastered(self) -> bool {
        self >= Self::MASTERED
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// Persistent learning state of one flashcard.
///
/// Content (`front`, `back`) is opaque to the scheduler. Mutation goes through
/// [`Card::answered`] so the stage, date and failure count move together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    front: String,
    back: String,
    last_practice_date: Option<NaiveDate>,
    stage: Stage,
    failed_count: u32,
}

impl Card {
    /// A card that has never been practiced.
    #[must_use]
    pub fn new(id: CardId, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id,
            front: front.into(),
            back: back.into(),
            last_practice_date: None,
            stage: Stage::UNLEARNED,
            failed_count: 0,
        }
    }

    /// Rehydrate a card from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: CardId,
        front: impl Into<String>,
        back: impl Into<String>,
        last_practice_date: Option<NaiveDate>,
        stage: Stage,
        failed_count: u32,
    ) -> Self {
        Self {
            id,
            front: front.into(),
            back: back.into(),
            last_practice_date,
            stage,
            failed_count,
        }
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }

    #[must_use]
    pub fn last_practice_date(&self) -> Option<NaiveDate> {
        self.last_practice_date
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn failed_count(&self) -> u32 {
        self.failed_count
    }

    /// True when the card has never been practiced.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.last_practice_date.is_none()
    }

    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.stage.is_mastered()
    }

    /// Whether the card should be practiced on `today`.
    ///
    /// Mastered cards are never due, new cards always are. Anything else is due
    /// once its last practice day is strictly in the past, so a card gets at most
    /// one promotion per calendar day.
    #[must_use]
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        if self.is_mastered() {
            return false;
        }
        match self.last_practice_date {
            None => true,
            Some(last) => last < today,
        }
    }

    /// Returns the state after answering on `today`.
    #[must_use]
    pub fn answered(&self, answer: Answer, today: NaiveDate) -> Card {
        let failed_count = match answer {
            Answer::Correct => self.failed_count,
            Answer::Incorrect => self.failed_count.saturating_add(1),
        };

        Card {
            last_practice_date: Some(today),
            stage: next_stage(self.stage, answer),
            failed_count,
            ..self.clone()
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_today;
    use chrono::Duration;

    fn practiced(stage: u8, days_ago: i64) -> Card {
        Card::from_persisted(
            CardId::new(2),
            "hund",
            "dog",
            Some(fixed_today() - Duration::days(days_ago)),
            Stage::new(stage).unwrap(),
            0,
        )
    }

    #[test]
    fn stage_rejects_values_above_mastery() {
        assert!(Stage::new(8).is_ok());
        let err = Stage::new(9).unwrap_err();
        assert_eq!(err, CardError::InvalidStage { provided: 9, max: 8 });
    }

    #[test]
    fn stage_clamped_keeps_range() {
        assert_eq!(Stage::clamped(-3), Stage::UNLEARNED);
        assert_eq!(Stage::clamped(5).value(), 5);
        assert_eq!(Stage::clamped(42), Stage::MASTERED);
    }

    #[test]
    fn promotion_saturates_at_mastery() {
        assert_eq!(Stage::new(7).unwrap().promoted(), Stage::MASTERED);
        assert_eq!(Stage::MASTERED.promoted(), Stage::MASTERED);
    }

    #[test]
    fn mastered_card_is_never_due() {
        let today = fixed_today();
        let old = practiced(8, 30);
        assert!(!old.is_due_on(today));

        let never = Card::from_persisted(CardId::new(1), "a", "b", None, Stage::MASTERED, 0);
        assert!(!never.is_due_on(today));
    }

    #[test]
    fn new_card_is_due_regardless_of_stage() {
        let today = fixed_today();
        for stage in 0..8 {
            let card =
                Card::from_persisted(CardId::new(1), "a", "b", None, Stage::new(stage).unwrap(), 0);
            assert!(card.is_new());
            assert!(card.is_due_on(today));
        }
    }

    #[test]
    fn practiced_card_is_due_only_after_its_practice_day() {
        let today = fixed_today();
        assert!(practiced(3, 1).is_due_on(today));
        assert!(practiced(3, 10).is_due_on(today));
        assert!(!practiced(3, 0).is_due_on(today));
        assert!(!practiced(3, -1).is_due_on(today));
    }

    #[test]
    fn correct_answer_promotes_and_keeps_failures() {
        let today = fixed_today();
        let card = practiced(3, 2);
        let next = card.answered(Answer::Correct, today);

        assert_eq!(next.stage().value(), 4);
        assert_eq!(next.last_practice_date(), Some(today));
        assert_eq!(next.failed_count(), 0);
        assert_eq!(next.front(), "hund");
    }

    #[test]
    fn incorrect_answer_resets_and_counts_failure() {
        let today = fixed_today();
        let card = practiced(6, 2);
        let next = card.answered(Answer::Incorrect, today);

        assert_eq!(next.stage(), Stage::UNLEARNED);
        assert_eq!(next.failed_count(), 1);
        assert_eq!(next.last_practice_date(), Some(today));
        assert!(!next.is_new());
    }

    #[test]
    fn answering_is_a_pure_function_of_inputs() {
        let today = fixed_today();
        let card = practiced(5, 1);
        assert_eq!(
            card.answered(Answer::Correct, today),
            card.answered(Answer::Correct, today)
        );
        assert_eq!(card.stage().value(), 5);
    }
}
