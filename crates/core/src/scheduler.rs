use chrono::NaiveDate;

use crate::model::{Answer, Card, PracticeOutcome, Stage};

//
// ─── TICK-8 RULE ───────────────────────────────────────────────────────────────
//

/// Highest stage on the Tick-8 scale. Cards at this stage are mastered.
pub const MAX_STAGE: u8 = 8;

/// Stage a card lands on after `answer`.
///
/// A correct answer climbs one stage (capped at mastery); any miss sends the
/// card back to stage 0.
///
/// # Examples
///
/// ```
/// # use tick8_core::model::{Answer, Stage};
/// # use tick8_core::scheduler::next_stage;
/// let three = Stage::new(3)?;
/// assert_eq!(next_stage(three, Answer::Correct).value(), 4);
/// assert_eq!(next_stage(three, Answer::Incorrect), Stage::UNLEARNED);
/// assert_eq!(next_stage(Stage::MASTERED, Answer::Correct), Stage::MASTERED);
/// # Ok::<(), tick8_core::model::CardError>(())
/// ```
#[must_use]
pub fn next_stage(stage: Stage, answer: Answer) -> Stage {
    match answer {
        Answer::Correct => stage.promoted(),
        Answer::Incorrect => Stage::UNLEARNED,
    }
}

//
// ─── APPLIED ANSWER ────────────────────────────────────────────────────────────
//

/// Result of applying an answer: the updated card and the outcome to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAnswer {
    pub card: Card,
    pub outcome: PracticeOutcome,
}

/// Apply `answer` to `card` on `today` without touching the original.
///
/// The returned card and outcome always agree on the new stage.
#[must_use]
pub fn apply_answer(card: &Card, answer: Answer, today: NaiveDate) -> AppliedAnswer {
    let updated = card.answered(answer, today);

    AppliedAnswer {
        outcome: PracticeOutcome::new(card.id(), answer, updated.stage(), today),
        card: updated,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardId;
    use crate::time::fixed_today;

    fn card_at(stage: u8, failed: u32) -> Card {
        Card::from_persisted(
            CardId::new(9),
            "katt",
            "cat",
            fixed_today().pred_opt(),
            Stage::new(stage).unwrap(),
            failed,
        )
    }

    #[test]
    fn next_stage_walks_the_scale() {
        let mut stage = Stage::UNLEARNED;
        for expected in 1..=MAX_STAGE {
            stage = next_stage(stage, Answer::Correct);
            assert_eq!(stage.value(), expected);
        }
        assert_eq!(next_stage(stage, Answer::Correct).value(), MAX_STAGE);
    }

    #[test]
    fn apply_answer_correct_from_stage_three() {
        let today = fixed_today();
        let applied = apply_answer(&card_at(3, 2), Answer::Correct, today);

        assert_eq!(applied.card.stage().value(), 4);
        assert_eq!(applied.card.failed_count(), 2);
        assert_eq!(applied.card.last_practice_date(), Some(today));
        assert_eq!(applied.outcome.new_stage.value(), 4);
        assert_eq!(applied.outcome.answer, Answer::Correct);
        assert_eq!(applied.outcome.card_id, CardId::new(9));
    }

    #[test]
    fn apply_answer_incorrect_from_stage_six() {
        let today = fixed_today();
        let original = card_at(6, 0);
        let applied = apply_answer(&original, Answer::Incorrect, today);

        assert_eq!(applied.card.stage(), Stage::UNLEARNED);
        assert_eq!(applied.card.failed_count(), 1);
        assert_eq!(applied.outcome.new_stage, Stage::UNLEARNED);
        assert_eq!(applied.outcome.practiced_on, today);
        // original untouched
        assert_eq!(original.stage().value(), 6);
    }

    #[test]
    fn applying_twice_from_same_state_is_stable() {
        let today = fixed_today();
        let card = card_at(2, 0);
        let first = apply_answer(&card, Answer::Correct, today);
        let second = apply_answer(&card, Answer::Correct, today);
        assert_eq!(first, second);
    }
}
