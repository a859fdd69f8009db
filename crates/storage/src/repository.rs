use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tick8_core::model::{Answer, Card, CardId, PracticeOutcome, Stage};

/// Date layout used for `last_practice_date` in every store.
pub const PRACTICE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("no card store is configured")]
    NotConfigured,

    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Persisted shape of a card, as loose as a spreadsheet row.
///
/// Scheduling columns are kept as raw strings; [`CardRecord::into_card`] applies
/// the defaults exactly once so the domain `Card` never sees missing values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub id: CardId,
    pub front: String,
    pub back: String,
    pub last_practice_date: Option<String>,
    pub stage: Option<String>,
    pub failed_count: Option<String>,
}

impl CardRecord {
    #[must_use]
    pub fn from_card(card: &Card) -> Self {
        Self {
            id: card.id(),
            front: card.front().to_owned(),
            back: card.back().to_owned(),
            last_practice_date: card.last_practice_date().map(format_practice_date),
            stage: Some(card.stage().to_string()),
            failed_count: Some(card.failed_count().to_string()),
        }
    }

    /// Rows without a front are placeholders, not cards.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.front.trim().is_empty()
    }

    /// Convert the record into a domain `Card`.
    ///
    /// Blank dates mean "never practiced". A date that is not `YYYY-MM-DD`
    /// still counts as practiced, on the earliest representable day, so the
    /// card stays due until an answer overwrites it. Missing or non-numeric
    /// stage and failure counts read as 0; stages above mastery are clamped.
    #[must_use]
    pub fn into_card(self) -> Card {
        let last_practice_date = match parse_practice_date(self.last_practice_date.as_deref()) {
            Ok(date) => date,
            Err(err) => {
                tracing::warn!(
                    card_id = %self.id,
                    error = %err,
                    "unreadable practice date; treating card as overdue"
                );
                Some(NaiveDate::MIN)
            }
        };
        let stage = parse_count(self.stage.as_deref()).map_or(Stage::UNLEARNED, Stage::clamped);
        let failed_count = parse_count(self.failed_count.as_deref())
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);

        Card::from_persisted(
            self.id,
            self.front.trim(),
            self.back.trim(),
            last_practice_date,
            stage,
            failed_count,
        )
    }

    /// Write an outcome into this row the way a remote sheet would.
    pub fn apply_outcome(&mut self, outcome: &PracticeOutcome) {
        self.last_practice_date = Some(format_practice_date(outcome.practiced_on));
        self.stage = Some(outcome.new_stage.to_string());
        if outcome.answer == Answer::Incorrect {
            self.failed_count = Some(bumped_failed_count(self.failed_count.as_deref()).to_string());
        }
    }
}

/// Input for creating a card; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCardRecord {
    pub front: String,
    pub back: String,
    pub last_practice_date: Option<String>,
    pub stage: Option<String>,
    pub failed_count: Option<String>,
}

impl NewCardRecord {
    #[must_use]
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_progress(mut self, last_practice_date: NaiveDate, stage: Stage, failed_count: u32) -> Self {
        self.last_practice_date = Some(format_practice_date(last_practice_date));
        self.stage = Some(stage.to_string());
        self.failed_count = Some(failed_count.to_string());
        self
    }

    #[must_use]
    pub fn assign_id(self, id: CardId) -> CardRecord {
        CardRecord {
            id,
            front: self.front,
            back: self.back,
            last_practice_date: self.last_practice_date,
            stage: self.stage,
            failed_count: self.failed_count,
        }
    }
}

#[must_use]
pub fn format_practice_date(date: NaiveDate) -> String {
    date.format(PRACTICE_DATE_FORMAT).to_string()
}

pub(crate) fn parse_practice_date(raw: Option<&str>) -> Result<Option<NaiveDate>, StorageError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, PRACTICE_DATE_FORMAT)
            .map(Some)
            .map_err(|_| StorageError::Serialization(format!("invalid practice date: {value}"))),
    }
}

/// Digits-only parse; anything else counts as absent.
pub(crate) fn parse_count(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Stored failure count after one more miss; unreadable counts restart at 1.
pub(crate) fn bumped_failed_count(raw: Option<&str>) -> u32 {
    parse_count(raw)
        .and_then(|n| u32::try_from(n).ok())
        .map_or(1, |n| n.saturating_add(1))
}

//
// ─── CARD STORE ────────────────────────────────────────────────────────────────
//

/// The external collaborator that owns the card collection.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Fetch every card, in storage order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store cannot be reached.
    /// Unreadable cells degrade per row and never fail the whole fetch.
    async fn fetch_all_cards(&self) -> Result<Vec<Card>, StorageError>;

    /// Persist the result of one answer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the card does not exist, or other
    /// storage errors if the write fails.
    async fn persist_outcome(&self, outcome: &PracticeOutcome) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY STORE ───────────────────────────────────────────────────────────
//

#[derive(Debug, Default)]
struct InMemoryState {
    rows: Vec<CardRecord>,
    persisted: Vec<PracticeOutcome>,
    fail_writes: bool,
    unreachable: bool,
}

/// Simple in-memory card store for testing and prototyping.
///
/// Failure switches let tests exercise unreachable stores and failed writes.
#[derive(Clone, Default)]
pub struct InMemoryCardStore {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryCardStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Self::with_records(cards.into_iter().map(|card| CardRecord::from_card(&card)))
    }

    #[must_use]
    pub fn with_records(rows: impl IntoIterator<Item = CardRecord>) -> Self {
        let store = Self::new();
        store.state().rows.extend(rows);
        store
    }

    fn state(&self) -> std::sync::MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a card row, assigning the next id after the current maximum.
    pub fn insert(&self, card: NewCardRecord) -> CardId {
        let mut state = self.state();
        let next = state.rows.iter().map(|row| row.id.value()).max().unwrap_or(0) + 1;
        let id = CardId::new(next);
        state.rows.push(card.assign_id(id));
        id
    }

    /// Make every subsequent `persist_outcome` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Make every call fail as if the store could not be reached.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    /// Outcomes that were successfully persisted, in order.
    #[must_use]
    pub fn persisted(&self) -> Vec<PracticeOutcome> {
        self.state().persisted.clone()
    }

    #[must_use]
    pub fn records(&self) -> Vec<CardRecord> {
        self.state().rows.clone()
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn fetch_all_cards(&self) -> Result<Vec<Card>, StorageError> {
        let state = self.state();
        if state.unreachable {
            return Err(StorageError::Connection("store unreachable".into()));
        }
        Ok(state
            .rows
            .iter()
            .filter(|row| !row.is_blank())
            .cloned()
            .map(CardRecord::into_card)
            .collect())
    }

    async fn persist_outcome(&self, outcome: &PracticeOutcome) -> Result<(), StorageError> {
        let mut guard = self.state();
        if guard.unreachable || guard.fail_writes {
            return Err(StorageError::Connection("write rejected".into()));
        }
        let row = guard
            .rows
            .iter_mut()
            .find(|row| row.id == outcome.card_id)
            .ok_or(StorageError::NotFound)?;
        row.apply_outcome(outcome);
        guard.persisted.push(outcome.clone());
        Ok(())
    }
}

//
// ─── STORAGE ───────────────────────────────────────────────────────────────────
//

/// A connected card store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub cards: Arc<dyn CardStore>,
}

impl Storage {
    #[must_use]
    pub fn from_store(store: impl CardStore + 'static) -> Self {
        Self {
            cards: Arc::new(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tick8_core::time::fixed_today;

    fn raw(front: &str, date: Option<&str>, stage: Option<&str>, failed: Option<&str>) -> CardRecord {
        CardRecord {
            id: CardId::new(2),
            front: front.into(),
            back: "back".into(),
            last_practice_date: date.map(Into::into),
            stage: stage.map(Into::into),
            failed_count: failed.map(Into::into),
        }
    }

    #[test]
    fn into_card_applies_defaults_once() {
        let card = raw("front", Some("  "), None, Some("n/a")).into_card();
        assert!(card.is_new());
        assert_eq!(card.stage(), Stage::UNLEARNED);
        assert_eq!(card.failed_count(), 0);
    }

    #[test]
    fn into_card_reads_progress_and_clamps_stage() {
        let card = raw("front", Some("2023-11-13"), Some("12"), Some("3")).into_card();
        assert_eq!(card.last_practice_date(), fixed_today().pred_opt());
        assert_eq!(card.stage(), Stage::MASTERED);
        assert_eq!(card.failed_count(), 3);
    }

    #[test]
    fn malformed_date_reads_as_practiced_and_due() {
        let card = raw("front", Some("13/11/2023"), Some("4"), None).into_card();
        assert!(!card.is_new());
        assert_eq!(card.last_practice_date(), Some(NaiveDate::MIN));
        assert_eq!(card.stage().value(), 4);
        assert!(card.is_due_on(fixed_today()));
    }

    #[tokio::test]
    async fn one_bad_date_does_not_block_the_collection() {
        let store = InMemoryCardStore::with_records(vec![
            CardRecord { id: CardId::new(2), ..raw("eins", None, None, None) },
            CardRecord { id: CardId::new(3), ..raw("zwei", Some("2023-11-10"), Some("2"), None) },
            CardRecord { id: CardId::new(4), ..raw("drei", Some("11/10/2023"), Some("2"), None) },
        ]);

        let cards = store.fetch_all_cards().await.unwrap();
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|card| card.is_due_on(fixed_today())));
    }

    #[test]
    fn negative_or_signed_counts_are_not_numeric() {
        assert_eq!(parse_count(Some("-1")), None);
        assert_eq!(parse_count(Some("+2")), None);
        assert_eq!(parse_count(Some(" 4 ")), Some(4));
    }

    #[test]
    fn failed_count_bump_restarts_unreadable_values() {
        assert_eq!(bumped_failed_count(None), 1);
        assert_eq!(bumped_failed_count(Some("x")), 1);
        assert_eq!(bumped_failed_count(Some("4")), 5);
    }

    #[test]
    fn apply_outcome_updates_row_like_a_sheet() {
        let mut row = raw("front", None, Some("6"), Some("2"));
        let outcome = PracticeOutcome::new(row.id, Answer::Incorrect, Stage::UNLEARNED, fixed_today());
        row.apply_outcome(&outcome);

        assert_eq!(row.last_practice_date.as_deref(), Some("2023-11-14"));
        assert_eq!(row.stage.as_deref(), Some("0"));
        assert_eq!(row.failed_count.as_deref(), Some("3"));

        let promoted = PracticeOutcome::new(row.id, Answer::Correct, Stage::new(1).unwrap(), fixed_today());
        row.apply_outcome(&promoted);
        assert_eq!(row.stage.as_deref(), Some("1"));
        assert_eq!(row.failed_count.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn in_memory_skips_blank_rows_and_keeps_order() {
        let store = InMemoryCardStore::with_records(vec![
            CardRecord { id: CardId::new(2), ..raw("eins", None, None, None) },
            CardRecord { id: CardId::new(3), ..raw("  ", None, None, None) },
            CardRecord { id: CardId::new(4), ..raw("zwei", None, None, None) },
        ]);

        let cards = store.fetch_all_cards().await.unwrap();
        let ids: Vec<_> = cards.iter().map(Card::id).collect();
        assert_eq!(ids, vec![CardId::new(2), CardId::new(4)]);
    }

    #[tokio::test]
    async fn in_memory_persists_and_reports_failures() {
        let store = InMemoryCardStore::new();
        let id = store.insert(NewCardRecord::new("drei", "three"));
        let outcome = PracticeOutcome::new(id, Answer::Correct, Stage::new(1).unwrap(), fixed_today());

        store.persist_outcome(&outcome).await.unwrap();
        assert_eq!(store.persisted(), vec![outcome.clone()]);

        let fetched = store.fetch_all_cards().await.unwrap();
        assert_eq!(fetched[0].stage().value(), 1);

        store.set_fail_writes(true);
        let err = store.persist_outcome(&outcome).await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
        assert_eq!(store.persisted().len(), 1);

        let missing = PracticeOutcome::new(CardId::new(99), Answer::Correct, Stage::new(1).unwrap(), fixed_today());
        store.set_fail_writes(false);
        let err = store.persist_outcome(&missing).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn poisoned_lock_is_recovered_by_every_call() {
        let store = InMemoryCardStore::new();
        let id = store.insert(NewCardRecord::new("vier", "four"));

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("poison the store");
        })
        .join();
        assert!(store.state.is_poisoned());

        assert_eq!(store.fetch_all_cards().await.unwrap().len(), 1);
        let outcome = PracticeOutcome::new(id, Answer::Correct, Stage::new(1).unwrap(), fixed_today());
        store.persist_outcome(&outcome).await.unwrap();
        assert_eq!(store.persisted().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_store_fails_fetch() {
        let store = InMemoryCardStore::new();
        store.set_unreachable(true);
        let err = store.fetch_all_cards().await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }
}
