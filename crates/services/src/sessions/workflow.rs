use std::sync::Arc;

use storage::repository::CardStore;
use tick8_core::model::{CardId, PracticeSettings};

use super::service::{RecordedAnswer, SessionService};
use crate::Clock;
use crate::error::SessionError;

/// Result of one step through a session.
#[derive(Debug)]
pub struct SessionStep {
    pub recorded: Option<RecordedAnswer>,
    pub skipped: Option<CardId>,
    pub has_next: bool,
}

/// Orchestrates loading cards from the store and persisted answering.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    store: Arc<dyn CardStore>,
    settings: PracticeSettings,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn CardStore>, settings: PracticeSettings) -> Self {
        Self {
            clock,
            store,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn CardStore> {
        Arc::clone(&self.store)
    }

    /// Fetch the collection and build an idle session engine over it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store cannot be read. Nothing is
    /// retried here.
    pub async fn open(&self) -> Result<SessionService, SessionError> {
        let cards = self.store.fetch_all_cards().await?;
        tracing::debug!(cards = cards.len(), "loaded card collection");
        Ok(SessionService::new(cards, self.settings.clone(), self.clock))
    }

    /// Fetch the collection and start a session right away.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store cannot be read.
    pub async fn start_session(&self) -> Result<SessionService, SessionError> {
        let mut session = self.open().await?;
        session.start(true);
        Ok(session)
    }

    /// Re-fetch the collection into an existing engine, ending its session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store cannot be read; the engine
    /// is left untouched in that case.
    pub async fn reload(&self, session: &mut SessionService) -> Result<(), SessionError> {
        let cards = self.store.fetch_all_cards().await?;
        tracing::debug!(cards = cards.len(), "reloaded card collection");
        session.replace_cards(cards);
        Ok(())
    }

    /// Answer the current card, persist the outcome, and move on.
    pub async fn answer_current(&self, session: &mut SessionService, correct: bool) -> SessionStep {
        let recorded = session.record_answer(correct, self.store.as_ref()).await;
        if recorded.is_some() {
            session.advance();
        }
        SessionStep {
            recorded,
            skipped: None,
            has_next: session.has_next(),
        }
    }

    /// Skip the current card.
    pub fn skip_current(&self, session: &mut SessionService) -> SessionStep {
        let skipped = session.skip();
        SessionStep {
            recorded: None,
            skipped,
            has_next: session.has_next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryCardStore;
    use storage::repository::{NewCardRecord, StorageError};
    use tick8_core::model::Card;
    use tick8_core::time::fixed_clock;

    fn loop_service(store: &InMemoryCardStore, batch: u32) -> SessionLoopService {
        SessionLoopService::new(
            fixed_clock(),
            Arc::new(store.clone()),
            PracticeSettings::new(batch, None).unwrap(),
        )
    }

    #[tokio::test]
    async fn open_surfaces_store_errors() {
        let store = InMemoryCardStore::new();
        store.set_unreachable(true);
        let err = loop_service(&store, 20).open().await.unwrap_err();
        assert!(matches!(err, SessionError::Storage(StorageError::Connection(_))));
    }

    #[tokio::test]
    async fn empty_store_is_a_valid_empty_session() {
        let store = InMemoryCardStore::new();
        let session = loop_service(&store, 20).start_session().await.unwrap();
        assert!(session.is_active());
        assert!(!session.has_next());
        assert_eq!(session.progress().total, 0);
    }

    #[tokio::test]
    async fn reload_picks_up_store_changes() {
        let store = InMemoryCardStore::with_cards(vec![Card::new(CardId::new(1), "a", "b")]);
        let svc = loop_service(&store, 20);
        let mut session = svc.start_session().await.unwrap();

        store.insert(NewCardRecord::new("c", "d"));
        svc.reload(&mut session).await.unwrap();

        assert!(!session.is_active());
        assert_eq!(session.cards().len(), 2);
    }

    #[tokio::test]
    async fn reload_failure_leaves_session_intact() {
        let store = InMemoryCardStore::with_cards(vec![Card::new(CardId::new(1), "a", "b")]);
        let svc = loop_service(&store, 20);
        let mut session = svc.start_session().await.unwrap();

        store.set_unreachable(true);
        assert!(svc.reload(&mut session).await.is_err());
        assert!(session.is_active());
        assert_eq!(session.batch_len(), 1);
    }
}
