use std::sync::Arc;

use storage::repository::{CardStore, Storage, StorageError};
use tick8_core::model::PracticeSettings;

use crate::Clock;
use crate::error::AppServicesError;
use crate::sessions::SessionLoopService;

/// Assembles the session services over a configured card store.
#[derive(Clone)]
pub struct AppServices {
    settings: PracticeSettings,
    store: Arc<dyn CardStore>,
    session_loop: Arc<SessionLoopService>,
}

impl AppServices {
    /// Build services backed by the `SQLite` store named in `settings`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage(StorageError::NotConfigured)` when no
    /// store URL is set, or `AppServicesError::Sqlite` if the store cannot be
    /// opened.
    pub async fn connect(settings: PracticeSettings, clock: Clock) -> Result<Self, AppServicesError> {
        let url = settings.store_url().ok_or(StorageError::NotConfigured)?;
        let storage = Storage::sqlite(url).await?;
        Ok(Self::with_store(storage.cards, settings, clock))
    }

    /// Build services over an already constructed store.
    #[must_use]
    pub fn with_store(store: Arc<dyn CardStore>, settings: PracticeSettings, clock: Clock) -> Self {
        let session_loop = Arc::new(SessionLoopService::new(
            clock,
            Arc::clone(&store),
            settings.clone(),
        ));
        Self {
            settings,
            store,
            session_loop,
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

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryCardStore;
    use tick8_core::time::fixed_clock;

    #[tokio::test]
    async fn connect_without_store_url_is_not_configured() {
        let err = AppServices::connect(PracticeSettings::default(), fixed_clock())
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            AppServicesError::Storage(StorageError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn connect_opens_sqlite_store() {
        let settings = PracticeSettings::new(
            5,
            Some("sqlite:file:app_services_connect?mode=memory&cache=shared".into()),
        )
        .unwrap();
        let services = AppServices::connect(settings, fixed_clock()).await.unwrap();

        assert_eq!(services.settings().cards_per_session(), 5);
        let session = services.session_loop().start_session().await.unwrap();
        assert_eq!(session.batch_len(), 0);
    }

    #[test]
    fn with_store_shares_the_store() {
        let store: Arc<dyn CardStore> = Arc::new(InMemoryCardStore::new());
        let services = AppServices::with_store(
            Arc::clone(&store),
            PracticeSettings::default(),
            fixed_clock(),
        );
        assert!(Arc::ptr_eq(&services.store(), &store));
        assert!(Arc::ptr_eq(&services.session_loop().store(), &store));
    }
}
