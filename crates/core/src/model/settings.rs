use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default batch size when `cardsPerSession` is not configured.
pub const DEFAULT_CARDS_PER_SESSION: u32 = 20;

/// Scheduling-relevant configuration, validated once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeSettings {
    cards_per_session: u32,
    store_url: Option<String>,
}

/// Loosely-typed settings as read from the config file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSettingsDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards_per_session: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("cards per session must be > 0")]
    InvalidCardsPerSession,
    #[error("invalid store URL: {0}")]
    InvalidStoreUrl(String),
}

impl PracticeSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the batch size is zero or the store URL is
    /// present but cannot be parsed.
    pub fn validate(self) -> Result<PracticeSettings, SettingsError> {
        let cards_per_session = self
            .cards_per_session
            .unwrap_or(DEFAULT_CARDS_PER_SESSION);
        if cards_per_session == 0 {
            return Err(SettingsError::InvalidCardsPerSession);
        }

        let store_url = normalize_optional(self.store_url);
        if let Some(url) = store_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(SettingsError::InvalidStoreUrl(url.clone()));
            }
        }

        Ok(PracticeSettings {
            cards_per_session,
            store_url,
        })
    }
}

impl From<&PracticeSettings> for PracticeSettingsDraft {
    fn from(settings: &PracticeSettings) -> Self {
        Self {
            cards_per_session: Some(settings.cards_per_session),
            store_url: settings.store_url.clone(),
        }
    }
}

impl PracticeSettings {
    /// # Errors
    ///
    /// See [`PracticeSettingsDraft::validate`].
    pub fn new(
        cards_per_session: u32,
        store_url: Option<String>,
    ) -> Result<Self, SettingsError> {
        PracticeSettingsDraft {
            cards_per_session: Some(cards_per_session),
            store_url,
        }
        .validate()
    }

    #[must_use]
    pub fn cards_per_session(&self) -> u32 {
        self.cards_per_session
    }

    #[must_use]
    pub fn store_url(&self) -> Option<&str> {
        self.store_url.as_deref()
    }
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            cards_per_session: DEFAULT_CARDS_PER_SESSION,
            store_url: None,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
