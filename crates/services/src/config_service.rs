use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tick8_core::model::{PracticeSettings, PracticeSettingsDraft};

use crate::error::ConfigServiceError;

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Loads and saves practice settings as a JSON file.
#[derive(Clone, Debug)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings strictly. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigServiceError` if the file cannot be read, is not valid
    /// JSON, or holds invalid values.
    pub fn try_load(&self) -> Result<PracticeSettings, ConfigServiceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(PracticeSettings::default());
            }
            Err(source) => {
                return Err(ConfigServiceError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let draft: PracticeSettingsDraft = serde_json::from_str(&raw)?;
        Ok(draft.validate()?)
    }

    /// Load settings, falling back to defaults on any problem.
    #[must_use]
    pub fn load(&self) -> PracticeSettings {
        self.try_load().unwrap_or_else(|err| {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "could not load settings; using defaults"
            );
            PracticeSettings::default()
        })
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigServiceError` if validation fails or the file cannot be written.
    pub fn save(&self, draft: PracticeSettingsDraft) -> Result<PracticeSettings, ConfigServiceError> {
        let settings = draft.validate()?;
        let json = serde_json::to_string_pretty(&PracticeSettingsDraft::from(&settings))?;

        let io_err = |source| ConfigServiceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, json).map_err(io_err)?;
        Ok(settings)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}
