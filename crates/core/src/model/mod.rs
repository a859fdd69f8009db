mod card;
mod ids;
mod review;
mod session;
mod settings;

pub use ids::CardId;

pub use card::{Card, CardError, Stage};
pub use review::{Answer, PracticeOutcome};
pub use session::SessionStats;
pub use settings::{
    DEFAULT_CARDS_PER_SESSION, PracticeSettings, PracticeSettingsDraft, SettingsError,
};
