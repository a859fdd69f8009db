#![forbid(unsafe_code)]

pub mod app_services;
pub mod config_service;
pub mod error;
pub mod sessions;

pub use tick8_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use config_service::{ConfigService, DEFAULT_CONFIG_PATH};
pub use error::{AppServicesError, ConfigServiceError, SessionError};

pub use sessions::{
    RecordedAnswer, ScoredCard, SessionBuilder, SessionLoopService, SessionPlan, SessionProgress,
    SessionService, SessionStep,
};
