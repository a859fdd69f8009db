mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{FAILURE_WEIGHT, LAPSED_BASE, NEW_BASE, ScoredCard, SessionBuilder, SessionPlan, priority_score};
pub use progress::SessionProgress;
pub use service::{RecordedAnswer, SessionService};
pub use workflow::{SessionLoopService, SessionStep};
