#![forbid(unsafe_code)]

pub mod authenticator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod list_manager;
pub mod notifications;
pub mod session_store;
pub mod stats;
pub mod tracker;

pub use tracker_core::Clock;

pub use authenticator::{AuthError, Authenticator, MockAuthenticator, SignUpRequest};
pub use catalog::{DifficultyFilter, PlatformFilter, ProblemCatalog, ProblemFilter, SolvedFilter};
pub use config::TrackerConfig;
pub use error::{BootstrapError, TrackerError};
pub use list_manager::ProblemListManager;
pub use notifications::{NotificationLog, NotificationSink, Notifier, SilentSink, TracingSink};
pub use session_store::{SessionState, SessionStore};
pub use stats::{Activity, DifficultyBreakdown, MonthlySolved, StatsAggregator, StatsSummary};
pub use tracker::Tracker;
