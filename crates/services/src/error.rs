//! Shared error types for the services crate.

use thiserror::Error;

use storage::sqlite::SqliteInitError;
use tracker_core::model::{
    ListError, ListId, Notification, NotificationKind, ProblemError, ProblemId, UserError,
};

use crate::authenticator::AuthError;

/// The recoverable failures a component operation can report.
///
/// None of these is fatal; callers surface them to the user (see
/// [`TrackerError::notification`]) and carry on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("a sign-in is already in progress")]
    AlreadyAuthenticating,
    #[error("invalid email or password")]
    InvalidCredentials,
}

impl TrackerError {
    #[must_use]
    pub fn problem_not_found(id: ProblemId) -> Self {
        Self::NotFound(format!("problem {id}"))
    }

    #[must_use]
    pub fn list_not_found(id: ListId) -> Self {
        Self::NotFound(format!("list {id}"))
    }

    /// Describe this failure for a transient notification.
    #[must_use]
    pub fn notification(&self) -> Notification {
        let kind = match self {
            Self::InvalidCredentials | Self::AlreadyAuthenticating => NotificationKind::SignInFailed,
            _ => NotificationKind::OperationFailed,
        };
        Notification::destructive(kind, self.to_string())
    }
}

impl From<UserError> for TrackerError {
    fn from(err: UserError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<ProblemError> for TrackerError {
    fn from(err: ProblemError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<ListError> for TrackerError {
    fn from(err: ListError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<tracker_core::Error> for TrackerError {
    fn from(err: tracker_core::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<AuthError> for TrackerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected => Self::InvalidCredentials,
            AuthError::InvalidUser(err) => err.into(),
        }
    }
}

/// Errors emitted while bootstrapping a `Tracker`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BootstrapError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
