use serde::Serialize;

/// How loudly a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Info,
    Destructive,
}

/// What happened. Presentation code picks icons and headings from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum NotificationKind {
    SignedIn,
    SignInFailed,
    SignedUp,
    SignedOut,
    ProfileUpdated,
    ProblemAdded,
    ProblemSolved,
    ProblemUnsolved,
    ProblemRemoved,
    ListCreated,
    ListDeleted,
    ListVisibilityChanged,
    ListProblemAdded,
    ListProblemRemoved,
    ListPruned,
    OperationFailed,
}

impl NotificationKind {
    /// Short heading suitable for a toast title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::SignedIn => "Signed In",
            Self::SignInFailed => "Sign In Failed",
            Self::SignedUp => "Account Created",
            Self::SignedOut => "Signed Out",
            Self::ProfileUpdated => "Profile Updated",
            Self::ProblemAdded => "Problem Added",
            Self::ProblemSolved => "Problem Marked as Solved",
            Self::ProblemUnsolved => "Problem Marked as Unsolved",
            Self::ProblemRemoved | Self::ListProblemRemoved => "Problem Removed",
            Self::ListCreated => "Problem List Created",
            Self::ListDeleted => "Problem List Deleted",
            Self::ListVisibilityChanged => "Visibility Updated",
            Self::ListProblemAdded => "Problem Added to List",
            Self::ListPruned => "List Cleaned Up",
            Self::OperationFailed => "Error",
        }
    }
}

/// A transient, render-agnostic event description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    #[must_use]
    pub fn info(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity: Severity::Info,
        }
    }

    #[must_use]
    pub fn destructive(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity: Severity::Destructive,
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}
