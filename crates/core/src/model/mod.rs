mod ids;
mod notification;
mod problem;
mod problem_list;
mod progress;
mod user;

pub use ids::{ListId, ParseIdError, ProblemId, UserId};
pub use notification::{Notification, NotificationKind, Severity};
pub use problem::{Difficulty, Problem, ProblemError, SolveState};
pub use problem_list::{ListDraft, ListError, ProblemList};
pub use progress::Progress;
pub use user::{ProfileUpdate, User, UserError, derive_username};
