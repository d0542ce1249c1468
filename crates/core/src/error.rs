use thiserror::Error;

use crate::model::{ListError, ProblemError, UserError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error(transparent)]
    List(#[from] ListError),
}
