use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::ids::ProblemId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("problem title cannot be empty")]
    EmptyTitle,

    #[error("platform cannot be empty")]
    EmptyPlatform,

    #[error("invalid problem URL: {0}")]
    InvalidUrl(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty rating as published by the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Every difficulty, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ProblemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ProblemError::UnknownDifficulty(s.to_owned())),
        }
    }
}

//
// ─── SOLVE STATE ───────────────────────────────────────────────────────────────
//

/// Whether a problem is solved. The solve date only exists on the solved side,
/// so "solved without a date" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveState {
    #[default]
    Unsolved,
    Solved {
        on: NaiveDate,
    },
}

//
// ─── PROBLEM ───────────────────────────────────────────────────────────────────
//

/// A single competitive-programming problem tracked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    id: ProblemId,
    title: String,
    difficulty: Difficulty,
    topics: Vec<String>,
    platform: String,
    url: Url,
    state: SolveState,
}

impl Problem {
    /// Creates an unsolved problem.
    ///
    /// Topics are trimmed; blanks and repeats are dropped, first occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError` if title or platform is blank, or the URL does not parse.
    pub fn new<T, S>(
        id: ProblemId,
        title: impl Into<String>,
        difficulty: Difficulty,
        topics: T,
        platform: impl Into<String>,
        url: &str,
    ) -> Result<Self, ProblemError>
    where
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ProblemError::EmptyTitle);
        }
        let platform = platform.into();
        if platform.trim().is_empty() {
            return Err(ProblemError::EmptyPlatform);
        }
        let url = Url::parse(url.trim()).map_err(|_| ProblemError::InvalidUrl(url.to_owned()))?;

        let mut seen = HashSet::new();
        let topics = topics
            .into_iter()
            .map(|t| t.as_ref().trim().to_owned())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            difficulty,
            topics,
            platform: platform.trim().to_owned(),
            url,
            state: SolveState::Unsolved,
        })
    }

    /// Builder-style variant of [`Problem::mark_solved`] for seeding.
    #[must_use]
    pub fn solved_on(mut self, date: NaiveDate) -> Self {
        self.mark_solved(date);
        self
    }

    /// Marks the problem solved on `date`, replacing any earlier solve date.
    pub fn mark_solved(&mut self, date: NaiveDate) {
        self.state = SolveState::Solved { on: date };
    }

    pub fn mark_unsolved(&mut self) {
        self.state = SolveState::Unsolved;
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ProblemId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn state(&self) -> SolveState {
        self.state
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        matches!(self.state, SolveState::Solved { .. })
    }

    #[must_use]
    pub fn solved_date(&self) -> Option<NaiveDate> {
        match self.state {
            SolveState::Solved { on } => Some(on),
            SolveState::Unsolved => None,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
