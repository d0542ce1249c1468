use std::collections::HashMap;

use chrono::NaiveDate;
use tracker_core::model::{Difficulty, NotificationKind, Problem, ProblemId};

use crate::error::TrackerError;
use crate::notifications::Notifier;

//
// ─── FILTER ────────────────────────────────────────────────────────────────────
//

/// Platform constraint. Platform names match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(String),
}

impl PlatformFilter {
    /// Parses a select-box value. `"all"` (any case) and `"All Platforms"` mean no constraint.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty()
            || value.eq_ignore_ascii_case("all")
            || value.eq_ignore_ascii_case("all platforms")
        {
            Self::All
        } else {
            Self::Only(value.to_owned())
        }
    }

    fn matches(&self, platform: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == platform,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    /// Parses a select-box value; `"all"` (any case) means no constraint.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` for an unknown difficulty.
    pub fn parse(value: &str) -> Result<Self, TrackerError> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Ok(Self::Only(value.parse::<Difficulty>()?))
    }

    fn matches(self, difficulty: Difficulty) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == difficulty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolvedFilter {
    #[default]
    All,
    Solved,
    Unsolved,
}

impl SolvedFilter {
    /// Parses `all`, `solved` or `unsolved`; anything else means no constraint.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "solved" | "true" => Self::Solved,
            "unsolved" | "false" => Self::Unsolved,
            _ => Self::All,
        }
    }

    fn matches(self, solved: bool) -> bool {
        match self {
            Self::All => true,
            Self::Solved => solved,
            Self::Unsolved => !solved,
        }
    }
}

/// Options for [`ProblemCatalog::query`]. Every supplied predicate must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemFilter {
    // Stored lowercased.
    text: Option<String>,
    platform: PlatformFilter,
    difficulty: DifficultyFilter,
    solved: SolvedFilter,
}

impl ProblemFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring on the title. An empty string matches everything.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_lowercase()).filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: PlatformFilter) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn difficulty(mut self, difficulty: DifficultyFilter) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn solved(mut self, solved: SolvedFilter) -> Self {
        self.solved = solved;
        self
    }

    #[must_use]
    pub fn matches(&self, problem: &Problem) -> bool {
        self.text
            .as_deref()
            .is_none_or(|t| problem.title().to_lowercase().contains(t))
            && self.platform.matches(problem.platform())
            && self.difficulty.matches(problem.difficulty())
            && self.solved.matches(problem.is_solved())
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Owns every known problem, in insertion order.
#[derive(Debug, Default)]
pub struct ProblemCatalog {
    problems: HashMap<ProblemId, Problem>,
    order: Vec<ProblemId>,
    notifier: Notifier,
}

impl ProblemCatalog {
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            problems: HashMap::new(),
            order: Vec::new(),
            notifier,
        }
    }

    /// Add a problem to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::DuplicateId` if a problem with the same id exists.
    pub fn add(&mut self, problem: Problem) -> Result<(), TrackerError> {
        let id = problem.id();
        if self.problems.contains_key(&id) {
            return Err(TrackerError::DuplicateId(format!("problem {id}")));
        }
        tracing::debug!(problem_id = %id, title = problem.title(), "problem added");
        self.notifier.info(
            NotificationKind::ProblemAdded,
            format!("{} has been added.", problem.title()),
        );
        self.order.push(id);
        self.problems.insert(id, problem);
        Ok(())
    }

    /// Add several problems, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::DuplicateId` on the first repeated id.
    pub fn extend(&mut self, problems: impl IntoIterator<Item = Problem>) -> Result<(), TrackerError> {
        problems.into_iter().try_for_each(|p| self.add(p))
    }

    #[must_use]
    pub fn get(&self, id: ProblemId) -> Option<&Problem> {
        self.problems.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ProblemId) -> bool {
        self.problems.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every problem in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Problem> + '_ {
        self.order.iter().filter_map(|id| self.problems.get(id))
    }

    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if `id` is not in the catalog.
    pub fn mark_solved(&mut self, id: ProblemId, date: NaiveDate) -> Result<&Problem, TrackerError> {
        let problem = self
            .problems
            .get_mut(&id)
            .ok_or_else(|| TrackerError::problem_not_found(id))?;
        problem.mark_solved(date);
        tracing::debug!(problem_id = %id, %date, "problem solved");
        self.notifier.info(
            NotificationKind::ProblemSolved,
            format!("{} marked as solved.", problem.title()),
        );
        Ok(problem)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if `id` is not in the catalog.
    pub fn mark_unsolved(&mut self, id: ProblemId) -> Result<&Problem, TrackerError> {
        let problem = self
            .problems
            .get_mut(&id)
            .ok_or_else(|| TrackerError::problem_not_found(id))?;
        problem.mark_unsolved();
        tracing::debug!(problem_id = %id, "problem unsolved");
        self.notifier.info(
            NotificationKind::ProblemUnsolved,
            format!("{} marked as unsolved.", problem.title()),
        );
        Ok(problem)
    }

    /// Remove a problem. Lists that reference it are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if `id` is not in the catalog.
    pub fn remove(&mut self, id: ProblemId) -> Result<Problem, TrackerError> {
        let problem = self
            .problems
            .remove(&id)
            .ok_or_else(|| TrackerError::problem_not_found(id))?;
        self.order.retain(|existing| *existing != id);
        tracing::debug!(problem_id = %id, "problem removed");
        self.notifier.info(
            NotificationKind::ProblemRemoved,
            format!("{} has been removed.", problem.title()),
        );
        Ok(problem)
    }

    /// Problems accepted by `filter`, in insertion order. Re-querying has no side effects.
    pub fn query<'a>(&'a self, filter: &'a ProblemFilter) -> impl Iterator<Item = &'a Problem> + 'a {
        self.iter().filter(move |p| filter.matches(p))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
