use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{ListId, ProblemId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ListError {
    #[error("list title cannot be empty")]
    EmptyTitle,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// User-supplied fields for a new list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDraft {
    pub title: String,
    pub description: String,
    pub is_public: bool,
    pub owner_id: UserId,
}

impl ListDraft {
    /// Validate the draft and stamp it with an id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `ListError::EmptyTitle` if the title is blank.
    pub fn validate(self, id: ListId, now: DateTime<Utc>) -> Result<ProblemList, ListError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ListError::EmptyTitle);
        }
        Ok(ProblemList {
            id,
            title: title.to_owned(),
            description: self.description.trim().to_owned(),
            is_public: self.is_public,
            owner_id: self.owner_id,
            created_at: now,
            updated_at: now,
            problem_ids: Vec::new(),
        })
    }
}

//
// ─── PROBLEM LIST ──────────────────────────────────────────────────────────────
//

/// A named, ordered, shareable selection of catalog problems.
///
/// Problem ids are lookups into a catalog, never owned problems. Ids are unique
/// within a list and keep the order they were added in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemList {
    id: ListId,
    title: String,
    description: String,
    is_public: bool,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    problem_ids: Vec<ProblemId>,
}

impl ProblemList {
    /// Appends `problem_id` unless already present. Returns whether the list changed.
    pub fn insert(&mut self, problem_id: ProblemId, now: DateTime<Utc>) -> bool {
        if self.contains(problem_id) {
            return false;
        }
        self.problem_ids.push(problem_id);
        self.touch(now);
        true
    }

    /// Removes `problem_id`. Returns whether it was present.
    pub fn remove(&mut self, problem_id: ProblemId, now: DateTime<Utc>) -> bool {
        let before = self.problem_ids.len();
        self.problem_ids.retain(|id| *id != problem_id);
        let removed = self.problem_ids.len() != before;
        if removed {
            self.touch(now);
        }
        removed
    }

    /// Keeps only ids accepted by `keep`. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(ProblemId) -> bool, now: DateTime<Utc>) -> usize {
        let before = self.problem_ids.len();
        self.problem_ids.retain(|id| keep(*id));
        let dropped = before - self.problem_ids.len();
        if dropped > 0 {
            self.touch(now);
        }
        dropped
    }

    pub fn set_visibility(&mut self, is_public: bool, now: DateTime<Utc>) {
        self.is_public = is_public;
        self.touch(now);
    }

    // updated_at never goes behind created_at, even with a clock that jumps back.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    #[must_use]
    pub fn contains(&self, problem_id: ProblemId) -> bool {
        self.problem_ids.contains(&problem_id)
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ListId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn problem_ids(&self) -> &[ProblemId] {
        &self.problem_ids
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
