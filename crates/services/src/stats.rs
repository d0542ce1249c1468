//! Dashboard statistics derived from the session, the catalog and the lists.
//!
//! Nothing here is cached: every call reads the current state, so repeated
//! calls are free of side effects and always agree with the components.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use tracker_core::model::{Difficulty, Problem, ProblemList};

use crate::Clock;
use crate::catalog::ProblemCatalog;
use crate::list_manager::ProblemListManager;
use crate::session_store::SessionStore;

/// Solved counts per difficulty. All three buckets always exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DifficultyBreakdown {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyBreakdown {
    #[must_use]
    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    /// Buckets easiest first.
    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, u32)> + '_ {
        Difficulty::ALL.into_iter().map(|d| (d, self.get(d)))
    }

    fn bump(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::Hard => self.hard += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_solved: u32,
    pub list_count: u32,
    pub current_streak: u32,
    /// A problem counts once for every topic it carries.
    pub by_topic: BTreeMap<String, u32>,
    pub by_difficulty: DifficultyBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySolved {
    pub year: i32,
    pub month: u32,
    pub solved: u32,
}

/// One entry of the recent-activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity<'a> {
    Solved { problem: &'a Problem, on: NaiveDate },
    ListCreated { list: &'a ProblemList, at: DateTime<Utc> },
}

impl Activity<'_> {
    /// When it happened. A solve has no time of day, so it sorts at the start of its date.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Activity::Solved { on, .. } => on.and_time(NaiveTime::MIN).and_utc(),
            Activity::ListCreated { at, .. } => *at,
        }
    }
}

/// Read-only view over the three stateful components.
#[derive(Debug, Clone, Copy)]
pub struct StatsAggregator<'a> {
    session: &'a SessionStore,
    catalog: &'a ProblemCatalog,
    lists: &'a ProblemListManager,
    clock: Clock,
}

impl<'a> StatsAggregator<'a> {
    #[must_use]
    pub fn new(
        session: &'a SessionStore,
        catalog: &'a ProblemCatalog,
        lists: &'a ProblemListManager,
        clock: Clock,
    ) -> Self {
        Self {
            session,
            catalog,
            lists,
            clock,
        }
    }

    #[must_use]
    pub fn summary(&self) -> StatsSummary {
        let mut total_solved = 0;
        let mut by_topic = BTreeMap::new();
        let mut by_difficulty = DifficultyBreakdown::default();

        for problem in solved_in(self.catalog) {
            total_solved += 1;
            by_difficulty.bump(problem.difficulty());
            for topic in problem.topics() {
                *by_topic.entry(topic.clone()).or_insert(0) += 1;
            }
        }

        StatsSummary {
            total_solved,
            list_count: self.list_count(),
            current_streak: self.current_streak(),
            by_topic,
            by_difficulty,
        }
    }

    /// Consecutive days with at least one solve, ending today. A chain that
    /// ends yesterday still counts, since today is not over yet.
    #[must_use]
    pub fn current_streak(&self) -> u32 {
        let days: HashSet<NaiveDate> = solved_in(self.catalog)
            .filter_map(Problem::solved_date)
            .collect();
        let today = self.clock.today();

        let mut day = if days.contains(&today) {
            today
        } else {
            match today.pred_opt() {
                Some(yesterday) if days.contains(&yesterday) => yesterday,
                _ => return 0,
            }
        };

        let mut streak = 0;
        while days.contains(&day) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }

    /// Solves per calendar month for the last `months` months, oldest first,
    /// ending with the current month. Months without solves report zero.
    #[must_use]
    pub fn monthly_solved(&self, months: u32) -> Vec<MonthlySolved> {
        let today = self.clock.today();
        let current = month_index(today);

        let mut counts: BTreeMap<i64, u32> = BTreeMap::new();
        for date in solved_in(self.catalog).filter_map(Problem::solved_date) {
            *counts.entry(month_index(date)).or_insert(0) += 1;
        }

        (0..i64::from(months))
            .rev()
            .map(|back| {
                let index = current - back;
                MonthlySolved {
                    year: i32::try_from(index.div_euclid(12)).unwrap_or(i32::MIN),
                    month: u32::try_from(index.rem_euclid(12) + 1).unwrap_or(1),
                    solved: counts.get(&index).copied().unwrap_or(0),
                }
            })
            .collect()
    }

    /// Newest-first feed of solves and list creations, at most `limit` entries.
    #[must_use]
    pub fn recent_activity(&self, limit: usize) -> Vec<Activity<'a>> {
        let solves = self.catalog.iter().filter_map(|problem| {
            problem
                .solved_date()
                .map(|on| Activity::Solved { problem, on })
        });
        let created = self.lists.lists().map(|list| Activity::ListCreated {
            list,
            at: list.created_at(),
        });

        let mut feed: Vec<Activity<'a>> = solves.chain(created).collect();
        feed.sort_by(|a, b| b.occurred_at().cmp(&a.occurred_at()));
        feed.truncate(limit);
        feed
    }

    fn list_count(&self) -> u32 {
        let count = match self.session.current_user() {
            Some(user) => self.lists.lists_owned_by(user.id()).count(),
            None => self.lists.len(),
        };
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

fn solved_in(catalog: &ProblemCatalog) -> impl Iterator<Item = &Problem> {
    catalog.iter().filter(|p| p.is_solved())
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}
