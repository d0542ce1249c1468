use url::Url;

use tracker_core::model::{
    ListDraft, ListId, NotificationKind, Problem, ProblemId, ProblemList, Progress, UserId,
};

use crate::Clock;
use crate::catalog::ProblemCatalog;
use crate::error::TrackerError;
use crate::notifications::Notifier;

/// Owns every problem list. Lists hold problem ids only; they are resolved
/// against the catalog passed to each call.
#[derive(Debug)]
pub struct ProblemListManager {
    clock: Clock,
    notifier: Notifier,
    lists: Vec<ProblemList>,
    next_id: u64,
}

impl ProblemListManager {
    #[must_use]
    pub fn new(clock: Clock, notifier: Notifier) -> Self {
        Self {
            clock,
            notifier,
            lists: Vec::new(),
            next_id: 1,
        }
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Create a list owned by `draft.owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if the title is blank.
    pub fn create_list(&mut self, draft: ListDraft) -> Result<&ProblemList, TrackerError> {
        let id = ListId::new(self.next_id);
        let list = draft.validate(id, self.clock.now())?;
        self.next_id += 1;

        tracing::info!(list_id = %id, title = list.title(), "list created");
        self.notifier.info(
            NotificationKind::ListCreated,
            format!("{} has been created.", list.title()),
        );
        self.lists.push(list);
        Ok(&self.lists[self.lists.len() - 1])
    }

    /// Append a catalog problem to a list. Adding an id already present changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list or the problem does not exist.
    pub fn add_problem(
        &mut self,
        catalog: &ProblemCatalog,
        list_id: ListId,
        problem_id: ProblemId,
    ) -> Result<&ProblemList, TrackerError> {
        let now = self.clock.now();
        let index = self.index_of(list_id)?;
        let problem = catalog
            .get(problem_id)
            .ok_or_else(|| TrackerError::problem_not_found(problem_id))?;

        let list = &mut self.lists[index];
        if list.insert(problem_id, now) {
            tracing::debug!(%list_id, %problem_id, "problem added to list");
            self.notifier.info(
                NotificationKind::ListProblemAdded,
                format!("{} added to {}.", problem.title(), list.title()),
            );
        }
        Ok(&self.lists[index])
    }

    /// Drop a problem id from a list. The id only has to be in the list, so
    /// references to problems already gone from the catalog can be removed too.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist or does not contain the id.
    pub fn remove_problem(
        &mut self,
        list_id: ListId,
        problem_id: ProblemId,
    ) -> Result<&ProblemList, TrackerError> {
        let now = self.clock.now();
        let index = self.index_of(list_id)?;
        let list = &mut self.lists[index];
        if !list.remove(problem_id, now) {
            return Err(TrackerError::NotFound(format!(
                "problem {problem_id} in list {list_id}"
            )));
        }
        tracing::debug!(%list_id, %problem_id, "problem removed from list");
        self.notifier.info(
            NotificationKind::ListProblemRemoved,
            format!("Problem {problem_id} removed from {}.", list.title()),
        );
        Ok(&self.lists[index])
    }

    /// Permanently delete a list. The catalog is unaffected.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist.
    pub fn delete(&mut self, list_id: ListId) -> Result<ProblemList, TrackerError> {
        let index = self.index_of(list_id)?;
        let list = self.lists.remove(index);
        tracing::info!(%list_id, "list deleted");
        self.notifier.info(
            NotificationKind::ListDeleted,
            format!("{} has been deleted.", list.title()),
        );
        Ok(list)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist.
    pub fn set_visibility(
        &mut self,
        list_id: ListId,
        is_public: bool,
    ) -> Result<&ProblemList, TrackerError> {
        let now = self.clock.now();
        let index = self.index_of(list_id)?;
        self.lists[index].set_visibility(is_public, now);
        tracing::debug!(%list_id, is_public, "list visibility changed");
        let message = if is_public {
            "List Set to Public"
        } else {
            "List Set to Private"
        };
        self.notifier
            .info(NotificationKind::ListVisibilityChanged, message);
        Ok(&self.lists[index])
    }

    /// Problems of a list whose title, any topic, or platform contains `text`
    /// (case-insensitive). Dangling ids are skipped. List order is kept.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist.
    pub fn search<'a>(
        &'a self,
        catalog: &'a ProblemCatalog,
        list_id: ListId,
        text: &str,
    ) -> Result<impl Iterator<Item = &'a Problem> + 'a, TrackerError> {
        let list = self.require(list_id)?;
        let needle = text.to_lowercase();
        Ok(resolve(catalog, list).filter(move |p| matches_broadly(p, &needle)))
    }

    /// Solved/total for a list. Ids missing from the catalog count toward neither.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist.
    pub fn progress(
        &self,
        catalog: &ProblemCatalog,
        list_id: ListId,
    ) -> Result<Progress, TrackerError> {
        let list = self.require(list_id)?;
        let (solved, total) = resolve(catalog, list).fold((0u32, 0u32), |(s, t), p| {
            (s + u32::from(p.is_solved()), t + 1)
        });
        Ok(Progress::from_counts(solved, total))
    }

    /// Ids a list references that the catalog no longer has.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist.
    pub fn dangling_ids(
        &self,
        catalog: &ProblemCatalog,
        list_id: ListId,
    ) -> Result<Vec<ProblemId>, TrackerError> {
        let list = self.require(list_id)?;
        Ok(list
            .problem_ids()
            .iter()
            .copied()
            .filter(|id| !catalog.contains(*id))
            .collect())
    }

    /// Remove dangling ids from a list, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist.
    pub fn prune_dangling(
        &mut self,
        catalog: &ProblemCatalog,
        list_id: ListId,
    ) -> Result<usize, TrackerError> {
        let now = self.clock.now();
        let index = self.index_of(list_id)?;
        let list = &mut self.lists[index];
        let removed = list.retain(|id| catalog.contains(id), now);
        if removed > 0 {
            tracing::info!(%list_id, removed, "pruned dangling problem ids");
            self.notifier.info(
                NotificationKind::ListPruned,
                format!("Removed {removed} missing problem(s) from {}.", list.title()),
            );
        }
        Ok(removed)
    }

    /// Shareable URL for a public list: `<base>/<list id>`.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist, or
    /// `TrackerError::InvalidInput` if it is private or `base` cannot carry a path.
    pub fn share_link(&self, list_id: ListId, base: &Url) -> Result<Url, TrackerError> {
        let list = self.require(list_id)?;
        if !list.is_public() {
            return Err(TrackerError::InvalidInput(format!(
                "list {list_id} is private"
            )));
        }
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| TrackerError::InvalidInput(format!("cannot share under {base}")))?
            .pop_if_empty()
            .push(&list_id.to_string());
        Ok(url)
    }

    #[must_use]
    pub fn get(&self, list_id: ListId) -> Option<&ProblemList> {
        self.lists.iter().find(|l| l.id() == list_id)
    }

    /// Every list in creation order.
    pub fn lists(&self) -> impl Iterator<Item = &ProblemList> + '_ {
        self.lists.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Lists whose title or description contains `text` (case-insensitive).
    pub fn find_lists<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a ProblemList> + 'a {
        let needle = text.to_lowercase();
        self.lists.iter().filter(move |l| {
            l.title().to_lowercase().contains(&needle)
                || l.description().to_lowercase().contains(&needle)
        })
    }

    pub fn lists_owned_by(&self, owner: UserId) -> impl Iterator<Item = &ProblemList> + '_ {
        self.lists.iter().filter(move |l| l.owner_id() == owner)
    }

    pub fn public_lists(&self) -> impl Iterator<Item = &ProblemList> + '_ {
        self.lists.iter().filter(|l| l.is_public())
    }

    fn index_of(&self, list_id: ListId) -> Result<usize, TrackerError> {
        self.lists
            .iter()
            .position(|l| l.id() == list_id)
            .ok_or_else(|| TrackerError::list_not_found(list_id))
    }

    fn require(&self, list_id: ListId) -> Result<&ProblemList, TrackerError> {
        self.get(list_id)
            .ok_or_else(|| TrackerError::list_not_found(list_id))
    }
}

fn resolve<'a>(
    catalog: &'a ProblemCatalog,
    list: &'a ProblemList,
) -> impl Iterator<Item = &'a Problem> + 'a {
    list.problem_ids().iter().filter_map(|id| catalog.get(*id))
}

fn matches_broadly(problem: &Problem, needle: &str) -> bool {
    problem.title().to_lowercase().contains(needle)
        || problem
            .topics()
            .iter()
            .any(|t| t.to_lowercase().contains(needle))
        || problem.platform().to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationLog;
    use chrono::{Duration, NaiveDate};
    use tracker_core::model::Difficulty;
    use tracker_core::time::{fixed_clock, fixed_now};

    fn catalog() -> ProblemCatalog {
        let solved = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
        let mut catalog = ProblemCatalog::new(Notifier::silent());
        catalog
            .extend([
                Problem::new(
                    ProblemId::new(1),
                    "Two Sum",
                    Difficulty::Easy,
                    ["Array", "Hash Table"],
                    "LeetCode",
                    "https://leetcode.com/problems/two-sum/",
                )
                .unwrap()
                .solved_on(solved),
                Problem::new(
                    ProblemId::new(2),
                    "Shortest Path",
                    Difficulty::Medium,
                    ["Graphs"],
                    "Codeforces",
                    "https://codeforces.com/problemset/problem/20/C",
                )
                .unwrap(),
                Problem::new(
                    ProblemId::new(3),
                    "Edit Distance",
                    Difficulty::Hard,
                    ["Dynamic Programming"],
                    "LeetCode",
                    "https://leetcode.com/problems/edit-distance/",
                )
                .unwrap()
                .solved_on(solved),
            ])
            .unwrap();
        catalog
    }

    fn draft(title: &str, owner: UserId) -> ListDraft {
        ListDraft {
            title: title.into(),
            description: "Warm-up set".into(),
            is_public: false,
            owner_id: owner,
        }
    }

    fn manager_with_list(catalog: &ProblemCatalog) -> (ProblemListManager, ListId) {
        let mut manager = ProblemListManager::new(fixed_clock(), Notifier::silent());
        let id = manager.create_list(draft("Mixed Bag", UserId::generate())).unwrap().id();
        for pid in 1..=3 {
            manager.add_problem(catalog, id, ProblemId::new(pid)).unwrap();
        }
        (manager, id)
    }

    #[test]
    fn create_list_assigns_sequential_ids() {
        let mut manager = ProblemListManager::new(fixed_clock(), Notifier::silent());
        let owner = UserId::generate();
        let first = manager.create_list(draft("A", owner)).unwrap().id();
        let second = manager.create_list(draft("B", owner)).unwrap().id();

        assert_eq!((first.value(), second.value()), (1, 2));
        let list = manager.get(first).unwrap();
        assert_eq!(list.created_at(), fixed_now());
        assert_eq!(list.updated_at(), fixed_now());
    }

    #[test]
    fn create_list_rejects_blank_title() {
        let mut manager = ProblemListManager::new(fixed_clock(), Notifier::silent());
        let err = manager.create_list(draft("  ", UserId::generate())).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
        assert!(manager.is_empty());
    }

    #[test]
    fn add_problem_is_idempotent() {
        let catalog = catalog();
        let (mut manager, id) = manager_with_list(&catalog);
        let once = manager.get(id).unwrap().clone();

        manager.set_clock(Clock::fixed(fixed_now() + Duration::hours(1)));
        manager.add_problem(&catalog, id, ProblemId::new(2)).unwrap();

        assert_eq!(manager.get(id).unwrap(), &once);
    }

    #[test]
    fn add_problem_requires_both_ids() {
        let catalog = catalog();
        let (mut manager, id) = manager_with_list(&catalog);

        let missing_problem = manager.add_problem(&catalog, id, ProblemId::new(42));
        assert_eq!(
            missing_problem.unwrap_err(),
            TrackerError::NotFound("problem 42".into())
        );
        let missing_list = manager.add_problem(&catalog, ListId::new(9), ProblemId::new(1));
        assert_eq!(
            missing_list.unwrap_err(),
            TrackerError::NotFound("list 9".into())
        );
    }

    #[test]
    fn progress_skips_dangling_references() {
        let mut catalog = catalog();
        let (manager, id) = manager_with_list(&catalog);
        catalog.remove(ProblemId::new(3)).unwrap();

        let progress = manager.progress(&catalog, id).unwrap();
        assert_eq!((progress.solved(), progress.total()), (1, 2));
        assert_eq!(progress.percentage(), 50);
        assert_eq!(manager.dangling_ids(&catalog, id).unwrap(), [ProblemId::new(3)]);
    }

    #[test]
    fn empty_list_has_zero_progress() {
        let catalog = catalog();
        let mut manager = ProblemListManager::new(fixed_clock(), Notifier::silent());
        let id = manager.create_list(draft("Empty", UserId::generate())).unwrap().id();
        assert_eq!(manager.progress(&catalog, id).unwrap(), Progress::from_counts(0, 0));
    }

    #[test]
    fn search_covers_title_topics_and_platform() {
        let catalog = catalog();
        let (manager, id) = manager_with_list(&catalog);
        let hits = |text: &str| -> Vec<u64> {
            manager
                .search(&catalog, id, text)
                .unwrap()
                .map(|p| p.id().value())
                .collect()
        };

        assert_eq!(hits("sum"), [1]);
        assert_eq!(hits("graph"), [2]);
        assert_eq!(hits("leetcode"), [1, 3]);
        assert_eq!(hits(""), [1, 2, 3]);
    }

    #[test]
    fn remove_problem_handles_dangling_ids() {
        let mut catalog = catalog();
        let (mut manager, id) = manager_with_list(&catalog);
        catalog.remove(ProblemId::new(2)).unwrap();

        manager.remove_problem(id, ProblemId::new(2)).unwrap();
        assert_eq!(
            manager.get(id).unwrap().problem_ids(),
            [ProblemId::new(1), ProblemId::new(3)]
        );
        assert!(matches!(
            manager.remove_problem(id, ProblemId::new(2)),
            Err(TrackerError::NotFound(_))
        ));
    }

    #[test]
    fn prune_dangling_reports_count() {
        let mut catalog = catalog();
        let (mut manager, id) = manager_with_list(&catalog);
        catalog.remove(ProblemId::new(1)).unwrap();
        catalog.remove(ProblemId::new(3)).unwrap();

        assert_eq!(manager.prune_dangling(&catalog, id).unwrap(), 2);
        assert_eq!(manager.prune_dangling(&catalog, id).unwrap(), 0);
        assert!(manager.dangling_ids(&catalog, id).unwrap().is_empty());
    }

    #[test]
    fn visibility_updates_timestamp_and_views() {
        let catalog = catalog();
        let (mut manager, id) = manager_with_list(&catalog);
        let later = fixed_now() + Duration::minutes(5);
        manager.set_clock(Clock::fixed(later));

        let list = manager.set_visibility(id, true).unwrap();
        assert!(list.is_public());
        assert_eq!(list.updated_at(), later);
        assert_eq!(manager.public_lists().count(), 1);
    }

    #[test]
    fn share_link_requires_public_list() {
        let catalog = catalog();
        let (mut manager, id) = manager_with_list(&catalog);
        let base = Url::parse("https://tracker.example.com/lists/").unwrap();

        assert!(matches!(
            manager.share_link(id, &base),
            Err(TrackerError::InvalidInput(_))
        ));
        manager.set_visibility(id, true).unwrap();
        assert_eq!(
            manager.share_link(id, &base).unwrap().as_str(),
            "https://tracker.example.com/lists/1"
        );
    }

    #[test]
    fn delete_leaves_catalog_alone() {
        let catalog = catalog();
        let (mut manager, id) = manager_with_list(&catalog);
        manager.delete(id).unwrap();

        assert!(manager.get(id).is_none());
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            manager.delete(id).unwrap_err(),
            TrackerError::list_not_found(id)
        );
    }

    #[test]
    fn find_and_owner_views() {
        let mut manager = ProblemListManager::new(fixed_clock(), Notifier::silent());
        let me = UserId::generate();
        manager.create_list(draft("Graph Drills", me)).unwrap();
        manager
            .create_list(ListDraft {
                description: "graph theory classics".into(),
                ..draft("Classics", UserId::generate())
            })
            .unwrap();

        assert_eq!(manager.find_lists("GRAPH").count(), 2);
        let mine: Vec<_> = manager.lists_owned_by(me).map(ProblemList::title).collect();
        assert_eq!(mine, ["Graph Drills"]);
    }

    #[test]
    fn mutations_emit_notifications() {
        let catalog = catalog();
        let log = NotificationLog::new();
        let mut manager = ProblemListManager::new(fixed_clock(), Notifier::logging_to(&log));
        let id = manager.create_list(draft("DP", UserId::generate())).unwrap().id();
        manager.add_problem(&catalog, id, ProblemId::new(3)).unwrap();
        manager.add_problem(&catalog, id, ProblemId::new(3)).unwrap();
        manager.set_visibility(id, true).unwrap();
        manager.delete(id).unwrap();

        assert_eq!(
            log.kinds(),
            [
                NotificationKind::ListCreated,
                NotificationKind::ListProblemAdded,
                NotificationKind::ListVisibilityChanged,
                NotificationKind::ListDeleted,
            ]
        );
        assert_eq!(log.entries()[2].message, "List Set to Public");
    }
}
