use std::sync::Arc;

use storage::repository::Storage;
use tracker_core::model::{ListDraft, ListId, Problem, ProblemId, ProblemList, Progress};

use crate::Clock;
use crate::catalog::ProblemCatalog;
use crate::config::TrackerConfig;
use crate::error::{BootstrapError, TrackerError};
use crate::list_manager::ProblemListManager;
use crate::notifications::Notifier;
use crate::session_store::SessionStore;
use crate::stats::StatsAggregator;

/// Assembles the session store, catalog and list manager behind one handle.
#[derive(Debug)]
pub struct Tracker {
    clock: Clock,
    notifier: Notifier,
    session: Arc<SessionStore>,
    catalog: ProblemCatalog,
    lists: ProblemListManager,
}

impl Tracker {
    /// Build a tracker whose session snapshot lives in `storage`.
    #[must_use]
    pub fn with_storage(
        storage: &Storage,
        config: &TrackerConfig,
        clock: Clock,
        notifier: Notifier,
    ) -> Self {
        let session = Arc::new(SessionStore::with_mock_auth(
            config,
            Arc::clone(&storage.kv),
            notifier.clone(),
        ));
        Self {
            clock,
            session,
            catalog: ProblemCatalog::new(notifier.clone()),
            lists: ProblemListManager::new(clock, notifier.clone()),
            notifier,
        }
    }

    /// Build a tracker that keeps the session snapshot in memory.
    #[must_use]
    pub fn in_memory(config: &TrackerConfig, clock: Clock, notifier: Notifier) -> Self {
        Self::with_storage(&Storage::in_memory(), config, clock, notifier)
    }

    /// Build a tracker backed by `SQLite` storage. Runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: &TrackerConfig,
        clock: Clock,
        notifier: Notifier,
    ) -> Result<Self, BootstrapError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, config, clock, notifier))
    }

    /// Pick the backend from `config.db_url` and restore any persisted session.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError` if the configured database cannot be opened.
    pub async fn from_config(
        config: &TrackerConfig,
        clock: Clock,
        notifier: Notifier,
    ) -> Result<Self, BootstrapError> {
        let tracker = match &config.db_url {
            Some(db_url) => Self::new_sqlite(db_url, config, clock, notifier).await?,
            None => Self::in_memory(config, clock, notifier),
        };
        let restored = tracker.session.restore_session().await;
        let backend = if config.db_url.is_some() { "sqlite" } else { "memory" };
        tracing::info!(backend, restored = restored.is_some(), "tracker ready");
        Ok(tracker)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
        self.lists.set_clock(clock);
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn catalog(&self) -> &ProblemCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ProblemCatalog {
        &mut self.catalog
    }

    #[must_use]
    pub fn lists(&self) -> &ProblemListManager {
        &self.lists
    }

    pub fn lists_mut(&mut self) -> &mut ProblemListManager {
        &mut self.lists
    }

    #[must_use]
    pub fn stats(&self) -> StatsAggregator<'_> {
        StatsAggregator::new(&self.session, &self.catalog, &self.lists, self.clock)
    }

    /// Surface a failed operation through the notification sink.
    pub fn report(&self, err: &TrackerError) {
        tracing::debug!(error = %err, "reporting failure");
        self.notifier.emit(err.notification());
    }

    /// Create a list owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotAuthenticated` when signed out, or
    /// `TrackerError::InvalidInput` for a blank title.
    pub fn create_list(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        is_public: bool,
    ) -> Result<&ProblemList, TrackerError> {
        let owner = self
            .session
            .current_user()
            .ok_or(TrackerError::NotAuthenticated)?;
        self.lists.create_list(ListDraft {
            title: title.into(),
            description: description.into(),
            is_public,
            owner_id: owner.id(),
        })
    }

    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the problem is not in the catalog.
    pub fn mark_solved_today(&mut self, problem_id: ProblemId) -> Result<&Problem, TrackerError> {
        let today = self.clock.today();
        self.catalog.mark_solved(problem_id, today)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list or the problem does not exist.
    pub fn add_to_list(
        &mut self,
        list_id: ListId,
        problem_id: ProblemId,
    ) -> Result<&ProblemList, TrackerError> {
        self.lists.add_problem(&self.catalog, list_id, problem_id)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not contain the id.
    pub fn remove_from_list(
        &mut self,
        list_id: ListId,
        problem_id: ProblemId,
    ) -> Result<&ProblemList, TrackerError> {
        self.lists.remove_problem(list_id, problem_id)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist.
    pub fn search_list(&self, list_id: ListId, text: &str) -> Result<Vec<&Problem>, TrackerError> {
        Ok(self.lists.search(&self.catalog, list_id, text)?.collect())
    }

    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` if the list does not exist.
    pub fn list_progress(&self, list_id: ListId) -> Result<Progress, TrackerError> {
        self.lists.progress(&self.catalog, list_id)
    }
}
