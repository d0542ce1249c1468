use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use storage::repository::KeyValueStore;
use storage::snapshot::UserRecord;
use tokio::sync::OwnedMutexGuard;
use tracker_core::model::{NotificationKind, ProfileUpdate, User};

use crate::authenticator::{AuthError, Authenticator, MockAuthenticator, SignUpRequest};
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::notifications::Notifier;

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    Authenticating,
    SignedIn(User),
}

struct Inner {
    state: SessionState,
    // Bumped by every attempt and by sign-out/restore, so a stale attempt
    // can tell it no longer owns the `Authenticating` state.
    epoch: u64,
}

/// Owns the identity of the signed-in user and its persisted snapshot.
///
/// Sign-in and sign-up suspend for a simulated network delay. While one of
/// them is in flight the state is `Authenticating` and any second attempt is
/// rejected with `AlreadyAuthenticating`.
pub struct SessionStore {
    authenticator: Arc<dyn Authenticator>,
    snapshots: Arc<dyn KeyValueStore>,
    snapshot_key: String,
    auth_delay: Duration,
    notifier: Notifier,
    inner: Mutex<Inner>,
    // Held across every snapshot read/write together with the state change it belongs to.
    snapshot_lock: Arc<tokio::sync::Mutex<()>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(
        config: &TrackerConfig,
        authenticator: Arc<dyn Authenticator>,
        snapshots: Arc<dyn KeyValueStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            authenticator,
            snapshots,
            snapshot_key: config.snapshot_key.clone(),
            auth_delay: config.auth_delay,
            notifier,
            inner: Mutex::new(Inner {
                state: SessionState::SignedOut,
                epoch: 0,
            }),
            snapshot_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// A store backed by the placeholder [`MockAuthenticator`].
    #[must_use]
    pub fn with_mock_auth(
        config: &TrackerConfig,
        snapshots: Arc<dyn KeyValueStore>,
        notifier: Notifier,
    ) -> Self {
        let auth = Arc::new(MockAuthenticator::new(config.avatar_base_url.clone()));
        Self::new(config, auth, snapshots, notifier)
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock_inner().state.clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        match &self.lock_inner().state {
            SessionState::SignedIn(user) => Some(user.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.lock_inner().state, SessionState::SignedIn(_))
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.lock_inner().state, SessionState::Authenticating)
    }

    /// Sign in with an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` for a blank email,
    /// `TrackerError::AlreadyAuthenticating` if another attempt is in flight,
    /// `TrackerError::InvalidCredentials` if the authenticator refuses, and
    /// `TrackerError::NotAuthenticated` if a sign-out superseded this attempt.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, TrackerError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(self.rejected(TrackerError::InvalidInput(
                "email cannot be empty".into(),
            )));
        }
        let attempt = self.begin_attempt().map_err(|err| self.rejected(err))?;
        tokio::time::sleep(self.auth_delay).await;
        let outcome = self.authenticator.sign_in(email, password).await;
        self.finish_attempt(attempt, outcome, NotificationKind::SignedIn)
            .await
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if name or email is blank, otherwise
    /// the same failures as [`SessionStore::sign_in`].
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<User, TrackerError> {
        if request.name.trim().is_empty() {
            return Err(self.rejected(TrackerError::InvalidInput(
                "name cannot be empty".into(),
            )));
        }
        if request.email.trim().is_empty() {
            return Err(self.rejected(TrackerError::InvalidInput(
                "email cannot be empty".into(),
            )));
        }
        let attempt = self.begin_attempt().map_err(|err| self.rejected(err))?;
        tokio::time::sleep(self.auth_delay).await;
        let outcome = self.authenticator.sign_up(&request).await;
        self.finish_attempt(attempt, outcome, NotificationKind::SignedUp)
            .await
    }

    fn rejected(&self, err: TrackerError) -> TrackerError {
        tracing::info!(error = %err, "authentication rejected");
        self.notifier
            .destructive(NotificationKind::SignInFailed, err.to_string());
        err
    }

    fn begin_attempt(&self) -> Result<AuthAttempt<'_>, TrackerError> {
        let mut inner = self.lock_inner();
        if matches!(inner.state, SessionState::Authenticating) {
            return Err(TrackerError::AlreadyAuthenticating);
        }
        inner.epoch += 1;
        let previous = std::mem::replace(&mut inner.state, SessionState::Authenticating);
        tracing::debug!(epoch = inner.epoch, "authenticating");
        Ok(AuthAttempt {
            store: self,
            epoch: inner.epoch,
            previous: Some(previous),
        })
    }

    async fn finish_attempt(
        &self,
        attempt: AuthAttempt<'_>,
        outcome: Result<User, AuthError>,
        kind: NotificationKind,
    ) -> Result<User, TrackerError> {
        let snapshot = Arc::clone(&self.snapshot_lock).lock_owned().await;

        if !attempt.is_current() {
            attempt.abandon();
            tracing::debug!("authentication superseded by sign-out");
            return Err(TrackerError::NotAuthenticated);
        }

        let user = match outcome {
            Ok(user) => user,
            Err(err) => {
                drop(attempt);
                return Err(self.rejected(TrackerError::from(err)));
            }
        };

        attempt.complete(SessionState::SignedIn(user.clone()));
        self.write_snapshot(snapshot, &user).await;
        tracing::info!(user_id = %user.id(), "signed in");
        self.notifier
            .info(kind, format!("Welcome, {}.", user.name()));
        Ok(user)
    }

    /// Merge profile fields into the signed-in user and re-persist the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotAuthenticated` unless signed in, or
    /// `TrackerError::InvalidInput` if a supplied field is blank.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, TrackerError> {
        let snapshot = Arc::clone(&self.snapshot_lock).lock_owned().await;

        let updated = {
            let mut inner = self.lock_inner();
            let SessionState::SignedIn(user) = &inner.state else {
                return Err(TrackerError::NotAuthenticated);
            };
            let mut user = user.clone();
            user.apply(update)?;
            inner.state = SessionState::SignedIn(user.clone());
            user
        };

        self.write_snapshot(snapshot, &updated).await;
        tracing::info!(user_id = %updated.id(), "profile updated");
        self.notifier.info(
            NotificationKind::ProfileUpdated,
            "Your profile has been saved.",
        );
        Ok(updated)
    }

    /// Sign out from any state and clear the snapshot. Idempotent.
    ///
    /// An attempt still in flight is superseded and will not sign in.
    pub async fn sign_out(&self) {
        let snapshot = Arc::clone(&self.snapshot_lock).lock_owned().await;

        let was_signed_in = {
            let mut inner = self.lock_inner();
            inner.epoch += 1;
            let previous = std::mem::replace(&mut inner.state, SessionState::SignedOut);
            !matches!(previous, SessionState::SignedOut)
        };

        self.commit_snapshot(snapshot, None).await;
        if was_signed_in {
            tracing::info!("signed out");
            self.notifier
                .info(NotificationKind::SignedOut, "You have been signed out.");
        }
    }

    /// Load the persisted snapshot, typically once at start-up.
    ///
    /// A missing, unreadable or malformed snapshot leaves the store signed out;
    /// a malformed one is also cleared. Never fails.
    pub async fn restore_session(&self) -> Option<User> {
        let _snapshot = self.snapshot_lock.lock().await;

        let restored = match self.snapshots.get(&self.snapshot_key).await {
            Ok(Some(raw)) => match parse_snapshot(&raw) {
                Ok(user) => Some(user),
                Err(reason) => {
                    tracing::warn!(%reason, "discarding malformed session snapshot");
                    self.clear_snapshot().await;
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "could not read session snapshot");
                None
            }
        };

        let mut inner = self.lock_inner();
        inner.epoch += 1;
        inner.state = match &restored {
            Some(user) => SessionState::SignedIn(user.clone()),
            None => SessionState::SignedOut,
        };
        tracing::debug!(restored = restored.is_some(), "session restored");
        restored
    }

    async fn write_snapshot(&self, snapshot: OwnedMutexGuard<()>, user: &User) {
        match UserRecord::from_user(user).to_json() {
            Ok(raw) => self.commit_snapshot(snapshot, Some(raw)).await,
            Err(err) => tracing::warn!(error = %err, "failed to encode session snapshot"),
        }
    }

    /// Store (`Some`) or delete (`None`) the snapshot on a task of its own.
    ///
    /// The task owns the snapshot lock until the backend call returns, so the
    /// write lands even when the caller's future is dropped, and no other
    /// session operation runs before it does.
    async fn commit_snapshot(&self, snapshot: OwnedMutexGuard<()>, raw: Option<String>) {
        let snapshots = Arc::clone(&self.snapshots);
        let key = self.snapshot_key.clone();
        let task = tokio::spawn(async move {
            let _snapshot = snapshot;
            match raw {
                Some(raw) => snapshots.put(&key, &raw).await,
                None => snapshots.remove(&key).await,
            }
        });
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "failed to write session snapshot"),
            Err(err) => tracing::warn!(error = %err, "session snapshot task did not finish"),
        }
    }

    async fn clear_snapshot(&self) {
        if let Err(err) = self.snapshots.remove(&self.snapshot_key).await {
            tracing::warn!(error = %err, "failed to clear session snapshot");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .field("snapshot_key", &self.snapshot_key)
            .field("auth_delay", &self.auth_delay)
            .finish_non_exhaustive()
    }
}

fn parse_snapshot(raw: &str) -> Result<User, String> {
    let record = UserRecord::from_json(raw).map_err(|e| e.to_string())?;
    record.into_user().map_err(|e| e.to_string())
}

/// Ownership of the `Authenticating` state for one sign-in/sign-up.
///
/// Dropped without completing (failure, or the caller discarding the future),
/// it puts back the state that preceded the attempt.
struct AuthAttempt<'a> {
    store: &'a SessionStore,
    epoch: u64,
    previous: Option<SessionState>,
}

impl AuthAttempt<'_> {
    fn is_current(&self) -> bool {
        self.store.lock_inner().epoch == self.epoch
    }

    fn complete(mut self, next: SessionState) {
        self.previous = None;
        let mut inner = self.store.lock_inner();
        if inner.epoch == self.epoch {
            inner.state = next;
        }
    }

    fn abandon(mut self) {
        self.previous = None;
    }
}

impl Drop for AuthAttempt<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let mut inner = self.store.lock_inner();
            if inner.epoch == self.epoch {
                inner.state = previous;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationLog;
    use storage::repository::InMemoryRepository;

    fn store_with(kv: &InMemoryRepository, log: &NotificationLog) -> SessionStore {
        let config = TrackerConfig::default().with_auth_delay(Duration::from_millis(50));
        SessionStore::with_mock_auth(&config, Arc::new(kv.clone()), Notifier::logging_to(log))
    }

    #[tokio::test(start_paused = true)]
    async fn sign_in_persists_snapshot_and_notifies() {
        let kv = InMemoryRepository::new();
        let log = NotificationLog::new();
        let store = store_with(&kv, &log);

        let user = store.sign_in("ada@example.com", "pw").await.unwrap();

        assert_eq!(store.state(), SessionState::SignedIn(user.clone()));
        let raw = kv.get("user").await.unwrap().expect("snapshot written");
        assert_eq!(UserRecord::from_json(&raw).unwrap(), UserRecord::from_user(&user));
        assert_eq!(log.kinds(), [NotificationKind::SignedIn]);
    }

    #[tokio::test(start_paused = true)]
    async fn state_is_authenticating_during_delay() {
        let kv = InMemoryRepository::new();
        let store = store_with(&kv, &NotificationLog::new());

        let (result, observed) = tokio::join!(store.sign_in("ada@example.com", "pw"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            (store.state(), store.is_loading())
        });

        assert!(result.is_ok());
        assert_eq!(observed, (SessionState::Authenticating, true));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_email_is_rejected_before_authenticating() {
        let store = store_with(&InMemoryRepository::new(), &NotificationLog::new());
        let err = store.sign_in("  ", "pw").await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
        assert_eq!(store.state(), SessionState::SignedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn sign_up_requires_name_and_email() {
        let store = store_with(&InMemoryRepository::new(), &NotificationLog::new());
        let err = store
            .sign_up(SignUpRequest::new("", "a@b.c", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));

        let err = store
            .sign_up(SignUpRequest::new("Ada", " ", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn update_profile_keeps_id_and_repersists() {
        let kv = InMemoryRepository::new();
        let store = store_with(&kv, &NotificationLog::new());
        let user = store
            .sign_up(SignUpRequest::new("Ada Lovelace", "ada@example.com", "pw"))
            .await
            .unwrap();

        let updated = store
            .update_profile(ProfileUpdate::new().name("Ada King").username("countess"))
            .await
            .unwrap();

        assert_eq!(updated.id(), user.id());
        assert_eq!(updated.name(), "Ada King");
        assert_eq!(updated.email(), "ada@example.com");
        let raw = kv.get("user").await.unwrap().unwrap();
        assert_eq!(UserRecord::from_json(&raw).unwrap().username, "countess");
    }

    #[tokio::test]
    async fn update_profile_requires_sign_in() {
        let store = store_with(&InMemoryRepository::new(), &NotificationLog::new());
        let err = store
            .update_profile(ProfileUpdate::new().name("x"))
            .await
            .unwrap_err();
        assert_eq!(err, TrackerError::NotAuthenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_is_idempotent_and_clears_snapshot() {
        let kv = InMemoryRepository::new();
        let log = NotificationLog::new();
        let store = store_with(&kv, &log);
        store.sign_in("ada@example.com", "pw").await.unwrap();

        store.sign_out().await;
        store.sign_out().await;

        assert_eq!(store.state(), SessionState::SignedOut);
        assert_eq!(kv.get("user").await.unwrap(), None);
        assert_eq!(
            log.kinds(),
            [NotificationKind::SignedIn, NotificationKind::SignedOut]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_sign_in_restores_previous_state() {
        let kv = InMemoryRepository::new();
        let log = NotificationLog::new();
        let config = TrackerConfig::default();
        let store = SessionStore::new(
            &config,
            Arc::new(MockAuthenticator::rejecting()),
            Arc::new(kv.clone()),
            Notifier::logging_to(&log),
        );

        let err = store.sign_in("ada@example.com", "wrong").await.unwrap_err();

        assert_eq!(err, TrackerError::InvalidCredentials);
        assert_eq!(store.state(), SessionState::SignedOut);
        assert_eq!(kv.get("user").await.unwrap(), None);
        assert_eq!(log.kinds(), [NotificationKind::SignInFailed]);
    }

    #[tokio::test(start_paused = true)]
    async fn discarded_attempt_does_not_stay_authenticating() {
        let store = store_with(&InMemoryRepository::new(), &NotificationLog::new());

        let timed_out =
            tokio::time::timeout(Duration::from_millis(5), store.sign_in("ada@example.com", "pw"))
                .await;

        assert!(timed_out.is_err());
        assert_eq!(store.state(), SessionState::SignedOut);
        assert!(store.sign_in("ada@example.com", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn restore_without_snapshot_is_signed_out() {
        let store = store_with(&InMemoryRepository::new(), &NotificationLog::new());
        assert_eq!(store.restore_session().await, None);
        assert!(!store.is_authenticated());
    }
}
