use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use tracker_core::model::{User, UserError, UserId, derive_username};

/// Fields collected by the sign-up form.
#[derive(Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Preferred handle; derived from `name` when absent or blank.
    pub username: Option<String>,
}

impl SignUpRequest {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            username: None,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// The requested username, or one derived from the display name.
    #[must_use]
    pub fn resolved_username(&self) -> String {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map_or_else(|| derive_username(&self.name), ToOwned::to_owned)
    }
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("credentials rejected")]
    Rejected,
    #[error(transparent)]
    InvalidUser(#[from] UserError),
}

/// The collaborator that actually checks credentials and issues identities.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` if the pair is not accepted.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError` if the account cannot be created.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<User, AuthError>;
}

/// Placeholder authenticator. It performs no credential verification at all.
#[derive(Debug, Clone, Default)]
pub struct MockAuthenticator {
    avatar_base_url: Option<Url>,
    reject_all: bool,
}

impl MockAuthenticator {
    #[must_use]
    pub fn new(avatar_base_url: Option<Url>) -> Self {
        Self {
            avatar_base_url,
            reject_all: false,
        }
    }

    /// An authenticator that refuses every sign-in and sign-up.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            avatar_base_url: None,
            reject_all: true,
        }
    }

    fn avatar_for(&self, seed: &str) -> Option<Url> {
        let mut url = self.avatar_base_url.clone()?;
        url.query_pairs_mut().append_pair("seed", seed);
        Some(url)
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<User, AuthError> {
        if self.reject_all {
            return Err(AuthError::Rejected);
        }
        let name = email
            .split('@')
            .next()
            .filter(|local| !local.trim().is_empty())
            .unwrap_or(email);
        let user = User::new(
            UserId::generate(),
            name,
            email,
            derive_username(name),
            self.avatar_for(name),
        )?;
        Ok(user)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<User, AuthError> {
        if self.reject_all {
            return Err(AuthError::Rejected);
        }
        let user = User::new(
            UserId::generate(),
            request.name.as_str(),
            request.email.as_str(),
            request.resolved_username(),
            self.avatar_for(request.name.trim()),
        )?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Option<Url> {
        Url::parse("https://api.dicebear.com/7.x/avataaars/svg").ok()
    }

    #[tokio::test]
    async fn sign_in_derives_identity_from_email() {
        let auth = MockAuthenticator::new(base());
        let user = auth.sign_in("Jane.Doe@example.com", "pw").await.unwrap();

        assert_eq!(user.name(), "Jane.Doe");
        assert_eq!(user.username(), "jane.doe");
        assert_eq!(user.email(), "Jane.Doe@example.com");
        assert_eq!(
            user.avatar().unwrap().as_str(),
            "https://api.dicebear.com/7.x/avataaars/svg?seed=Jane.Doe"
        );
    }

    #[tokio::test]
    async fn sign_up_derives_username_when_missing() {
        let auth = MockAuthenticator::new(None);
        let request = SignUpRequest::new("Linus Torvalds", "linus@example.com", "pw");
        let user = auth.sign_up(&request).await.unwrap();

        assert_eq!(user.username(), "linustorvalds");
        assert!(user.avatar().is_none());
    }

    #[tokio::test]
    async fn sign_up_keeps_supplied_username() {
        let auth = MockAuthenticator::new(None);
        let request =
            SignUpRequest::new("Linus Torvalds", "linus@example.com", "pw").with_username("torvalds");
        let user = auth.sign_up(&request).await.unwrap();
        assert_eq!(user.username(), "torvalds");
    }

    #[tokio::test]
    async fn rejecting_authenticator_refuses() {
        let auth = MockAuthenticator::rejecting();
        assert_eq!(
            auth.sign_in("a@b.c", "pw").await.unwrap_err(),
            AuthError::Rejected
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let request = SignUpRequest::new("A", "a@b.c", "hunter2");
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
