use thiserror::Error;
use url::Url;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("invalid avatar URL: {0}")]
    InvalidAvatar(String),
}

//
// ─── USERNAME ──────────────────────────────────────────────────────────────────
//

/// Derives a handle from a display name: lower-cased, all whitespace removed.
///
/// `"Ada  Lovelace"` becomes `"adalovelace"`.
#[must_use]
pub fn derive_username(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn required(value: impl Into<String>, err: UserError) -> Result<String, UserError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_owned())
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// The signed-in person. `id` never changes after issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    username: String,
    avatar: Option<Url>,
}

impl User {
    /// Creates a validated user.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if name, email or username is blank.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        avatar: Option<Url>,
    ) -> Result<Self, UserError> {
        Ok(Self {
            id,
            name: required(name, UserError::EmptyName)?,
            email: required(email, UserError::EmptyEmail)?,
            username: required(username, UserError::EmptyUsername)?,
            avatar,
        })
    }

    /// Rehydrate a user from persisted strings.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if any field fails validation, including an unparsable avatar.
    pub fn from_persisted(
        id: UserId,
        name: String,
        email: String,
        username: String,
        avatar: Option<String>,
    ) -> Result<Self, UserError> {
        let avatar = avatar
            .map(|raw| Url::parse(&raw).map_err(|_| UserError::InvalidAvatar(raw)))
            .transpose()?;
        Self::new(id, name, email, username, avatar)
    }

    /// Merge a partial profile update. Validation happens before any field changes,
    /// so a rejected update leaves the user untouched.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if a supplied field is blank.
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<(), UserError> {
        let name = update
            .name
            .map(|n| required(n, UserError::EmptyName))
            .transpose()?;
        let email = update
            .email
            .map(|e| required(e, UserError::EmptyEmail))
            .transpose()?;
        let username = update
            .username
            .map(|u| required(u, UserError::EmptyUsername))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(username) = username {
            self.username = username;
        }
        Ok(())
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&Url> {
        self.avatar.as_ref()
    }
}

/// Fields a profile edit may change. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
