//! Serialized shape of the signed-in user, as kept in the session store.

use serde::{Deserialize, Serialize};
use tracker_core::model::{User, UserError, UserId};
use uuid::Uuid;

use crate::repository::StorageError;

/// Persisted shape for a user.
///
/// This mirrors the domain `User` so the snapshot can be (de)serialized
/// without leaking storage concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserRecord {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().as_uuid(),
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            username: user.username().to_owned(),
            avatar: user.avatar().map(ToString::to_string),
        }
    }

    /// Convert the record back into a domain `User`.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if any field fails domain validation.
    pub fn into_user(self) -> Result<User, UserError> {
        User::from_persisted(
            UserId::from_uuid(self.id),
            self.name,
            self.email,
            self.username,
            self.avatar,
        )
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if `raw` is not a well-formed record.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn user() -> User {
        User::new(
            UserId::generate(),
            "Grace Hopper",
            "grace@example.com",
            "gracehopper",
            Some(Url::parse("https://api.dicebear.com/7.x/avataaars/svg?seed=Grace").unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn json_round_trip_preserves_user() {
        let original = user();
        let raw = UserRecord::from_user(&original).to_json().unwrap();
        let restored = UserRecord::from_json(&raw).unwrap().into_user().unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn avatar_is_optional_on_the_wire() {
        let raw = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","name":"A","email":"a@b.c","username":"a"}"#;
        let record = UserRecord::from_json(raw).unwrap();
        assert_eq!(record.avatar, None);
        assert!(!record.to_json().unwrap().contains("avatar"));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = UserRecord::from_json("{\"id\":1").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn blank_fields_fail_domain_validation() {
        let record = UserRecord {
            id: Uuid::nil(),
            name: String::new(),
            email: "a@b.c".into(),
            username: "a".into(),
            avatar: None,
        };
        assert_eq!(record.into_user().unwrap_err(), UserError::EmptyName);
    }
}
