use crate::domain::repository::Entity;
use std::fmt;

/// Opaque, store-assigned user identifier.
///
/// Each backend has its own textual format (UUID for Postgres, ObjectId hex for
/// MongoDB). Parsing into the backend's native type happens inside the
/// repository, which rejects malformed values with `AppError::InvalidIdentifier`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted user.
///
/// The password is stored as provided, without hashing.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload for creating a user. The identifier is always assigned by the store.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Partial update of a user.
///
/// `None` and `Some("")` are both treated as "leave unchanged", so a field can
/// never be cleared to the empty string through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    /// Returns true when applying this patch would not change any field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.username, &self.email].iter().all(|field| field.as_deref().is_none_or(str::is_empty))
    }
}

fn overlay(target: &mut String, source: Option<String>) {
    if let Some(value) = source.filter(|v| !v.is_empty()) {
        *target = value;
    }
}

impl Entity for User {
    type Id = UserId;
    type Draft = NewUser;
    type Patch = UserPatch;

    fn merge(&mut self, patch: UserPatch) {
        overlay(&mut self.username, patch.username);
        overlay(&mut self.email, patch.email);
    }
}
