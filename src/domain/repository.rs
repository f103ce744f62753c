use crate::domain::page::Page;
use crate::error::Result;
use async_trait::async_trait;

/// A record type that can be persisted through a [`Repository`].
pub trait Entity: Send + Sync + 'static {
    /// Store-assigned identifier returned by `create`.
    type Id: Send + 'static;
    /// Payload accepted by `create`.
    type Draft: Send + 'static;
    /// Partial update accepted by `update`.
    type Patch: Send + 'static;

    /// Overlays the fields set in `patch` onto `self`, leaving unset fields untouched.
    fn merge(&mut self, patch: Self::Patch);
}

/// Storage-agnostic CRUD operations over one entity type.
///
/// Identifiers are accepted as strings so callers never depend on a backend's
/// native id type. Every implementation rejects ids it cannot parse with
/// `AppError::InvalidIdentifier` before touching the store.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync + std::fmt::Debug {
    /// Persists a new record and returns the id the store assigned to it.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` on a uniqueness violation, or another
    /// persistence error if the write fails.
    async fn create(&self, draft: E::Draft) -> Result<E::Id>;

    /// Looks up a record. A well-formed id with no matching record yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns `AppError::InvalidIdentifier` for a malformed id.
    async fn get_by_id(&self, id: &str) -> Result<Option<E>>;

    /// Returns one page of records ordered by id.
    ///
    /// # Errors
    /// Returns a persistence error if the store query fails.
    async fn get_all(&self, page: Page) -> Result<Vec<E>>;

    /// Fetches the record, merges `patch` into it and writes the result back.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if no record exists for `id`, or
    /// `AppError::InvalidIdentifier` for a malformed id.
    async fn update(&self, id: &str, patch: E::Patch) -> Result<()>;

    /// # Errors
    /// Returns `AppError::NotFound` if nothing was deleted, or
    /// `AppError::InvalidIdentifier` for a malformed id.
    async fn delete(&self, id: &str) -> Result<()>;
}
