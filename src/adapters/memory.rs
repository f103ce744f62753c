use crate::domain::{Entity, NewUser, Page, Repository, User, UserId, UserPatch};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local user store.
///
/// Ids are UUIDv7, so iteration order of the map is creation order. Username
/// and email uniqueness is enforced the same way the database constraints do.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidIdentifier(id.to_string()))
}

fn check_unique<'a>(
    mut others: impl Iterator<Item = &'a User>,
    username: &str,
    email: &str,
) -> Result<()> {
    if others.any(|u| u.username == username || u.email == email) {
        return Err(AppError::Conflict("username or email already exists".into()));
    }
    Ok(())
}

#[async_trait]
impl Repository<User> for InMemoryUserRepository {
    async fn create(&self, draft: NewUser) -> Result<UserId> {
        let mut users = self.users.write().await;
        check_unique(users.values(), &draft.username, &draft.email)?;

        let uuid = Uuid::now_v7();
        let id = UserId::from(uuid.to_string());
        users.insert(
            uuid,
            User { id: id.clone(), username: draft.username, email: draft.email, password: draft.password },
        );
        Ok(id)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = parse_id(id)?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_all(&self, page: Page) -> Result<Vec<User>> {
        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);

        Ok(self.users.read().await.values().skip(skip).take(limit).cloned().collect())
    }

    async fn update(&self, id: &str, patch: UserPatch) -> Result<()> {
        let id = parse_id(id)?;
        let mut users = self.users.write().await;

        let mut user = users.get(&id).cloned().ok_or(AppError::NotFound)?;
        user.merge(patch);
        check_unique(users.iter().filter(|(k, _)| **k != id).map(|(_, u)| u), &user.username, &user.email)?;

        users.insert(id, user);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        self.users.write().await.remove(&id).map(|_| ()).ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser { username: name.into(), email: format!("{name}@example.com"), password: "password".into() }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let repo = InMemoryUserRepository::new();
        let id = repo.create(new_user("alice")).await.unwrap();

        let user = repo.get_by_id(id.as_str()).await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password, "password");
    }

    #[tokio::test]
    async fn test_get_by_id_distinguishes_invalid_from_absent() {
        let repo = InMemoryUserRepository::new();

        assert!(matches!(repo.get_by_id("not-an-id").await, Err(AppError::InvalidIdentifier(_))));
        assert!(repo.get_by_id(&Uuid::now_v7().to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_applies_only_set_fields() {
        let repo = InMemoryUserRepository::new();
        let id = repo.create(new_user("alice")).await.unwrap();

        repo.update(id.as_str(), UserPatch { username: Some("alicia".into()), email: None }).await.unwrap();
        let user = repo.get_by_id(id.as_str()).await.unwrap().unwrap();
        assert_eq!(user.username, "alicia");
        assert_eq!(user.email, "alice@example.com");

        repo.update(id.as_str(), UserPatch::default()).await.unwrap();
        assert_eq!(repo.get_by_id(id.as_str()).await.unwrap().unwrap(), user);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let res = repo.update(&Uuid::now_v7().to_string(), UserPatch::default()).await;
        assert!(matches!(res, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = InMemoryUserRepository::new();
        let id = repo.create(new_user("alice")).await.unwrap();

        repo.delete(id.as_str()).await.unwrap();
        assert!(repo.get_by_id(id.as_str()).await.unwrap().is_none());
        assert!(matches!(repo.delete(id.as_str()).await, Err(AppError::NotFound)));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_pages_do_not_overlap() {
        let repo = InMemoryUserRepository::new();
        for name in ["a", "b", "c", "d", "e"] {
            repo.create(new_user(name)).await.unwrap();
        }

        let first = repo.get_all(Page::new(1, 2)).await.unwrap();
        let second = repo.get_all(Page::new(2, 2)).await.unwrap();
        let third = repo.get_all(Page::new(3, 2)).await.unwrap();
        let past_end = repo.get_all(Page::new(4, 2)).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(third.len(), 1);
        assert!(past_end.is_empty());
        assert!(first.iter().all(|u| !second.contains(u)));
        assert_eq!(repo.len().await, 5);
    }

    #[tokio::test]
    async fn test_uniqueness_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("alice")).await.unwrap();
        let bob = repo.create(new_user("bob")).await.unwrap();

        let dup = repo.create(new_user("alice")).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        let clash = repo.update(bob.as_str(), UserPatch { username: Some("alice".into()), email: None }).await;
        assert!(matches!(clash, Err(AppError::Conflict(_))));

        // Re-saving your own values is not a conflict.
        repo.update(bob.as_str(), UserPatch { username: Some("bob".into()), email: None }).await.unwrap();
    }
}
