use crate::config::PaginationConfig;
use crate::domain::{NewUser, Page, User, UserId, UserPatch, UserRepository};
use crate::error::Result;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct UserMetrics {
    users_created_total: Counter<u64>,
    users_updated_total: Counter<u64>,
    users_deleted_total: Counter<u64>,
}

impl UserMetrics {
    fn new() -> Self {
        let meter = global::meter("agro-user-service");
        Self {
            users_created_total: meter
                .u64_counter("users_created_total")
                .with_description("Total number of users created")
                .build(),
            users_updated_total: meter
                .u64_counter("users_updated_total")
                .with_description("Total number of successful user updates")
                .build(),
            users_deleted_total: meter
                .u64_counter("users_deleted_total")
                .with_description("Total number of users deleted")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct UserService {
    repo: Arc<UserRepository>,
    pagination: PaginationConfig,
    metrics: UserMetrics,
}

impl UserService {
    pub fn new(repo: Arc<UserRepository>, pagination: PaginationConfig) -> Self {
        Self { repo, pagination, metrics: UserMetrics::new() }
    }

    /// # Errors
    /// Propagates the repository error.
    #[tracing::instrument(skip(self, user), fields(user.id = tracing::field::Empty), err(level = "warn"))]
    pub async fn create(&self, user: NewUser) -> Result<UserId> {
        let id = self.repo.create(user).await?;

        tracing::Span::current().record("user.id", tracing::field::display(&id));
        tracing::info!("User created");
        self.metrics.users_created_total.add(1, &[]);

        Ok(id)
    }

    /// # Errors
    /// Propagates the repository error.
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        self.repo.get_by_id(id).await
    }

    /// Lists one page of users. Out-of-range page values are normalized, see [`Page::from_request`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn list(&self, page_number: i32, page_size: i32) -> Result<Vec<User>> {
        let page = Page::from_request(page_number, page_size, &self.pagination);
        self.repo.get_all(page).await
    }

    /// # Errors
    /// Propagates the repository error.
    #[tracing::instrument(skip(self, patch), err(level = "warn"))]
    pub async fn update(&self, id: &str, patch: UserPatch) -> Result<()> {
        if patch.is_empty() {
            // Still goes to the store so an unknown id reports NotFound.
            tracing::debug!("Update carries no changes");
        }
        self.repo.update(id, patch).await?;

        tracing::info!("User updated");
        self.metrics.users_updated_total.add(1, &[]);
        Ok(())
    }

    /// # Errors
    /// Propagates the repository error.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repo.delete(id).await?;

        tracing::info!("User deleted");
        self.metrics.users_deleted_total.add(1, &[]);
        Ok(())
    }
}
