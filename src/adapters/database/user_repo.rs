use crate::adapters::database::DbPool;
use crate::adapters::database::records::UserRecord;
use crate::domain::{Entity, NewUser, Page, Repository, User, UserId, UserPatch};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidIdentifier(id.to_string()))
}

fn map_write_error(err: sqlx::Error) -> AppError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::Conflict("username or email already exists".into()),
        _ => AppError::Database(err),
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl Repository<User> for PgUserRepository {
    #[tracing::instrument(level = "debug", skip(self, draft), err)]
    async fn create(&self, draft: NewUser) -> Result<UserId> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&draft.username)
        .bind(&draft.email)
        .bind(&draft.password)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(UserId::from(id.to_string()))
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = parse_id(id)?;
        let record = sqlx::query_as::<_, UserRecord>("SELECT id, username, email, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn get_all(&self, page: Page) -> Result<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, email, password
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(to_i64(page.limit()))
        .bind(to_i64(page.skip()))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, patch), err)]
    async fn update(&self, id: &str, patch: UserPatch) -> Result<()> {
        let id = parse_id(id)?;
        let mut tx = self.pool.begin().await?;

        // Row lock keeps the read-merge-write atomic against concurrent updates.
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, password FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            return Err(AppError::NotFound);
        };

        let mut user = User::from(record);
        user.merge(patch);

        sqlx::query("UPDATE users SET username = $2, email = $3, password = $4 WHERE id = $1")
            .bind(id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_repo() -> PgUserRepository {
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/test").unwrap();
        PgUserRepository::new(pool)
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("not-a-uuid"), Err(AppError::InvalidIdentifier(s)) if s == "not-a-uuid"));
        assert!(matches!(parse_id(""), Err(AppError::InvalidIdentifier(_))));
    }

    #[tokio::test]
    async fn test_malformed_ids_are_rejected_before_querying() {
        let repo = lazy_repo();

        assert!(matches!(repo.get_by_id("abc").await, Err(AppError::InvalidIdentifier(_))));
        assert!(matches!(repo.update("abc", UserPatch::default()).await, Err(AppError::InvalidIdentifier(_))));
        assert!(matches!(repo.delete("abc").await, Err(AppError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_non_database_errors_are_not_conflicts() {
        assert!(matches!(map_write_error(sqlx::Error::RowNotFound), AppError::Database(_)));
    }
}
