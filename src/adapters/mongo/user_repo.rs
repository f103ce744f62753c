use crate::adapters::mongo::records::UserDocument;
use crate::domain::{Entity, NewUser, Page, Repository, User, UserId, UserPatch};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    #[must_use]
    pub(crate) const fn new(collection: Collection<UserDocument>) -> Self {
        Self { collection }
    }

    /// Creates the unique indexes on `username` and `email`.
    ///
    /// # Errors
    /// Returns an error if the indexes cannot be built, e.g. because existing
    /// documents already violate them.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        self.collection
            .create_indexes([
                IndexModel::builder().keys(doc! { "username": 1 }).options(unique()).build(),
                IndexModel::builder().keys(doc! { "email": 1 }).options(unique()).build(),
            ])
            .await?;
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidIdentifier(id.to_string()))
}

fn map_write_error(err: mongodb::error::Error) -> AppError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY => {
            AppError::Conflict("username or email already exists".into())
        }
        _ => AppError::DocumentStore(err),
    }
}

#[async_trait]
impl Repository<User> for MongoUserRepository {
    #[tracing::instrument(level = "debug", skip(self, draft), err)]
    async fn create(&self, draft: NewUser) -> Result<UserId> {
        let result = self.collection.insert_one(UserDocument::from(draft)).await.map_err(map_write_error)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Persistence("inserted id is not an ObjectId".into()))?;
        Ok(UserId::from(id.to_hex()))
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = parse_id(id)?;
        let document = self.collection.find_one(doc! { "_id": id }).await?;

        document.map(User::try_from).transpose()
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn get_all(&self, page: Page) -> Result<Vec<User>> {
        let documents: Vec<UserDocument> = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .skip(page.skip())
            .limit(i64::try_from(page.limit()).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(User::try_from).collect()
    }

    #[tracing::instrument(level = "debug", skip(self, patch), err)]
    async fn update(&self, id: &str, patch: UserPatch) -> Result<()> {
        let oid = parse_id(id)?;
        let document = self.collection.find_one(doc! { "_id": oid }).await?.ok_or(AppError::NotFound)?;

        let mut user = User::try_from(document)?;
        user.merge(patch);

        let result = self
            .collection
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "username": user.username, "email": user.email, "password": user.password } },
            )
            .await
            .map_err(map_write_error)?;

        // Deleted between the read and the write.
        if result.matched_count == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
