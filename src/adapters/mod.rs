pub mod database;
pub mod memory;
pub mod mongo;

use crate::config::{Config, StoreKind};
use crate::domain::UserRepository;
use crate::error::Result;
use anyhow::Context;
use backon::{ExponentialBuilder, Retryable};
use database::{DbPool, PgUserRepository};
use memory::InMemoryUserRepository;
use mongo::{MongoStore, MongoUserRepository};
use std::sync::Arc;
use std::time::Duration;

/// Handle to the configured backing store.
///
/// Constructed once at boot, cloned into whatever needs it, and closed
/// explicitly during shutdown.
#[derive(Clone, Debug)]
pub enum Store {
    Postgres(DbPool),
    Mongo { store: MongoStore, collection: String },
    Memory(Arc<InMemoryUserRepository>),
}

impl Store {
    /// Connects to the store selected in `config`, retrying with exponential
    /// backoff, and prepares its schema (migrations or indexes).
    ///
    /// # Errors
    /// Returns an error if required connection settings are missing, if the
    /// store stays unreachable after all retries, or if schema setup fails.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let retry = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(config.store.connect_backoff_ms))
            .with_max_times(config.store.connect_retries);

        match config.store.kind {
            StoreKind::Postgres => {
                let url =
                    config.database.url.as_deref().context("AGRO_DATABASE_URL is required for the postgres store")?;

                let pool = (|| database::init_pool(url, &config.database))
                    .retry(retry)
                    .notify(|e, after| {
                        tracing::warn!(error = %e, retry_in = ?after, "Postgres connection failed, retrying");
                    })
                    .await?;
                database::run_migrations(&pool).await?;

                tracing::info!("Connected to Postgres");
                Ok(Self::Postgres(pool))
            }
            StoreKind::Mongo => {
                let uri = config.mongo.uri.as_deref().context("AGRO_MONGO_URI is required for the mongo store")?;
                let db_name =
                    config.mongo.database.as_deref().context("AGRO_MONGO_DB_NAME is required for the mongo store")?;

                let store = (|| MongoStore::connect(uri, db_name))
                    .retry(retry)
                    .notify(|e, after| {
                        tracing::warn!(error = %e, retry_in = ?after, "MongoDB connection failed, retrying");
                    })
                    .await?;
                MongoUserRepository::new(store.collection(&config.mongo.collection)).ensure_indexes().await?;

                tracing::info!(database = db_name, collection = %config.mongo.collection, "Connected to MongoDB");
                Ok(Self::Mongo { store, collection: config.mongo.collection.clone() })
            }
            StoreKind::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                Ok(Self::Memory(Arc::default()))
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> StoreKind {
        match self {
            Self::Postgres(_) => StoreKind::Postgres,
            Self::Mongo { .. } => StoreKind::Mongo,
            Self::Memory(_) => StoreKind::Memory,
        }
    }

    /// Builds the user repository for this store.
    #[must_use]
    pub fn user_repository(&self) -> Arc<UserRepository> {
        match self {
            Self::Postgres(pool) => Arc::new(PgUserRepository::new(pool.clone())),
            Self::Mongo { store, collection } => Arc::new(MongoUserRepository::new(store.collection(collection))),
            Self::Memory(repo) => Arc::clone(repo) as Arc<UserRepository>,
        }
    }

    /// Round-trips a trivial command to the store.
    ///
    /// # Errors
    /// Returns the store error if it does not answer.
    pub async fn ping(&self) -> Result<()> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Self::Mongo { store, .. } => store.ping().await?,
            Self::Memory(_) => {}
        }
        Ok(())
    }

    /// Releases all pooled connections.
    pub async fn close(self) {
        match self {
            Self::Postgres(pool) => pool.close().await,
            Self::Mongo { store, .. } => store.shutdown().await,
            Self::Memory(_) => {}
        }
        tracing::info!("Store connections closed");
    }
}
