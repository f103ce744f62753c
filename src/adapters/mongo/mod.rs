pub mod records;
pub mod user_repo;

use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};

pub use user_repo::MongoUserRepository;

/// Connection to a MongoDB database.
///
/// The driver pools connections internally, so clones share one pool.
#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connects and verifies the server answers a `ping`.
    ///
    /// # Errors
    /// Returns an error if the URI is invalid or the server cannot be reached.
    pub async fn connect(uri: &str, database: &str) -> mongodb::error::Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database);
        let store = Self { client, database };
        store.ping().await?;
        Ok(store)
    }

    #[must_use]
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    /// # Errors
    /// Returns an error if the server does not answer.
    pub async fn ping(&self) -> mongodb::error::Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Closes all pooled connections, waiting for in-flight operations.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}
