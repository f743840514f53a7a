use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc},
    options::IndexOptions,
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::MongoDocument,
};
use crate::dao::{
    models::{AthleteEntity, BoutEntity, TeamEntity},
    storage::StorageResult,
    store::TournamentStore,
};
use crate::engine::{bracket::Bracket, mat::Mat, standings::Pool};

const TEAM_COLLECTION: &str = "teams";
const ATHLETE_COLLECTION: &str = "athletes";
const BOUT_COLLECTION: &str = "bouts";
const MAT_COLLECTION: &str = "mats";
const POOL_COLLECTION: &str = "pools";
const BRACKET_COLLECTION: &str = "bracket";

// The elimination bracket is a singleton document.
const BRACKET_DOC_ID: &str = "tableau";

/// MongoDB-backed tournament store.
#[derive(Clone)]
pub struct MongoTournamentStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoTournamentStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let athletes = database.collection::<Document>(ATHLETE_COLLECTION);
        let athlete_index = mongodb::IndexModel::builder()
            .keys(doc! { "team_id": 1 })
            .options(
                IndexOptions::builder()
                    .name(Some("athlete_team_idx".to_owned()))
                    .build(),
            )
            .build();
        athletes
            .create_index(athlete_index)
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: ATHLETE_COLLECTION,
                source,
            })?;

        let bouts = database.collection::<Document>(BOUT_COLLECTION);
        let bout_index = mongodb::IndexModel::builder()
            .keys(doc! { "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name(Some("bout_created_idx".to_owned()))
                    .build(),
            )
            .build();
        bouts
            .create_index(bout_index)
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: BOUT_COLLECTION,
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection<T>(&self, name: &str) -> Collection<MongoDocument<T>>
    where
        T: Send + Sync,
    {
        let guard = self.inner.state.read().await;
        guard.database.collection::<MongoDocument<T>>(name)
    }

    async fn list_docs<T>(&self, name: &'static str, sort: Document) -> MongoResult<Vec<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + Unpin,
    {
        let collection = self.collection::<T>(name).await;
        let documents: Vec<MongoDocument<T>> = collection
            .find(doc! {})
            .sort(sort)
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: name,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: name,
                source,
            })?;

        Ok(documents.into_iter().map(|doc| doc.body).collect())
    }

    async fn find_doc<T>(&self, name: &'static str, id: &str) -> MongoResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let collection = self.collection::<T>(name).await;
        let document = collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: name,
                source,
            })?;
        Ok(document.map(|doc| doc.body))
    }

    async fn save_doc<T>(&self, name: &'static str, id: String, body: T) -> MongoResult<()>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let collection = self.collection::<T>(name).await;
        let document = MongoDocument { id, body };
        collection
            .replace_one(doc! { "_id": &document.id }, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: name,
                id: document.id.clone(),
                source,
            })?;
        Ok(())
    }

    async fn delete_doc(&self, name: &'static str, id: String) -> MongoResult<bool> {
        let collection = self.collection::<Document>(name).await;
        let result = collection
            .delete_one(doc! { "_id": &id })
            .await
            .map_err(|source| MongoDaoError::Delete {
                collection: name,
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn drop_collection(&self, name: &'static str) -> MongoResult<()> {
        let database = self.database().await;
        database
            .collection::<Document>(name)
            .drop()
            .await
            .map_err(|source| MongoDaoError::Delete {
                collection: name,
                id: "*".to_owned(),
                source,
            })?;
        Ok(())
    }
}

impl TournamentStore for MongoTournamentStore {
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_docs(TEAM_COLLECTION, doc! { "created_at": 1, "_id": 1 })
                .await
                .map_err(Into::into)
        })
    }

    fn find_team(&self, id: String) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_doc(TEAM_COLLECTION, &id).await.map_err(Into::into) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = team.id.clone();
            store
                .save_doc(TEAM_COLLECTION, id, team)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_team(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_doc(TEAM_COLLECTION, id).await.map_err(Into::into) })
    }

    fn list_athletes(&self) -> BoxFuture<'static, StorageResult<Vec<AthleteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_docs(ATHLETE_COLLECTION, doc! { "name": 1, "_id": 1 })
                .await
                .map_err(Into::into)
        })
    }

    fn find_athlete(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<AthleteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_doc(ATHLETE_COLLECTION, &id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn save_athlete(&self, athlete: AthleteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = athlete.id.to_string();
            store
                .save_doc(ATHLETE_COLLECTION, id, athlete)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_athlete(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_doc(ATHLETE_COLLECTION, id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn list_bouts(&self) -> BoxFuture<'static, StorageResult<Vec<BoutEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_docs(BOUT_COLLECTION, doc! { "created_at": 1, "_id": 1 })
                .await
                .map_err(Into::into)
        })
    }

    fn find_bout(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<BoutEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_doc(BOUT_COLLECTION, &id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn save_bout(&self, bout: BoutEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = bout.id.to_string();
            store
                .save_doc(BOUT_COLLECTION, id, bout)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_bout(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_doc(BOUT_COLLECTION, id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn list_mats(&self) -> BoxFuture<'static, StorageResult<Vec<Mat>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_docs(MAT_COLLECTION, doc! { "created_at": 1, "_id": 1 })
                .await
                .map_err(Into::into)
        })
    }

    fn find_mat(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Mat>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_doc(MAT_COLLECTION, &id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn save_mat(&self, mat: Mat) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = mat.id.to_string();
            store
                .save_doc(MAT_COLLECTION, id, mat)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_mat(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_doc(MAT_COLLECTION, id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn list_pools(&self) -> BoxFuture<'static, StorageResult<Vec<Pool>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_docs(POOL_COLLECTION, doc! { "name": 1, "_id": 1 })
                .await
                .map_err(Into::into)
        })
    }

    fn find_pool(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Pool>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_doc(POOL_COLLECTION, &id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn save_pool(&self, pool: Pool) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = pool.id.to_string();
            store
                .save_doc(POOL_COLLECTION, id, pool)
                .await
                .map_err(Into::into)
        })
    }

    fn clear_pools(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.drop_collection(POOL_COLLECTION).await.map_err(Into::into) })
    }

    fn load_bracket(&self) -> BoxFuture<'static, StorageResult<Option<Bracket>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_doc(BRACKET_COLLECTION, BRACKET_DOC_ID)
                .await
                .map_err(Into::into)
        })
    }

    fn save_bracket(&self, bracket: Bracket) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .save_doc(BRACKET_COLLECTION, BRACKET_DOC_ID.to_owned(), bracket)
                .await
                .map_err(Into::into)
        })
    }

    fn clear_bracket(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_doc(BRACKET_COLLECTION, BRACKET_DOC_ID.to_owned())
                .await?;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
