//! Flat-file JSON backend: one file per collection under a data directory,
//! mirrored in memory and rewritten whole on every mutation.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{AthleteEntity, BoutEntity, TeamEntity},
    storage::{StorageError, StorageResult},
    store::TournamentStore,
};
use crate::engine::{bracket::Bracket, mat::Mat, standings::Pool};

const TEAMS_FILE: &str = "teams.json";
const ATHLETES_FILE: &str = "athletes.json";
const BOUTS_FILE: &str = "bouts.json";
const MATS_FILE: &str = "mats.json";
const POOLS_FILE: &str = "pools.json";
const BRACKET_FILE: &str = "bracket.json";

/// Result alias for the flat-file backend.
pub type JsonResult<T> = Result<T, JsonDaoError>;

/// Failures of the flat-file backend.
#[derive(Debug, Error)]
pub enum JsonDaoError {
    /// The data directory could not be created.
    #[error("failed to create data directory {path}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },
    /// A collection file could not be read or written.
    #[error("io error on {path}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },
    /// A collection file holds invalid JSON.
    #[error("invalid JSON in {path}")]
    Decode {
        /// File path.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A collection could not be encoded.
    #[error("failed to encode collection {collection}")]
    Encode {
        /// Collection file name.
        collection: &'static str,
        /// Underlying encode error.
        #[source]
        source: serde_json::Error,
    },
}

impl From<JsonDaoError> for StorageError {
    fn from(err: JsonDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// Flat-file JSON store.
#[derive(Clone)]
pub struct JsonFileStore {
    inner: Arc<Inner>,
}

struct Inner {
    dir: PathBuf,
    teams: DashMap<String, TeamEntity>,
    athletes: DashMap<Uuid, AthleteEntity>,
    bouts: DashMap<Uuid, BoutEntity>,
    mats: DashMap<Uuid, Mat>,
    pools: DashMap<Uuid, Pool>,
    bracket: RwLock<Option<Bracket>>,
}

async fn read_collection<T: DeserializeOwned>(path: &Path) -> JsonResult<Vec<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| JsonDaoError::Decode {
            path: path.to_owned(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(JsonDaoError::Io {
            path: path.to_owned(),
            source,
        }),
    }
}

async fn write_collection<T: Serialize>(
    path: &Path,
    collection: &'static str,
    values: &[T],
) -> JsonResult<()> {
    let bytes = serde_json::to_vec_pretty(values)
        .map_err(|source| JsonDaoError::Encode { collection, source })?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| JsonDaoError::Io {
            path: path.to_owned(),
            source,
        })
}

impl Inner {
    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    async fn flush_teams(&self) -> JsonResult<()> {
        let mut teams: Vec<TeamEntity> = self.teams.iter().map(|e| e.value().clone()).collect();
        teams.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        write_collection(&self.path(TEAMS_FILE), TEAMS_FILE, &teams).await
    }

    async fn flush_athletes(&self) -> JsonResult<()> {
        let mut athletes: Vec<AthleteEntity> =
            self.athletes.iter().map(|e| e.value().clone()).collect();
        athletes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        write_collection(&self.path(ATHLETES_FILE), ATHLETES_FILE, &athletes).await
    }

    async fn flush_bouts(&self) -> JsonResult<()> {
        let mut bouts: Vec<BoutEntity> = self.bouts.iter().map(|e| e.value().clone()).collect();
        bouts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        write_collection(&self.path(BOUTS_FILE), BOUTS_FILE, &bouts).await
    }

    async fn flush_mats(&self) -> JsonResult<()> {
        let mut mats: Vec<Mat> = self.mats.iter().map(|e| e.value().clone()).collect();
        mats.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        write_collection(&self.path(MATS_FILE), MATS_FILE, &mats).await
    }

    async fn flush_pools(&self) -> JsonResult<()> {
        let mut pools: Vec<Pool> = self.pools.iter().map(|e| e.value().clone()).collect();
        pools.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        write_collection(&self.path(POOLS_FILE), POOLS_FILE, &pools).await
    }

    async fn flush_bracket(&self, bracket: Option<&Bracket>) -> JsonResult<()> {
        let path = self.path(BRACKET_FILE);
        match bracket {
            Some(bracket) => {
                let bytes = serde_json::to_vec_pretty(bracket)
                    .map_err(|source| JsonDaoError::Encode {
                        collection: BRACKET_FILE,
                        source,
                    })?;
                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(|source| JsonDaoError::Io { path, source })
            }
            None => match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(JsonDaoError::Io { path, source }),
            },
        }
    }
}

impl JsonFileStore {
    /// Open (or initialize) the data directory and load every collection.
    pub async fn open(dir: impl Into<PathBuf>) -> JsonResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| JsonDaoError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let inner = Inner {
            teams: DashMap::new(),
            athletes: DashMap::new(),
            bouts: DashMap::new(),
            mats: DashMap::new(),
            pools: DashMap::new(),
            bracket: RwLock::new(None),
            dir,
        };

        for team in read_collection::<TeamEntity>(&inner.path(TEAMS_FILE)).await? {
            inner.teams.insert(team.id.clone(), team);
        }
        for athlete in read_collection::<AthleteEntity>(&inner.path(ATHLETES_FILE)).await? {
            inner.athletes.insert(athlete.id, athlete);
        }
        for bout in read_collection::<BoutEntity>(&inner.path(BOUTS_FILE)).await? {
            inner.bouts.insert(bout.id, bout);
        }
        for mat in read_collection::<Mat>(&inner.path(MATS_FILE)).await? {
            inner.mats.insert(mat.id, mat);
        }
        for pool in read_collection::<Pool>(&inner.path(POOLS_FILE)).await? {
            inner.pools.insert(pool.id, pool);
        }

        let bracket_path = inner.path(BRACKET_FILE);
        let bracket = match tokio::fs::read(&bracket_path).await {
            Ok(bytes) => Some(serde_json::from_slice::<Bracket>(&bytes).map_err(|source| {
                JsonDaoError::Decode {
                    path: bracket_path,
                    source,
                }
            })?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(JsonDaoError::Io {
                    path: bracket_path,
                    source,
                });
            }
        };
        *inner.bracket.write().await = bracket;

        Ok(Self {
            inner: Arc::new(inner),
        })
    }
}

impl TournamentStore for JsonFileStore {
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut teams: Vec<TeamEntity> =
                store.inner.teams.iter().map(|e| e.value().clone()).collect();
            teams.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(teams)
        })
    }

    fn find_team(&self, id: String) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.teams.get(&id).map(|e| e.value().clone())) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.teams.insert(team.id.clone(), team);
            store.inner.flush_teams().await.map_err(Into::into)
        })
    }

    fn delete_team(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let removed = store.inner.teams.remove(&id).is_some();
            if removed {
                store.inner.flush_teams().await?;
            }
            Ok(removed)
        })
    }

    fn list_athletes(&self) -> BoxFuture<'static, StorageResult<Vec<AthleteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut athletes: Vec<AthleteEntity> = store
                .inner
                .athletes
                .iter()
                .map(|e| e.value().clone())
                .collect();
            athletes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(athletes)
        })
    }

    fn find_athlete(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<AthleteEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.athletes.get(&id).map(|e| e.value().clone())) })
    }

    fn save_athlete(&self, athlete: AthleteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.athletes.insert(athlete.id, athlete);
            store.inner.flush_athletes().await.map_err(Into::into)
        })
    }

    fn delete_athlete(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let removed = store.inner.athletes.remove(&id).is_some();
            if removed {
                store.inner.flush_athletes().await?;
            }
            Ok(removed)
        })
    }

    fn list_bouts(&self) -> BoxFuture<'static, StorageResult<Vec<BoutEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut bouts: Vec<BoutEntity> =
                store.inner.bouts.iter().map(|e| e.value().clone()).collect();
            bouts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(bouts)
        })
    }

    fn find_bout(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<BoutEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.bouts.get(&id).map(|e| e.value().clone())) })
    }

    fn save_bout(&self, bout: BoutEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.bouts.insert(bout.id, bout);
            store.inner.flush_bouts().await.map_err(Into::into)
        })
    }

    fn delete_bout(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let removed = store.inner.bouts.remove(&id).is_some();
            if removed {
                store.inner.flush_bouts().await?;
            }
            Ok(removed)
        })
    }

    fn list_mats(&self) -> BoxFuture<'static, StorageResult<Vec<Mat>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut mats: Vec<Mat> = store.inner.mats.iter().map(|e| e.value().clone()).collect();
            mats.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(mats)
        })
    }

    fn find_mat(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Mat>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.mats.get(&id).map(|e| e.value().clone())) })
    }

    fn save_mat(&self, mat: Mat) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.mats.insert(mat.id, mat);
            store.inner.flush_mats().await.map_err(Into::into)
        })
    }

    fn delete_mat(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let removed = store.inner.mats.remove(&id).is_some();
            if removed {
                store.inner.flush_mats().await?;
            }
            Ok(removed)
        })
    }

    fn list_pools(&self) -> BoxFuture<'static, StorageResult<Vec<Pool>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut pools: Vec<Pool> =
                store.inner.pools.iter().map(|e| e.value().clone()).collect();
            pools.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(pools)
        })
    }

    fn find_pool(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Pool>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.pools.get(&id).map(|e| e.value().clone())) })
    }

    fn save_pool(&self, pool: Pool) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.pools.insert(pool.id, pool);
            store.inner.flush_pools().await.map_err(Into::into)
        })
    }

    fn clear_pools(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.pools.clear();
            store.inner.flush_pools().await.map_err(Into::into)
        })
    }

    fn load_bracket(&self) -> BoxFuture<'static, StorageResult<Option<Bracket>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.bracket.read().await.clone()) })
    }

    fn save_bracket(&self, bracket: Bracket) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.bracket.write().await;
            *guard = Some(bracket);
            store
                .inner
                .flush_bracket(guard.as_ref())
                .await
                .map_err(Into::into)
        })
    }

    fn clear_bracket(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.bracket.write().await;
            *guard = None;
            store.inner.flush_bracket(None).await.map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let metadata = tokio::fs::metadata(&store.inner.dir)
                .await
                .map_err(|source| JsonDaoError::Io {
                    path: store.inner.dir.clone(),
                    source,
                })?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(JsonDaoError::Io {
                    path: store.inner.dir.clone(),
                    source: std::io::Error::other("data path is not a directory"),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            tokio::fs::create_dir_all(&store.inner.dir)
                .await
                .map_err(|source| JsonDaoError::CreateDir {
                    path: store.inner.dir.clone(),
                    source,
                })?;
            Ok(())
        })
    }
}
