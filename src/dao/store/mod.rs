#[cfg(feature = "json-store")]
pub mod jsonfile;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{AthleteEntity, BoutEntity, TeamEntity};
use crate::dao::storage::StorageResult;
use crate::engine::{bracket::Bracket, mat::Mat, standings::Pool};

/// Abstraction over the persistence layer for tournament data.
///
/// Saves are upserts keyed on the entity id. Pools, mats and the bracket are
/// persisted in their domain shape; teams, athletes and bouts go through the
/// entity types in [`crate::dao::models`].
pub trait TournamentStore: Send + Sync {
    /// List every team.
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// Look up one team.
    fn find_team(&self, id: String) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Insert or replace a team.
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a team; `false` when it did not exist.
    fn delete_team(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;

    /// List every athlete.
    fn list_athletes(&self) -> BoxFuture<'static, StorageResult<Vec<AthleteEntity>>>;
    /// Look up one athlete.
    fn find_athlete(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<AthleteEntity>>>;
    /// Insert or replace an athlete.
    fn save_athlete(&self, athlete: AthleteEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete an athlete; `false` when it did not exist.
    fn delete_athlete(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// List every bout.
    fn list_bouts(&self) -> BoxFuture<'static, StorageResult<Vec<BoutEntity>>>;
    /// Look up one bout.
    fn find_bout(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<BoutEntity>>>;
    /// Insert or replace a bout.
    fn save_bout(&self, bout: BoutEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a bout; `false` when it did not exist.
    fn delete_bout(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// List every mat.
    fn list_mats(&self) -> BoxFuture<'static, StorageResult<Vec<Mat>>>;
    /// Look up one mat.
    fn find_mat(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Mat>>>;
    /// Insert or replace a mat.
    fn save_mat(&self, mat: Mat) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a mat; `false` when it did not exist.
    fn delete_mat(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// List every pool.
    fn list_pools(&self) -> BoxFuture<'static, StorageResult<Vec<Pool>>>;
    /// Look up one pool.
    fn find_pool(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Pool>>>;
    /// Insert or replace a pool.
    fn save_pool(&self, pool: Pool) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete every pool.
    fn clear_pools(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Load the bracket aggregate, if one was created.
    fn load_bracket(&self) -> BoxFuture<'static, StorageResult<Option<Bracket>>>;
    /// Replace the bracket aggregate.
    fn save_bracket(&self, bracket: Bracket) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove the bracket aggregate.
    fn clear_bracket(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Probe the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failure.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
