//! Read-side projection of bouts.
//!
//! Corner references are refreshed against the current roster so renames show
//! up without rewriting stored bouts; when a reference no longer resolves the
//! denormalized corner fields captured at creation time are kept as-is.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dao::store::TournamentStore,
    dto::bout::BoutView,
    engine::{
        Athlete, Team,
        bout::{Bout, Corner},
        mat::Mat,
    },
    error::ServiceError,
};

/// Roster and mat context loaded once per request.
pub struct Context {
    athletes: HashMap<Uuid, Athlete>,
    teams: HashMap<String, Team>,
    mats: Vec<Mat>,
}

impl Context {
    /// Load the current roster and mat assignments from the store.
    pub async fn load(store: &dyn TournamentStore) -> Result<Self, ServiceError> {
        let athletes = store
            .list_athletes()
            .await?
            .into_iter()
            .map(Athlete::from)
            .map(|athlete| (athlete.id, athlete))
            .collect();
        let teams = store
            .list_teams()
            .await?
            .into_iter()
            .map(Team::from)
            .map(|team| (team.id.clone(), team))
            .collect();
        let mats = store.list_mats().await?;

        Ok(Self {
            athletes,
            teams,
            mats,
        })
    }

    fn refresh_corner(&self, corner: &mut Corner) {
        if let Some(athlete) = corner
            .athlete_id
            .and_then(|id| self.athletes.get(&id))
        {
            corner.name = athlete.name.clone();
            corner.team_id = athlete.team_id.clone();
            corner.weight = athlete.weight.clone();
            corner.sex = athlete.sex.clone();
        }
        if let Some(team) = self.teams.get(&corner.team_id) {
            corner.team_name = team.name.clone();
        }
    }

    fn mat_of(&self, bout_id: Uuid) -> Option<Uuid> {
        self.mats
            .iter()
            .find(|mat| mat.bout_ids.contains(&bout_id))
            .map(|mat| mat.id)
    }

    /// Project a bout for the read side.
    pub fn enrich(&self, mut bout: Bout) -> BoutView {
        self.refresh_corner(&mut bout.rouge);
        self.refresh_corner(&mut bout.bleu);
        let mat_id = self.mat_of(bout.id);
        BoutView { bout, mat_id }
    }
}
