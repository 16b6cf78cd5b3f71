use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::DataError;
use crate::player::PlayerId;
use crate::position::PositionCategory;
use crate::roster::RosterState;
use crate::session::SessionId;

pub type RosterId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    pub id: RosterId,
    pub roster_name: String,
    pub session_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSelection {
    pub player_id: PlayerId,
    pub position_group: String,
    pub sort_order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRoster {
    pub record: RosterRecord,
    /// Ordered by `sort_order`.
    pub selections: Vec<SavedSelection>,
}

/// Where saved rosters live. Selections are keyed by `(roster, player)`.
pub trait RosterStore {
    fn create_roster(&self, session: &SessionId, name: &str) -> Result<RosterId>;
    fn add_selection(
        &self,
        roster: &RosterId,
        player_id: PlayerId,
        category: PositionCategory,
        sort_order: usize,
    ) -> Result<()>;
    fn remove_selection(&self, roster: &RosterId, player_id: PlayerId) -> Result<()>;
    fn rename_roster(&self, roster: &RosterId, name: &str) -> Result<()>;
    fn load_roster(&self, roster: &RosterId) -> Result<Option<SavedRoster>>;
    fn list_rosters(&self, session: &SessionId) -> Result<Vec<RosterRecord>>;
}

/// Writes a snapshot of `state`. The roster record is created on first save;
/// later saves rename if needed and replace the previous selections. The
/// in-memory state is never touched, whatever the outcome.
pub fn save_roster(
    store: &dyn RosterStore,
    session: &SessionId,
    name: &str,
    existing: Option<&RosterId>,
    state: &RosterState,
) -> Result<RosterId, DataError> {
    write_snapshot(store, session, name, existing, state)
        .map_err(|err| DataError::persistence(&err))
}

fn write_snapshot(
    store: &dyn RosterStore,
    session: &SessionId,
    name: &str,
    existing: Option<&RosterId>,
    state: &RosterState,
) -> Result<RosterId> {
    let roster_id = match existing {
        Some(id) => {
            let saved = store
                .load_roster(id)?
                .with_context(|| format!("roster {id} no longer exists"))?;
            if saved.record.roster_name != name {
                store.rename_roster(id, name)?;
            }
            for selection in &saved.selections {
                store.remove_selection(id, selection.player_id)?;
            }
            id.clone()
        }
        None => store.create_roster(session, name)?,
    };

    for (sort_order, player) in state.squad().iter().enumerate() {
        store
            .add_selection(&roster_id, player.id, player.category(), sort_order)
            .with_context(|| format!("save selection {}", player.full_name))?;
    }
    Ok(roster_id)
}

/// Rebuilds roster state from saved selections, in saved order. Ids missing
/// from the catalog are reported back rather than failing the whole restore.
pub fn restore_roster(saved: &SavedRoster, catalog: &Catalog) -> (RosterState, Vec<String>) {
    let mut state = RosterState::new();
    let mut problems = Vec::new();
    for selection in &saved.selections {
        let Some(player) = catalog.get(selection.player_id) else {
            problems.push(format!("player {} not in catalog", selection.player_id));
            continue;
        };
        if let Err(err) = state.add_player(player) {
            problems.push(format!("{}: {err}", player.full_name));
        }
    }
    (state, problems)
}
