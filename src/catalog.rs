use std::collections::HashSet;

use anyhow::Result;

use crate::error::DataError;
use crate::player::{Player, PlayerId};

/// Anything that can hand over the full list of eligible players.
pub trait PlayerSource {
    fn fetch_all_players(&self) -> Result<Vec<Player>>;
}

/// Read-only snapshot of eligible players for one builder session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    players: Vec<Player>,
}

impl Catalog {
    /// Keeps the first row for each id; later duplicates are dropped.
    pub fn from_players(players: Vec<Player>) -> Self {
        let mut seen = HashSet::with_capacity(players.len());
        let players = players
            .into_iter()
            .filter(|p| seen.insert(p.id))
            .collect();
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

pub fn load_catalog(source: &dyn PlayerSource) -> Result<Catalog, DataError> {
    source
        .fetch_all_players()
        .map(Catalog::from_players)
        .map_err(|err| DataError::unavailable(&err))
}
