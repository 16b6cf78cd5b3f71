use std::collections::{BTreeSet, HashSet};

use crate::collation::{collate, contains_ci};
use crate::error::RosterError;
use crate::player::{Player, PlayerId};
use crate::position::{CATEGORY_ORDER, PositionCategory, category_cap, compare_categories};

pub const SQUAD_CAPACITY: usize = 26;
pub const STARTER_CAPACITY: usize = 11;

/// Narrows the candidate pool only. Never applied to the squad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilters {
    pub search: String,
    pub category: Option<PositionCategory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterToggle {
    Promoted,
    Demoted,
    /// Not in the squad, or the starting eleven is already full.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub category: PositionCategory,
    pub players: Vec<&'a Player>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSummary {
    pub total: usize,
    pub capacity: usize,
    pub starters: usize,
    pub open_slots: usize,
    pub progress_pct: u16,
    pub is_complete: bool,
    pub counts: Vec<(PositionCategory, usize)>,
}

/// Squad under construction for one builder session.
///
/// Invariants: squad ids are unique, `squad.len() <= SQUAD_CAPACITY`,
/// `starters` is a subset of the squad ids and holds at most
/// `STARTER_CAPACITY` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterState {
    squad: Vec<Player>,
    starters: BTreeSet<PlayerId>,
    pub filters: ViewFilters,
}

impl RosterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn squad(&self) -> &[Player] {
        &self.squad
    }

    pub fn starters(&self) -> &BTreeSet<PlayerId> {
        &self.starters
    }

    pub fn len(&self) -> usize {
        self.squad.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squad.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.squad.len() >= SQUAD_CAPACITY
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.squad.iter().any(|p| p.id == id)
    }

    pub fn is_starter(&self, id: PlayerId) -> bool {
        self.starters.contains(&id)
    }

    /// Appends `player` to the squad. Already-present ids are a no-op;
    /// squad capacity is checked before the per-category cap.
    pub fn add_player(&mut self, player: &Player) -> Result<AddOutcome, RosterError> {
        if self.contains(player.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        if self.squad.len() >= SQUAD_CAPACITY {
            return Err(RosterError::RosterFull {
                cap: SQUAD_CAPACITY,
            });
        }
        let category = player.category();
        if let Some(cap) = category_cap(category) {
            let in_category = self.squad.iter().filter(|p| p.category() == category).count();
            if in_category >= cap {
                return Err(RosterError::PositionCapExceeded { category, cap });
            }
        }
        self.squad.push(player.clone());
        debug_assert!(self.invariants_hold());
        Ok(AddOutcome::Added)
    }

    /// Returns whether a squad member was removed. Starters are pruned too.
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        let before = self.squad.len();
        self.squad.retain(|p| p.id != id);
        self.starters.remove(&id);
        before != self.squad.len()
    }

    pub fn toggle_starter(&mut self, id: PlayerId) -> StarterToggle {
        if !self.contains(id) {
            return StarterToggle::Ignored;
        }
        if self.starters.remove(&id) {
            return StarterToggle::Demoted;
        }
        if self.starters.len() >= STARTER_CAPACITY {
            return StarterToggle::Ignored;
        }
        self.starters.insert(id);
        StarterToggle::Promoted
    }

    pub fn clear(&mut self) {
        self.squad.clear();
        self.starters.clear();
    }

    pub fn grouped(&self) -> Vec<CategoryGroup<'_>> {
        grouped_by_category(&self.squad)
    }

    pub fn counts(&self) -> Vec<(PositionCategory, usize)> {
        position_counts(&self.squad)
    }

    pub fn candidate_pool<'a>(&self, catalog: &'a [Player]) -> Vec<&'a Player> {
        filter_candidate_pool(
            catalog,
            &self.squad,
            &self.filters.search,
            self.filters.category,
        )
    }

    pub fn summary(&self) -> RosterSummary {
        let total = self.squad.len();
        RosterSummary {
            total,
            capacity: SQUAD_CAPACITY,
            starters: self.starters.len(),
            open_slots: SQUAD_CAPACITY.saturating_sub(total),
            progress_pct: ((total * 100) / SQUAD_CAPACITY) as u16,
            is_complete: total == SQUAD_CAPACITY,
            counts: self.counts(),
        }
    }

    pub fn invariants_hold(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.squad.len());
        let unique = self.squad.iter().all(|p| seen.insert(p.id));
        unique
            && self.squad.len() <= SQUAD_CAPACITY
            && self.starters.len() <= STARTER_CAPACITY
            && self.starters.iter().all(|id| seen.contains(id))
    }
}

/// Squad partitioned by category, in display order, each group sorted by
/// collated last name (full name when the last name is missing).
pub fn grouped_by_category(squad: &[Player]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    for player in squad {
        let category = player.category();
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.players.push(player),
            None => groups.push(CategoryGroup {
                category,
                players: vec![player],
            }),
        }
    }
    for group in &mut groups {
        group
            .players
            .sort_by(|a, b| collate(a.sort_name(), b.sort_name()));
    }
    groups.sort_by(|a, b| compare_categories(a.category, b.category));
    groups
}

/// Fixed categories are always listed (possibly zero); `Unknown` only when
/// present. Counts sum to the squad size.
pub fn position_counts(squad: &[Player]) -> Vec<(PositionCategory, usize)> {
    let mut counts: Vec<(PositionCategory, usize)> =
        CATEGORY_ORDER.iter().map(|c| (*c, 0)).collect();
    for player in squad {
        let category = player.category();
        match counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => counts.push((category, 1)),
        }
    }
    counts.sort_by(|a, b| compare_categories(a.0, b.0));
    counts
}

pub fn filter_candidate_pool<'a>(
    all_players: &'a [Player],
    squad: &[Player],
    search: &str,
    category: Option<PositionCategory>,
) -> Vec<&'a Player> {
    let selected: HashSet<PlayerId> = squad.iter().map(|p| p.id).collect();
    let mut pool: Vec<&Player> = all_players
        .iter()
        .filter(|p| !selected.contains(&p.id))
        .filter(|p| search.is_empty() || contains_ci(&p.full_name, search))
        .filter(|p| category.is_none_or(|c| p.category() == c))
        .collect();
    pool.sort_by(|a, b| collate(a.sort_name(), b.sort_name()));
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_absent_is_noop() {
        let mut state = RosterState::new();
        state
            .add_player(&Player::new(1, "Matt Turner", Some("GK")))
            .unwrap();
        let before = state.clone();
        assert!(!state.remove_player(99));
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_category_has_no_cap() {
        let mut state = RosterState::new();
        for id in 0..12 {
            let p = Player::new(id, &format!("Utility {id}"), Some("CF"));
            assert_eq!(state.add_player(&p), Ok(AddOutcome::Added));
        }
        assert_eq!(state.len(), 12);
    }

    #[test]
    fn summary_reports_progress() {
        let mut state = RosterState::new();
        for id in 0..13 {
            let pos = if id < 3 { "GK" } else { "CB" };
            state
                .add_player(&Player::new(id, &format!("P{id}"), Some(pos)))
                .unwrap();
        }
        state.toggle_starter(0);
        let summary = state.summary();
        assert_eq!(summary.total, 13);
        assert_eq!(summary.open_slots, 13);
        assert_eq!(summary.progress_pct, 50);
        assert_eq!(summary.starters, 1);
        assert!(!summary.is_complete);
        assert_eq!(summary.counts[0], (PositionCategory::Goalkeeper, 3));
        assert_eq!(summary.counts[1], (PositionCategory::Defender, 10));
    }
}
