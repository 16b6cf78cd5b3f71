use std::collections::VecDeque;

use crate::catalog::Catalog;
use crate::dashboard::{Dashboard, PlayerForm};
use crate::player::{Player, PlayerId};
use crate::position::next_category_filter;
use crate::roster::{AddOutcome, RosterState, RosterSummary, StarterToggle};
use crate::session::SessionId;
use crate::store::{RosterId, SavedRoster, restore_roster};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Builder,
    Dashboard,
    PlayerDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderFocus {
    Pool,
    Squad,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub focus: BuilderFocus,
    pub session: SessionId,
    pub roster_name: String,
    pub roster_id: Option<RosterId>,
    pub catalog: Catalog,
    pub catalog_loading: bool,
    pub catalog_error: Option<String>,
    pub roster: RosterState,
    pub pool_selected: usize,
    pub squad_selected: usize,
    pub search_active: bool,
    pub saving: bool,
    pub dashboard: Option<Dashboard>,
    pub dashboard_loading: bool,
    pub dashboard_error: Option<String>,
    pub detail_player: Option<PlayerId>,
    pub detail_back: Screen,
    pub player_form: Option<PlayerForm>,
    /// Blocking message shown until dismissed (rule rejections, failed saves).
    pub notice: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(session: SessionId, roster_name: &str) -> Self {
        Self {
            screen: Screen::Builder,
            focus: BuilderFocus::Pool,
            session,
            roster_name: roster_name.to_string(),
            roster_id: None,
            catalog: Catalog::default(),
            catalog_loading: false,
            catalog_error: None,
            roster: RosterState::new(),
            pool_selected: 0,
            squad_selected: 0,
            search_active: false,
            saving: false,
            dashboard: None,
            dashboard_loading: false,
            dashboard_error: None,
            detail_player: None,
            detail_back: Screen::Builder,
            player_form: None,
            notice: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn pool(&self) -> Vec<&Player> {
        self.roster.candidate_pool(self.catalog.players())
    }

    /// Squad in the order the squad panel shows it: grouped, then sorted.
    pub fn squad_rows(&self) -> Vec<&Player> {
        self.roster
            .grouped()
            .into_iter()
            .flat_map(|group| group.players)
            .collect()
    }

    pub fn summary(&self) -> RosterSummary {
        self.roster.summary()
    }

    pub fn selected_pool_player(&self) -> Option<&Player> {
        self.pool().get(self.pool_selected).copied()
    }

    pub fn selected_squad_player(&self) -> Option<&Player> {
        self.squad_rows().get(self.squad_selected).copied()
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            BuilderFocus::Pool => BuilderFocus::Squad,
            BuilderFocus::Squad => BuilderFocus::Pool,
        };
        self.clamp_selection();
    }

    pub fn select_next(&mut self) {
        match self.focus {
            BuilderFocus::Pool => {
                let total = self.pool().len();
                if total > 0 {
                    self.pool_selected = (self.pool_selected + 1).min(total - 1);
                }
            }
            BuilderFocus::Squad => {
                let total = self.roster.len();
                if total > 0 {
                    self.squad_selected = (self.squad_selected + 1).min(total - 1);
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            BuilderFocus::Pool => self.pool_selected = self.pool_selected.saturating_sub(1),
            BuilderFocus::Squad => self.squad_selected = self.squad_selected.saturating_sub(1),
        }
    }

    pub fn clamp_selection(&mut self) {
        let pool_len = self.pool().len();
        self.pool_selected = self.pool_selected.min(pool_len.saturating_sub(1));
        let squad_len = self.roster.len();
        self.squad_selected = self.squad_selected.min(squad_len.saturating_sub(1));
    }

    pub fn add_selected(&mut self) {
        let Some(player) = self.selected_pool_player().cloned() else {
            return;
        };
        match self.roster.add_player(&player) {
            Ok(AddOutcome::Added) => {
                self.push_log(format!("[INFO] Added {}", player.full_name));
            }
            Ok(AddOutcome::AlreadyPresent) => {
                self.push_log(format!("[INFO] {} already in squad", player.full_name));
            }
            Err(err) => {
                self.push_log(format!("[WARN] {err}"));
                self.notice = Some(err.to_string());
            }
        }
        self.clamp_selection();
    }

    pub fn remove_selected(&mut self) {
        let Some((id, name)) = self
            .selected_squad_player()
            .map(|p| (p.id, p.full_name.clone()))
        else {
            return;
        };
        if self.roster.remove_player(id) {
            self.push_log(format!("[INFO] Removed {name}"));
        }
        self.clamp_selection();
    }

    pub fn toggle_selected_starter(&mut self) {
        let Some((id, name)) = self
            .selected_squad_player()
            .map(|p| (p.id, p.full_name.clone()))
        else {
            return;
        };
        match self.roster.toggle_starter(id) {
            StarterToggle::Promoted => self.push_log(format!("[INFO] {name} starts")),
            StarterToggle::Demoted => self.push_log(format!("[INFO] {name} to the bench")),
            StarterToggle::Ignored => {}
        }
    }

    pub fn clear_roster(&mut self) {
        if self.roster.is_empty() {
            return;
        }
        self.roster.clear();
        self.squad_selected = 0;
        self.push_log("[INFO] Roster cleared");
        self.clamp_selection();
    }

    pub fn cycle_category_filter(&mut self) {
        self.roster.filters.category = next_category_filter(self.roster.filters.category);
        self.pool_selected = 0;
    }

    pub fn search_push(&mut self, ch: char) {
        self.roster.filters.search.push(ch);
        self.pool_selected = 0;
    }

    pub fn search_pop(&mut self) {
        self.roster.filters.search.pop();
        self.pool_selected = 0;
    }

    pub fn search_clear(&mut self) {
        self.roster.filters.search.clear();
        self.search_active = false;
        self.pool_selected = 0;
    }

    pub fn dismiss_notice(&mut self) -> bool {
        self.notice.take().is_some()
    }

    /// Opens the detail page for the highlighted player and returns its id.
    pub fn open_player_detail(&mut self) -> Option<PlayerId> {
        let id = match self.focus {
            BuilderFocus::Pool => self.selected_pool_player().map(|p| p.id),
            BuilderFocus::Squad => self.selected_squad_player().map(|p| p.id),
        }?;
        if self.screen != Screen::PlayerDetail {
            self.detail_back = self.screen;
        }
        self.screen = Screen::PlayerDetail;
        self.detail_player = Some(id);
        self.player_form = None;
        Some(id)
    }

    pub fn close_player_detail(&mut self) {
        self.screen = self.detail_back;
    }

    pub fn detail_player(&self) -> Option<&Player> {
        self.detail_player.and_then(|id| self.catalog.get(id))
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetCatalog(Catalog),
    CatalogFailed(String),
    SetDashboard(Dashboard),
    DashboardFailed(String),
    SetPlayerForm(PlayerForm),
    RosterSaved { roster_id: RosterId, players: usize },
    SaveFailed(String),
    SetSavedRoster(SavedRoster),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadCatalog,
    LoadDashboard,
    FetchPlayerForm {
        player_id: PlayerId,
    },
    SaveRoster {
        session: SessionId,
        name: String,
        roster_id: Option<RosterId>,
        snapshot: RosterState,
    },
    LoadLatestRoster {
        session: SessionId,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetCatalog(catalog) => {
            state.catalog = catalog;
            state.catalog_loading = false;
            state.catalog_error = None;
            state.clamp_selection();
            state.push_log(format!("[INFO] Loaded {} players", state.catalog.len()));
        }
        Delta::CatalogFailed(message) => {
            state.catalog_loading = false;
            state.push_log(format!("[ERROR] {message}"));
            state.catalog_error = Some(message);
        }
        Delta::SetDashboard(dashboard) => {
            state.dashboard_loading = false;
            state.dashboard_error = None;
            for warning in &dashboard.warnings {
                state.push_log(format!("[WARN] Dashboard {warning}"));
            }
            state.dashboard = Some(dashboard);
        }
        Delta::DashboardFailed(message) => {
            state.dashboard_loading = false;
            state.push_log(format!("[ERROR] Dashboard: {message}"));
            state.dashboard_error = Some(message);
        }
        Delta::SetPlayerForm(form) => {
            if state.detail_player == Some(form.player_id) {
                state.player_form = Some(form);
            }
        }
        Delta::RosterSaved { roster_id, players } => {
            state.saving = false;
            state.push_log(format!(
                "[INFO] Saved \"{}\" ({players} players, id {roster_id})",
                state.roster_name
            ));
            state.roster_id = Some(roster_id);
        }
        Delta::SaveFailed(message) => {
            state.saving = false;
            state.push_log(format!("[WARN] {message}"));
            state.notice = Some(message);
        }
        Delta::SetSavedRoster(saved) => {
            if state.catalog.is_empty() {
                state.push_log("[WARN] Catalog not loaded; cannot restore roster");
                return;
            }
            let (mut restored, problems) = restore_roster(&saved, &state.catalog);
            restored.filters = state.roster.filters.clone();
            for problem in problems {
                state.push_log(format!("[WARN] Restore: {problem}"));
            }
            state.push_log(format!(
                "[INFO] Restored \"{}\" ({} players)",
                saved.record.roster_name,
                restored.len()
            ));
            state.roster = restored;
            state.roster_name = saved.record.roster_name;
            state.roster_id = Some(saved.record.id);
            state.clamp_selection();
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
