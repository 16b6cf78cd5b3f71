use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::Result;

use crate::catalog::{PlayerSource, load_catalog};
use crate::config::AppConfig;
use crate::dashboard::{DashboardSource, load_dashboard, load_player_form};
use crate::error::DataError;
use crate::session::SessionId;
use crate::sqlite_store::SqliteStore;
use crate::state::{Delta, ProviderCommand};
use crate::store::{RosterStore, SavedRoster, save_roster};
use crate::supabase::SupabaseClient;

enum Backend {
    Remote(SupabaseClient),
    Local(SqliteStore),
}

impl Backend {
    fn from_config(config: &AppConfig, tx: &Sender<Delta>) -> Result<Self> {
        if let Some(client) = SupabaseClient::from_config(config) {
            let _ = tx.send(Delta::Log("[INFO] Using remote store".to_string()));
            return Ok(Self::Remote(client));
        }
        if let Some(path) = &config.db_path {
            match SqliteStore::open(path) {
                Ok(store) => {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Using local store {}",
                        path.display()
                    )));
                    return Ok(Self::Local(store));
                }
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Local store: {err:#}")));
                }
            }
        }
        let _ = tx.send(Delta::Log(
            "[WARN] Using in-memory store; rosters will not outlive this run".to_string(),
        ));
        Ok(Self::Local(SqliteStore::open_in_memory()?))
    }

    fn players(&self) -> &dyn PlayerSource {
        match self {
            Self::Remote(client) => client,
            Self::Local(store) => store,
        }
    }

    fn rosters(&self) -> &dyn RosterStore {
        match self {
            Self::Remote(client) => client,
            Self::Local(store) => store,
        }
    }

    fn dashboard(&self) -> Option<&dyn DashboardSource> {
        match self {
            Self::Remote(client) => Some(client),
            Self::Local(_) => None,
        }
    }
}

/// Runs reads and saves off the UI thread. Commands are handled in order; the
/// thread exits when the command channel closes.
pub fn spawn_provider(config: AppConfig, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let backend = match Backend::from_config(&config, &tx) {
            Ok(backend) => backend,
            Err(err) => {
                let message = DataError::unavailable(&err).to_string();
                let _ = tx.send(Delta::CatalogFailed(message));
                return;
            }
        };
        for cmd in cmd_rx {
            handle_command(&backend, cmd, &tx);
        }
    });
}

fn handle_command(backend: &Backend, cmd: ProviderCommand, tx: &Sender<Delta>) {
    match cmd {
        ProviderCommand::LoadCatalog => {
            let delta = match load_catalog(backend.players()) {
                Ok(catalog) => Delta::SetCatalog(catalog),
                Err(err) => Delta::CatalogFailed(err.to_string()),
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::LoadDashboard => {
            let Some(source) = backend.dashboard() else {
                let _ = tx.send(Delta::DashboardFailed(
                    "dashboard needs SUPABASE_URL and SUPABASE_ANON_KEY".to_string(),
                ));
                return;
            };
            let delta = match load_dashboard(source) {
                Ok(dashboard) => Delta::SetDashboard(dashboard),
                Err(err) => Delta::DashboardFailed(format!("{err:#}")),
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchPlayerForm { player_id } => {
            let Some(source) = backend.dashboard() else {
                return;
            };
            match load_player_form(source, player_id) {
                Ok(form) => {
                    let _ = tx.send(Delta::SetPlayerForm(form));
                }
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!(
                        "[WARN] Match timeline for player {player_id}: {err:#}"
                    )));
                }
            }
        }
        ProviderCommand::SaveRoster {
            session,
            name,
            roster_id,
            snapshot,
        } => {
            let delta = match save_roster(
                backend.rosters(),
                &session,
                &name,
                roster_id.as_ref(),
                &snapshot,
            ) {
                Ok(roster_id) => Delta::RosterSaved {
                    roster_id,
                    players: snapshot.len(),
                },
                Err(err) => Delta::SaveFailed(err.to_string()),
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::LoadLatestRoster { session } => {
            match latest_roster(backend.rosters(), &session) {
                Ok(Some(saved)) => {
                    let _ = tx.send(Delta::SetSavedRoster(saved));
                }
                Ok(None) => {
                    let _ = tx.send(Delta::Log(
                        "[INFO] No saved roster for this session".to_string(),
                    ));
                }
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Roster load: {err:#}")));
                }
            }
        }
    }
}

fn latest_roster(store: &dyn RosterStore, session: &SessionId) -> Result<Option<SavedRoster>> {
    let Some(record) = store.list_rosters(session)?.into_iter().next() else {
        return Ok(None);
    };
    store.load_roster(&record.id)
}
