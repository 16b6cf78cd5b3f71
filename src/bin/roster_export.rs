use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use wc26_roster::catalog::{Catalog, PlayerSource};
use wc26_roster::config::{AppConfig, app_cache_dir, load_dotenv};
use wc26_roster::export::{
    WORKBOOK_FILE_NAME, export_roster, export_roster_workbook, write_text_export,
};
use wc26_roster::session::load_or_create_session;
use wc26_roster::sqlite_store::SqliteStore;
use wc26_roster::store::{RosterStore, restore_roster};

/// Prints a saved roster in export format.
///
/// Usage: `roster_export [--db PATH] [--roster ID] [--out DIR] [--xlsx]`.
/// Without `--roster` the most recently updated roster of this session is used.
fn main() -> Result<()> {
    load_dotenv();
    let config = AppConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let db_path = arg_value(&args, "--db")
        .map(PathBuf::from)
        .or_else(|| config.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let store = SqliteStore::open(&db_path)?;

    let roster_id = match arg_value(&args, "--roster") {
        Some(id) => id,
        None => {
            let session = load_or_create_session(app_cache_dir().as_deref());
            store
                .list_rosters(&session)?
                .into_iter()
                .next()
                .map(|record| record.id)
                .ok_or_else(|| anyhow!("no saved roster for session {session}"))?
        }
    };
    let saved = store
        .load_roster(&roster_id)?
        .with_context(|| format!("roster {roster_id} not found"))?;

    let catalog = Catalog::from_players(store.fetch_all_players()?);
    let (state, problems) = restore_roster(&saved, &catalog);
    for problem in &problems {
        eprintln!("warning: {problem}");
    }

    match arg_value(&args, "--out").map(PathBuf::from) {
        Some(dir) => {
            let path = write_text_export(&dir, state.squad())?;
            println!("Wrote {}", path.display());
            if args.iter().any(|arg| arg == "--xlsx") {
                let path = dir.join(WORKBOOK_FILE_NAME);
                let rows = export_roster_workbook(&path, &state)?;
                println!("Wrote {} ({rows} players)", path.display());
            }
        }
        None => {
            println!("# {} ({} players)", saved.record.roster_name, state.len());
            println!("{}", export_roster(state.squad()));
        }
    }
    Ok(())
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
