use std::path::PathBuf;

use anyhow::{Context, Result};

use wc26_roster::catalog::load_catalog;
use wc26_roster::config::{AppConfig, load_dotenv};
use wc26_roster::position::category_short_label;
use wc26_roster::roster::position_counts;
use wc26_roster::sqlite_store::SqliteStore;
use wc26_roster::supabase::SupabaseClient;

fn main() -> Result<()> {
    load_dotenv();
    let config = AppConfig::from_env();
    let client = SupabaseClient::from_config(&config)
        .context("SUPABASE_URL and SUPABASE_ANON_KEY must be set")?;
    let db_path = parse_db_path_arg()
        .or_else(|| config.db_path.clone())
        .context("unable to resolve sqlite path")?;

    let catalog = load_catalog(&client)?;
    let mut store = SqliteStore::open(&db_path)?;
    let written = store.upsert_players(catalog.players())?;

    println!("Player catalog ingest complete");
    println!("DB: {}", db_path.display());
    println!("Players upserted: {written}");
    let counts = position_counts(catalog.players())
        .into_iter()
        .map(|(category, n)| format!("{} {n}", category_short_label(category)))
        .collect::<Vec<_>>()
        .join(", ");
    println!("By position: {counts}");

    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
