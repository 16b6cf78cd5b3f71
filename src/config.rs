use std::env;
use std::path::PathBuf;

const CACHE_DIR: &str = "wc26_roster";
const DEFAULT_ROSTER_NAME: &str = "My World Cup Roster";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgREST base, e.g. `https://xyz.supabase.co`. Absent means the
    /// local SQLite store is used for everything.
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub db_path: Option<PathBuf>,
    pub roster_name: String,
    pub export_dir: PathBuf,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Reads the process environment. Call `load_dotenv` first to pick up
    /// `.env.local` / `.env`.
    pub fn from_env() -> Self {
        let supabase_url =
            non_empty_var("SUPABASE_URL").map(|url| url.trim().trim_end_matches('/').to_string());
        let supabase_key = non_empty_var("SUPABASE_ANON_KEY");
        let db_path = non_empty_var("ROSTER_DB")
            .map(PathBuf::from)
            .or_else(|| app_cache_dir().map(|dir| dir.join("rosters.sqlite")));
        let roster_name =
            non_empty_var("ROSTER_NAME").unwrap_or_else(|| DEFAULT_ROSTER_NAME.to_string());
        let export_dir = non_empty_var("ROSTER_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(3, 60);
        Self {
            supabase_url,
            supabase_key,
            db_path,
            roster_name,
            export_dir,
            http_timeout_secs,
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_key.is_some()
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Some(base) = non_empty_var("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = non_empty_var("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}
