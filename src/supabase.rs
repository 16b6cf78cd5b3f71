use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use crate::catalog::PlayerSource;
use crate::config::AppConfig;
use crate::dashboard::{DashboardSource, MatchRow, ResultCorrelationMetric, TimelineRow};
use crate::http_client::http_client;
use crate::player::{Player, PlayerId, PlayerSummaryRow, lenient_u32};
use crate::position::{PositionCategory, category_short_label};
use crate::session::SessionId;
use crate::store::{RosterId, RosterRecord, RosterStore, SavedRoster, SavedSelection};

const PLAYERS_SELECT: &str = "id,full_name,first_name,last_name,position";
const SELECTIONS_SELECT: &str = "player_id,position_group,sort_order";

/// Thin PostgREST client for the hosted tables and views.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

/// Row of the `players` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerRow {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub id: Option<u32>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default)]
    roster_name: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SelectionRow {
    #[serde(default, deserialize_with = "lenient_u32")]
    player_id: Option<u32>,
    #[serde(default)]
    position_group: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    sort_order: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(default)]
    match_rating: Option<f64>,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let url = config.supabase_url.as_deref()?;
        let key = config.supabase_key.as_deref()?;
        Some(Self::new(url, key, config.http_timeout_secs))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn client(&self) -> Result<&'static Client> {
        http_client(self.timeout_secs)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    fn send(&self, request: RequestBuilder, what: &str) -> Result<String> {
        let resp = self
            .authorized(request)
            .send()
            .with_context(|| format!("{what} request failed"))?;
        let status = resp.status();
        let body = resp
            .text()
            .with_context(|| format!("{what} response unreadable"))?;
        if !status.is_success() {
            return Err(anyhow!("{what}: http {status}: {}", body.trim()));
        }
        Ok(body)
    }

    fn get(&self, table: &str, query: &[(&str, String)]) -> Result<String> {
        let request = self.client()?.get(self.table_url(table)).query(query);
        self.send(request, table)
    }

    fn fetch_rows<T>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let body = self.get(table, query)?;
        parse_rows(&body).with_context(|| format!("invalid {table} json"))
    }

    pub fn fetch_player_rows(&self) -> Result<Vec<PlayerRow>> {
        self.fetch_rows("players", &[("select", PLAYERS_SELECT.to_string())])
    }

    pub fn fetch_summary_rows(&self) -> Result<Vec<PlayerSummaryRow>> {
        self.fetch_rows(
            "player_advanced_summary",
            &[
                ("select", "*".to_string()),
                ("order", "matches_played.desc.nullslast".to_string()),
            ],
        )
    }
}

/// Parses a PostgREST array body. An empty or `null` body is an empty result.
pub fn parse_rows<T>(raw: &str) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let rows: Option<Vec<T>> = serde_json::from_str(trimmed)?;
    Ok(rows.unwrap_or_default())
}

pub fn parse_players_json(raw: &str) -> Result<Vec<PlayerRow>> {
    parse_rows(raw).context("invalid players json")
}

pub fn parse_summary_json(raw: &str) -> Result<Vec<PlayerSummaryRow>> {
    parse_rows(raw).context("invalid player summary json")
}

/// Joins base rows with their summary aggregates. Rows without an id are
/// dropped; a missing name becomes "Unknown". Summaries keyed by player id;
/// the first summary for an id wins.
pub fn merge_catalog(rows: Vec<PlayerRow>, summaries: &[PlayerSummaryRow]) -> Vec<Player> {
    let mut by_id: HashMap<u32, &PlayerSummaryRow> = HashMap::new();
    for summary in summaries {
        if let Some(id) = summary.player_id {
            by_id.entry(id).or_insert(summary);
        }
    }

    rows.into_iter()
        .filter_map(|row| {
            let id = row.id?;
            let summary = by_id.get(&id);
            let full_name = row
                .full_name
                .filter(|name| !name.trim().is_empty())
                .or_else(|| summary.and_then(|s| s.full_name.clone()))
                .unwrap_or_else(|| "Unknown".to_string());
            let position = row
                .position
                .filter(|p| !p.trim().is_empty())
                .or_else(|| summary.and_then(|s| s.position.clone()));
            Some(Player {
                id,
                full_name,
                first_name: row.first_name,
                last_name: row.last_name,
                position,
                stats: summary.map(|s| s.stats()).unwrap_or_default(),
            })
        })
        .collect()
}

impl PlayerSource for SupabaseClient {
    fn fetch_all_players(&self) -> Result<Vec<Player>> {
        let (rows, summaries) =
            rayon::join(|| self.fetch_player_rows(), || self.fetch_summary_rows());
        let rows = rows?;
        // Aggregates are optional; players without them still show up.
        let summaries = summaries.unwrap_or_default();
        Ok(merge_catalog(rows, &summaries))
    }
}

impl RosterStore for SupabaseClient {
    fn create_roster(&self, session: &SessionId, name: &str) -> Result<RosterId> {
        let request = self
            .client()?
            .post(self.table_url("user_rosters"))
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .json(&json!({ "roster_name": name, "session_id": session.as_str() }));
        let body = self.send(request, "user_rosters")?;
        let created: Vec<RecordRow> = parse_rows(&body).context("invalid created roster json")?;
        created
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| anyhow!("roster insert returned no id"))
    }

    fn add_selection(
        &self,
        roster: &RosterId,
        player_id: PlayerId,
        category: PositionCategory,
        sort_order: usize,
    ) -> Result<()> {
        let request = self
            .client()?
            .post(self.table_url("roster_selections"))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!({
                "roster_id": roster,
                "player_id": player_id,
                "position_group": category_short_label(category),
                "sort_order": sort_order,
            }));
        self.send(request, "roster_selections")?;
        Ok(())
    }

    fn remove_selection(&self, roster: &RosterId, player_id: PlayerId) -> Result<()> {
        let request = self
            .client()?
            .delete(self.table_url("roster_selections"))
            .query(&[
                ("roster_id", format!("eq.{roster}")),
                ("player_id", format!("eq.{player_id}")),
            ]);
        self.send(request, "roster_selections")?;
        Ok(())
    }

    fn rename_roster(&self, roster: &RosterId, name: &str) -> Result<()> {
        let request = self
            .client()?
            .patch(self.table_url("user_rosters"))
            .query(&[("id", format!("eq.{roster}"))])
            .json(&json!({ "roster_name": name, "updated_at": Utc::now().to_rfc3339() }));
        self.send(request, "user_rosters")?;
        Ok(())
    }

    fn load_roster(&self, roster: &RosterId) -> Result<Option<SavedRoster>> {
        let records: Vec<RecordRow> = self.fetch_rows(
            "user_rosters",
            &[("select", "*".to_string()), ("id", format!("eq.{roster}"))],
        )?;
        let Some(record) = records.into_iter().next() else {
            return Ok(None);
        };
        let rows: Vec<SelectionRow> = self.fetch_rows(
            "roster_selections",
            &[
                ("select", SELECTIONS_SELECT.to_string()),
                ("roster_id", format!("eq.{roster}")),
                ("order", "sort_order.asc".to_string()),
            ],
        )?;
        let selections = rows
            .into_iter()
            .filter_map(|row| {
                Some(SavedSelection {
                    player_id: row.player_id?,
                    position_group: row.position_group.unwrap_or_default(),
                    sort_order: row.sort_order.unwrap_or_default() as usize,
                })
            })
            .collect();
        Ok(Some(SavedRoster {
            record: record_from_row(record),
            selections,
        }))
    }

    fn list_rosters(&self, session: &SessionId) -> Result<Vec<RosterRecord>> {
        let rows: Vec<RecordRow> = self.fetch_rows(
            "user_rosters",
            &[
                ("select", "*".to_string()),
                ("session_id", format!("eq.{session}")),
                ("order", "updated_at.desc".to_string()),
            ],
        )?;
        Ok(rows.into_iter().map(record_from_row).collect())
    }
}

impl DashboardSource for SupabaseClient {
    fn fetch_finished_matches(&self) -> Result<Vec<MatchRow>> {
        self.fetch_rows(
            "matches",
            &[
                ("select", "*".to_string()),
                ("finished", "eq.true".to_string()),
                ("order", "kickoff_utc.asc".to_string()),
            ],
        )
    }

    fn fetch_match_ratings(&self) -> Result<Vec<Option<f64>>> {
        let rows: Vec<RatingRow> = self.fetch_rows(
            "player_match_stats",
            &[("select", "match_rating".to_string())],
        )?;
        Ok(rows.into_iter().map(|row| row.match_rating).collect())
    }

    fn fetch_player_summaries(&self) -> Result<Vec<PlayerSummaryRow>> {
        self.fetch_summary_rows()
    }

    fn fetch_correlation_metrics(&self) -> Result<Vec<ResultCorrelationMetric>> {
        self.fetch_rows(
            "result_correlation_metrics",
            &[
                ("select", "*".to_string()),
                ("order", "delta_win_loss.desc.nullslast".to_string()),
            ],
        )
    }

    fn fetch_player_timeline(&self, player_id: PlayerId) -> Result<Vec<TimelineRow>> {
        self.fetch_rows(
            "player_match_timeline",
            &[
                ("select", "*".to_string()),
                ("player_id", format!("eq.{player_id}")),
                ("order", "kickoff_utc.asc".to_string()),
            ],
        )
    }
}

fn record_from_row(row: RecordRow) -> RosterRecord {
    RosterRecord {
        id: row.id,
        roster_name: row.roster_name.unwrap_or_default(),
        session_id: row.session_id.unwrap_or_default(),
        created_at: row.created_at.unwrap_or_default(),
        updated_at: row.updated_at.unwrap_or_default(),
    }
}

// Ids come back as integers or uuids depending on the table definition.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected id value {other}"
        ))),
    }
}
