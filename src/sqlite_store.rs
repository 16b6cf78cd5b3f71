use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::catalog::PlayerSource;
use crate::player::{Player, PlayerId, PlayerStats};
use crate::position::{PositionCategory, category_short_label};
use crate::session::SessionId;
use crate::store::{RosterId, RosterRecord, RosterStore, SavedRoster, SavedSelection};

/// Local store with the same tables as the remote one: a `players` snapshot,
/// `user_rosters` and `roster_selections`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Replaces the stored players snapshot. Returns the number of rows written.
    pub fn upsert_players(&mut self, players: &[Player]) -> Result<usize> {
        let updated_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().context("begin players transaction")?;
        for player in players {
            let s = &player.stats;
            tx.execute(
                "INSERT INTO players(id, full_name, first_name, last_name, position,
                    matches_played, total_goals, total_assists, total_minutes, avg_match_rating,
                    pass_completion_pct, tackles_per_90, interceptions_per_90, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(id) DO UPDATE SET
                    full_name = excluded.full_name,
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    position = excluded.position,
                    matches_played = excluded.matches_played,
                    total_goals = excluded.total_goals,
                    total_assists = excluded.total_assists,
                    total_minutes = excluded.total_minutes,
                    avg_match_rating = excluded.avg_match_rating,
                    pass_completion_pct = excluded.pass_completion_pct,
                    tackles_per_90 = excluded.tackles_per_90,
                    interceptions_per_90 = excluded.interceptions_per_90,
                    updated_at = excluded.updated_at",
                params![
                    player.id,
                    player.full_name,
                    player.first_name,
                    player.last_name,
                    player.position,
                    s.matches_played,
                    s.total_goals,
                    s.total_assists,
                    s.total_minutes,
                    s.avg_match_rating,
                    s.pass_completion_pct,
                    s.tackles_per_90,
                    s.interceptions_per_90,
                    updated_at,
                ],
            )
            .with_context(|| format!("upsert player {}", player.id))?;
        }
        tx.commit().context("commit players transaction")?;
        Ok(players.len())
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY,
            full_name TEXT NOT NULL,
            first_name TEXT NULL,
            last_name TEXT NULL,
            position TEXT NULL,
            matches_played INTEGER NULL,
            total_goals INTEGER NULL,
            total_assists INTEGER NULL,
            total_minutes INTEGER NULL,
            avg_match_rating REAL NULL,
            pass_completion_pct REAL NULL,
            tackles_per_90 REAL NULL,
            interceptions_per_90 REAL NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_rosters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            roster_name TEXT NOT NULL,
            session_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_rosters_session ON user_rosters(session_id);

        CREATE TABLE IF NOT EXISTS roster_selections (
            roster_id INTEGER NOT NULL REFERENCES user_rosters(id) ON DELETE CASCADE,
            player_id INTEGER NOT NULL,
            position_group TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            PRIMARY KEY (roster_id, player_id)
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn parse_roster_id(roster: &RosterId) -> Result<i64> {
    roster
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow!("invalid local roster id {roster:?}"))
}

impl PlayerSource for SqliteStore {
    fn fetch_all_players(&self) -> Result<Vec<Player>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, full_name, first_name, last_name, position,
                    matches_played, total_goals, total_assists, total_minutes, avg_match_rating,
                    pass_completion_pct, tackles_per_90, interceptions_per_90
                 FROM players",
            )
            .context("prepare players query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Player {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                    first_name: row.get(2)?,
                    last_name: row.get(3)?,
                    position: row.get(4)?,
                    stats: PlayerStats {
                        matches_played: row.get(5)?,
                        total_goals: row.get(6)?,
                        total_assists: row.get(7)?,
                        total_minutes: row.get(8)?,
                        avg_match_rating: row.get(9)?,
                        pass_completion_pct: row.get(10)?,
                        tackles_per_90: row.get(11)?,
                        interceptions_per_90: row.get(12)?,
                    },
                })
            })
            .context("query players")?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("read player row")?);
        }
        Ok(out)
    }
}

impl RosterStore for SqliteStore {
    fn create_roster(&self, session: &SessionId, name: &str) -> Result<RosterId> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO user_rosters(roster_name, session_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)",
                params![name, session.as_str(), now],
            )
            .context("insert roster")?;
        Ok(self.conn.last_insert_rowid().to_string())
    }

    fn add_selection(
        &self,
        roster: &RosterId,
        player_id: PlayerId,
        category: PositionCategory,
        sort_order: usize,
    ) -> Result<()> {
        let roster_id = parse_roster_id(roster)?;
        self.conn
            .execute(
                "INSERT INTO roster_selections(roster_id, player_id, position_group, sort_order)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(roster_id, player_id) DO UPDATE SET
                    position_group = excluded.position_group,
                    sort_order = excluded.sort_order",
                params![
                    roster_id,
                    player_id,
                    category_short_label(category),
                    sort_order as i64
                ],
            )
            .context("insert roster selection")?;
        Ok(())
    }

    fn remove_selection(&self, roster: &RosterId, player_id: PlayerId) -> Result<()> {
        let roster_id = parse_roster_id(roster)?;
        self.conn
            .execute(
                "DELETE FROM roster_selections WHERE roster_id = ?1 AND player_id = ?2",
                params![roster_id, player_id],
            )
            .context("delete roster selection")?;
        Ok(())
    }

    fn rename_roster(&self, roster: &RosterId, name: &str) -> Result<()> {
        let roster_id = parse_roster_id(roster)?;
        let changed = self
            .conn
            .execute(
                "UPDATE user_rosters SET roster_name = ?1, updated_at = ?2 WHERE id = ?3",
                params![name, Utc::now().to_rfc3339(), roster_id],
            )
            .context("rename roster")?;
        if changed == 0 {
            return Err(anyhow!("roster {roster} not found"));
        }
        Ok(())
    }

    fn load_roster(&self, roster: &RosterId) -> Result<Option<SavedRoster>> {
        let roster_id = parse_roster_id(roster)?;
        let record = self
            .conn
            .query_row(
                "SELECT id, roster_name, session_id, created_at, updated_at
                 FROM user_rosters WHERE id = ?1",
                params![roster_id],
                read_record,
            )
            .optional()
            .context("load roster")?;
        let Some(record) = record else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare(
                "SELECT player_id, position_group, sort_order
                 FROM roster_selections WHERE roster_id = ?1 ORDER BY sort_order",
            )
            .context("prepare selections query")?;
        let rows = stmt
            .query_map(params![roster_id], |row| {
                let sort_order: i64 = row.get(2)?;
                Ok(SavedSelection {
                    player_id: row.get(0)?,
                    position_group: row.get(1)?,
                    sort_order: usize::try_from(sort_order).unwrap_or_default(),
                })
            })
            .context("query selections")?;
        let mut selections = Vec::new();
        for row in rows {
            selections.push(row.context("read selection row")?);
        }
        Ok(Some(SavedRoster { record, selections }))
    }

    fn list_rosters(&self, session: &SessionId) -> Result<Vec<RosterRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, roster_name, session_id, created_at, updated_at
                 FROM user_rosters WHERE session_id = ?1 ORDER BY updated_at DESC, id DESC",
            )
            .context("prepare rosters query")?;
        let rows = stmt
            .query_map(params![session.as_str()], read_record)
            .context("query rosters")?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("read roster row")?);
        }
        Ok(out)
    }
}

fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RosterRecord> {
    let id: i64 = row.get(0)?;
    Ok(RosterRecord {
        id: id.to_string(),
        roster_name: row.get(1)?,
        session_id: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
