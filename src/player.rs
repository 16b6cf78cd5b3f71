use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::position::{PositionCategory, category_from_position};

pub type PlayerId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub full_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub stats: PlayerStats,
}

/// Aggregates from the summary view. Display and sorting only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub matches_played: Option<u32>,
    pub total_goals: Option<u32>,
    pub total_assists: Option<u32>,
    pub total_minutes: Option<u32>,
    pub avg_match_rating: Option<f64>,
    pub pass_completion_pct: Option<f64>,
    pub tackles_per_90: Option<f64>,
    pub interceptions_per_90: Option<f64>,
}

impl Player {
    pub fn new(id: PlayerId, full_name: &str, position: Option<&str>) -> Self {
        Self {
            id,
            full_name: full_name.to_string(),
            first_name: None,
            last_name: None,
            position: position.map(str::to_string),
            stats: PlayerStats::default(),
        }
    }

    pub fn with_last_name(mut self, last_name: &str) -> Self {
        self.last_name = Some(last_name.to_string());
        self
    }

    pub fn category(&self) -> PositionCategory {
        category_from_position(self.position.as_deref())
    }

    /// Last name when present and non-empty, otherwise the full name.
    pub fn sort_name(&self) -> &str {
        self.last_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.full_name)
    }

    /// Raw position code for tables and exports.
    pub fn position_code(&self) -> &str {
        self.position
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(NOT_AVAILABLE)
    }
}

/// Row of the `player_advanced_summary` view. Every column may be null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerSummaryRow {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub player_id: Option<u32>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub matches_played: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_goals: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_assists: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_minutes: Option<u32>,
    #[serde(default)]
    pub avg_match_rating: Option<f64>,
    #[serde(default)]
    pub pass_completion_pct: Option<f64>,
    #[serde(default)]
    pub tackles_per_90: Option<f64>,
    #[serde(default)]
    pub interceptions_per_90: Option<f64>,
}

impl PlayerSummaryRow {
    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            matches_played: self.matches_played,
            total_goals: self.total_goals,
            total_assists: self.total_assists,
            total_minutes: self.total_minutes,
            avg_match_rating: self.avg_match_rating,
            pass_completion_pct: self.pass_completion_pct,
            tackles_per_90: self.tackles_per_90,
            interceptions_per_90: self.interceptions_per_90,
        }
    }
}

/// Views hand back counters as integers, floats or numeric strings depending
/// on the column type; anything unusable becomes `None`.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| *f >= 0.0)
            .map(|f| f.round() as u32),
        _ => None,
    }))
}

pub const NOT_AVAILABLE: &str = "N/A";

pub fn display_int(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn display_decimal(value: Option<f64>, decimals: usize) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn display_percent(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{v:.1}%"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Zero fallback for counters shown as plain numbers ("0 goals").
pub fn count_or_zero(value: Option<u32>) -> u32 {
    value.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_name_falls_back_to_full_name() {
        let p = Player::new(1, "Christian Pulisic", Some("RW"));
        assert_eq!(p.sort_name(), "Christian Pulisic");
        let p = p.with_last_name("Pulisic");
        assert_eq!(p.sort_name(), "Pulisic");
        let mut p = Player::new(2, "Tyler Adams", Some("DM"));
        p.last_name = Some(String::new());
        assert_eq!(p.sort_name(), "Tyler Adams");
    }

    #[test]
    fn display_helpers_coalesce() {
        assert_eq!(display_int(None), "N/A");
        assert_eq!(display_int(Some(4)), "4");
        assert_eq!(display_decimal(Some(7.256), 2), "7.26");
        assert_eq!(display_decimal(Some(f64::NAN), 1), "N/A");
        assert_eq!(display_percent(Some(88.04)), "88.0%");
        assert_eq!(count_or_zero(None), 0);
    }

    #[test]
    fn position_code_defaults() {
        assert_eq!(Player::new(1, "A", None).position_code(), "N/A");
        assert_eq!(Player::new(1, "A", Some("CB")).position_code(), "CB");
    }
}
