use std::cmp::Ordering;

use anyhow::Result;
use serde::Deserialize;

use crate::player::{NOT_AVAILABLE, PlayerId, PlayerSummaryRow};

pub const TOP_PERFORMERS_LIMIT: usize = 5;
pub const FORM_WINDOW: usize = 3;

const PERCENTAGE_METRICS: [&str; 4] = [
    "shot_accuracy",
    "pass_completion",
    "duel_win_pct",
    "possession_pct",
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatchRow {
    #[serde(default)]
    pub kickoff_utc: Option<String>,
    #[serde(default)]
    pub opponent_name: Option<String>,
    #[serde(default)]
    pub usa_score: Option<i64>,
    #[serde(default)]
    pub opponent_score: Option<i64>,
    #[serde(default)]
    pub result_char: Option<String>,
    #[serde(default)]
    pub possession_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultCorrelationMetric {
    #[serde(default)]
    pub metric_key: Option<String>,
    #[serde(default)]
    pub metric_label: Option<String>,
    #[serde(default)]
    pub delta_win_loss: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TimelineRow {
    #[serde(default)]
    pub kickoff_utc: Option<String>,
    #[serde(default)]
    pub opponent_name: Option<String>,
    #[serde(default)]
    pub match_rating: Option<f64>,
    #[serde(default)]
    pub pass_completion_pct: Option<f64>,
    #[serde(default)]
    pub def_actions_per_90: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStats {
    pub matches_played: usize,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_difference: i64,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub clean_sheets: usize,
    pub avg_goals_per_match: f64,
    pub avg_possession: Option<f64>,
    pub avg_player_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopPerformer {
    pub full_name: String,
    pub position: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopPerformers {
    pub top_scorers: Vec<TopPerformer>,
    pub top_assisters: Vec<TopPerformer>,
    pub top_rated: Vec<TopPerformer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchTrend {
    pub date: String,
    pub opponent: String,
    pub goals_for: i64,
    pub goals_against: i64,
    pub points: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub team: TeamStats,
    pub performers: TopPerformers,
    pub trends: Vec<MatchTrend>,
    pub drivers: Vec<ResultCorrelationMetric>,
    /// Non-fatal problems from optional reads.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerForm {
    pub player_id: PlayerId,
    pub timeline: Vec<TimelineRow>,
    pub rating_trend: Vec<Option<f64>>,
}

/// Read-only aggregates behind the dashboard pages. Reads are independent and
/// may run concurrently.
pub trait DashboardSource: Sync {
    fn fetch_finished_matches(&self) -> Result<Vec<MatchRow>>;
    fn fetch_match_ratings(&self) -> Result<Vec<Option<f64>>>;
    fn fetch_player_summaries(&self) -> Result<Vec<PlayerSummaryRow>>;
    fn fetch_correlation_metrics(&self) -> Result<Vec<ResultCorrelationMetric>>;
    fn fetch_player_timeline(&self, player_id: PlayerId) -> Result<Vec<TimelineRow>>;
}

pub fn load_dashboard(source: &dyn DashboardSource) -> Result<Dashboard> {
    let ((matches, ratings), (summaries, drivers)) = rayon::join(
        || {
            rayon::join(
                || source.fetch_finished_matches(),
                || source.fetch_match_ratings(),
            )
        },
        || {
            rayon::join(
                || source.fetch_player_summaries(),
                || source.fetch_correlation_metrics(),
            )
        },
    );
    let matches = matches?;
    let ratings = ratings?;

    let mut warnings = Vec::new();
    let performers = match summaries {
        Ok(rows) => top_performers(&rows, TOP_PERFORMERS_LIMIT),
        Err(err) => {
            warnings.push(format!("top performers: {err:#}"));
            TopPerformers::default()
        }
    };
    let drivers = drivers.unwrap_or_else(|err| {
        warnings.push(format!("win/loss drivers: {err:#}"));
        Vec::new()
    });

    Ok(Dashboard {
        team: compute_team_stats(&matches, &ratings),
        performers,
        trends: match_trends(&matches),
        drivers,
        warnings,
    })
}

pub fn load_player_form(source: &dyn DashboardSource, player_id: PlayerId) -> Result<PlayerForm> {
    let mut timeline = source.fetch_player_timeline(player_id)?;
    timeline.sort_by(|a, b| cmp_kickoff(a.kickoff_utc.as_deref(), b.kickoff_utc.as_deref()));
    let ratings: Vec<Option<f64>> = timeline.iter().map(|row| row.match_rating).collect();
    Ok(PlayerForm {
        player_id,
        rating_trend: rolling_average(&ratings, FORM_WINDOW),
        timeline,
    })
}

pub fn compute_team_stats(matches: &[MatchRow], ratings: &[Option<f64>]) -> TeamStats {
    let matches_played = matches.len();
    let goals_for: i64 = matches.iter().map(|m| m.usa_score.unwrap_or(0)).sum();
    let goals_against: i64 = matches.iter().map(|m| m.opponent_score.unwrap_or(0)).sum();
    let result_count = |code: &str| {
        matches
            .iter()
            .filter(|m| result_is(m.result_char.as_deref(), code))
            .count()
    };
    let avg_goals_per_match = if matches_played > 0 {
        goals_for as f64 / matches_played as f64
    } else {
        0.0
    };

    TeamStats {
        matches_played,
        goals_for,
        goals_against,
        goal_difference: goals_for - goals_against,
        wins: result_count("W"),
        draws: result_count("D"),
        losses: result_count("L"),
        clean_sheets: matches.iter().filter(|m| m.opponent_score == Some(0)).count(),
        avg_goals_per_match,
        avg_possession: mean_present(matches.iter().map(|m| m.possession_pct)),
        avg_player_rating: mean_present(ratings.iter().copied()),
    }
}

pub fn top_performers(rows: &[PlayerSummaryRow], limit: usize) -> TopPerformers {
    TopPerformers {
        top_scorers: top_by(rows, limit, |r| r.total_goals.map(f64::from)),
        top_assisters: top_by(rows, limit, |r| r.total_assists.map(f64::from)),
        top_rated: top_by(rows, limit, |r| r.avg_match_rating),
    }
}

/// Descending by `key`, missing values last, stable on ties.
fn top_by(
    rows: &[PlayerSummaryRow],
    limit: usize,
    key: impl Fn(&PlayerSummaryRow) -> Option<f64>,
) -> Vec<TopPerformer> {
    let mut ranked: Vec<(&PlayerSummaryRow, Option<f64>)> =
        rows.iter().map(|r| (r, key(r))).collect();
    ranked.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|(row, value)| TopPerformer {
            full_name: row
                .full_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            position: row
                .position
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            value: value.unwrap_or(0.0),
        })
        .collect()
}

pub fn points_for_result(result_char: Option<&str>) -> u8 {
    if result_is(result_char, "W") {
        3
    } else if result_is(result_char, "D") {
        1
    } else {
        0
    }
}

/// Finished matches in kickoff order (undated last).
pub fn match_trends(matches: &[MatchRow]) -> Vec<MatchTrend> {
    let mut ordered: Vec<&MatchRow> = matches.iter().collect();
    ordered.sort_by(|a, b| cmp_kickoff(a.kickoff_utc.as_deref(), b.kickoff_utc.as_deref()));
    ordered
        .into_iter()
        .map(|m| MatchTrend {
            date: m.kickoff_utc.clone().unwrap_or_default(),
            opponent: m
                .opponent_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            goals_for: m.usa_score.unwrap_or(0),
            goals_against: m.opponent_score.unwrap_or(0),
            points: points_for_result(m.result_char.as_deref()),
        })
        .collect()
}

/// Trailing mean over the last `window` entries, skipping gaps. A point with
/// no values in its window stays `None`.
pub fn rolling_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean_present(values[start..=i].iter().copied())
        })
        .collect()
}

pub fn format_metric_value(value: Option<f64>, metric_key: Option<&str>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    if metric_key.is_some_and(|key| PERCENTAGE_METRICS.contains(&key)) {
        format!("{value:.1}%")
    } else {
        format!("{value:.2}")
    }
}

fn result_is(result_char: Option<&str>, code: &str) -> bool {
    result_char.is_some_and(|r| r.trim().eq_ignore_ascii_case(code))
}

fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ISO-8601 timestamps order correctly as strings.
fn cmp_kickoff(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
