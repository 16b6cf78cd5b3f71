use anyhow::{Result, anyhow};

use wc26_roster::dashboard::{
    DashboardSource, MatchRow, ResultCorrelationMetric, TimelineRow, load_dashboard,
    load_player_form,
};
use wc26_roster::player::{PlayerId, PlayerSummaryRow};

struct FakeSource {
    fail_drivers: bool,
    fail_matches: bool,
}

fn finished(kickoff: &str, us: i64, them: i64, result: &str) -> MatchRow {
    MatchRow {
        kickoff_utc: Some(kickoff.to_string()),
        opponent_name: Some("Opponent".to_string()),
        usa_score: Some(us),
        opponent_score: Some(them),
        result_char: Some(result.to_string()),
        possession_pct: Some(50.0),
    }
}

fn summary(
    name: &str,
    goals: Option<u32>,
    assists: Option<u32>,
    rating: Option<f64>,
) -> PlayerSummaryRow {
    PlayerSummaryRow {
        full_name: Some(name.to_string()),
        position: Some("ST".to_string()),
        total_goals: goals,
        total_assists: assists,
        avg_match_rating: rating,
        ..Default::default()
    }
}

impl DashboardSource for FakeSource {
    fn fetch_finished_matches(&self) -> Result<Vec<MatchRow>> {
        if self.fail_matches {
            return Err(anyhow!("matches offline"));
        }
        Ok(vec![
            finished("2024-07-02T00:00:00Z", 3, 0, "W"),
            finished("2024-06-20T00:00:00Z", 0, 1, "L"),
        ])
    }

    fn fetch_match_ratings(&self) -> Result<Vec<Option<f64>>> {
        Ok(vec![Some(6.0), None, Some(8.0)])
    }

    fn fetch_player_summaries(&self) -> Result<Vec<PlayerSummaryRow>> {
        let mut rows: Vec<PlayerSummaryRow> = (0..8)
            .map(|i| {
                let rating = 6.0 + f64::from(i) / 10.0;
                summary(&format!("P{i}"), Some(i), None, Some(rating))
            })
            .collect();
        rows.push(summary("No Data", None, Some(9), None));
        Ok(rows)
    }

    fn fetch_correlation_metrics(&self) -> Result<Vec<ResultCorrelationMetric>> {
        if self.fail_drivers {
            return Err(anyhow!("view missing"));
        }
        Ok(vec![ResultCorrelationMetric {
            metric_key: Some("pass_completion".to_string()),
            metric_label: Some("Pass completion".to_string()),
            delta_win_loss: Some(6.25),
        }])
    }

    fn fetch_player_timeline(&self, player_id: PlayerId) -> Result<Vec<TimelineRow>> {
        if player_id != 9 {
            return Ok(Vec::new());
        }
        let row = |kickoff: &str, rating: Option<f64>| TimelineRow {
            kickoff_utc: Some(kickoff.to_string()),
            match_rating: rating,
            ..Default::default()
        };
        Ok(vec![
            row("2024-06-20T00:00:00Z", Some(8.0)),
            row("2024-06-01T00:00:00Z", Some(6.0)),
            row("2024-06-10T00:00:00Z", None),
        ])
    }
}

#[test]
fn loads_full_dashboard() {
    let source = FakeSource {
        fail_drivers: false,
        fail_matches: false,
    };
    let dashboard = load_dashboard(&source).expect("dashboard loads");
    assert_eq!(dashboard.team.matches_played, 2);
    assert_eq!(dashboard.team.avg_player_rating, Some(7.0));
    assert_eq!(dashboard.trends[0].points, 0);
    assert_eq!(dashboard.trends[1].points, 3);

    let scorers = &dashboard.performers.top_scorers;
    assert_eq!(scorers.len(), 5);
    assert_eq!(scorers[0].full_name, "P7");
    assert_eq!(scorers[0].value, 7.0);
    assert_eq!(dashboard.performers.top_assisters[0].full_name, "No Data");
    assert_eq!(dashboard.performers.top_assisters[1].value, 0.0);
    assert_eq!(dashboard.drivers.len(), 1);
    assert!(dashboard.warnings.is_empty());
}

#[test]
fn missing_drivers_only_warn() {
    let source = FakeSource {
        fail_drivers: true,
        fail_matches: false,
    };
    let dashboard = load_dashboard(&source).expect("dashboard still loads");
    assert!(dashboard.drivers.is_empty());
    assert_eq!(dashboard.warnings.len(), 1);
    assert!(dashboard.warnings[0].contains("view missing"));
}

#[test]
fn match_failure_fails_the_dashboard() {
    let source = FakeSource {
        fail_drivers: false,
        fail_matches: true,
    };
    let err = load_dashboard(&source).unwrap_err();
    assert!(format!("{err:#}").contains("matches offline"));
}

#[test]
fn player_form_is_ordered_with_rolling_trend() {
    let source = FakeSource {
        fail_drivers: false,
        fail_matches: false,
    };
    let form = load_player_form(&source, 9).expect("form loads");
    let dates: Vec<&str> = form
        .timeline
        .iter()
        .filter_map(|row| row.kickoff_utc.as_deref())
        .collect();
    assert_eq!(
        dates,
        vec![
            "2024-06-01T00:00:00Z",
            "2024-06-10T00:00:00Z",
            "2024-06-20T00:00:00Z"
        ]
    );
    assert_eq!(form.rating_trend, vec![Some(6.0), Some(6.0), Some(7.0)]);

    let empty = load_player_form(&source, 1).unwrap();
    assert!(empty.timeline.is_empty());
    assert!(empty.rating_trend.is_empty());
}
