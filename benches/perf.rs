use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use wc26_roster::export::export_roster;
use wc26_roster::player::Player;
use wc26_roster::roster::{RosterState, filter_candidate_pool, grouped_by_category};
use wc26_roster::supabase::{merge_catalog, parse_players_json, parse_summary_json};

const POSITIONS: [&str; 12] = [
    "GK", "CB", "LB", "RB", "DM", "CM", "AM", "LW", "RW", "ST", "SW", "",
];
const SURNAMES: [&str; 10] = [
    "Pulisic", "Álvarez", "Robinson", "Øvrebø", "smith", "Smith", "Zendejas", "Ream",
    "Łukasz", "Adams",
];

fn catalog(size: u32) -> Vec<Player> {
    (0..size)
        .map(|id| {
            let surname = SURNAMES[id as usize % SURNAMES.len()];
            let position = POSITIONS[id as usize % POSITIONS.len()];
            let position = (!position.is_empty()).then_some(position);
            Player::new(id, &format!("Player{id} {surname}"), position).with_last_name(surname)
        })
        .collect()
}

fn filled_state(players: &[Player]) -> RosterState {
    let mut state = RosterState::new();
    for p in players {
        if state.is_full() {
            break;
        }
        let _ = state.add_player(p);
    }
    state
}

fn bench_candidate_pool(c: &mut Criterion) {
    let players = catalog(2_000);
    let state = filled_state(&players);
    c.bench_function("candidate_pool_search", |b| {
        b.iter(|| {
            let pool = filter_candidate_pool(
                black_box(&players),
                state.squad(),
                black_box("smith"),
                None,
            );
            black_box(pool.len());
        })
    });
}

fn bench_grouped_view(c: &mut Criterion) {
    let players = catalog(200);
    let state = filled_state(&players);
    c.bench_function("grouped_by_category", |b| {
        b.iter(|| {
            let groups = grouped_by_category(black_box(state.squad()));
            black_box(groups.len());
        })
    });
    c.bench_function("export_roster", |b| {
        b.iter(|| black_box(export_roster(black_box(state.squad()))).len())
    });
}

fn bench_catalog_merge(c: &mut Criterion) {
    let players_json = serde_json::to_string(
        &(0..1_000)
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "full_name": format!("Player {id}"),
                    "last_name": SURNAMES[id % SURNAMES.len()],
                    "position": POSITIONS[id % POSITIONS.len()],
                })
            })
            .collect::<Vec<_>>(),
    )
    .expect("serializable");
    let summary_json = serde_json::to_string(
        &(0..1_000)
            .map(|id| {
                serde_json::json!({
                    "player_id": id,
                    "matches_played": id % 40,
                    "total_goals": (id % 9).to_string(),
                    "avg_match_rating": 6.0 + (id % 20) as f64 / 10.0,
                })
            })
            .collect::<Vec<_>>(),
    )
    .expect("serializable");

    c.bench_function("catalog_parse_merge", |b| {
        b.iter(|| {
            let rows = parse_players_json(black_box(&players_json)).unwrap();
            let summaries = parse_summary_json(black_box(&summary_json)).unwrap();
            black_box(merge_catalog(rows, &summaries).len());
        })
    });
}

criterion_group!(
    perf,
    bench_candidate_pool,
    bench_grouped_view,
    bench_catalog_merge
);
criterion_main!(perf);
