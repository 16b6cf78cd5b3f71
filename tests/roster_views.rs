use wc26_roster::player::Player;
use wc26_roster::position::PositionCategory;
use wc26_roster::roster::{
    RosterState, filter_candidate_pool, grouped_by_category, position_counts,
};

fn named(id: u32, full: &str, last: &str, position: Option<&str>) -> Player {
    Player::new(id, full, position).with_last_name(last)
}

fn catalog() -> Vec<Player> {
    vec![
        named(1, "Zack Steffen", "Steffen", Some("GK")),
        named(2, "Matt Turner", "Turner", Some("GK")),
        named(3, "Antonee Robinson", "Robinson", Some("LB")),
        named(4, "Chris Richards", "Richards", Some("CB")),
        named(5, "Adam Smith", "Smith", Some("RB")),
        named(6, "Jordan Smithson", "Smithson", Some("CB")),
        named(7, "Kelly Smith", "Smith", Some("ST")),
        named(8, "Blacksmith Álvarez", "Álvarez", Some("CB")),
        named(9, "Tyler Adams", "Adams", Some("DM")),
        named(10, "Christian Pulisic", "Pulisic", Some("LW")),
        named(11, "Mystery Man", "", Some("SW")),
        Player::new(12, "Nameless", None),
    ]
}

#[test]
fn groups_in_category_order_with_sorted_names() {
    let squad = catalog();
    let groups = grouped_by_category(&squad);
    let order: Vec<PositionCategory> = groups.iter().map(|g| g.category).collect();
    assert_eq!(
        order,
        vec![
            PositionCategory::Goalkeeper,
            PositionCategory::Defender,
            PositionCategory::Midfielder,
            PositionCategory::Forward,
            PositionCategory::Unknown,
        ]
    );

    let keepers: Vec<&str> = groups[0].players.iter().map(|p| p.sort_name()).collect();
    assert_eq!(keepers, vec!["Steffen", "Turner"]);

    let defenders: Vec<&str> = groups[1].players.iter().map(|p| p.sort_name()).collect();
    assert_eq!(
        defenders,
        vec!["Álvarez", "Richards", "Robinson", "Smith", "Smithson"]
    );

    let unknown: Vec<&str> = groups[4].players.iter().map(|p| p.sort_name()).collect();
    assert_eq!(unknown, vec!["Mystery Man", "Nameless"]);
}

#[test]
fn empty_squad_has_no_groups() {
    assert!(grouped_by_category(&[]).is_empty());
}

#[test]
fn counts_sum_to_squad_size() {
    let squad = catalog();
    let counts = position_counts(&squad);
    assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), squad.len());
    assert_eq!(counts[0], (PositionCategory::Goalkeeper, 2));
    assert_eq!(counts[1], (PositionCategory::Defender, 5));
    assert_eq!(counts[4], (PositionCategory::Unknown, 2));

    let empty = position_counts(&[]);
    assert_eq!(empty.len(), 4);
    assert!(empty.iter().all(|(_, n)| *n == 0));
}

#[test]
fn pool_filters_by_search_and_category() {
    let all = catalog();
    let mut state = RosterState::new();
    state.add_player(&all[5]).unwrap();

    let pool = filter_candidate_pool(
        &all,
        state.squad(),
        "Smith",
        Some(PositionCategory::Defender),
    );
    let ids: Vec<u32> = pool.iter().map(|p| p.id).collect();
    // Smithson is already selected and Kelly Smith is a forward.
    assert_eq!(ids, vec![8, 5]);
    assert!(pool.iter().all(|p| p.category() == PositionCategory::Defender));
    assert!(
        pool.iter()
            .all(|p| p.full_name.to_lowercase().contains("smith"))
    );
}

#[test]
fn pool_without_filters_excludes_squad_and_sorts() {
    let all = catalog();
    let mut state = RosterState::new();
    state.add_player(&all[9]).unwrap();
    state.add_player(&all[0]).unwrap();

    let pool = state.candidate_pool(&all);
    assert_eq!(pool.len(), all.len() - 2);
    assert!(pool.iter().all(|p| p.id != 10 && p.id != 1));
    let names: Vec<&str> = pool.iter().map(|p| p.sort_name()).collect();
    assert_eq!(names.first(), Some(&"Adams"));
}

#[test]
fn filters_do_not_touch_the_squad() {
    let all = catalog();
    let mut state = RosterState::new();
    for p in &all[..4] {
        state.add_player(p).unwrap();
    }
    state.filters.search = "zzz".to_string();
    state.filters.category = Some(PositionCategory::Forward);
    assert!(state.candidate_pool(&all).is_empty());
    assert_eq!(state.len(), 4);
    assert_eq!(state.grouped().len(), 2);
}

#[test]
fn summary_tracks_progress() {
    let all = catalog();
    let mut state = RosterState::new();
    for p in &all[..4] {
        state.add_player(p).unwrap();
    }
    state.toggle_starter(1);
    let summary = state.summary();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.capacity, 26);
    assert_eq!(summary.open_slots, 22);
    assert_eq!(summary.starters, 1);
    assert_eq!(summary.progress_pct, 15);
    assert!(!summary.is_complete);
}
