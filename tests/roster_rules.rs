use wc26_roster::error::RosterError;
use wc26_roster::player::Player;
use wc26_roster::position::PositionCategory;
use wc26_roster::roster::{AddOutcome, RosterState, STARTER_CAPACITY, StarterToggle};

fn player(id: u32, name: &str, position: &str) -> Player {
    Player::new(id, name, Some(position))
}

fn numbered(start: u32, count: u32, position: &str) -> Vec<Player> {
    (start..start + count)
        .map(|id| player(id, &format!("Player {id}"), position))
        .collect()
}

fn full_squad() -> (RosterState, Vec<Player>) {
    let mut players = numbered(1, 3, "GK");
    players.extend(numbered(10, 10, "CB"));
    players.extend(numbered(30, 3, "CM"));
    players.extend(numbered(50, 10, "ST"));
    let mut state = RosterState::new();
    for p in &players {
        assert_eq!(state.add_player(p), Ok(AddOutcome::Added));
    }
    (state, players)
}

#[test]
fn fills_to_capacity_then_rejects_any_player() {
    let (mut state, _) = full_squad();
    assert_eq!(state.len(), 26);
    assert!(state.is_full());
    assert!(state.invariants_hold());

    let before = state.clone();
    let midfielder = player(99, "Extra Mid", "DM");
    assert_eq!(
        state.add_player(&midfielder),
        Err(RosterError::RosterFull { cap: 26 })
    );
    // Total capacity wins over the goalkeeper cap.
    let keeper = player(98, "Extra Keeper", "GK");
    assert_eq!(
        state.add_player(&keeper),
        Err(RosterError::RosterFull { cap: 26 })
    );
    assert_eq!(state, before);
}

#[test]
fn fourth_goalkeeper_is_rejected_without_changes() {
    let mut state = RosterState::new();
    for p in numbered(1, 3, "GK") {
        state.add_player(&p).unwrap();
    }
    let before = state.clone();
    let err = state.add_player(&player(4, "Fourth Keeper", "gk")).unwrap_err();
    assert_eq!(
        err,
        RosterError::PositionCapExceeded {
            category: PositionCategory::Goalkeeper,
            cap: 3
        }
    );
    assert_eq!(err.to_string(), "Maximum 3 Goalkeeper players allowed.");
    assert_eq!(state, before);
}

#[test]
fn adding_twice_is_idempotent() {
    let mut state = RosterState::new();
    let p = player(7, "Weston McKennie", "CM");
    assert_eq!(state.add_player(&p), Ok(AddOutcome::Added));
    let once = state.clone();
    assert_eq!(state.add_player(&p), Ok(AddOutcome::AlreadyPresent));
    assert_eq!(state, once);
    assert_eq!(state.len(), 1);
}

#[test]
fn unknown_positions_have_no_category_cap() {
    let mut state = RosterState::new();
    for id in 0..12 {
        let p = Player::new(id, &format!("Mystery {id}"), None);
        assert_eq!(state.add_player(&p), Ok(AddOutcome::Added));
    }
    let odd = player(100, "Sweeper", "SW");
    assert_eq!(state.add_player(&odd), Ok(AddOutcome::Added));
    assert_eq!(state.len(), 13);
}

#[test]
fn removing_a_starter_drops_it_from_starters() {
    let mut state = RosterState::new();
    let p = player(5, "Tim Ream", "CB");
    state.add_player(&p).unwrap();
    assert_eq!(state.toggle_starter(5), StarterToggle::Promoted);
    assert!(state.is_starter(5));

    assert!(state.remove_player(5));
    assert!(!state.contains(5));
    assert!(!state.is_starter(5));
    assert!(state.invariants_hold());
    assert!(!state.remove_player(5));
}

#[test]
fn starters_stop_at_eleven() {
    let mut state = RosterState::new();
    let players = numbered(1, 6, "ST").into_iter().chain(numbered(7, 6, "CB"));
    for p in players {
        state.add_player(&p).unwrap();
    }
    for id in 1..=11 {
        assert_eq!(state.toggle_starter(id), StarterToggle::Promoted);
    }
    assert_eq!(state.starters().len(), STARTER_CAPACITY);

    assert_eq!(state.toggle_starter(12), StarterToggle::Ignored);
    assert_eq!(state.starters().len(), STARTER_CAPACITY);
    assert!(!state.is_starter(12));

    assert_eq!(state.toggle_starter(3), StarterToggle::Demoted);
    assert_eq!(state.toggle_starter(12), StarterToggle::Promoted);
    assert!(state.invariants_hold());
}

#[test]
fn toggling_a_non_member_is_ignored() {
    let mut state = RosterState::new();
    assert_eq!(state.toggle_starter(42), StarterToggle::Ignored);
    assert!(state.starters().is_empty());
}

#[test]
fn clear_empties_squad_and_starters() {
    let (mut state, _) = full_squad();
    for id in [1, 10, 11, 50] {
        state.toggle_starter(id);
    }
    state.clear();
    assert!(state.is_empty());
    assert!(state.starters().is_empty());
    assert!(state.invariants_hold());
}

#[test]
fn invariants_hold_through_mixed_operations() {
    let mut catalog = numbered(1, 5, "GK");
    catalog.extend(numbered(10, 14, "LB"));
    catalog.extend(numbered(30, 14, "AM"));
    catalog.extend(numbered(50, 14, "LW"));
    catalog.extend((80..84).map(|id| Player::new(id, &format!("Loose {id}"), None)));

    let mut state = RosterState::new();
    for (step, p) in catalog.iter().enumerate() {
        let _ = state.add_player(p);
        if step % 3 == 0 {
            state.toggle_starter(p.id);
        }
        if step % 7 == 0 {
            state.remove_player(catalog[step / 2].id);
        }
        assert!(state.invariants_hold(), "broken after step {step}");
    }
}
