use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionCategory {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Unknown,
}

/// Display order for grouped views. Anything else sorts after these by label.
pub const CATEGORY_ORDER: [PositionCategory; 4] = [
    PositionCategory::Goalkeeper,
    PositionCategory::Defender,
    PositionCategory::Midfielder,
    PositionCategory::Forward,
];

/// Maps a raw position code to its category. Case-insensitive; surrounding
/// whitespace is ignored. Missing or unmapped codes become `Unknown`.
pub fn category_from_position(code: Option<&str>) -> PositionCategory {
    let Some(code) = code else {
        return PositionCategory::Unknown;
    };
    match code.trim().to_ascii_uppercase().as_str() {
        "GK" => PositionCategory::Goalkeeper,
        "CB" | "LB" | "RB" | "LWB" | "RWB" => PositionCategory::Defender,
        "AM" | "DM" | "CM" | "RM" | "LM" => PositionCategory::Midfielder,
        "ST" | "RW" | "LW" => PositionCategory::Forward,
        _ => PositionCategory::Unknown,
    }
}

pub fn category_label(category: PositionCategory) -> &'static str {
    match category {
        PositionCategory::Goalkeeper => "Goalkeeper",
        PositionCategory::Defender => "Defender",
        PositionCategory::Midfielder => "Midfielder",
        PositionCategory::Forward => "Forward",
        PositionCategory::Unknown => "Unknown",
    }
}

/// Short group code stored alongside saved selections.
pub fn category_short_label(category: PositionCategory) -> &'static str {
    match category {
        PositionCategory::Goalkeeper => "GK",
        PositionCategory::Defender => "DEF",
        PositionCategory::Midfielder => "MID",
        PositionCategory::Forward => "FWD",
        PositionCategory::Unknown => "UNK",
    }
}

/// Accepts either the long label or the short group code.
pub fn category_from_label(raw: &str) -> Option<PositionCategory> {
    let raw = raw.trim();
    [
        PositionCategory::Goalkeeper,
        PositionCategory::Defender,
        PositionCategory::Midfielder,
        PositionCategory::Forward,
        PositionCategory::Unknown,
    ]
    .into_iter()
    .find(|c| {
        category_label(*c).eq_ignore_ascii_case(raw)
            || category_short_label(*c).eq_ignore_ascii_case(raw)
    })
}

/// Per-category squad cap. `Unknown` is bounded only by the squad size.
pub fn category_cap(category: PositionCategory) -> Option<usize> {
    match category {
        PositionCategory::Goalkeeper => Some(3),
        PositionCategory::Defender => Some(10),
        PositionCategory::Midfielder => Some(10),
        PositionCategory::Forward => Some(10),
        PositionCategory::Unknown => None,
    }
}

pub fn compare_categories(a: PositionCategory, b: PositionCategory) -> Ordering {
    let rank = |c: PositionCategory| CATEGORY_ORDER.iter().position(|o| *o == c);
    match (rank(a), rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => category_label(a).cmp(category_label(b)),
    }
}

/// Cycles the pool filter: all -> GK -> DEF -> MID -> FWD -> all.
pub fn next_category_filter(current: Option<PositionCategory>) -> Option<PositionCategory> {
    match current {
        None => Some(PositionCategory::Goalkeeper),
        Some(PositionCategory::Goalkeeper) => Some(PositionCategory::Defender),
        Some(PositionCategory::Defender) => Some(PositionCategory::Midfielder),
        Some(PositionCategory::Midfielder) => Some(PositionCategory::Forward),
        Some(PositionCategory::Forward) | Some(PositionCategory::Unknown) => None,
    }
}

impl fmt::Display for PositionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(category_label(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_codes_case_insensitively() {
        assert_eq!(category_from_position(Some("gk")), PositionCategory::Goalkeeper);
        assert_eq!(category_from_position(Some("Rwb")), PositionCategory::Defender);
        assert_eq!(category_from_position(Some("dm")), PositionCategory::Midfielder);
        assert_eq!(category_from_position(Some("LW")), PositionCategory::Forward);
        assert_eq!(category_from_position(Some(" st ")), PositionCategory::Forward);
    }

    #[test]
    fn unmapped_and_missing_codes_are_unknown() {
        assert_eq!(category_from_position(Some("CF")), PositionCategory::Unknown);
        assert_eq!(category_from_position(Some("")), PositionCategory::Unknown);
        assert_eq!(category_from_position(None), PositionCategory::Unknown);
    }

    #[test]
    fn fixed_categories_sort_before_unknown() {
        let mut all = vec![
            PositionCategory::Unknown,
            PositionCategory::Forward,
            PositionCategory::Goalkeeper,
            PositionCategory::Midfielder,
            PositionCategory::Defender,
        ];
        all.sort_by(|a, b| compare_categories(*a, *b));
        assert_eq!(
            all,
            vec![
                PositionCategory::Goalkeeper,
                PositionCategory::Defender,
                PositionCategory::Midfielder,
                PositionCategory::Forward,
                PositionCategory::Unknown,
            ]
        );
    }

    #[test]
    fn labels_round_trip() {
        assert_eq!(category_from_label("MID"), Some(PositionCategory::Midfielder));
        assert_eq!(category_from_label("forward"), Some(PositionCategory::Forward));
        assert_eq!(category_from_label("winger"), None);
    }

    #[test]
    fn filter_cycle_returns_to_all() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            current = next_category_filter(current);
            seen.push(current);
        }
        assert_eq!(seen.last(), Some(&None));
        assert_eq!(seen[0], Some(PositionCategory::Goalkeeper));
    }
}
