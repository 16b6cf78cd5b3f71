use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Compares names the way a root-locale collator does: base letters first,
/// then accents (unaccented before accented), then case (lowercase first).
/// Codepoint order is only the last tie-break.
pub fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| tertiary_key(a).cmp(&tertiary_key(b)))
        .then_with(|| a.cmp(b))
}

fn primary_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'ß' => out.push_str("ss"),
            'æ' | 'Æ' => out.push_str("ae"),
            'œ' | 'Œ' => out.push_str("oe"),
            'ø' | 'Ø' => out.push('o'),
            'ł' | 'Ł' => out.push('l'),
            'đ' | 'Đ' => out.push('d'),
            'ı' => out.push('i'),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

fn secondary_key(raw: &str) -> String {
    raw.nfd().flat_map(char::to_lowercase).collect()
}

fn tertiary_key(raw: &str) -> Vec<bool> {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
        .collect()
}

/// Unicode-aware case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_do_not_jump_the_alphabet() {
        let mut names = vec!["Zendejas", "Álvarez", "Adams", "Busio"];
        names.sort_by(|a, b| collate(a, b));
        assert_eq!(names, vec!["Adams", "Álvarez", "Busio", "Zendejas"]);
    }

    #[test]
    fn case_is_ignored_before_tie_break() {
        assert_eq!(collate("de la Torre", "Dest"), Ordering::Less);
        assert_eq!(collate("mckennie", "McKennie"), Ordering::Less);
    }

    #[test]
    fn unaccented_sorts_before_accented_on_tie() {
        assert_eq!(collate("Pepi", "Pépi"), Ordering::Less);
        assert_eq!(collate("Pépi", "Pepi"), Ordering::Greater);
    }

    #[test]
    fn special_letters_fold() {
        assert_eq!(collate("Øst", "Osz"), Ordering::Less);
        assert_eq!(collate("Weiß", "Weiss"), Ordering::Greater);
    }

    #[test]
    fn contains_ci_handles_non_ascii() {
        assert!(contains_ci("Sergiño Dest", "SERGIÑO"));
        assert!(contains_ci("Tim Ream", ""));
        assert!(!contains_ci("Tim Ream", "weah"));
    }
}
