use std::fmt;
use std::fs;
use std::path::Path;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

const SESSION_FILE: &str = "session";
const SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Anonymous token that namespaces saved rosters. Passed explicitly to the
/// persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!(
            "session_{}_{}",
            Utc::now().timestamp_millis(),
            suffix
        ))
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reuses the token remembered under `dir`, or generates and remembers a new
/// one. Storage problems fall back to an unsaved fresh token.
pub fn load_or_create_session(dir: Option<&Path>) -> SessionId {
    let Some(dir) = dir else {
        return SessionId::generate();
    };
    let path = dir.join(SESSION_FILE);
    if let Some(existing) = fs::read_to_string(&path)
        .ok()
        .and_then(|raw| SessionId::parse(&raw))
    {
        return existing;
    }

    let session = SessionId::generate();
    if fs::create_dir_all(dir).is_ok() {
        let tmp = path.with_extension("tmp");
        if fs::write(&tmp, session.as_str()).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_expected_shape() {
        let id = SessionId::generate();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn parse_rejects_blank_and_spaced() {
        assert!(SessionId::parse("  ").is_none());
        assert!(SessionId::parse("a b").is_none());
        assert_eq!(
            SessionId::parse("session_1_abc\n").map(|s| s.to_string()),
            Some("session_1_abc".to_string())
        );
    }

    #[test]
    fn session_is_remembered_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let first = load_or_create_session(Some(dir.path()));
        let second = load_or_create_session(Some(dir.path()));
        assert_eq!(first, second);
    }
}
