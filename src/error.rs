use thiserror::Error;

use crate::position::PositionCategory;

/// Rejections from the roster engine. The state is untouched when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Roster is full! Maximum {cap} players allowed.")]
    RosterFull { cap: usize },

    #[error("Maximum {cap} {category} players allowed.")]
    PositionCapExceeded {
        category: PositionCategory,
        cap: usize,
    },
}

/// Failures at the data boundaries, kept apart from engine rejections.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Player data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Roster save failed: {0}")]
    PersistenceFailed(String),
}

impl DataError {
    pub fn unavailable(err: &anyhow::Error) -> Self {
        Self::DataUnavailable(format!("{err:#}"))
    }

    pub fn persistence(err: &anyhow::Error) -> Self {
        Self::PersistenceFailed(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_errors_name_rule_and_limit() {
        let err = RosterError::RosterFull { cap: 26 };
        assert_eq!(err.to_string(), "Roster is full! Maximum 26 players allowed.");

        let err = RosterError::PositionCapExceeded {
            category: PositionCategory::Goalkeeper,
            cap: 3,
        };
        assert_eq!(err.to_string(), "Maximum 3 Goalkeeper players allowed.");
    }

    #[test]
    fn data_errors_keep_context_chain() {
        let inner = anyhow::anyhow!("http 503").context("fetch players");
        let err = DataError::unavailable(&inner);
        assert!(matches!(err, DataError::DataUnavailable(_)));
        assert_eq!(
            err.to_string(),
            "Player data unavailable: fetch players: http 503"
        );
    }
}
