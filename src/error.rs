use thiserror::Error;

/// Reasons a contestant cannot join a team's draft pick set.
///
/// The display strings are shown to players as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftRejection {
    #[error("already drafted")]
    AlreadyDrafted,
    #[error("cannot draft eliminated contestant")]
    Eliminated,
    #[error("maximum picks reached")]
    MaximumPicksReached,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    #[error("week {0} is outside the season")]
    InvalidWeek(u32),
    #[error("a pick for week {0} was already submitted")]
    AlreadySubmitted(u32),
    #[error("week {0} has already been resolved")]
    WeekResolved(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown team {0}")]
    UnknownTeam(String),
    #[error("pick set for {team} changed (expected version {expected}, found {found})")]
    Conflict {
        team: String,
        expected: u64,
        found: u64,
    },
    #[error("gave up admitting to {team} after {attempts} conflicting writes")]
    RetriesExhausted { team: String, attempts: usize },
    #[error(transparent)]
    Rejected(#[from] DraftRejection),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
