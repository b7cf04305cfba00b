//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

use crate::domain::entities::{MemberId, TeamId};

/// Kind of record a missing identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Team,
    Member,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Team => write!(f, "team"),
            RecordKind::Member => write!(f, "member"),
        }
    }
}

/// Domain errors represent business rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A write would break the forest invariant, or the supplied
    /// collection already violates it.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("{kind} not found: #{id}")]
    NotFound { kind: RecordKind, id: u64 },

    #[error("{message}")]
    InvalidName { field: &'static str, message: String },

    #[error("unknown metadata key: {0} (expected department or incidentManager)")]
    UnknownMetadataKey(String),
}

impl DomainError {
    pub fn team_not_found(id: TeamId) -> Self {
        Self::NotFound {
            kind: RecordKind::Team,
            id: id.get(),
        }
    }

    pub fn member_not_found(id: MemberId) -> Self {
        Self::NotFound {
            kind: RecordKind::Member,
            id: id.get(),
        }
    }
}

/// Result type for engine operations.
pub type DomainResult<T> = Result<T, DomainError>;
