//! Domain entities: core data structures

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Minimum number of characters in a team name.
pub const MIN_TEAM_NAME_LEN: usize = 2;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().trim_start_matches('#').parse().map($name)
            }
        }
    };
}

id_type!(
    /// Stable identifier of a team.
    TeamId
);
id_type!(
    /// Stable identifier of a team member.
    MemberId
);

/// Free-form attributes attached to teams and members.
///
/// Only the known keys are representable; anything else is rejected by
/// [`Metadata::set`]. Blank values are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_manager: Option<String>,
}

impl Metadata {
    pub const DEPARTMENT: &'static str = "department";
    pub const INCIDENT_MANAGER: &'static str = "incidentManager";

    pub fn new(department: Option<&str>, incident_manager: Option<&str>) -> Self {
        Self {
            department: non_blank(department),
            incident_manager: non_blank(incident_manager),
        }
    }

    /// Set a metadata value by its external key name.
    ///
    /// Accepts `department` and `incidentManager` (also `incident_manager`).
    pub fn set(&mut self, key: &str, value: &str) -> DomainResult<()> {
        match key {
            Self::DEPARTMENT => self.department = non_blank(Some(value)),
            Self::INCIDENT_MANAGER | "incident_manager" => {
                self.incident_manager = non_blank(Some(value))
            }
            other => return Err(DomainError::UnknownMetadataKey(other.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.incident_manager.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
}

/// A named organizational unit, optionally nested under a parent team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TeamId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>, parent_id: Option<TeamId>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            parent_id,
            created_at: now,
            updated_at: now,
            metadata: Metadata::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

fn default_active() -> bool {
    true
}

/// A person record, optionally attached to one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl TeamMember {
    pub fn new(id: MemberId, name: impl Into<String>, team_id: Option<TeamId>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            role: None,
            is_active: true,
            team_id,
            created_at: now,
            updated_at: now,
            metadata: Metadata::default(),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.team_id.is_none()
    }
}

/// Check a team name against the minimum length rule.
pub fn validate_team_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() || name.chars().count() < MIN_TEAM_NAME_LEN {
        return Err(DomainError::InvalidName {
            field: "name",
            message: format!(
                "Name must be at least {} characters long",
                MIN_TEAM_NAME_LEN
            ),
        });
    }
    Ok(())
}

/// Member names only need to be non-blank.
pub fn validate_member_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName {
            field: "name",
            message: "Name is required".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_short_name_when_validating_team_then_rejects() {
        assert!(validate_team_name("A").is_err());
        assert!(validate_team_name("  ").is_err());
        assert!(validate_team_name("Ops").is_ok());
    }

    #[test]
    fn given_blank_values_when_building_metadata_then_stores_absent() {
        let meta = Metadata::new(Some(""), Some("  "));
        assert!(meta.is_empty());
    }

    #[test]
    fn given_unknown_key_when_setting_metadata_then_rejects() {
        let mut meta = Metadata::default();
        assert_eq!(
            meta.set("budget", "100"),
            Err(DomainError::UnknownMetadataKey("budget".to_string()))
        );
        meta.set("incidentManager", "Dana").unwrap();
        assert_eq!(meta.incident_manager.as_deref(), Some("Dana"));
    }

    #[test]
    fn given_hash_prefixed_id_when_parsing_then_accepts() {
        assert_eq!("#12".parse::<TeamId>().unwrap(), TeamId(12));
        assert_eq!("7".parse::<MemberId>().unwrap(), MemberId(7));
        assert!("x".parse::<TeamId>().is_err());
    }
}
