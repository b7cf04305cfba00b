//! Form input for team and member writes.
//!
//! Forms carry what the user submitted; services validate them and resolve
//! roles before anything reaches the store.

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    validate_member_name, validate_team_name, DomainError, Metadata, RoleSelection, Team, TeamId,
    TeamMember,
};

/// Full team form, as used when creating a team or replacing all its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamForm {
    pub name: String,
    pub parent_id: Option<TeamId>,
    pub metadata: Metadata,
}

impl TeamForm {
    pub fn new(name: impl Into<String>, parent_id: Option<TeamId>) -> Self {
        Self {
            name: name.into(),
            parent_id,
            metadata: Metadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn validate(&self) -> ApplicationResult<()> {
        validate_team_name(&self.name).map_err(field_error)
    }
}

/// Partial team update: only the fields that are set change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPatch {
    pub name: Option<String>,
    /// `Some(None)` detaches the team to the root level.
    pub parent_id: Option<Option<TeamId>>,
    /// `(key, value)` pairs applied through [`Metadata::set`].
    pub metadata: Vec<(String, String)>,
}

impl TeamPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_id.is_none() && self.metadata.is_empty()
    }

    /// Apply the patch to a copy of the stored team.
    pub fn apply_to(&self, team: &mut Team) -> ApplicationResult<()> {
        if let Some(name) = &self.name {
            validate_team_name(name).map_err(field_error)?;
            team.name = name.clone();
        }
        if let Some(parent_id) = self.parent_id {
            team.parent_id = parent_id;
        }
        for (key, value) in &self.metadata {
            team.metadata.set(key, value)?;
        }
        Ok(())
    }
}

/// Member form shared by every create and edit flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberForm {
    pub name: String,
    pub role: RoleSelection,
}

impl MemberForm {
    pub fn new(name: impl Into<String>, role: RoleSelection) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn validate(&self) -> ApplicationResult<()> {
        validate_member_name(&self.name).map_err(field_error)
    }

    pub fn effective_role(&self) -> Option<String> {
        self.role.effective()
    }
}

/// Partial member update: unset fields keep the stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberPatch {
    pub name: Option<String>,
    /// Replaces the role; resolved through [`RoleSelection::effective`].
    pub role: Option<RoleSelection>,
    pub is_active: Option<bool>,
}

impl MemberPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.is_active.is_none()
    }

    /// Apply the patch to a copy of the stored member.
    pub fn apply_to(&self, member: &mut TeamMember) -> ApplicationResult<()> {
        if let Some(name) = &self.name {
            validate_member_name(name).map_err(field_error)?;
            member.name = name.clone();
        }
        if let Some(role) = &self.role {
            member.role = role.effective();
        }
        if let Some(is_active) = self.is_active {
            member.is_active = is_active;
        }
        Ok(())
    }
}

/// Surface name rule violations as field errors, like the form layer expects.
fn field_error(e: DomainError) -> ApplicationError {
    match e {
        DomainError::InvalidName { field, message } => ApplicationError::validation(field, message),
        other => ApplicationError::Domain(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_short_team_name_when_validating_then_field_error() {
        let err = TeamForm::new("A", None).validate().unwrap_err();
        assert_eq!(err.to_string(), "name: Name must be at least 2 characters long");
    }

    #[test]
    fn given_patch_with_unknown_key_when_applying_then_rejects() {
        let mut team = Team::new(TeamId(1), "Platform", None);
        let patch = TeamPatch {
            metadata: vec![("budget".into(), "1".into())],
            ..Default::default()
        };
        assert!(patch.apply_to(&mut team).is_err());
    }

    #[test]
    fn given_member_patch_without_role_when_applying_then_keeps_stored_role() {
        let mut member = TeamMember::new(crate::domain::MemberId(1), "Kim", None);
        member.role = Some("Tech Lead".into());
        let patch = MemberPatch {
            is_active: Some(false),
            ..Default::default()
        };

        patch.apply_to(&mut member).unwrap();

        assert_eq!(member.role.as_deref(), Some("Tech Lead"));
        assert_eq!(member.name, "Kim");
        assert!(!member.is_active);
    }

    #[test]
    fn given_detach_patch_when_applying_then_clears_parent() {
        let mut team = Team::new(TeamId(2), "Infra", Some(TeamId(1)));
        let patch = TeamPatch {
            parent_id: Some(None),
            ..Default::default()
        };
        patch.apply_to(&mut team).unwrap();
        assert!(team.is_root());
    }
}
