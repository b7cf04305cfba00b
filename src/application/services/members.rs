//! Member roster service

use std::sync::Arc;

use itertools::Itertools;
use tracing::{info, instrument};

use crate::application::forms::{MemberForm, MemberPatch};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::hierarchy::member_order;
use crate::domain::{MemberId, Team, TeamMember};
use crate::infrastructure::traits::TeamRepository;

/// Member with the name of the team it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub member: TeamMember,
    pub team: Option<Team>,
}

/// Service for the member roster.
pub struct MemberService {
    repo: Arc<dyn TeamRepository>,
}

impl MemberService {
    pub fn new(repo: Arc<dyn TeamRepository>) -> Self {
        Self { repo }
    }

    /// All members ordered by name, each with its team.
    #[instrument(level = "debug", skip(self))]
    pub fn list(&self) -> ApplicationResult<Vec<MemberRow>> {
        let teams = self.repo.teams()?;
        let members = self.repo.members()?;

        Ok(members
            .into_iter()
            .sorted_by(member_order)
            .map(|member| {
                let team = member
                    .team_id
                    .and_then(|tid| teams.iter().find(|t| t.id == tid).cloned());
                MemberRow { member, team }
            })
            .collect())
    }

    /// Create an unassigned, active member.
    #[instrument(level = "debug", skip(self, form), fields(name = %form.name))]
    pub fn create(&self, form: MemberForm) -> ApplicationResult<TeamMember> {
        form.validate()?;

        let mut draft = TeamMember::new(MemberId(0), form.name.clone(), None);
        draft.role = form.effective_role();

        let member = self.repo.insert_member(draft, &mut |_, _| Ok(()))?;
        info!("created member #{} {:?}", member.id, member.name);
        Ok(member)
    }

    /// Replace name, role and active flag.
    #[instrument(level = "debug", skip(self, form), fields(name = %form.name))]
    pub fn edit(
        &self,
        id: MemberId,
        form: MemberForm,
        is_active: bool,
    ) -> ApplicationResult<TeamMember> {
        form.validate()?;
        let role = form.effective_role();

        let member = self.repo.update_member(id, &mut |_, member| {
            member.name = form.name.clone();
            member.role = role.clone();
            member.is_active = is_active;
            Ok(())
        })?;
        info!("updated member #{}", member.id);
        Ok(member)
    }

    /// Change only the fields set in `patch`, against the stored record.
    #[instrument(level = "debug", skip(self))]
    pub fn patch(&self, id: MemberId, patch: MemberPatch) -> ApplicationResult<TeamMember> {
        if patch.is_empty() {
            return Err(ApplicationError::validation("member", "nothing to update"));
        }

        let member = self
            .repo
            .update_member(id, &mut |_, member| patch.apply_to(member))?;
        info!("updated member #{}", member.id);
        Ok(member)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn toggle_active(&self, id: MemberId) -> ApplicationResult<TeamMember> {
        let member = self.repo.update_member(id, &mut |_, member| {
            member.is_active = !member.is_active;
            Ok(())
        })?;
        info!("member #{} active: {}", member.id, member.is_active);
        Ok(member)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, id: MemberId) -> ApplicationResult<TeamMember> {
        let member = self.repo.delete_member(id)?;
        info!("deleted member #{}", member.id);
        Ok(member)
    }
}
