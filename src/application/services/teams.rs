//! Team service
//!
//! Team creation, reparenting and membership, validated against the hierarchy
//! engine before each write.

use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::forms::{MemberForm, TeamForm, TeamPatch};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::hierarchy::{member_order, team_order};
use crate::domain::{
    build_forest, safe_reparent_targets, validate_parent, DomainError, Forest, MemberId, Team,
    TeamId, TeamMember,
};
use crate::infrastructure::traits::TeamRepository;

/// Row of the team overview table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSummary {
    pub team: Team,
    pub parent: Option<Team>,
    pub member_count: usize,
}

/// Everything the team detail view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDetails {
    pub team: Team,
    pub parent: Option<Team>,
    pub members: Vec<TeamMember>,
    pub children: Vec<Team>,
    /// Active members without a team, candidates for "add existing member".
    pub available_members: Vec<TeamMember>,
    /// Teams offered in the parent selector.
    pub available_parents: Vec<Team>,
}

/// Service for team hierarchy operations.
pub struct TeamService {
    repo: Arc<dyn TeamRepository>,
}

impl TeamService {
    pub fn new(repo: Arc<dyn TeamRepository>) -> Self {
        Self { repo }
    }

    /// All teams ordered by name, with parent and member count.
    #[instrument(level = "debug", skip(self))]
    pub fn list(&self) -> ApplicationResult<Vec<TeamSummary>> {
        let teams = self.repo.teams()?;
        let members = self.repo.members()?;
        let counts = members.iter().filter_map(|m| m.team_id).counts();

        Ok(teams
            .iter()
            .sorted_by(|a, b| team_order(a, b))
            .map(|team| TeamSummary {
                team: team.clone(),
                parent: team
                    .parent_id
                    .and_then(|pid| teams.iter().find(|t| t.id == pid).cloned()),
                member_count: counts.get(&team.id).copied().unwrap_or(0),
            })
            .collect())
    }

    /// The org chart: every root team with its subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn forest(&self) -> ApplicationResult<Forest> {
        let teams = self.repo.teams()?;
        let members = self.repo.members()?;
        Ok(build_forest(&teams, &members)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn details(&self, id: TeamId) -> ApplicationResult<TeamDetails> {
        let teams = self.repo.teams()?;
        let members = self.repo.members()?;

        let team = teams
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DomainError::team_not_found(id))?;
        let parent = team
            .parent_id
            .and_then(|pid| teams.iter().find(|t| t.id == pid).cloned());

        let team_members = members
            .iter()
            .filter(|m| m.team_id == Some(id))
            .sorted_by(|a, b| member_order(a, b))
            .cloned()
            .collect();
        let children = teams
            .iter()
            .filter(|t| t.parent_id == Some(id))
            .sorted_by(|a, b| team_order(a, b))
            .cloned()
            .collect();
        let available_members = members
            .iter()
            .filter(|m| m.is_unassigned() && m.is_active)
            .sorted_by(|a, b| member_order(a, b))
            .cloned()
            .collect();
        let available_parents = safe_reparent_targets(id, &teams)?
            .into_iter()
            .cloned()
            .collect();

        Ok(TeamDetails {
            team,
            parent,
            members: team_members,
            children,
            available_members,
            available_parents,
        })
    }

    /// Teams that may become the new parent of `id`, ordered by name.
    #[instrument(level = "debug", skip(self))]
    pub fn reparent_targets(&self, id: TeamId) -> ApplicationResult<Vec<Team>> {
        let teams = self.repo.teams()?;
        Ok(safe_reparent_targets(id, &teams)?
            .into_iter()
            .cloned()
            .collect())
    }

    #[instrument(level = "debug", skip(self, form), fields(name = %form.name))]
    pub fn create(&self, form: TeamForm) -> ApplicationResult<Team> {
        form.validate()?;

        let mut draft = Team::new(TeamId(0), form.name, form.parent_id);
        draft.metadata = form.metadata;

        let team = self.repo.insert_team(draft, &mut |teams, team| {
            Ok(validate_parent(None, team.parent_id, teams)?)
        })?;
        info!("created team #{} {:?}", team.id, team.name);
        Ok(team)
    }

    /// Replace name, parent and metadata of a team.
    #[instrument(level = "debug", skip(self, form), fields(name = %form.name))]
    pub fn update(&self, id: TeamId, form: TeamForm) -> ApplicationResult<Team> {
        form.validate()?;

        let team = self.repo.update_team(id, &mut |teams, team| {
            validate_parent(Some(id), form.parent_id, teams)?;
            team.name = form.name.clone();
            team.parent_id = form.parent_id;
            team.metadata = form.metadata.clone();
            Ok(())
        })?;
        info!("updated team #{}", team.id);
        Ok(team)
    }

    /// Change only the fields set in `patch`.
    #[instrument(level = "debug", skip(self))]
    pub fn patch(&self, id: TeamId, patch: TeamPatch) -> ApplicationResult<Team> {
        if patch.is_empty() {
            return Err(ApplicationError::validation("team", "nothing to update"));
        }

        let team = self.repo.update_team(id, &mut |teams, team| {
            patch.apply_to(team)?;
            // re-checked against the data the write lands on
            validate_parent(Some(id), team.parent_id, teams)?;
            Ok(())
        })?;
        info!("updated team #{}", team.id);
        Ok(team)
    }

    /// Create a member directly inside a team.
    #[instrument(level = "debug", skip(self, form), fields(name = %form.name))]
    pub fn add_new_member(&self, team_id: TeamId, form: MemberForm) -> ApplicationResult<TeamMember> {
        form.validate()?;

        let mut draft = TeamMember::new(MemberId(0), form.name.clone(), Some(team_id));
        draft.role = form.effective_role();

        let member = self.repo.insert_member(draft, &mut |teams, _| {
            ensure_team(teams, team_id)
        })?;
        info!("added new member #{} to team #{}", member.id, team_id);
        Ok(member)
    }

    /// Attach an existing member to a team.
    #[instrument(level = "debug", skip(self))]
    pub fn add_existing_member(
        &self,
        team_id: TeamId,
        member_id: MemberId,
    ) -> ApplicationResult<TeamMember> {
        let member = self.repo.update_member(member_id, &mut |teams, member| {
            ensure_team(teams, team_id)?;
            member.team_id = Some(team_id);
            Ok(())
        })?;
        info!("attached member #{} to team #{}", member_id, team_id);
        Ok(member)
    }

    /// Detach a member from a team; the member record is kept.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_member(
        &self,
        team_id: TeamId,
        member_id: MemberId,
    ) -> ApplicationResult<TeamMember> {
        let member = self.repo.update_member(member_id, &mut |_, member| {
            if member.team_id != Some(team_id) {
                return Err(ApplicationError::validation(
                    "memberId",
                    format!("member #{} is not in team #{}", member_id, team_id),
                ));
            }
            member.team_id = None;
            Ok(())
        })?;
        debug!("detached member #{} from team #{}", member_id, team_id);
        Ok(member)
    }
}

fn ensure_team(teams: &[Team], id: TeamId) -> ApplicationResult<()> {
    if teams.iter().any(|t| t.id == id) {
        Ok(())
    } else {
        Err(DomainError::team_not_found(id).into())
    }
}
