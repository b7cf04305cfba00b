//! Team hierarchy engine.
//!
//! Pure functions over a snapshot of the team collection: cycle checks for
//! reparenting, the set of legal reparent targets, and the forest view used by
//! the org chart. Nothing here performs I/O or mutates its input.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::domain::entities::{Team, TeamId, TeamMember};
use crate::domain::error::{DomainError, DomainResult};

/// Message surfaced when a reparent would close a loop.
pub const CYCLE_MESSAGE: &str = "cannot assign a team as its own descendant's parent";

/// Child team id -> parent team id, for every team that has a parent.
pub type ParentEdges = HashMap<TeamId, TeamId>;

pub fn parent_edges(teams: &[Team]) -> ParentEdges {
    teams
        .iter()
        .filter_map(|t| t.parent_id.map(|parent| (t.id, parent)))
        .collect()
}

/// Parent team id -> direct child ids, in input order.
pub fn children_index(teams: &[Team]) -> HashMap<TeamId, Vec<TeamId>> {
    let mut index: HashMap<TeamId, Vec<TeamId>> = HashMap::new();
    for team in teams {
        if let Some(parent) = team.parent_id {
            index.entry(parent).or_default().push(team.id);
        }
    }
    index
}

/// Name ascending, ties broken by id.
pub fn team_order(a: &Team, b: &Team) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

/// Name ascending, ties broken by id.
pub fn member_order(a: &TeamMember, b: &TeamMember) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

/// Would making `candidate_parent` the parent of `team_id` create a cycle?
///
/// Walks the parent chain upwards from the candidate. A sound forest reaches a
/// root within `edges.len()` steps; if the bound is exhausted the chain is
/// already looping, and attaching to it is treated as unsafe.
#[instrument(level = "trace", skip(edges))]
pub fn would_create_cycle(
    candidate_parent: Option<TeamId>,
    team_id: TeamId,
    edges: &ParentEdges,
) -> bool {
    let Some(mut current) = candidate_parent else {
        return false;
    };

    for _ in 0..=edges.len() {
        if current == team_id {
            return true;
        }
        match edges.get(&current) {
            Some(&parent) => current = parent,
            None => return false,
        }
    }

    warn!(
        "parent chain from #{} does not terminate, edge set is corrupt",
        current
    );
    true
}

/// All teams reachable from `team_id` by following child links.
///
/// `team_id` itself is never part of the result, even on corrupt input where
/// it sits on its own cycle.
pub fn descendants(team_id: TeamId, teams: &[Team]) -> HashSet<TeamId> {
    let children = children_index(teams);
    let mut found = HashSet::new();
    let mut queue: VecDeque<TeamId> = children
        .get(&team_id)
        .into_iter()
        .flatten()
        .copied()
        .collect();

    while let Some(current) = queue.pop_front() {
        if current == team_id || !found.insert(current) {
            continue;
        }
        if let Some(kids) = children.get(&current) {
            queue.extend(kids.iter().copied());
        }
    }
    found
}

/// Teams that may legally become the new parent of `team_id`.
///
/// Everything except the team itself and its descendants, ordered by name.
#[instrument(level = "debug", skip(teams), fields(teams = teams.len()))]
pub fn safe_reparent_targets(team_id: TeamId, teams: &[Team]) -> DomainResult<Vec<&Team>> {
    if !teams.iter().any(|t| t.id == team_id) {
        return Err(DomainError::team_not_found(team_id));
    }

    let excluded = descendants(team_id, teams);
    debug!("team #{} has {} descendants", team_id, excluded.len());

    Ok(teams
        .iter()
        .filter(|t| t.id != team_id && !excluded.contains(&t.id))
        .sorted_by(|a, b| team_order(a, b))
        .collect())
}

/// Check a proposed parent reference before it is written.
///
/// `team_id` is `None` when the team does not exist yet; a new team has no
/// descendants, so only the candidate's existence matters.
#[instrument(level = "debug", skip(teams))]
pub fn validate_parent(
    team_id: Option<TeamId>,
    candidate_parent: Option<TeamId>,
    teams: &[Team],
) -> DomainResult<()> {
    let Some(parent) = candidate_parent else {
        return Ok(());
    };
    if !teams.iter().any(|t| t.id == parent) {
        return Err(DomainError::team_not_found(parent));
    }

    let Some(team_id) = team_id else {
        return Ok(());
    };
    if !teams.iter().any(|t| t.id == team_id) {
        return Err(DomainError::team_not_found(team_id));
    }

    // the proposed edge replaces the team's current one
    let mut edges = parent_edges(teams);
    edges.remove(&team_id);

    if would_create_cycle(Some(parent), team_id, &edges) {
        return Err(DomainError::IntegrityViolation(CYCLE_MESSAGE.to_string()));
    }
    Ok(())
}

/// A team with its members and child teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamNode {
    pub team: Team,
    pub members: Vec<TeamMember>,
    pub children: Vec<TeamNode>,
}

impl TeamNode {
    pub fn id(&self) -> TeamId {
        self.team.id
    }

    /// Pre-order walk of this subtree; depth is relative to this node.
    pub fn iter(&self) -> ForestIter<'_> {
        ForestIter {
            stack: vec![(0, self)],
        }
    }
}

/// All root teams with their subtrees, plus members without a team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    pub roots: Vec<TeamNode>,
    pub unassigned: Vec<TeamMember>,
}

impl Forest {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> ForestIter<'_> {
        ForestIter {
            stack: self.roots.iter().rev().map(|root| (0, root)).collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels of the deepest tree; 0 for an empty forest.
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    pub fn find(&self, id: TeamId) -> Option<&TeamNode> {
        self.iter().map(|(_, node)| node).find(|node| node.id() == id)
    }
}

/// Pre-order iterator yielding `(depth, node)`, children in sorted order.
pub struct ForestIter<'a> {
    stack: Vec<(usize, &'a TeamNode)>,
}

impl<'a> Iterator for ForestIter<'a> {
    type Item = (usize, &'a TeamNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // reverse so the first child is visited first
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

/// Derive the renderable forest from flat team and member collections.
///
/// Construction is iterative: teams are discovered breadth-first from the
/// roots with a visited set, then nodes are assembled bottom-up. Teams that
/// cannot be reached from any root sit on a parent cycle and are reported as
/// an integrity violation.
#[instrument(level = "debug", skip_all, fields(teams = teams.len(), members = members.len()))]
pub fn build_forest(teams: &[Team], members: &[TeamMember]) -> DomainResult<Forest> {
    let mut by_id: HashMap<TeamId, &Team> = HashMap::with_capacity(teams.len());
    for team in teams {
        if by_id.insert(team.id, team).is_some() {
            return Err(DomainError::IntegrityViolation(format!(
                "duplicate team id #{}",
                team.id
            )));
        }
    }
    for team in teams {
        if let Some(parent) = team.parent_id {
            if !by_id.contains_key(&parent) {
                return Err(DomainError::team_not_found(parent));
            }
        }
    }

    let mut team_members: HashMap<TeamId, Vec<TeamMember>> = HashMap::new();
    let mut unassigned = Vec::new();
    for member in members {
        match member.team_id {
            Some(team_id) if by_id.contains_key(&team_id) => {
                team_members.entry(team_id).or_default().push(member.clone())
            }
            Some(team_id) => return Err(DomainError::team_not_found(team_id)),
            None => unassigned.push(member.clone()),
        }
    }

    let children = children_index(teams);
    let root_ids: Vec<TeamId> = teams
        .iter()
        .filter(|t| t.is_root())
        .sorted_by(|a, b| team_order(a, b))
        .map(|t| t.id)
        .collect();

    let mut visited: HashSet<TeamId> = HashSet::with_capacity(teams.len());
    let mut order: Vec<TeamId> = Vec::with_capacity(teams.len());
    let mut queue: VecDeque<TeamId> = root_ids.iter().copied().collect();
    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            return Err(DomainError::IntegrityViolation(format!(
                "team #{} reached twice while building hierarchy",
                current
            )));
        }
        order.push(current);
        if let Some(kids) = children.get(&current) {
            queue.extend(kids.iter().copied());
        }
    }

    if order.len() != teams.len() {
        let stranded = teams
            .iter()
            .map(|t| t.id)
            .filter(|id| !visited.contains(id))
            .min();
        return Err(DomainError::IntegrityViolation(match stranded {
            Some(id) => format!("cycle detected in team hierarchy at team #{}", id),
            None => "cycle detected in team hierarchy".to_string(),
        }));
    }

    // deepest nodes first, so every child is built before its parent
    let mut built: HashMap<TeamId, TeamNode> = HashMap::with_capacity(order.len());
    for id in order.iter().rev() {
        let mut child_nodes: Vec<TeamNode> = children
            .get(id)
            .map(|kids| kids.iter().filter_map(|kid| built.remove(kid)).collect())
            .unwrap_or_default();
        child_nodes.sort_by(|a, b| team_order(&a.team, &b.team));

        let mut node_members = team_members.remove(id).unwrap_or_default();
        node_members.sort_by(member_order);

        built.insert(
            *id,
            TeamNode {
                team: by_id[id].clone(),
                members: node_members,
                children: child_nodes,
            },
        );
    }

    let roots: Vec<TeamNode> = root_ids
        .iter()
        .filter_map(|id| built.remove(id))
        .collect();
    unassigned.sort_by(member_order);

    debug!("built forest with {} roots", roots.len());
    Ok(Forest { roots, unassigned })
}
