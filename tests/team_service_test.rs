//! Tests for TeamService against a TOML store in a temp directory

use std::sync::Arc;

use tempfile::TempDir;

use teamtree::application::services::{MemberService, TeamService};
use teamtree::application::{ApplicationError, MemberForm, TeamForm, TeamPatch};
use teamtree::domain::{DomainError, Metadata, MemberId, RoleSelection, TeamId, CYCLE_MESSAGE};
use teamtree::infrastructure::traits::{RealFileSystem, TeamRepository};
use teamtree::infrastructure::TomlStore;
use teamtree::util::testing::init_test_setup;

struct Fixture {
    _temp: TempDir,
    teams: TeamService,
    members: MemberService,
}

fn setup() -> Fixture {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let repo: Arc<dyn TeamRepository> = Arc::new(TomlStore::new(
        temp.path().join("roster.toml"),
        Arc::new(RealFileSystem),
    ));
    Fixture {
        _temp: temp,
        teams: TeamService::new(Arc::clone(&repo)),
        members: MemberService::new(repo),
    }
}

/// A <- B <- C
fn create_chain(f: &Fixture) -> (TeamId, TeamId, TeamId) {
    let a = f.teams.create(TeamForm::new("A team", None)).unwrap();
    let b = f.teams.create(TeamForm::new("B team", Some(a.id))).unwrap();
    let c = f.teams.create(TeamForm::new("C team", Some(b.id))).unwrap();
    (a.id, b.id, c.id)
}

fn role(selected: &str, custom: Option<&str>) -> RoleSelection {
    RoleSelection::new(Some(selected.to_string()), custom.map(str::to_string))
}

// ============================================================
// create / update
// ============================================================

#[test]
fn given_valid_form_when_creating_then_assigns_increasing_ids() {
    let f = setup();

    let first = f.teams.create(TeamForm::new("Platform", None)).unwrap();
    let second = f.teams.create(TeamForm::new("Payments", None)).unwrap();

    assert_eq!(first.id, TeamId(1));
    assert_eq!(second.id, TeamId(2));
}

#[test]
fn given_short_name_when_creating_then_validation_error() {
    let f = setup();

    let err = f.teams.create(TeamForm::new("X", None)).unwrap_err();

    assert_eq!(err.to_string(), "name: Name must be at least 2 characters long");
    assert!(f.teams.list().unwrap().is_empty());
}

#[test]
fn given_unknown_parent_when_creating_then_not_found() {
    let f = setup();

    let err = f.teams.create(TeamForm::new("Orphan", Some(TeamId(9)))).unwrap_err();

    assert_eq!(err.domain(), Some(&DomainError::team_not_found(TeamId(9))));
}

#[test]
fn given_blank_metadata_when_creating_then_stored_as_absent() {
    let f = setup();
    let form = TeamForm::new("Platform", None).with_metadata(Metadata::new(Some("  "), Some("Ann")));

    let team = f.teams.create(form).unwrap();

    assert_eq!(team.metadata.department, None);
    assert_eq!(team.metadata.incident_manager.as_deref(), Some("Ann"));
}

#[test]
fn given_descendant_as_parent_when_updating_then_rejected_and_unchanged() {
    let f = setup();
    let (a, _, c) = create_chain(&f);

    let err = f.teams.update(a, TeamForm::new("A team", Some(c))).unwrap_err();

    assert_eq!(
        err.domain(),
        Some(&DomainError::IntegrityViolation(CYCLE_MESSAGE.into()))
    );
    let details = f.teams.details(a).unwrap();
    assert!(details.team.parent_id.is_none());
}

#[test]
fn given_self_as_parent_when_patching_then_rejected() {
    let f = setup();
    let (_, b, _) = create_chain(&f);

    let patch = TeamPatch {
        parent_id: Some(Some(b)),
        ..Default::default()
    };
    let err = f.teams.patch(b, patch).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::IntegrityViolation(_))
    ));
}

#[test]
fn given_root_patch_when_patching_then_team_becomes_root() {
    let f = setup();
    let (_, b, c) = create_chain(&f);

    let patch = TeamPatch {
        parent_id: Some(None),
        ..Default::default()
    };
    let team = f.teams.patch(c, patch).unwrap();

    assert!(team.is_root());
    assert_eq!(f.teams.forest().unwrap().roots.len(), 2);
    assert!(f.teams.details(b).unwrap().children.is_empty());
}

#[test]
fn given_metadata_patch_when_patching_then_only_metadata_changes() {
    let f = setup();
    let (a, _, _) = create_chain(&f);

    let patch = TeamPatch {
        metadata: vec![("department".into(), "engineering".into())],
        ..Default::default()
    };
    let team = f.teams.patch(a, patch).unwrap();

    assert_eq!(team.name, "A team");
    assert_eq!(team.metadata.department.as_deref(), Some("engineering"));
}

#[test]
fn given_empty_patch_when_patching_then_validation_error() {
    let f = setup();
    let (a, _, _) = create_chain(&f);

    let err = f.teams.patch(a, TeamPatch::default()).unwrap_err();

    assert!(matches!(err, ApplicationError::Validation { .. }));
}

#[test]
fn given_unknown_team_when_updating_then_not_found() {
    let f = setup();

    let err = f.teams.update(TeamId(5), TeamForm::new("Nope", None)).unwrap_err();

    assert_eq!(err.domain(), Some(&DomainError::team_not_found(TeamId(5))));
}

// ============================================================
// details / targets / list
// ============================================================

#[test]
fn given_chain_when_listing_reparent_targets_then_excludes_subtree() {
    let f = setup();
    let (a, b, c) = create_chain(&f);

    assert!(f.teams.reparent_targets(a).unwrap().is_empty());
    let targets: Vec<TeamId> = f.teams.reparent_targets(b).unwrap().iter().map(|t| t.id).collect();
    assert_eq!(targets, vec![a]);
    assert_eq!(f.teams.reparent_targets(c).unwrap().len(), 2);
}

#[test]
fn given_team_with_members_when_showing_details_then_collects_everything() {
    let f = setup();
    let (a, b, _) = create_chain(&f);
    f.teams
        .add_new_member(b, MemberForm::new("Zoe", role("Software Engineer", None)))
        .unwrap();
    f.teams.add_new_member(b, MemberForm::new("Abe", RoleSelection::default())).unwrap();
    let idle = f.members.create(MemberForm::new("Idle", RoleSelection::default())).unwrap();
    let gone = f.members.create(MemberForm::new("Gone", RoleSelection::default())).unwrap();
    f.members.toggle_active(gone.id).unwrap();

    let details = f.teams.details(b).unwrap();

    assert_eq!(details.parent.as_ref().map(|p| p.id), Some(a));
    let names: Vec<&str> = details.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Abe", "Zoe"]);
    assert_eq!(details.children.len(), 1);
    // unassigned and active only
    let available: Vec<MemberId> = details.available_members.iter().map(|m| m.id).collect();
    assert_eq!(available, vec![idle.id]);
    assert_eq!(details.available_parents.len(), 1);
}

#[test]
fn given_teams_when_listing_then_sorted_with_member_counts() {
    let f = setup();
    let (a, b, _) = create_chain(&f);
    f.teams.add_new_member(b, MemberForm::new("Kim", RoleSelection::default())).unwrap();

    let list = f.teams.list().unwrap();

    let names: Vec<&str> = list.iter().map(|s| s.team.name.as_str()).collect();
    assert_eq!(names, vec!["A team", "B team", "C team"]);
    assert_eq!(list[1].member_count, 1);
    assert_eq!(list[1].parent.as_ref().map(|p| p.id), Some(a));
    assert_eq!(list[0].member_count, 0);
}

// ============================================================
// membership
// ============================================================

#[test]
fn given_custom_role_when_adding_new_member_then_stores_custom_text() {
    let f = setup();
    let (a, _, _) = create_chain(&f);

    let member = f
        .teams
        .add_new_member(a, MemberForm::new("Kim", role("custom", Some("Tech Lead"))))
        .unwrap();

    assert_eq!(member.role.as_deref(), Some("Tech Lead"));
    assert_eq!(member.team_id, Some(a));
    assert!(member.is_active);
}

#[test]
fn given_missing_team_when_adding_new_member_then_nothing_stored() {
    let f = setup();

    let err = f
        .teams
        .add_new_member(TeamId(3), MemberForm::new("Kim", RoleSelection::default()))
        .unwrap_err();

    assert_eq!(err.domain(), Some(&DomainError::team_not_found(TeamId(3))));
    assert!(f.members.list().unwrap().is_empty());
}

#[test]
fn given_unassigned_member_when_assigning_and_removing_then_team_reference_follows() {
    let f = setup();
    let (a, _, _) = create_chain(&f);
    let member = f.members.create(MemberForm::new("Lee", RoleSelection::default())).unwrap();

    let assigned = f.teams.add_existing_member(a, member.id).unwrap();
    assert_eq!(assigned.team_id, Some(a));

    let removed = f.teams.remove_member(a, member.id).unwrap();
    assert_eq!(removed.team_id, None);
    // the record survives detachment
    assert_eq!(f.members.list().unwrap().len(), 1);
}

#[test]
fn given_member_of_other_team_when_removing_then_rejected() {
    let f = setup();
    let (a, b, _) = create_chain(&f);
    let member = f
        .teams
        .add_new_member(b, MemberForm::new("Kim", RoleSelection::default()))
        .unwrap();

    let err = f.teams.remove_member(a, member.id).unwrap_err();

    assert!(matches!(err, ApplicationError::Validation { .. }));
}
