//! Tests for MemberService

use std::sync::Arc;

use tempfile::TempDir;

use teamtree::application::services::{MemberService, TeamService};
use teamtree::application::{ApplicationError, MemberForm, MemberPatch, TeamForm};
use teamtree::domain::{DomainError, MemberId, RoleSelection};
use teamtree::infrastructure::traits::{RealFileSystem, TeamRepository};
use teamtree::infrastructure::TomlStore;

fn services(temp: &TempDir) -> (TeamService, MemberService) {
    let repo: Arc<dyn TeamRepository> = Arc::new(TomlStore::new(
        temp.path().join("roster.toml"),
        Arc::new(RealFileSystem),
    ));
    (TeamService::new(Arc::clone(&repo)), MemberService::new(repo))
}

fn custom(text: &str) -> RoleSelection {
    RoleSelection::new(Some("custom".into()), Some(text.into()))
}

#[test]
fn given_valid_form_when_creating_then_member_is_unassigned_and_active() {
    let temp = TempDir::new().unwrap();
    let (_, members) = services(&temp);

    let member = members
        .create(MemberForm::new("Ann", RoleSelection::new(Some("Frontend Engineer".into()), None)))
        .unwrap();

    assert_eq!(member.id, MemberId(1));
    assert!(member.is_unassigned());
    assert!(member.is_active);
    assert!(member.metadata.is_empty());
    assert_eq!(member.role.as_deref(), Some("Frontend Engineer"));
}

#[test]
fn given_blank_name_when_creating_then_name_required() {
    let temp = TempDir::new().unwrap();
    let (_, members) = services(&temp);

    let err = members
        .create(MemberForm::new("   ", RoleSelection::default()))
        .unwrap_err();

    assert_eq!(err.to_string(), "name: Name is required");
}

#[test]
fn given_same_custom_role_when_creating_and_editing_then_same_result() {
    let temp = TempDir::new().unwrap();
    let (teams, members) = services(&temp);
    let team = teams.create(TeamForm::new("Platform", None)).unwrap();

    let created = members.create(MemberForm::new("Ann", custom("Tech Lead"))).unwrap();
    let added = teams
        .add_new_member(team.id, MemberForm::new("Bo", custom("Tech Lead")))
        .unwrap();
    let plain = members
        .create(MemberForm::new("Cy", RoleSelection::default()))
        .unwrap();
    let edited = members
        .edit(plain.id, MemberForm::new("Cy", custom("Tech Lead")), true)
        .unwrap();

    assert_eq!(created.role.as_deref(), Some("Tech Lead"));
    assert_eq!(added.role, created.role);
    assert_eq!(edited.role, created.role);
}

#[test]
fn given_custom_without_text_when_editing_then_role_cleared() {
    let temp = TempDir::new().unwrap();
    let (_, members) = services(&temp);
    let member = members.create(MemberForm::new("Ann", custom("Tech Lead"))).unwrap();

    let edited = members
        .edit(member.id, MemberForm::new("Ann", custom("")), true)
        .unwrap();

    assert_eq!(edited.role, None);
}

#[test]
fn given_member_when_editing_then_keeps_team_and_refreshes_updated_at() {
    let temp = TempDir::new().unwrap();
    let (teams, members) = services(&temp);
    let team = teams.create(TeamForm::new("Platform", None)).unwrap();
    let member = teams
        .add_new_member(team.id, MemberForm::new("Ann", RoleSelection::default()))
        .unwrap();

    let edited = members
        .edit(member.id, MemberForm::new("Anna", RoleSelection::default()), false)
        .unwrap();

    assert_eq!(edited.name, "Anna");
    assert!(!edited.is_active);
    assert_eq!(edited.team_id, Some(team.id));
    assert_eq!(edited.created_at, member.created_at);
    assert!(edited.updated_at >= member.updated_at);
}

#[test]
fn given_member_when_toggling_twice_then_active_again() {
    let temp = TempDir::new().unwrap();
    let (_, members) = services(&temp);
    let member = members.create(MemberForm::new("Ann", RoleSelection::default())).unwrap();

    assert!(!members.toggle_active(member.id).unwrap().is_active);
    assert!(members.toggle_active(member.id).unwrap().is_active);
}

#[test]
fn given_members_when_listing_then_sorted_by_name_with_team() {
    let temp = TempDir::new().unwrap();
    let (teams, members) = services(&temp);
    let team = teams.create(TeamForm::new("Platform", None)).unwrap();
    members.create(MemberForm::new("Zed", RoleSelection::default())).unwrap();
    teams
        .add_new_member(team.id, MemberForm::new("Amy", RoleSelection::default()))
        .unwrap();

    let rows = members.list().unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r.member.name.as_str()).collect();
    assert_eq!(names, vec!["Amy", "Zed"]);
    assert_eq!(rows[0].team.as_ref().map(|t| t.id), Some(team.id));
    assert!(rows[1].team.is_none());
}

#[test]
fn given_deleted_member_when_deleting_again_then_not_found() {
    let temp = TempDir::new().unwrap();
    let (_, members) = services(&temp);
    let member = members.create(MemberForm::new("Ann", RoleSelection::default())).unwrap();

    members.delete(member.id).unwrap();
    let err = members.delete(member.id).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotFound { .. })
    ));
    assert!(members.list().unwrap().is_empty());
}

#[test]
fn given_patch_with_only_active_flag_when_applying_then_keeps_concurrent_edits() {
    let temp = TempDir::new().unwrap();
    let (_, members) = services(&temp);
    let member = members.create(MemberForm::new("Ann", RoleSelection::default())).unwrap();
    // another writer renames the member after this caller last read it
    members
        .edit(member.id, MemberForm::new("Anna", custom("Tech Lead")), true)
        .unwrap();

    let patched = members
        .patch(
            member.id,
            MemberPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(patched.name, "Anna");
    assert_eq!(patched.role.as_deref(), Some("Tech Lead"));
    assert!(!patched.is_active);
}

#[test]
fn given_role_patch_when_applying_then_resolves_custom_role() {
    let temp = TempDir::new().unwrap();
    let (_, members) = services(&temp);
    let member = members.create(MemberForm::new("Ann", RoleSelection::default())).unwrap();

    let patched = members
        .patch(
            member.id,
            MemberPatch {
                role: Some(custom("Staff Engineer")),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(patched.name, "Ann");
    assert_eq!(patched.role.as_deref(), Some("Staff Engineer"));
}

#[test]
fn given_empty_patch_when_applying_then_validation_error() {
    let temp = TempDir::new().unwrap();
    let (_, members) = services(&temp);
    let member = members.create(MemberForm::new("Ann", RoleSelection::default())).unwrap();

    let err = members.patch(member.id, MemberPatch::default()).unwrap_err();

    assert!(matches!(err, ApplicationError::Validation { .. }));
}
