//! Tests for role resolution shared by every member create and edit flow.

use rstest::rstest;

use teamtree::application::MemberForm;
use teamtree::domain::{classify_role, RoleSelection, CUSTOM_ROLE, SUGGESTED_ROLES};

#[rstest]
#[case::custom_without_text(Some("custom"), Some(""), None)]
#[case::custom_missing_text(Some("custom"), None, None)]
#[case::custom_with_text(Some("custom"), Some("Tech Lead"), Some("Tech Lead"))]
#[case::suggested_ignores_override(Some("Software Engineer"), Some("anything"), Some("Software Engineer"))]
#[case::verbatim_free_text(Some("Staff Engineer"), None, Some("Staff Engineer"))]
#[case::empty_selection(Some(""), Some("Tech Lead"), None)]
#[case::no_selection(None, Some("Tech Lead"), None)]
fn given_selection_when_classifying_then_effective_role(
    #[case] selected: Option<&str>,
    #[case] custom: Option<&str>,
    #[case] expected: Option<&str>,
) {
    let role = classify_role(selected, &SUGGESTED_ROLES, custom);
    assert_eq!(role.as_ref().map(|r| r.as_str()), expected);
}

#[rstest]
#[case("Principal Engineer", true)]
#[case("Tech Lead", false)]
fn given_role_when_classifying_then_flags_suggested(#[case] name: &str, #[case] suggested: bool) {
    let selected = if suggested { name } else { CUSTOM_ROLE };
    let role = classify_role(Some(selected), &SUGGESTED_ROLES, Some(name)).unwrap();
    assert_eq!(role.is_suggested(), suggested);
}

#[test]
fn given_same_selection_when_resolving_via_form_and_engine_then_identical() {
    let selection = RoleSelection::new(Some("custom".into()), Some("Tech Lead".into()));
    let form = MemberForm::new("Kim", selection.clone());

    let from_engine = classify_role(
        selection.selected.as_deref(),
        &SUGGESTED_ROLES,
        selection.custom.as_deref(),
    )
    .map(|r| r.into_string());

    assert_eq!(form.effective_role(), from_engine);
    assert_eq!(selection.effective(), Some("Tech Lead".to_string()));
}
