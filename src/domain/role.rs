//! Member role selection.
//!
//! Every flow that creates or edits a member resolves the submitted role
//! through [`classify_role`] with [`SUGGESTED_ROLES`].

use std::fmt;

/// Selector value meaning "use the free-text role instead".
pub const CUSTOM_ROLE: &str = "custom";

/// Roles offered by the role selector.
pub const SUGGESTED_ROLES: [&str; 4] = [
    "Software Engineer",
    "Principal Engineer",
    "Engineering Manager",
    "Frontend Engineer",
];

/// An effective member role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    name: String,
    suggested: bool,
}

impl Role {
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// True if the role is one of the suggested set.
    pub fn is_suggested(&self) -> bool {
        self.suggested
    }

    pub fn into_string(self) -> String {
        self.name
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolve the effective role from a selector value and an optional override.
///
/// - `custom` with non-empty text: the text
/// - `custom` without text: no role
/// - anything else: the selector value verbatim, empty meaning no role
pub fn classify_role(
    selected: Option<&str>,
    suggested: &[&str],
    custom_text: Option<&str>,
) -> Option<Role> {
    let name = match selected {
        Some(CUSTOM_ROLE) => custom_text.filter(|text| !text.is_empty())?,
        Some(value) if !value.is_empty() => value,
        _ => return None,
    };

    Some(Role {
        name: name.to_string(),
        suggested: suggested.contains(&name),
    })
}

/// Role fields as submitted by a create or edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSelection {
    pub selected: Option<String>,
    pub custom: Option<String>,
}

impl RoleSelection {
    pub fn new(selected: Option<String>, custom: Option<String>) -> Self {
        Self { selected, custom }
    }

    /// The role to store, resolved against [`SUGGESTED_ROLES`].
    pub fn effective(&self) -> Option<String> {
        classify_role(
            self.selected.as_deref(),
            &SUGGESTED_ROLES,
            self.custom.as_deref(),
        )
        .map(Role::into_string)
    }
}
