//! Rendering of teams, members and the org chart for the terminal.

use termtree::Tree;

use crate::config::DisplayConfig;
use crate::domain::{Forest, Team, TeamMember, TeamNode};

/// What to include when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_members: bool,
    pub show_inactive: bool,
    pub show_ids: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&DisplayConfig::default())
    }
}

impl From<&DisplayConfig> for RenderOptions {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            show_members: display.show_members,
            show_inactive: display.show_inactive,
            show_ids: display.show_ids,
        }
    }
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self, opts: &RenderOptions) -> Tree<String>;
}

impl TreeNodeConvert for TeamNode {
    fn to_tree_string(&self, opts: &RenderOptions) -> Tree<String> {
        let mut tree = Tree::new(team_label(&self.team, opts));

        if opts.show_members {
            for member in &self.members {
                if member.is_active || opts.show_inactive {
                    tree.push(Tree::new(member_label(member, opts)));
                }
            }
        }
        for child in &self.children {
            tree.push(child.to_tree_string(opts));
        }
        tree
    }
}

/// One tree per root team, in forest order.
pub fn render_forest(forest: &Forest, opts: &RenderOptions) -> Vec<Tree<String>> {
    forest
        .roots
        .iter()
        .map(|root| root.to_tree_string(opts))
        .collect()
}

pub fn team_label(team: &Team, opts: &RenderOptions) -> String {
    let mut label = team.name.clone();
    if opts.show_ids {
        label.push_str(&format!(" (#{})", team.id));
    }
    if let Some(department) = &team.metadata.department {
        label.push_str(&format!(" [{}]", capitalize_first(Some(department))));
    }
    label
}

pub fn member_label(member: &TeamMember, opts: &RenderOptions) -> String {
    let mut label = member.name.clone();
    if opts.show_ids {
        label.push_str(&format!(" (#{})", member.id));
    }
    if let Some(role) = &member.role {
        label.push_str(&format!(" · {}", role));
    }
    if !member.is_active {
        label.push_str(" (inactive)");
    }
    label
}

/// Upper-case the first character; "-" for missing or empty values.
pub fn capitalize_first(value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return "-".to_string();
    };
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "-".to_string(),
    }
}

/// Left-aligned columns separated by two spaces.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(headers.to_vec())];
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}
