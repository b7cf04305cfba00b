//! Command dispatch: parse args, call services, print results

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{MemberForm, MemberPatch, TeamForm, TeamPatch};
use crate::cli::args::{Cli, Commands, ConfigCommands, MemberCommands, TeamCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{self, RenderOptions};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    MemberId, Metadata, RoleSelection, TeamId, CUSTOM_ROLE, SUGGESTED_ROLES,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

/// Execute the parsed CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => {
            let settings = load_settings(cli)?;
            execute_config(cli, &settings, command)
        }
        Some(Commands::Team { command }) => {
            let container = ServiceContainer::new(load_settings(cli)?);
            execute_team(&container, command)
        }
        Some(Commands::Member { command }) => {
            let container = ServiceContainer::new(load_settings(cli)?);
            execute_member(&container, command)
        }
        None => Err(CliError::Usage(
            "no command given, see `teamtree --help`".to_string(),
        )),
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    let mut settings = Settings::load(Some(dir.as_path()))?;
    if let Some(store) = &cli.store {
        settings.store_path = store.clone();
    }
    debug!("store: {}", settings.store_path.display());
    Ok(settings)
}

// ============================================================
// Team commands
// ============================================================

#[instrument(level = "debug", skip(container))]
fn execute_team(container: &ServiceContainer, cmd: &TeamCommands) -> CliResult<()> {
    let opts = RenderOptions::from(&container.settings.display);

    match cmd {
        TeamCommands::List => team_list(container),
        TeamCommands::Tree { no_members } => {
            let opts = RenderOptions {
                show_members: opts.show_members && !no_members,
                ..opts
            };
            team_tree(container, &opts)
        }
        TeamCommands::Show { team } => team_show(container, *team, &opts),
        TeamCommands::Create {
            name,
            parent,
            department,
            incident_manager,
        } => {
            let metadata = Metadata::new(department.as_deref(), incident_manager.as_deref());
            let form = TeamForm::new(name.clone(), *parent).with_metadata(metadata);
            let team = container.teams.create(form)?;
            output::success(&format!("Created team #{} {}", team.id, team.name));
            Ok(())
        }
        TeamCommands::Update {
            team,
            name,
            parent,
            root,
            department,
            incident_manager,
            meta,
        } => {
            let mut patch = TeamPatch {
                name: name.clone(),
                parent_id: if *root { Some(None) } else { parent.map(Some) },
                metadata: Vec::new(),
            };
            if let Some(value) = department {
                patch.metadata.push((Metadata::DEPARTMENT.to_string(), value.clone()));
            }
            if let Some(value) = incident_manager {
                patch
                    .metadata
                    .push((Metadata::INCIDENT_MANAGER.to_string(), value.clone()));
            }
            for entry in meta {
                patch.metadata.push(parse_meta(entry)?);
            }

            let updated = container.teams.patch(*team, patch)?;
            output::success(&format!("Updated team #{} {}", updated.id, updated.name));
            Ok(())
        }
        TeamCommands::Targets { team } => {
            let targets = container.teams.reparent_targets(*team)?;
            if targets.is_empty() {
                output::info("No valid parent teams");
                return Ok(());
            }
            for target in &targets {
                output::info(&format!("#{}  {}", target.id, target.name));
            }
            Ok(())
        }
        TeamCommands::AddMember {
            team,
            name,
            role,
            custom_role,
        } => {
            let form = MemberForm::new(name.clone(), role_selection(role, custom_role));
            let member = container.teams.add_new_member(*team, form)?;
            output::success(&format!(
                "Added member #{} {} to team #{}",
                member.id, member.name, team
            ));
            Ok(())
        }
        TeamCommands::Assign { team, member } => {
            let member = container.teams.add_existing_member(*team, *member)?;
            output::success(&format!("Assigned {} to team #{}", member.name, team));
            Ok(())
        }
        TeamCommands::RemoveMember { team, member } => {
            let member = container.teams.remove_member(*team, *member)?;
            output::success(&format!("Removed {} from team #{}", member.name, team));
            Ok(())
        }
    }
}

fn team_list(container: &ServiceContainer) -> CliResult<()> {
    let summaries = container.teams.list()?;
    if summaries.is_empty() {
        output::info("No teams yet");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            vec![
                s.team.id.to_string(),
                s.team.name.clone(),
                s.parent
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "-".to_string()),
                render::capitalize_first(s.team.metadata.department.as_deref()),
                s.member_count.to_string(),
            ]
        })
        .collect();
    output::info(&render::format_table(
        &["ID", "Name", "Parent", "Department", "Members"],
        &rows,
    ));
    Ok(())
}

fn team_tree(container: &ServiceContainer, opts: &RenderOptions) -> CliResult<()> {
    let forest = container.teams.forest()?;
    if forest.is_empty() {
        output::info("No teams yet");
    }
    for tree in render::render_forest(&forest, opts) {
        output::info(&tree);
    }

    let unassigned: Vec<_> = forest
        .unassigned
        .iter()
        .filter(|m| m.is_active || opts.show_inactive)
        .collect();
    if opts.show_members && !unassigned.is_empty() {
        output::header("Unassigned");
        for member in unassigned {
            output::detail(&render::member_label(member, opts));
        }
    }
    Ok(())
}

fn team_show(container: &ServiceContainer, id: TeamId, opts: &RenderOptions) -> CliResult<()> {
    let details = container.teams.details(id)?;
    let team = &details.team;

    output::header(&format!("{} (#{})", team.name, team.id));
    output::detail(&format!(
        "Parent:           {}",
        details
            .parent
            .as_ref()
            .map(|p| format!("{} (#{})", p.name, p.id))
            .unwrap_or_else(|| "-".to_string())
    ));
    output::detail(&format!(
        "Department:       {}",
        render::capitalize_first(team.metadata.department.as_deref())
    ));
    output::detail(&format!(
        "Incident manager: {}",
        team.metadata.incident_manager.as_deref().unwrap_or("-")
    ));
    output::detail(&format!(
        "Updated:          {}",
        team.updated_at.format("%Y-%m-%d %H:%M")
    ));

    output::header("Members");
    if details.members.is_empty() {
        output::detail("-");
    } else {
        let rows: Vec<Vec<String>> = details
            .members
            .iter()
            .map(|m| {
                vec![
                    m.id.to_string(),
                    m.name.clone(),
                    m.role.clone().unwrap_or_else(|| "-".to_string()),
                    if m.is_active { "active" } else { "inactive" }.to_string(),
                ]
            })
            .collect();
        output::info(&render::format_table(&["ID", "Name", "Role", "Status"], &rows));
    }

    output::header("Sub-teams");
    if details.children.is_empty() {
        output::detail("-");
    }
    for child in &details.children {
        output::detail(&render::team_label(child, &RenderOptions { show_ids: true, ..*opts }));
    }

    output::header("Available members");
    if details.available_members.is_empty() {
        output::detail("-");
    }
    for member in &details.available_members {
        output::detail(&render::member_label(member, &RenderOptions { show_ids: true, ..*opts }));
    }

    output::header("Possible parents");
    if details.available_parents.is_empty() {
        output::detail("-");
    }
    for parent in &details.available_parents {
        output::detail(&format!("#{}  {}", parent.id, parent.name));
    }
    Ok(())
}

/// Split a `KEY=VALUE` metadata argument.
fn parse_meta(entry: &str) -> CliResult<(String, String)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CliError::InvalidArgs(format!(
            "expected KEY=VALUE, got '{}'",
            entry
        ))),
    }
}

/// `--custom-role` on its own implies `--role custom`.
fn role_selection(role: &Option<String>, custom_role: &Option<String>) -> RoleSelection {
    let selected = match (role, custom_role) {
        (None, Some(_)) => Some(CUSTOM_ROLE.to_string()),
        _ => role.clone(),
    };
    RoleSelection::new(selected, custom_role.clone())
}

// ============================================================
// Member commands
// ============================================================

#[instrument(level = "debug", skip(container))]
fn execute_member(container: &ServiceContainer, cmd: &MemberCommands) -> CliResult<()> {
    match cmd {
        MemberCommands::List => member_list(container),
        MemberCommands::Roles => {
            for role in SUGGESTED_ROLES {
                output::info(role);
            }
            Ok(())
        }
        MemberCommands::Create {
            name,
            role,
            custom_role,
        } => {
            let form = MemberForm::new(name.clone(), role_selection(role, custom_role));
            let member = container.members.create(form)?;
            output::success(&format!("Created member #{} {}", member.id, member.name));
            Ok(())
        }
        MemberCommands::Edit {
            member,
            name,
            role,
            custom_role,
            active,
        } => member_edit(container, *member, name, role, custom_role, *active),
        MemberCommands::Toggle { member } => {
            let member = container.members.toggle_active(*member)?;
            let state = if member.is_active { "active" } else { "inactive" };
            output::success(&format!("{} is now {}", member.name, state));
            Ok(())
        }
        MemberCommands::Delete { member } => {
            let member = container.members.delete(*member)?;
            output::success(&format!("Deleted member #{} {}", member.id, member.name));
            Ok(())
        }
    }
}

fn member_list(container: &ServiceContainer) -> CliResult<()> {
    let rows = container.members.list()?;
    if rows.is_empty() {
        output::info("No members yet");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.member.id.to_string(),
                row.member.name.clone(),
                row.member.role.clone().unwrap_or_else(|| "-".to_string()),
                row.team
                    .as_ref()
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| "-".to_string()),
                if row.member.is_active { "active" } else { "inactive" }.to_string(),
            ]
        })
        .collect();
    output::info(&render::format_table(
        &["ID", "Name", "Role", "Team", "Status"],
        &rows,
    ));
    Ok(())
}

/// Unspecified fields keep their stored values; a role flag replaces the role.
fn member_edit(
    container: &ServiceContainer,
    id: MemberId,
    name: &Option<String>,
    role: &Option<String>,
    custom_role: &Option<String>,
    active: Option<bool>,
) -> CliResult<()> {
    let patch = MemberPatch {
        name: name.clone(),
        role: (role.is_some() || custom_role.is_some()).then(|| role_selection(role, custom_role)),
        is_active: active,
    };

    let member = container.members.patch(id, patch)?;
    output::success(&format!("Updated member #{} {}", member.id, member.name));
    Ok(())
}

// ============================================================
// Config commands
// ============================================================

fn execute_config(cli: &Cli, settings: &Settings, cmd: &ConfigCommands) -> CliResult<()> {
    match cmd {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let dir = config_dir(cli)?;
            match global_config_path() {
                Some(path) => output::info(&format!("Global: {}", path.display())),
                None => output::info("Global: (no config directory available)"),
            }
            output::info(&format!("Local:  {}", local_config_path(&dir).display()));
            output::info(&format!("Store:  {}", settings.store_path.display()));
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("no global config directory available".to_string())
                })?
            } else {
                local_config_path(&config_dir(cli)?)
            };

            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
            fs.write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}
