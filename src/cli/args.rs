//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::{MemberId, TeamId};

/// Team hierarchy and roster manager: nested teams, member assignment, org chart rendering
#[derive(Parser, Debug)]
#[command(name = "teamtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Roster file (overrides config)
    #[arg(long, global = true, env = "TEAMTREE_STORE", value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    /// Directory with a local .teamtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage teams and the team hierarchy
    Team {
        #[command(subcommand)]
        command: TeamCommands,
    },

    /// Manage the member roster
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List all teams
    List,

    /// Show the org chart
    Tree {
        /// Hide members
        #[arg(long)]
        no_members: bool,
    },

    /// Show a team with members, children and parent options
    Show {
        /// Team id
        team: TeamId,
    },

    /// Create a team
    Create {
        /// Team name (at least 2 characters)
        name: String,
        /// Parent team id
        #[arg(short, long)]
        parent: Option<TeamId>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        incident_manager: Option<String>,
    },

    /// Rename, reparent or edit metadata of a team
    Update {
        /// Team id
        team: TeamId,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New parent team id
        #[arg(short, long, conflicts_with = "root")]
        parent: Option<TeamId>,
        /// Detach from parent (make it a root team)
        #[arg(long)]
        root: bool,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        incident_manager: Option<String>,
        /// Metadata entry (department, incidentManager)
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// List teams that may become the parent of a team
    Targets {
        /// Team id
        team: TeamId,
    },

    /// Create a new member inside a team
    AddMember {
        /// Team id
        team: TeamId,
        /// Member name
        name: String,
        /// Role (one of the suggested roles, or "custom")
        #[arg(short, long)]
        role: Option<String>,
        /// Role text used when --role custom
        #[arg(long)]
        custom_role: Option<String>,
    },

    /// Attach an existing member to a team
    Assign {
        /// Team id
        team: TeamId,
        /// Member id
        member: MemberId,
    },

    /// Detach a member from a team
    RemoveMember {
        /// Team id
        team: TeamId,
        /// Member id
        member: MemberId,
    },
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// List all members
    List,

    /// Show suggested roles
    Roles,

    /// Create an unassigned member
    Create {
        /// Member name
        name: String,
        /// Role (one of the suggested roles, or "custom")
        #[arg(short, long)]
        role: Option<String>,
        /// Role text used when --role custom
        #[arg(long)]
        custom_role: Option<String>,
    },

    /// Edit name, role and active flag
    Edit {
        /// Member id
        member: MemberId,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// Role (one of the suggested roles, or "custom"; empty clears it)
        #[arg(short, long)]
        role: Option<String>,
        /// Role text used when --role custom
        #[arg(long)]
        custom_role: Option<String>,
        /// Active flag
        #[arg(long)]
        active: Option<bool>,
    },

    /// Flip the active flag
    Toggle {
        /// Member id
        member: MemberId,
    },

    /// Delete a member record
    Delete {
        /// Member id
        member: MemberId,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
