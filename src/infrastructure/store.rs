//! TOML file store for the team roster.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DomainError, MemberId, Team, TeamId, TeamMember};
use crate::infrastructure::traits::{FileSystem, MemberWrite, TeamRepository, TeamWrite};

/// On-disk layout of the roster file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Roster {
    next_team_id: u64,
    next_member_id: u64,
    teams: Vec<Team>,
    members: Vec<TeamMember>,
}

impl Roster {
    fn allocate_team_id(&mut self) -> TeamId {
        let highest = self.teams.iter().map(|t| t.id.get()).max().unwrap_or(0);
        let id = self.next_team_id.max(highest + 1);
        self.next_team_id = id + 1;
        TeamId(id)
    }

    fn allocate_member_id(&mut self) -> MemberId {
        let highest = self.members.iter().map(|m| m.id.get()).max().unwrap_or(0);
        let id = self.next_member_id.max(highest + 1);
        self.next_member_id = id + 1;
        MemberId(id)
    }
}

/// Roster persisted as a single TOML file.
///
/// Every operation loads the file, and writes replace it via a temporary
/// sibling file and a rename. A missing file reads as an empty roster.
///
/// Writes hold the in-process mutex and an exclusive advisory lock on
/// `<path>.lock` from load to save, so stores in other threads or processes
/// never interleave a load-modify-save on the same roster.
pub struct TomlStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    lock: Mutex<()>,
}

impl TomlStore {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> ApplicationResult<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| ApplicationError::Store {
            context: format!("lock roster {}", self.path.display()),
            source: Box::new(io::Error::other("store lock poisoned")),
        })
    }

    fn lock_path(&self) -> PathBuf {
        let mut lock = self.path.clone().into_os_string();
        lock.push(".lock");
        PathBuf::from(lock)
    }

    fn open_lock_file(&self) -> ApplicationResult<RwLock<File>> {
        let lock_path = self.lock_path();
        self.fs
            .ensure_parent(&lock_path)
            .with_path_context("create roster directory", &lock_path)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_path_context("open roster lock", &lock_path)?;
        Ok(RwLock::new(file))
    }

    fn load(&self) -> ApplicationResult<Roster> {
        if !self.fs.exists(&self.path) {
            debug!("roster {} does not exist yet", self.path.display());
            return Ok(Roster::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read roster", &self.path)?;
        toml::from_str(&content).map_err(|e| ApplicationError::Store {
            context: format!("parse roster {}", self.path.display()),
            source: Box::new(e),
        })
    }

    fn save(&self, roster: &Roster) -> ApplicationResult<()> {
        let content = toml::to_string_pretty(roster).map_err(|e| ApplicationError::Store {
            context: format!("serialize roster {}", self.path.display()),
            source: Box::new(e),
        })?;

        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create roster directory", &self.path)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        self.fs
            .write(&tmp, &content)
            .with_path_context("write roster", &tmp)?;
        self.fs
            .rename(&tmp, &self.path)
            .with_path_context("replace roster", &self.path)?;
        debug!(
            "saved roster: {} teams, {} members",
            roster.teams.len(),
            roster.members.len()
        );
        Ok(())
    }

    fn read<T>(&self, op: impl FnOnce(Roster) -> T) -> ApplicationResult<T> {
        let _guard = self.guard()?;
        Ok(op(self.load()?))
    }

    fn transact<T>(
        &self,
        op: impl FnOnce(&mut Roster) -> ApplicationResult<T>,
    ) -> ApplicationResult<T> {
        let _guard = self.guard()?;
        let mut lock_file = self.open_lock_file()?;
        let _file_guard = lock_file
            .write()
            .with_path_context("lock roster", &self.lock_path())?;

        let mut roster = self.load()?;
        let out = op(&mut roster)?;
        self.save(&roster)?;
        Ok(out)
    }
}

impl TeamRepository for TomlStore {
    fn teams(&self) -> ApplicationResult<Vec<Team>> {
        self.read(|roster| roster.teams)
    }

    fn members(&self) -> ApplicationResult<Vec<TeamMember>> {
        self.read(|roster| roster.members)
    }

    #[instrument(level = "debug", skip(self, draft, write), fields(name = %draft.name))]
    fn insert_team(&self, draft: Team, write: TeamWrite<'_>) -> ApplicationResult<Team> {
        self.transact(|roster| {
            let mut team = draft;
            write(&roster.teams, &mut team)?;
            let now = Utc::now();
            team.id = roster.allocate_team_id();
            team.created_at = now;
            team.updated_at = now;
            roster.teams.push(team.clone());
            Ok(team)
        })
    }

    #[instrument(level = "debug", skip(self, write))]
    fn update_team(&self, id: TeamId, write: TeamWrite<'_>) -> ApplicationResult<Team> {
        self.transact(|roster| {
            let idx = roster
                .teams
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| DomainError::team_not_found(id))?;
            let mut team = roster.teams[idx].clone();
            write(&roster.teams, &mut team)?;
            team.id = id;
            team.created_at = roster.teams[idx].created_at;
            team.updated_at = Utc::now();
            roster.teams[idx] = team.clone();
            Ok(team)
        })
    }

    #[instrument(level = "debug", skip(self, draft, write), fields(name = %draft.name))]
    fn insert_member(
        &self,
        draft: TeamMember,
        write: MemberWrite<'_>,
    ) -> ApplicationResult<TeamMember> {
        self.transact(|roster| {
            let mut member = draft;
            write(&roster.teams, &mut member)?;
            let now = Utc::now();
            member.id = roster.allocate_member_id();
            member.created_at = now;
            member.updated_at = now;
            roster.members.push(member.clone());
            Ok(member)
        })
    }

    #[instrument(level = "debug", skip(self, write))]
    fn update_member(&self, id: MemberId, write: MemberWrite<'_>) -> ApplicationResult<TeamMember> {
        self.transact(|roster| {
            let idx = roster
                .members
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| DomainError::member_not_found(id))?;
            let mut member = roster.members[idx].clone();
            write(&roster.teams, &mut member)?;
            member.id = id;
            member.created_at = roster.members[idx].created_at;
            member.updated_at = Utc::now();
            roster.members[idx] = member.clone();
            Ok(member)
        })
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_member(&self, id: MemberId) -> ApplicationResult<TeamMember> {
        self.transact(|roster| {
            let idx = roster
                .members
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| DomainError::member_not_found(id))?;
            Ok(roster.members.remove(idx))
        })
    }
}
