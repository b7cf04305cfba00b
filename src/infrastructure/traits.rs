//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested against temporary stores or alternative backends.

use std::io;
use std::path::Path;

use crate::application::ApplicationResult;
use crate::domain::{MemberId, Team, TeamId, TeamMember};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Rename/move a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Callback that may adjust or reject a team write.
///
/// Receives every stored team as of the write and a mutable copy of the
/// record being written.
pub type TeamWrite<'a> = &'a mut dyn FnMut(&[Team], &mut Team) -> ApplicationResult<()>;

/// Callback that may adjust or reject a member write.
pub type MemberWrite<'a> = &'a mut dyn FnMut(&[Team], &mut TeamMember) -> ApplicationResult<()>;

/// Persistence boundary for teams and members.
///
/// Implementations run each write callback and the write itself under one
/// critical section, shared by every writer of the same roster including
/// other processes, so validation inside the callback sees the same data the
/// write lands on.
pub trait TeamRepository: Send + Sync {
    fn teams(&self) -> ApplicationResult<Vec<Team>>;

    fn members(&self) -> ApplicationResult<Vec<TeamMember>>;

    /// Store a new team. The id and timestamps of `draft` are assigned by the store.
    fn insert_team(&self, draft: Team, write: TeamWrite<'_>) -> ApplicationResult<Team>;

    /// Modify an existing team; `NotFound` if absent.
    fn update_team(&self, id: TeamId, write: TeamWrite<'_>) -> ApplicationResult<Team>;

    /// Store a new member. The id and timestamps of `draft` are assigned by the store.
    fn insert_member(&self, draft: TeamMember, write: MemberWrite<'_>)
        -> ApplicationResult<TeamMember>;

    /// Modify an existing member; `NotFound` if absent.
    fn update_member(&self, id: MemberId, write: MemberWrite<'_>) -> ApplicationResult<TeamMember>;

    /// Remove a member record and return it.
    fn delete_member(&self, id: MemberId) -> ApplicationResult<TeamMember>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
