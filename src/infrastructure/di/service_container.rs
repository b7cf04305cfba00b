//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{MemberService, TeamService};
use crate::config::Settings;
use crate::infrastructure::store::TomlStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, TeamRepository};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Roster persistence
    pub repo: Arc<dyn TeamRepository>,

    pub teams: TeamService,
    pub members: MemberService,
}

impl ServiceContainer {
    /// Create a new service container with the TOML store at `settings.store_path`.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let repo: Arc<dyn TeamRepository> =
            Arc::new(TomlStore::new(settings.store_path.clone(), Arc::clone(&fs)));
        Self::with_deps(settings, fs, repo)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        repo: Arc<dyn TeamRepository>,
    ) -> Self {
        let settings = Arc::new(settings);
        let teams = TeamService::new(Arc::clone(&repo));
        let members = MemberService::new(Arc::clone(&repo));

        Self {
            settings,
            fs,
            repo,
            teams,
            members,
        }
    }
}
