//! Shared helpers for unit and integration tests.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{MemberId, Team, TeamId, TeamMember};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "teamtree=trace");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("teamtree=debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Team fixture with fixed id and optional parent.
pub fn team(id: u64, name: &str, parent: Option<u64>) -> Team {
    Team::new(TeamId(id), name, parent.map(TeamId))
}

/// Active member fixture, optionally assigned to a team.
pub fn member(id: u64, name: &str, team: Option<u64>) -> TeamMember {
    TeamMember::new(MemberId(id), name, team.map(TeamId))
}

/// Complete tree: every team above `depth` has `width` children.
///
/// Ids are assigned breadth-first starting at 1; the root is team 1.
pub fn balanced_tree(depth: usize, width: usize) -> Vec<Team> {
    let mut teams = vec![team(1, "Team 1", None)];
    let mut level = vec![1u64];
    let mut next = 2u64;

    for _ in 1..depth {
        let mut next_level = Vec::with_capacity(level.len() * width);
        for &parent in &level {
            for _ in 0..width {
                teams.push(team(next, &format!("Team {next}"), Some(parent)));
                next_level.push(next);
                next += 1;
            }
        }
        level = next_level;
    }
    teams
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_depth_and_width_when_building_fixture_then_counts_match() {
        // 1 + 3 + 9
        assert_eq!(balanced_tree(3, 3).len(), 13);
        assert_eq!(balanced_tree(1, 5).len(), 1);
    }
}
