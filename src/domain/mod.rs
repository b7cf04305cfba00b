//! Domain layer: entities and the hierarchy engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod role;

pub use entities::*;
pub use error::{DomainError, DomainResult, RecordKind};
pub use hierarchy::{
    build_forest, descendants, parent_edges, safe_reparent_targets, validate_parent,
    would_create_cycle, Forest, ForestIter, ParentEdges, TeamNode, CYCLE_MESSAGE,
};
pub use role::{classify_role, Role, RoleSelection, CUSTOM_ROLE, SUGGESTED_ROLES};
