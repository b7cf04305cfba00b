//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the `TeamRepository` boundary trait
//! but are themselves concrete structs, not traits.

mod members;
mod teams;

pub use members::{MemberRow, MemberService};
pub use teams::{TeamDetails, TeamService, TeamSummary};
