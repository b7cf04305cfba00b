//! teamtree: nested teams, member assignment and org chart rendering.
//!
//! Layers, innermost first:
//! - [`domain`]: entities, the hierarchy engine and role resolution
//! - [`application`]: forms and services that validate writes against the hierarchy
//! - [`infrastructure`]: the TOML roster store and service wiring
//! - [`cli`]: argument parsing, dispatch and rendering

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
