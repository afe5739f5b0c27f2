//! Subcommand handlers.

pub mod highlight;
pub mod install;
pub mod run;
pub mod serve;
