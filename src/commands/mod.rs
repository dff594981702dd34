//! Command implementations for the gatebundle CLI

pub mod completions;
pub mod install;
pub mod list;
pub mod show;
pub mod version;
