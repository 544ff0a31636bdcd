//! Infrastructure concerns shared by every crate in the workspace: command line and
//! environment configuration, and global logger setup.

pub mod config;
pub mod logging;
