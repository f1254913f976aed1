//! CLI commands

pub mod analyze;
pub mod download;
pub mod history;
pub mod init;
pub mod premium;
pub mod simulate;
