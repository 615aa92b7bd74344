//! CLI command implementations

pub mod commands;
pub mod init;
pub mod report;
pub mod simulate;
pub mod transfer;
