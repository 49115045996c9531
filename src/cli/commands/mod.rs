//! CLI command implementations

pub mod completions;
pub mod copy_master;
pub mod hello;
pub mod import;
pub mod init;
pub mod read_csv;
pub mod status;
