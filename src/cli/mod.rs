//! Command-line front end for the escrow wallet

pub mod commands;

pub use commands::{cmd_new, cmd_sign, cmd_status, resolve_config, CliResult};
