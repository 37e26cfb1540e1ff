//! Command-line host for `kalshi-bridge`: layered configuration plus the
//! `run` and `check` commands.

pub mod commands;
pub mod config;
