//! Library side of the `roster` command-line tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
