//! grove command-line interface

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod interrupt;
pub mod logging;
pub mod notifier;
