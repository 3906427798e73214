pub mod abandon;
pub mod config;
pub mod export;
pub mod import;
pub mod pending;
