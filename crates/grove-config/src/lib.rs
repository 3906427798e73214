//! # Grove Configuration Library
//!
//! Type-safe configuration for the grove workspace, loaded from TOML.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grove_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("grove.toml").await?;
//!     println!("chunk size: {}", config.import.chunk_size);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

mod components;
mod config;
mod loader;

pub use components::*;
pub use config::*;
pub use loader::*;
