//! SQLite storage backend for grove
//!
//! One database file holds both halves of grove's durable state:
//!
//! - **Progress store**: a key-value table of JSON documents implementing
//!   [`grove_core::ProgressStore`] (import manifests and text blobs)
//! - **Thought tree**: a parent-linked `thoughts` table implementing the merge,
//!   pull and placeholder collaborators
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grove_sqlite::{SqliteConfig, SqlitePool, SqliteProgressStore, SqliteThoughtStore};
//!
//! let pool = SqlitePool::new(SqliteConfig::new("./grove.db"))?;
//! let progress = SqliteProgressStore::new(pool.clone());
//! let tree = SqliteThoughtStore::new(pool);
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod progress_store;
pub mod schema;
pub mod thought_store;

pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use progress_store::SqliteProgressStore;
pub use thought_store::SqliteThoughtStore;
