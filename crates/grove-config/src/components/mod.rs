//! Configuration components

pub mod import;
pub mod logging;
pub mod storage;

pub use import::*;
pub use logging::*;
pub use storage::*;
