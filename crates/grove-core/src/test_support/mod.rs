//! Test doubles for the collaborator traits

pub mod mocks;

pub use mocks::{InMemoryProgressStore, InMemoryThoughtTree, RecordingNotifier, StoreCall};
