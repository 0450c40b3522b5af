//! Persistence domain types for the stored session format.
//!
//! The persisted form is decoupled from the in-memory [`crate::Session`] so
//! the on-disk contract can be versioned independently.

mod common;
mod session;

pub use common::{CURRENT_SCHEMA_VERSION, TaggedSet};
pub use session::PersistedSession;
