//! Testing infrastructure for devloop.
//!
//! Fixtures build throwaway project directories containing a plan file and
//! the context artifacts an interrupted run leaves behind. They are only
//! compiled for unit tests.

#[cfg(test)]
pub mod fixtures;

#[cfg(test)]
pub use fixtures::*;
