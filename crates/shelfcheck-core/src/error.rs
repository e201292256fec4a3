//! Core domain errors.

use thiserror::Error;

/// Core domain errors for shelfcheck.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The item list contained no searchable entries.
    #[error("Item list is empty")]
    EmptyTaskSet,

    /// Positions must start at 1.
    #[error("Invalid item position: {0}")]
    InvalidPosition(usize),
}
