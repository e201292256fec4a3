//! shelfcheck Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - WebDriver
//! - Runtime specifics
//!
//! Items go in, outcomes come out. Everything needed to decide what an
//! outcome means (classification, notification wording) lives here so it
//! can be tested without a browser.

pub mod classify;
pub mod error;
pub mod ids;
pub mod item;
pub mod notice;
pub mod outcome;
pub mod status;

// Re-export commonly used types
pub use classify::{classify, FailureKind, Signal};
pub use error::CoreError;
pub use ids::RunId;
pub use item::{Item, TaskSet};
pub use notice::Notice;
pub use outcome::{Outcome, Report};
pub use status::OutcomeStatus;
