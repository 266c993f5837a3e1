//! gradewell-core: grading workflow, data model, and portal store.
//!
//! This crate defines the activity/submission model, the remote-first
//! grading workflow with its local fallback, and the slot-persisted portal
//! state that the CLI drives.

pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod portal;
pub mod prompt;
pub mod schema;
pub mod seed;
pub mod store;
pub mod traits;

pub use error::{GradingError, PortalError, ProviderError, SchemaError};
pub use grading::{fallback_grade, Grader, GraderConfig};
pub use model::{Activity, AnswerSet, GradingResult, Question, Submission};
pub use portal::Portal;
