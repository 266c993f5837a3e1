//! Provider error types.
//!
//! Defined in `gradewell-core` so the grading workflow can inspect them;
//! re-exported here for provider implementations and callers.

pub use gradewell_core::error::ProviderError;
