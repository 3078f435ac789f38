//! Structured error types for the import pipeline.

mod import;

pub use import::{ImportError, ImportErrorKind};
