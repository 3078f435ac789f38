//! Spreadsheet import reconciliation.
//!
//! The engine takes parsed [`ImportRow`]s, resolves their coop/sire/dam
//! references against a [`ReconciliationContext`], creates records through
//! a caller-supplied [`BirdStore`], and reports per-row outcomes in an
//! [`ImportResult`].

pub mod context;
pub mod memory;
pub mod reconciler;
pub mod store;
pub mod types;

pub use context::ReconciliationContext;
pub use memory::{CreatedBird, MemoryStore};
pub use reconciler::reconcile_and_import;
pub use store::BirdStore;
pub use types::{AutoCreated, BirdStatus, ImportResult, ImportRow, NewBird, RowError, Sex};
