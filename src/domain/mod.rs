//! Engine rules that sit above raw rows: snapshots, the audit trail,
//! ordered deletion and the catalog predicate.

pub mod audit;
pub mod cascade;
pub mod catalog;
pub mod error;
pub mod snapshot;
