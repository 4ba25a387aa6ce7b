//! # veridea-settlement
//!
//! **Settlement plane**: reward settlement, approval workflow, and the
//! `Marketplace` facade.
//!
//! ## Architecture
//!
//! The settlement engine receives an admitted validation and:
//! 1. Re-enforces (post, validator) uniqueness at the validation book insert
//! 2. Pays the normal tier inline (validator credit + author debit + paired
//!    transaction entries) or records the detailed tier as a pending hold
//! 3. Updates the post's tier counter
//! 4. Closes the post when both tiers reach their caps
//!
//! The approval workflow resolves pending detailed validations: the author
//! approves (deferred credit, reputation bonus) or rejects (reputation
//! penalty, no payout), exactly once per validation.
//!
//! ## Atomicity
//!
//! Every fallible check runs before the first write, so a failed operation
//! leaves no partial effect. The [`Marketplace`] facade serializes
//! operations through `&mut self`; share it behind a lock for concurrent
//! callers.

pub mod approval;
pub mod engine;
pub mod marketplace;

pub use approval::ApprovalWorkflow;
pub use engine::{SettlementEngine, SettlementOutcome};
pub use marketplace::Marketplace;
