//! # veridea-types
//!
//! Shared types, errors, and configuration for the **Veridea** validation &
//! reward settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`PostId`], [`ValidationId`], [`TxId`]
//! - **Account model**: [`UserAccount`]
//! - **Post model**: [`Post`], [`PostDraft`], [`PostStatus`], [`ValidationTier`]
//! - **Validation model**: [`Validation`], [`ValidationRequest`], [`ValidationStatus`]
//! - **Ledger model**: [`Transaction`], [`TransactionKind`], [`TransactionStatus`]
//! - **Review forms**: [`FieldSpec`], [`FieldKind`], [`FieldValue`], [`FieldResponse`]
//! - **Configuration**: [`MarketplaceConfig`]
//! - **Errors**: [`VerideaError`] with `VD_ERR_` prefix codes
//! - **Constants**: reputation deltas and system-wide limits

pub mod account;
pub mod config;
pub mod constants;
pub mod error;
pub mod form;
pub mod ids;
pub mod post;
pub mod transaction;
pub mod validation;

// Re-export all primary types at crate root for ergonomic imports:
//   use veridea_types::{Post, Validation, Transaction, ...};

pub use account::*;
pub use config::*;
pub use error::*;
pub use form::*;
pub use ids::*;
pub use post::*;
pub use transaction::*;
pub use validation::*;

// Constants are accessed via `veridea_types::constants::FOO`
// (not re-exported to avoid name collisions).
