//! # veridea-ledger
//!
//! **Ledger plane**: the account book and the append-only transaction log.
//!
//! ## Architecture
//!
//! Every balance field in the system is mutated through [`LedgerBook`] and
//! nowhere else. Each mutating call performs its fallible checks first, then
//! applies the balance change *and* appends the matching [`Transaction`] in
//! the same call — a partial application (balance moved but no entry, or
//! vice versa) cannot be observed.
//!
//! [`LedgerAudit`] verifies the resulting invariant: for every user, the sum
//! of their transaction amounts equals their `total_balance`.
//!
//! [`Transaction`]: veridea_types::Transaction

pub mod audit;
pub mod book;

pub use audit::LedgerAudit;
pub use book::LedgerBook;
