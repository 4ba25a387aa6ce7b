//! Error types for the Veridea settlement engine.
//!
//! All errors use the `VD_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Identity / lookup errors
//! - 2xx: Balance errors
//! - 3xx: Admission errors
//! - 4xx: Approval / state-transition errors
//! - 5xx: Persistence / audit errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{PostId, UserId, ValidationId, ValidationStatus, ValidationTier};

/// Central error enum for all Veridea operations.
///
/// Every variant is non-fatal and returned to the caller; the core never
/// retries on its own. No error is ever observed alongside a partially
/// committed mutation.
#[derive(Debug, Error)]
pub enum VerideaError {
    // =================================================================
    // Identity / Lookup Errors (1xx)
    // =================================================================
    /// No authenticated user was supplied by the identity provider.
    #[error("VD_ERR_100: Unauthorized: no authenticated user")]
    Unauthorized,

    /// The referenced user account does not exist.
    #[error("VD_ERR_101: Account not found: {0}")]
    AccountNotFound(UserId),

    /// The referenced post does not exist.
    #[error("VD_ERR_102: Post not found: {0}")]
    PostNotFound(PostId),

    /// The referenced validation does not exist.
    #[error("VD_ERR_103: Validation not found: {0}")]
    ValidationNotFound(ValidationId),

    /// An account with this ID already exists.
    #[error("VD_ERR_104: Account already exists: {0}")]
    DuplicateAccount(UserId),

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Not enough spendable balance to perform the operation.
    #[error("VD_ERR_200: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// A balance operation would produce a negative value.
    #[error("VD_ERR_201: Balance underflow")]
    BalanceUnderflow,

    /// A monetary amount that must be positive was zero or negative.
    #[error("VD_ERR_202: Non-positive amount: {amount}")]
    NonPositiveAmount { amount: Decimal },

    // =================================================================
    // Admission Errors (3xx)
    // =================================================================
    /// A validation already exists for this (post, validator) pair.
    #[error("VD_ERR_300: Already validated: post {post_id} by {validator_id}")]
    AlreadyValidated {
        post_id: PostId,
        validator_id: UserId,
    },

    /// A user attempted to validate their own post.
    #[error("VD_ERR_301: Self-validation blocked for post {post_id}")]
    SelfValidation { post_id: PostId },

    /// The post is closed or past its expiry date.
    #[error("VD_ERR_302: Post not open: {post_id}")]
    PostNotOpen { post_id: PostId },

    /// The requested tier has reached its validator cap.
    #[error("VD_ERR_303: {tier} tier full: cap {cap} reached")]
    TierFull { tier: ValidationTier, cap: u32 },

    /// The post draft failed validation (bad budget, caps, form, etc.).
    #[error("VD_ERR_304: Invalid draft: {reason}")]
    InvalidDraft { reason: String },

    /// Review-form responses do not satisfy the post's form.
    #[error("VD_ERR_305: Invalid response: {reason}")]
    InvalidResponse { reason: String },

    // =================================================================
    // Approval / State Errors (4xx)
    // =================================================================
    /// The approver is not the post's author.
    #[error("VD_ERR_400: Not the post author")]
    NotAuthor,

    /// The validation is not in PENDING state (already resolved).
    #[error("VD_ERR_401: Validation not pending: currently {status}")]
    NotPending { status: ValidationStatus },

    /// A state transition not present in the transition table was attempted.
    #[error("VD_ERR_402: Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // =================================================================
    // Persistence / Audit Errors (5xx)
    // =================================================================
    /// A concurrent mutation aborted the operation. The caller should retry
    /// the whole operation, never resume partially.
    #[error("VD_ERR_500: Persistence conflict: retry the operation")]
    PersistenceConflict,

    /// The ledger audit invariant does not hold for a user — critical alert.
    #[error(
        "VD_ERR_501: Audit mismatch for {user_id}: transaction sum {tx_sum} \
         != total balance {total_balance}"
    )]
    AuditMismatch {
        user_id: UserId,
        tx_sum: Decimal,
        total_balance: Decimal,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("VD_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("VD_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, VerideaError>;
