//! Append-only ledger entries for the Veridea audit trail.
//!
//! Every balance mutation produces exactly one [`Transaction`]; entries are
//! never mutated or deleted. For any user, the sum of their transaction
//! amounts equals the net change to their `total_balance` since account
//! creation — the ledger audit checks exactly this.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{TxId, UserId, ValidationId};

/// What kind of balance movement this entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Author spend: budget escrow at publish, or the per-validation payout
    /// charge. Always negative.
    PostPayment,
    /// Validator earning for a completed or approved validation. Positive.
    ValidationEarning,
    /// Withdrawal to an external payment rail. Negative.
    Cashout,
    /// Promotional or signup credit. Positive.
    Bonus,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PostPayment => write!(f, "POST_PAYMENT"),
            Self::ValidationEarning => write!(f, "VALIDATION_EARNING"),
            Self::Cashout => write!(f, "CASHOUT"),
            Self::Bonus => write!(f, "BONUS"),
        }
    }
}

/// Settlement status of a transaction.
///
/// This core settles synchronously, so every entry it writes is `Completed`.
/// `Pending`/`Failed` exist for asynchronous payment rails, which live
/// outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// One immutable ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: TxId,
    pub user_id: UserId,
    /// Signed amount: positive credits, negative debits.
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// Back-reference for validation-driven movements.
    pub validation_id: Option<ValidationId>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// A completed entry — the only status this core writes.
    #[must_use]
    pub fn completed(
        user_id: UserId,
        amount: Decimal,
        kind: TransactionKind,
        validation_id: Option<ValidationId>,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TxId::new(),
            user_id,
            amount,
            kind,
            status: TransactionStatus::Completed,
            validation_id,
            description,
            created_at: now,
        }
    }

    /// Whether this entry credits the user.
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }
}
