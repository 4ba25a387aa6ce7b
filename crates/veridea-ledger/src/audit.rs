//! Ledger audit — the money-conservation invariant checker.
//!
//! Invariant checked for every user:
//! ```text
//! Σ(transaction amounts for user) == user.total_balance
//! ```
//! Accounts open at zero and every balance mutation appends exactly one
//! entry, so the transaction log must reproduce the total balance exactly.
//! A mismatch means a mutation bypassed the book — the ultimate safety net.

use sha2::{Digest, Sha256};
use veridea_types::{Result, UserId, VerideaError};

use crate::book::LedgerBook;

/// Read-only audit view over a [`LedgerBook`].
pub struct LedgerAudit<'a> {
    book: &'a LedgerBook,
}

impl<'a> LedgerAudit<'a> {
    #[must_use]
    pub fn new(book: &'a LedgerBook) -> Self {
        Self { book }
    }

    /// Verify the conservation invariant for one user.
    ///
    /// # Errors
    /// Returns [`VerideaError::AuditMismatch`] if the transaction sum does
    /// not reproduce the user's total balance, or `AccountNotFound`.
    pub fn verify_user(&self, user_id: UserId) -> Result<()> {
        let account = self.book.account(user_id)?;
        let tx_sum = self.book.user_net(user_id);
        if tx_sum != account.total_balance {
            return Err(VerideaError::AuditMismatch {
                user_id,
                tx_sum,
                total_balance: account.total_balance,
            });
        }
        Ok(())
    }

    /// Verify the conservation invariant for every registered account.
    ///
    /// # Errors
    /// Returns the first [`VerideaError::AuditMismatch`] encountered.
    pub fn verify_all(&self) -> Result<()> {
        for user_id in self.book.user_ids() {
            self.verify_user(user_id)?;
        }
        Ok(())
    }

    /// SHA-256 digest of the serialized transaction log, hex-encoded.
    /// Exported alongside audit reports so two parties can compare trails.
    ///
    /// # Errors
    /// Returns `Serialization` if the log cannot be serialized.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self.book.transactions())
            .map_err(|e| VerideaError::Serialization(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(b"veridea:ledger:v1:");
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

impl LedgerBook {
    /// Audit view over this book.
    #[must_use]
    pub fn audit(&self) -> LedgerAudit<'_> {
        LedgerAudit::new(self)
    }
}
