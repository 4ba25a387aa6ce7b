//! User account record: balances, reputation, and activity counters.
//!
//! Every user has a `total_balance` (all-time net earnings minus spend, the
//! ledger mirror), an `available_balance` (spendable funds, never negative),
//! and an `opted_out_balance` (protected funds excluded from spend and
//! cashout). Balance fields are only ever mutated through the ledger book.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A user account as the settlement core sees it.
///
/// Created at signup; never deleted. The presentation layer owns the rest of
/// the profile (name, avatar, bio) — none of that enters this core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    /// All-time net earnings minus spend. Mirrors the transaction log:
    /// the sum of this user's transaction amounts equals the net change
    /// here since account creation.
    pub total_balance: Decimal,
    /// Spendable / withdrawable funds. Must never go negative.
    pub available_balance: Decimal,
    /// Funds the user has protected from being spent or cashed out.
    /// Always `<= available_balance`.
    pub opted_out_balance: Decimal,
    /// Adjusted by validation outcomes: earned on completed and approved
    /// validations, deducted on rejections.
    pub reputation_score: i64,
    /// Number of validations this user has performed (any tier).
    pub total_validations: u64,
    /// Number of posts this user has published.
    pub total_ideas_submitted: u64,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create a fresh zero-balance account.
    #[must_use]
    pub fn new(id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            total_balance: Decimal::ZERO,
            available_balance: Decimal::ZERO,
            opted_out_balance: Decimal::ZERO,
            reputation_score: 0,
            total_validations: 0,
            total_ideas_submitted: 0,
            created_at: now,
        }
    }

    /// Funds usable for post budgets, payouts, and cashout:
    /// available minus the opted-out protection.
    #[must_use]
    pub fn spendable(&self) -> Decimal {
        self.available_balance - self.opted_out_balance
    }

    /// Whether this account holds no funds at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available_balance.is_zero() && self.total_balance.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_is_zeroed() {
        let acct = UserAccount::new(UserId::new(), Utc::now());
        assert_eq!(acct.total_balance, Decimal::ZERO);
        assert_eq!(acct.available_balance, Decimal::ZERO);
        assert_eq!(acct.opted_out_balance, Decimal::ZERO);
        assert_eq!(acct.reputation_score, 0);
        assert!(acct.is_empty());
    }

    #[test]
    fn spendable_excludes_opted_out() {
        let mut acct = UserAccount::new(UserId::new(), Utc::now());
        acct.available_balance = Decimal::new(100, 0);
        acct.opted_out_balance = Decimal::new(30, 0);
        assert_eq!(acct.spendable(), Decimal::new(70, 0));
    }

    #[test]
    fn serde_roundtrip() {
        let mut acct = UserAccount::new(UserId::new(), Utc::now());
        acct.available_balance = Decimal::new(12345, 2); // 123.45
        acct.reputation_score = -3;
        let json = serde_json::to_string(&acct).unwrap();
        let back: UserAccount = serde_json::from_str(&json).unwrap();
        assert_eq!(acct, back);
    }
}
