//! The account book — the single funnel for every balance mutation.
//!
//! Components never touch `UserAccount` balance fields directly; they call
//! one of the mutators here. Each mutator validates everything it can fail
//! on *before* the first write, then applies the balance change, the counter
//! updates, and the transaction append together.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use veridea_types::{
    PostId, Result, Transaction, TransactionKind, TxId, UserAccount, UserId, ValidationId,
    VerideaError,
};

/// Source of truth for account state and the transaction log.
pub struct LedgerBook {
    accounts: HashMap<UserId, UserAccount>,
    /// Append-only. Entries are never mutated or removed.
    log: Vec<Transaction>,
}

impl LedgerBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            log: Vec::new(),
        }
    }

    /// Open a zero-balance account at signup.
    ///
    /// # Errors
    /// Returns `DuplicateAccount` if the ID is already registered.
    pub fn open_account(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<()> {
        if self.accounts.contains_key(&user_id) {
            return Err(VerideaError::DuplicateAccount(user_id));
        }
        self.accounts.insert(user_id, UserAccount::new(user_id, now));
        debug!(%user_id, "account opened");
        Ok(())
    }

    /// Look up an account.
    ///
    /// # Errors
    /// Returns `AccountNotFound` if absent.
    pub fn account(&self, user_id: UserId) -> Result<&UserAccount> {
        self.accounts
            .get(&user_id)
            .ok_or(VerideaError::AccountNotFound(user_id))
    }

    /// Whether an account exists.
    #[must_use]
    pub fn contains(&self, user_id: UserId) -> bool {
        self.accounts.contains_key(&user_id)
    }

    /// Credit external funds (signup grant, promotional credit).
    /// Appends a `BONUS` entry.
    ///
    /// # Errors
    /// `AccountNotFound` or `NonPositiveAmount`.
    pub fn deposit(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<TxId> {
        Self::require_positive(amount)?;
        let account = self.account_mut(user_id)?;
        account.available_balance += amount;
        account.total_balance += amount;
        info!(%user_id, %amount, "bonus credited");
        Ok(self.push(
            user_id,
            amount,
            TransactionKind::Bonus,
            None,
            description.to_string(),
            now,
        ))
    }

    /// Escrow a post budget from the author: decrement available (and total)
    /// by `budget`, bump `total_ideas_submitted`, and append a negative
    /// `POST_PAYMENT` entry. One logical unit — if any check fails, nothing
    /// changes.
    ///
    /// # Errors
    /// `AccountNotFound`, `NonPositiveAmount`, or `InsufficientFunds` if the
    /// author's spendable balance cannot cover the budget.
    pub fn charge_post_budget(
        &mut self,
        author_id: UserId,
        budget: Decimal,
        post_id: PostId,
        now: DateTime<Utc>,
    ) -> Result<TxId> {
        Self::require_positive(budget)?;
        let account = self.account_mut(author_id)?;
        if account.spendable() < budget {
            return Err(VerideaError::InsufficientFunds {
                needed: budget,
                available: account.spendable(),
            });
        }
        account.available_balance -= budget;
        account.total_balance -= budget;
        account.total_ideas_submitted += 1;
        info!(%author_id, %post_id, %budget, "post budget escrowed");
        Ok(self.push(
            author_id,
            -budget,
            TransactionKind::PostPayment,
            None,
            format!("budget escrow for {post_id}"),
            now,
        ))
    }

    /// Inline payout for a normal-tier validation: debit the author, credit
    /// the validator, and append one entry per side. This is a peer-to-peer
    /// charge on top of the publish-time escrow, not a draw against it.
    ///
    /// # Errors
    /// `AccountNotFound` for either side, `NonPositiveAmount`, or
    /// `InsufficientFunds` if the author's spendable balance cannot cover
    /// the reward. Checks run before the first write.
    pub fn pay_validation(
        &mut self,
        author_id: UserId,
        validator_id: UserId,
        amount: Decimal,
        validation_id: ValidationId,
        now: DateTime<Utc>,
    ) -> Result<(TxId, TxId)> {
        Self::require_positive(amount)?;
        if !self.contains(validator_id) {
            return Err(VerideaError::AccountNotFound(validator_id));
        }
        let author = self.account_mut(author_id)?;
        if author.spendable() < amount {
            return Err(VerideaError::InsufficientFunds {
                needed: amount,
                available: author.spendable(),
            });
        }

        // All checks passed — the rest cannot fail.
        author.available_balance -= amount;
        author.total_balance -= amount;
        let charge_tx = self.push(
            author_id,
            -amount,
            TransactionKind::PostPayment,
            Some(validation_id),
            format!("validation payout for {validation_id}"),
            now,
        );
        let earn_tx = self.credit_earning(validator_id, amount, validation_id, now)?;
        info!(%author_id, %validator_id, %amount, %validation_id, "normal validation settled");
        Ok((charge_tx, earn_tx))
    }

    /// Deferred payout for an approved detailed validation: credit the
    /// validator from the post's escrow. No author debit here — the escrow
    /// was captured at publish.
    ///
    /// # Errors
    /// `AccountNotFound` or `NonPositiveAmount`.
    pub fn credit_reward(
        &mut self,
        validator_id: UserId,
        amount: Decimal,
        validation_id: ValidationId,
        now: DateTime<Utc>,
    ) -> Result<TxId> {
        Self::require_positive(amount)?;
        let tx = self.credit_earning(validator_id, amount, validation_id, now)?;
        info!(%validator_id, %amount, %validation_id, "detailed validation reward credited");
        Ok(tx)
    }

    /// Record that a validator performed a validation: bumps
    /// `total_validations` and applies a reputation delta (zero for a
    /// detailed submission still awaiting approval).
    ///
    /// # Errors
    /// `AccountNotFound`.
    pub fn record_validation_activity(
        &mut self,
        validator_id: UserId,
        reputation_delta: i64,
    ) -> Result<()> {
        let account = self.account_mut(validator_id)?;
        account.total_validations += 1;
        account.reputation_score += reputation_delta;
        Ok(())
    }

    /// Apply a bare reputation delta (approval bonus, rejection penalty).
    ///
    /// # Errors
    /// `AccountNotFound`.
    pub fn adjust_reputation(&mut self, user_id: UserId, delta: i64) -> Result<()> {
        let account = self.account_mut(user_id)?;
        account.reputation_score += delta;
        debug!(%user_id, delta, score = account.reputation_score, "reputation adjusted");
        Ok(())
    }

    /// Withdraw funds to an external payment rail. Appends a negative
    /// `CASHOUT` entry. Opted-out funds are not withdrawable.
    ///
    /// # Errors
    /// `AccountNotFound`, `NonPositiveAmount`, or `InsufficientFunds`.
    pub fn cash_out(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<TxId> {
        Self::require_positive(amount)?;
        let account = self.account_mut(user_id)?;
        if account.spendable() < amount {
            return Err(VerideaError::InsufficientFunds {
                needed: amount,
                available: account.spendable(),
            });
        }
        account.available_balance -= amount;
        account.total_balance -= amount;
        info!(%user_id, %amount, "cashout settled");
        Ok(self.push(
            user_id,
            -amount,
            TransactionKind::Cashout,
            None,
            "balance cashout".to_string(),
            now,
        ))
    }

    /// Protect funds from spend and cashout.
    ///
    /// # Errors
    /// `AccountNotFound`, `NonPositiveAmount`, or `InsufficientFunds` if the
    /// protection would exceed the available balance.
    pub fn opt_out(&mut self, user_id: UserId, amount: Decimal) -> Result<()> {
        Self::require_positive(amount)?;
        let account = self.account_mut(user_id)?;
        if account.opted_out_balance + amount > account.available_balance {
            return Err(VerideaError::InsufficientFunds {
                needed: amount,
                available: account.spendable(),
            });
        }
        account.opted_out_balance += amount;
        Ok(())
    }

    /// Release previously protected funds.
    ///
    /// # Errors
    /// `AccountNotFound`, `NonPositiveAmount`, or `BalanceUnderflow` if more
    /// than the protected amount is released.
    pub fn opt_in(&mut self, user_id: UserId, amount: Decimal) -> Result<()> {
        Self::require_positive(amount)?;
        let account = self.account_mut(user_id)?;
        if amount > account.opted_out_balance {
            return Err(VerideaError::BalanceUnderflow);
        }
        account.opted_out_balance -= amount;
        Ok(())
    }

    /// The full append-only log, oldest first.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// All entries for one user, oldest first.
    #[must_use]
    pub fn transactions_for(&self, user_id: UserId) -> Vec<&Transaction> {
        self.log.iter().filter(|tx| tx.user_id == user_id).collect()
    }

    /// Net of all transaction amounts for a user. The audit compares this
    /// against `total_balance`.
    #[must_use]
    pub fn user_net(&self, user_id: UserId) -> Decimal {
        self.log
            .iter()
            .filter(|tx| tx.user_id == user_id)
            .map(|tx| tx.amount)
            .sum()
    }

    /// All registered account IDs.
    #[must_use]
    pub fn user_ids(&self) -> Vec<UserId> {
        self.accounts.keys().copied().collect()
    }

    fn account_mut(&mut self, user_id: UserId) -> Result<&mut UserAccount> {
        self.accounts
            .get_mut(&user_id)
            .ok_or(VerideaError::AccountNotFound(user_id))
    }

    fn require_positive(amount: Decimal) -> Result<()> {
        if amount.is_zero() || amount.is_sign_negative() {
            return Err(VerideaError::NonPositiveAmount { amount });
        }
        Ok(())
    }

    /// Credit half of a payout: balance bump plus the earning entry.
    fn credit_earning(
        &mut self,
        validator_id: UserId,
        amount: Decimal,
        validation_id: ValidationId,
        now: DateTime<Utc>,
    ) -> Result<TxId> {
        let account = self.account_mut(validator_id)?;
        account.available_balance += amount;
        account.total_balance += amount;
        Ok(self.push(
            validator_id,
            amount,
            TransactionKind::ValidationEarning,
            Some(validation_id),
            format!("validation earning for {validation_id}"),
            now,
        ))
    }

    fn push(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        kind: TransactionKind,
        validation_id: Option<ValidationId>,
        description: String,
        now: DateTime<Utc>,
    ) -> TxId {
        let tx = Transaction::completed(user_id, amount, kind, validation_id, description, now);
        let id = tx.id;
        self.log.push(tx);
        id
    }
}

impl Default for LedgerBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(book: &mut LedgerBook, amount: i64) -> UserId {
        let user = UserId::new();
        book.open_account(user, Utc::now()).unwrap();
        book.deposit(user, Decimal::new(amount, 0), "signup grant", Utc::now())
            .unwrap();
        user
    }

    #[test]
    fn open_account_twice_fails() {
        let mut book = LedgerBook::new();
        let user = UserId::new();
        book.open_account(user, Utc::now()).unwrap();
        let err = book.open_account(user, Utc::now()).unwrap_err();
        assert!(matches!(err, VerideaError::DuplicateAccount(_)));
    }

    #[test]
    fn deposit_credits_both_balances() {
        let mut book = LedgerBook::new();
        let user = funded(&mut book, 100);
        let acct = book.account(user).unwrap();
        assert_eq!(acct.available_balance, Decimal::new(100, 0));
        assert_eq!(acct.total_balance, Decimal::new(100, 0));
        assert_eq!(book.transactions_for(user).len(), 1);
        assert_eq!(
            book.transactions_for(user)[0].kind,
            TransactionKind::Bonus
        );
    }

    #[test]
    fn deposit_unknown_account_fails() {
        let mut book = LedgerBook::new();
        let err = book
            .deposit(UserId::new(), Decimal::ONE, "x", Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::AccountNotFound(_)));
    }

    #[test]
    fn non_positive_amounts_rejected() {
        let mut book = LedgerBook::new();
        let user = funded(&mut book, 100);
        let err = book
            .deposit(user, Decimal::ZERO, "x", Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::NonPositiveAmount { .. }));
        let err = book
            .cash_out(user, Decimal::new(-5, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::NonPositiveAmount { .. }));
    }

    #[test]
    fn charge_post_budget_is_one_unit() {
        let mut book = LedgerBook::new();
        let author = funded(&mut book, 100);
        let post_id = PostId::new();

        book.charge_post_budget(author, Decimal::new(20, 0), post_id, Utc::now())
            .unwrap();

        let acct = book.account(author).unwrap();
        assert_eq!(acct.available_balance, Decimal::new(80, 0));
        assert_eq!(acct.total_balance, Decimal::new(80, 0));
        assert_eq!(acct.total_ideas_submitted, 1);

        let txs = book.transactions_for(author);
        assert_eq!(txs.len(), 2); // grant + escrow
        assert_eq!(txs[1].kind, TransactionKind::PostPayment);
        assert_eq!(txs[1].amount, Decimal::new(-20, 0));
    }

    #[test]
    fn charge_insufficient_leaves_no_trace() {
        let mut book = LedgerBook::new();
        let author = funded(&mut book, 10);

        let err = book
            .charge_post_budget(author, Decimal::new(20, 0), PostId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InsufficientFunds { .. }));

        let acct = book.account(author).unwrap();
        assert_eq!(acct.available_balance, Decimal::new(10, 0));
        assert_eq!(acct.total_ideas_submitted, 0);
        assert_eq!(book.transactions_for(author).len(), 1, "no escrow entry");
    }

    #[test]
    fn pay_validation_moves_both_sides() {
        let mut book = LedgerBook::new();
        let author = funded(&mut book, 100);
        let validator = UserId::new();
        book.open_account(validator, Utc::now()).unwrap();

        let vid = ValidationId::new();
        book.pay_validation(author, validator, Decimal::new(5, 0), vid, Utc::now())
            .unwrap();

        assert_eq!(
            book.account(author).unwrap().available_balance,
            Decimal::new(95, 0)
        );
        assert_eq!(
            book.account(validator).unwrap().available_balance,
            Decimal::new(5, 0)
        );
        assert_eq!(
            book.account(validator).unwrap().total_balance,
            Decimal::new(5, 0)
        );

        let earn = book.transactions_for(validator);
        assert_eq!(earn.len(), 1);
        assert_eq!(earn[0].kind, TransactionKind::ValidationEarning);
        assert_eq!(earn[0].validation_id, Some(vid));
    }

    #[test]
    fn pay_validation_author_short_leaves_no_trace() {
        let mut book = LedgerBook::new();
        let author = funded(&mut book, 3);
        let validator = UserId::new();
        book.open_account(validator, Utc::now()).unwrap();

        let err = book
            .pay_validation(
                author,
                validator,
                Decimal::new(5, 0),
                ValidationId::new(),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, VerideaError::InsufficientFunds { .. }));
        assert_eq!(
            book.account(author).unwrap().available_balance,
            Decimal::new(3, 0)
        );
        assert!(book.transactions_for(validator).is_empty());
    }

    #[test]
    fn pay_validation_unknown_validator_checked_before_debit() {
        let mut book = LedgerBook::new();
        let author = funded(&mut book, 100);

        let err = book
            .pay_validation(
                author,
                UserId::new(),
                Decimal::new(5, 0),
                ValidationId::new(),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, VerideaError::AccountNotFound(_)));
        assert_eq!(
            book.account(author).unwrap().available_balance,
            Decimal::new(100, 0),
            "author untouched"
        );
    }

    #[test]
    fn opted_out_funds_cannot_be_spent() {
        let mut book = LedgerBook::new();
        let author = funded(&mut book, 100);
        book.opt_out(author, Decimal::new(90, 0)).unwrap();

        let err = book
            .charge_post_budget(author, Decimal::new(20, 0), PostId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InsufficientFunds { .. }));

        let err = book
            .cash_out(author, Decimal::new(20, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InsufficientFunds { .. }));

        // Releasing the protection makes the funds usable again.
        book.opt_in(author, Decimal::new(90, 0)).unwrap();
        book.cash_out(author, Decimal::new(20, 0), Utc::now())
            .unwrap();
    }

    #[test]
    fn opt_out_cannot_exceed_available() {
        let mut book = LedgerBook::new();
        let user = funded(&mut book, 50);
        let err = book.opt_out(user, Decimal::new(60, 0)).unwrap_err();
        assert!(matches!(err, VerideaError::InsufficientFunds { .. }));
    }

    #[test]
    fn opt_in_cannot_exceed_protected() {
        let mut book = LedgerBook::new();
        let user = funded(&mut book, 50);
        book.opt_out(user, Decimal::new(10, 0)).unwrap();
        let err = book.opt_in(user, Decimal::new(20, 0)).unwrap_err();
        assert!(matches!(err, VerideaError::BalanceUnderflow));
    }

    #[test]
    fn cash_out_appends_negative_entry() {
        let mut book = LedgerBook::new();
        let user = funded(&mut book, 50);
        book.cash_out(user, Decimal::new(30, 0), Utc::now()).unwrap();

        let acct = book.account(user).unwrap();
        assert_eq!(acct.available_balance, Decimal::new(20, 0));
        let txs = book.transactions_for(user);
        assert_eq!(txs[1].kind, TransactionKind::Cashout);
        assert_eq!(txs[1].amount, Decimal::new(-30, 0));
    }

    #[test]
    fn user_net_sums_signed_amounts() {
        let mut book = LedgerBook::new();
        let user = funded(&mut book, 100);
        book.charge_post_budget(user, Decimal::new(20, 0), PostId::new(), Utc::now())
            .unwrap();
        book.cash_out(user, Decimal::new(30, 0), Utc::now()).unwrap();
        assert_eq!(book.user_net(user), Decimal::new(50, 0));
    }

    #[test]
    fn reputation_and_activity_tracking() {
        let mut book = LedgerBook::new();
        let user = funded(&mut book, 1);
        book.record_validation_activity(user, 1).unwrap();
        book.record_validation_activity(user, 0).unwrap();
        book.adjust_reputation(user, -2).unwrap();

        let acct = book.account(user).unwrap();
        assert_eq!(acct.total_validations, 2);
        assert_eq!(acct.reputation_score, -1);
    }
}
