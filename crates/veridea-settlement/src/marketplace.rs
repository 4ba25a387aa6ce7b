//! Marketplace facade — the engines wired together behind one door.
//!
//! Callers supply the authenticated actor as `Option<UserId>` (the identity
//! provider is external; `None` fails `Unauthorized`). Every operation takes
//! `&mut self`, so sharing one `Marketplace` behind a lock gives each
//! admission-plus-settlement sequence and each approval the serialized scope
//! the invariants require.

use chrono::Utc;
use rust_decimal::Decimal;
use veridea_admission::{PostRegistry, ValidationBook};
use veridea_ledger::{LedgerAudit, LedgerBook};
use veridea_types::{
    FieldResponse, MarketplaceConfig, Post, PostDraft, PostId, Result, Transaction, TxId,
    UserAccount, UserId, Validation, ValidationId, ValidationRequest, ValidationTier,
    VerideaError,
};

use crate::{
    approval::ApprovalWorkflow,
    engine::{SettlementEngine, SettlementOutcome},
};

/// One marketplace: ledger, posts, validations, and the engines over them.
pub struct Marketplace {
    ledger: LedgerBook,
    registry: PostRegistry,
    book: ValidationBook,
    engine: SettlementEngine,
    approvals: ApprovalWorkflow,
}

impl Marketplace {
    /// A marketplace with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MarketplaceConfig::default())
    }

    #[must_use]
    pub fn with_config(config: MarketplaceConfig) -> Self {
        Self {
            ledger: LedgerBook::new(),
            registry: PostRegistry::new(config.clone()),
            book: ValidationBook::new(),
            engine: SettlementEngine::new(config.clone()),
            approvals: ApprovalWorkflow::new(config),
        }
    }

    /// Open an account for a newly signed-up user.
    ///
    /// # Errors
    /// `DuplicateAccount` on an ID collision.
    pub fn register_user(&mut self) -> Result<UserId> {
        let user_id = UserId::new();
        self.ledger.open_account(user_id, Utc::now())?;
        Ok(user_id)
    }

    /// Credit external funds into a user's balance (funding rail, signup
    /// grant).
    ///
    /// # Errors
    /// `AccountNotFound` or `NonPositiveAmount`.
    pub fn deposit(&mut self, user_id: UserId, amount: Decimal) -> Result<TxId> {
        self.ledger
            .deposit(user_id, amount, "account funding", Utc::now())
    }

    /// Publish an idea: validate the draft, escrow its budget, store the
    /// post.
    ///
    /// # Errors
    /// `Unauthorized` without an actor; otherwise whatever
    /// [`PostRegistry::publish`] returns.
    pub fn publish_post(&mut self, actor: Option<UserId>, draft: PostDraft) -> Result<PostId> {
        let author_id = Self::require_actor(actor)?;
        self.registry
            .publish(&mut self.ledger, author_id, draft, Utc::now())
    }

    /// Submit a validation attempt for a post. Admission and settlement run
    /// as one serialized unit.
    ///
    /// # Errors
    /// `Unauthorized` without an actor; otherwise whatever
    /// [`SettlementEngine::submit`] returns.
    pub fn submit_validation(
        &mut self,
        actor: Option<UserId>,
        post_id: PostId,
        tier: ValidationTier,
        feedback: Option<String>,
        responses: Vec<FieldResponse>,
    ) -> Result<SettlementOutcome> {
        let validator_id = Self::require_actor(actor)?;
        let request = ValidationRequest {
            post_id,
            validator_id,
            tier,
            feedback,
            responses,
        };
        self.engine.submit(
            &mut self.registry,
            &mut self.book,
            &mut self.ledger,
            &request,
            Utc::now(),
        )
    }

    /// Approve a pending detailed validation (author only).
    ///
    /// # Errors
    /// `Unauthorized` without an actor; otherwise whatever
    /// [`ApprovalWorkflow::approve`] returns.
    pub fn approve_validation(
        &mut self,
        actor: Option<UserId>,
        validation_id: ValidationId,
    ) -> Result<()> {
        let approver = Self::require_actor(actor)?;
        self.approvals.approve(
            &mut self.book,
            &self.registry,
            &mut self.ledger,
            validation_id,
            approver,
            Utc::now(),
        )
    }

    /// Reject a pending detailed validation with a reason (author only).
    ///
    /// # Errors
    /// `Unauthorized` without an actor; otherwise whatever
    /// [`ApprovalWorkflow::reject`] returns.
    pub fn reject_validation(
        &mut self,
        actor: Option<UserId>,
        validation_id: ValidationId,
        reason: impl Into<String>,
    ) -> Result<()> {
        let approver = Self::require_actor(actor)?;
        self.approvals.reject(
            &mut self.book,
            &self.registry,
            &mut self.ledger,
            validation_id,
            approver,
            reason.into(),
            Utc::now(),
        )
    }

    /// Withdraw funds to an external rail.
    ///
    /// # Errors
    /// `Unauthorized` without an actor; otherwise whatever
    /// [`LedgerBook::cash_out`] returns.
    pub fn cash_out(&mut self, actor: Option<UserId>, amount: Decimal) -> Result<TxId> {
        let user_id = Self::require_actor(actor)?;
        self.ledger.cash_out(user_id, amount, Utc::now())
    }

    /// Protect funds from spend and cashout.
    ///
    /// # Errors
    /// `Unauthorized` without an actor; otherwise whatever
    /// [`LedgerBook::opt_out`] returns.
    pub fn opt_out(&mut self, actor: Option<UserId>, amount: Decimal) -> Result<()> {
        let user_id = Self::require_actor(actor)?;
        self.ledger.opt_out(user_id, amount)
    }

    /// Release previously protected funds.
    ///
    /// # Errors
    /// `Unauthorized` without an actor; otherwise whatever
    /// [`LedgerBook::opt_in`] returns.
    pub fn opt_in(&mut self, actor: Option<UserId>, amount: Decimal) -> Result<()> {
        let user_id = Self::require_actor(actor)?;
        self.ledger.opt_in(user_id, amount)
    }

    // -- Read side ----------------------------------------------------------

    /// # Errors
    /// `AccountNotFound`.
    pub fn account(&self, user_id: UserId) -> Result<&UserAccount> {
        self.ledger.account(user_id)
    }

    /// # Errors
    /// `PostNotFound`.
    pub fn post(&self, post_id: PostId) -> Result<&Post> {
        self.registry.get(post_id)
    }

    /// # Errors
    /// `ValidationNotFound`.
    pub fn validation(&self, validation_id: ValidationId) -> Result<&Validation> {
        self.book.get(validation_id)
    }

    /// The author's approval queue for one post.
    #[must_use]
    pub fn pending_validations(&self, post_id: PostId) -> Vec<&Validation> {
        self.book.pending_for_post(post_id)
    }

    /// All ledger entries for one user, oldest first.
    #[must_use]
    pub fn transactions_for(&self, user_id: UserId) -> Vec<&Transaction> {
        self.ledger.transactions_for(user_id)
    }

    /// Audit view over the ledger.
    #[must_use]
    pub fn audit(&self) -> LedgerAudit<'_> {
        self.ledger.audit()
    }

    fn require_actor(actor: Option<UserId>) -> Result<UserId> {
        actor.ok_or(VerideaError::Unauthorized)
    }
}

impl Default for Marketplace {
    fn default() -> Self {
        Self::new()
    }
}
