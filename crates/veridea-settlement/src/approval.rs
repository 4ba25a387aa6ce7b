//! Approval workflow — resolving pending detailed validations.
//!
//! Only the post's author may resolve, and a validation resolves exactly
//! once: the PENDING check is the idempotence guard, enforced both here and
//! by the record's own transition table.

use chrono::{DateTime, Utc};
use tracing::info;
use veridea_admission::{PostRegistry, ValidationBook};
use veridea_ledger::LedgerBook;
use veridea_types::{MarketplaceConfig, Result, UserId, ValidationId, VerideaError};

/// Resolves PENDING detailed validations on the author's behalf.
pub struct ApprovalWorkflow {
    config: MarketplaceConfig,
}

impl ApprovalWorkflow {
    #[must_use]
    pub fn new(config: MarketplaceConfig) -> Self {
        Self { config }
    }

    /// Approve a pending detailed validation.
    ///
    /// On success: status → APPROVED, `is_paid` set; the validator is
    /// credited `reward_amount` out of the post's escrow (no further author
    /// debit) with a `VALIDATION_EARNING` entry, and gains the approval
    /// reputation bonus.
    ///
    /// # Errors
    /// `ValidationNotFound`, `NotAuthor` if `approver` is not the post's
    /// author, `NotPending` if already resolved, `AccountNotFound` if the
    /// validator's account is gone. Checks run before the first write.
    pub fn approve(
        &self,
        book: &mut ValidationBook,
        registry: &PostRegistry,
        ledger: &mut LedgerBook,
        validation_id: ValidationId,
        approver: UserId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (validator_id, reward) = {
            let validation = book.get(validation_id)?;
            let post = registry.get(validation.post_id)?;
            if post.author_id != approver {
                return Err(VerideaError::NotAuthor);
            }
            if !validation.is_pending() {
                return Err(VerideaError::NotPending {
                    status: validation.status,
                });
            }
            if !ledger.contains(validation.validator_id) {
                return Err(VerideaError::AccountNotFound(validation.validator_id));
            }
            (validation.validator_id, validation.reward_amount)
        };

        // All checks passed — the transition and the credit cannot fail now.
        book.get_mut(validation_id)?.mark_approved(now)?;
        ledger.credit_reward(validator_id, reward, validation_id, now)?;
        ledger.adjust_reputation(validator_id, self.config.reputation_approved)?;

        info!(%validation_id, %validator_id, %reward, "detailed validation approved");
        Ok(())
    }

    /// Reject a pending detailed validation with a reason.
    ///
    /// On success: status → REJECTED, reason stored, reputation penalty
    /// applied. No balance change — the detailed tier was never charged
    /// beyond the original post budget.
    ///
    /// # Errors
    /// Same authorization and state checks as [`Self::approve`].
    pub fn reject(
        &self,
        book: &mut ValidationBook,
        registry: &PostRegistry,
        ledger: &mut LedgerBook,
        validation_id: ValidationId,
        approver: UserId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let validator_id = {
            let validation = book.get(validation_id)?;
            let post = registry.get(validation.post_id)?;
            if post.author_id != approver {
                return Err(VerideaError::NotAuthor);
            }
            if !validation.is_pending() {
                return Err(VerideaError::NotPending {
                    status: validation.status,
                });
            }
            if !ledger.contains(validation.validator_id) {
                return Err(VerideaError::AccountNotFound(validation.validator_id));
            }
            validation.validator_id
        };

        book.get_mut(validation_id)?.mark_rejected(reason, now)?;
        ledger.adjust_reputation(validator_id, self.config.reputation_rejected)?;

        info!(%validation_id, %validator_id, "detailed validation rejected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use veridea_types::{
        PostDraft, PostId, ValidationRequest, ValidationStatus, ValidationTier,
    };

    use super::*;
    use crate::engine::SettlementEngine;

    struct Fixture {
        workflow: ApprovalWorkflow,
        engine: SettlementEngine,
        registry: PostRegistry,
        book: ValidationBook,
        ledger: LedgerBook,
        author: UserId,
        validator: UserId,
        post_id: PostId,
        validation_id: ValidationId,
    }

    fn setup() -> Fixture {
        let config = MarketplaceConfig::default();
        let workflow = ApprovalWorkflow::new(config.clone());
        let engine = SettlementEngine::new(config.clone());
        let mut registry = PostRegistry::new(config);
        let mut book = ValidationBook::new();
        let mut ledger = LedgerBook::new();

        let author = UserId::new();
        let validator = UserId::new();
        ledger.open_account(author, Utc::now()).unwrap();
        ledger.open_account(validator, Utc::now()).unwrap();
        ledger
            .deposit(author, Decimal::new(100, 0), "grant", Utc::now())
            .unwrap();

        let draft = PostDraft {
            title: "community tool library".to_string(),
            category: None,
            total_budget: Decimal::new(40, 0),
            normal_reward: Decimal::new(5, 0),
            detailed_reward: Decimal::new(20, 0),
            normal_validator_cap: 1,
            detailed_validator_cap: 2,
            expiry_date: None,
            review_form: Vec::new(),
        };
        let post_id = registry
            .publish(&mut ledger, author, draft, Utc::now())
            .unwrap();

        let request = ValidationRequest::dummy(post_id, validator, ValidationTier::Detailed);
        let outcome = engine
            .submit(&mut registry, &mut book, &mut ledger, &request, Utc::now())
            .unwrap();

        Fixture {
            workflow,
            engine,
            registry,
            book,
            ledger,
            author,
            validator,
            post_id,
            validation_id: outcome.validation_id,
        }
    }

    #[test]
    fn approve_pays_and_boosts_reputation() {
        let mut fx = setup();

        fx.workflow
            .approve(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                fx.validation_id,
                fx.author,
                Utc::now(),
            )
            .unwrap();

        let validation = fx.book.get(fx.validation_id).unwrap();
        assert_eq!(validation.status, ValidationStatus::Approved);
        assert!(validation.is_paid);

        let acct = fx.ledger.account(fx.validator).unwrap();
        assert_eq!(acct.available_balance, Decimal::new(20, 0));
        assert_eq!(acct.total_balance, Decimal::new(20, 0));
        assert_eq!(acct.reputation_score, 5);

        // No author debit: escrow already covered it.
        assert_eq!(
            fx.ledger.account(fx.author).unwrap().available_balance,
            Decimal::new(60, 0)
        );
        fx.ledger.audit().verify_all().unwrap();
    }

    #[test]
    fn approve_twice_fails_with_one_credit() {
        let mut fx = setup();

        fx.workflow
            .approve(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                fx.validation_id,
                fx.author,
                Utc::now(),
            )
            .unwrap();
        let err = fx
            .workflow
            .approve(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                fx.validation_id,
                fx.author,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            VerideaError::NotPending {
                status: ValidationStatus::Approved
            }
        ));
        assert_eq!(
            fx.ledger.account(fx.validator).unwrap().available_balance,
            Decimal::new(20, 0),
            "exactly one credit"
        );
    }

    #[test]
    fn reject_penalizes_without_payout() {
        let mut fx = setup();

        fx.workflow
            .reject(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                fx.validation_id,
                fx.author,
                "no supporting evidence".to_string(),
                Utc::now(),
            )
            .unwrap();

        let validation = fx.book.get(fx.validation_id).unwrap();
        assert_eq!(validation.status, ValidationStatus::Rejected);
        assert!(!validation.is_paid);
        assert_eq!(
            validation.rejection_reason.as_deref(),
            Some("no supporting evidence")
        );

        let acct = fx.ledger.account(fx.validator).unwrap();
        assert_eq!(acct.available_balance, Decimal::ZERO);
        assert_eq!(acct.reputation_score, -2);
    }

    #[test]
    fn reject_after_approve_fails() {
        let mut fx = setup();

        fx.workflow
            .approve(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                fx.validation_id,
                fx.author,
                Utc::now(),
            )
            .unwrap();
        let err = fx
            .workflow
            .reject(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                fx.validation_id,
                fx.author,
                "changed my mind".to_string(),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, VerideaError::NotPending { .. }));
    }

    #[test]
    fn only_author_may_resolve() {
        let mut fx = setup();
        let stranger = UserId::new();

        let err = fx
            .workflow
            .approve(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                fx.validation_id,
                stranger,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, VerideaError::NotAuthor));

        let err = fx
            .workflow
            .reject(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                fx.validation_id,
                fx.validator,
                "self-serving".to_string(),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, VerideaError::NotAuthor));

        // Untouched.
        assert!(fx.book.get(fx.validation_id).unwrap().is_pending());
    }

    #[test]
    fn normal_validation_cannot_be_resolved() {
        let mut fx = setup();
        let other = UserId::new();
        fx.ledger.open_account(other, Utc::now()).unwrap();

        let request = ValidationRequest::dummy(fx.post_id, other, ValidationTier::Normal);
        let outcome = fx
            .engine
            .submit(
                &mut fx.registry,
                &mut fx.book,
                &mut fx.ledger,
                &request,
                Utc::now(),
            )
            .unwrap();

        let err = fx
            .workflow
            .approve(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                outcome.validation_id,
                fx.author,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            VerideaError::NotPending {
                status: ValidationStatus::Completed
            }
        ));
    }

    #[test]
    fn unknown_validation_fails() {
        let mut fx = setup();
        let err = fx
            .workflow
            .approve(
                &mut fx.book,
                &fx.registry,
                &mut fx.ledger,
                ValidationId::new(),
                fx.author,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, VerideaError::ValidationNotFound(_)));
    }
}
