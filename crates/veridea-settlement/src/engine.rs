//! Settlement engine — admission plus settlement as one unit of work.
//!
//! Sequence for a submission:
//! 1. Admission gate (pure — five ordered checks plus content validation)
//! 2. Settlement pre-checks (validator account, author cover for the
//!    normal-tier payout)
//! 3. Validation book insert (the uniqueness invariant's second line of
//!    defense, and the first write)
//! 4. Balance moves and activity counters through the ledger funnel
//! 5. Post counter update, then the auto-close check on the same row
//!
//! Steps 1–2 are the only fallible ones. Once step 3 runs, the remaining
//! writes cannot fail, so a caller never observes a partial settlement.

use chrono::{DateTime, Utc};
use tracing::info;
use veridea_admission::{AdmissionGate, PostRegistry, ValidationBook};
use veridea_ledger::LedgerBook;
use veridea_types::{
    MarketplaceConfig, Result, ValidationId, ValidationRequest, ValidationTier, VerideaError,
};

/// What a successful submission settled to. Handed back to the presentation
/// layer together with the affected records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub validation_id: ValidationId,
    /// Whether the reward was paid inline (normal tier).
    pub paid: bool,
    /// Whether this submission filled the post's last open slot.
    pub post_closed: bool,
}

/// Settles admitted validations and keeps post counters consistent.
pub struct SettlementEngine {
    gate: AdmissionGate,
    config: MarketplaceConfig,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(config: MarketplaceConfig) -> Self {
        Self {
            gate: AdmissionGate::new(config.clone()),
            config,
        }
    }

    /// Admit and settle one validation attempt.
    ///
    /// NORMAL tier: pays the validator immediately. The payout debits the
    /// author's available balance directly — a peer-to-peer charge on top of
    /// the publish-time escrow, not a draw against it.
    ///
    /// DETAILED tier: no money moves; the validation is held PENDING for the
    /// author's decision.
    ///
    /// Either way the tier counter is incremented, and the post closes when
    /// both counters have reached their caps.
    ///
    /// # Errors
    /// Any admission error from [`AdmissionGate::admit`]; `AccountNotFound`
    /// if the validator has no account; `InsufficientFunds` if the author
    /// cannot cover a normal-tier payout. All errors leave every record
    /// untouched.
    pub fn submit(
        &self,
        registry: &mut PostRegistry,
        book: &mut ValidationBook,
        ledger: &mut LedgerBook,
        request: &ValidationRequest,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome> {
        // Phase 1: admission (pure).
        let validation = self.gate.admit(book, registry, request, now)?;
        let tier = validation.tier;
        let reward = validation.reward_amount;
        let validator_id = validation.validator_id;
        let post_id = validation.post_id;
        let author_id = registry.get(post_id)?.author_id;

        // Phase 2: settlement pre-checks (still pure).
        if !ledger.contains(validator_id) {
            return Err(VerideaError::AccountNotFound(validator_id));
        }
        if tier == ValidationTier::Normal {
            let author = ledger.account(author_id)?;
            if author.spendable() < reward {
                return Err(VerideaError::InsufficientFunds {
                    needed: reward,
                    available: author.spendable(),
                });
            }
        }

        // Phase 3: writes. The insert re-enforces uniqueness; after it, the
        // remaining steps cannot fail.
        let validation_id = book.insert(validation)?;
        let paid = tier == ValidationTier::Normal;

        match tier {
            ValidationTier::Normal => {
                ledger.pay_validation(author_id, validator_id, reward, validation_id, now)?;
                ledger.record_validation_activity(validator_id, self.config.reputation_normal)?;
            }
            ValidationTier::Detailed => {
                ledger.record_validation_activity(validator_id, 0)?;
            }
        }

        let post = registry.get_mut(post_id)?;
        post.record_validation(tier)?;

        // Terminal transition: both counters read post-update, same row.
        let post_closed = if post.goals_met() {
            post.close()?;
            info!(%post_id, "validation goals met, post closed");
            true
        } else {
            false
        };

        info!(%validation_id, %post_id, %validator_id, %tier, paid, "validation settled");
        Ok(SettlementOutcome {
            validation_id,
            paid,
            post_closed,
        })
    }
}
