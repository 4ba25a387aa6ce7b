//! Validation records and their lifecycle.
//!
//! Exactly one validation may exist per (post, validator) pair — the
//! validation book enforces this as an insert-time invariant. The reward
//! amount is copied from the post's tier reward at creation, so later reward
//! changes never retroactively affect existing validations.
//!
//! ## State Machine
//!
//! ```text
//!               approve    ┌──────────┐
//!   ┌─────────┐──────────▶│ APPROVED │
//!   │ PENDING │            └──────────┘
//!   └─────────┘──────────▶┌──────────┐
//!               reject     │ REJECTED │
//!                          └──────────┘
//!   ┌───────────┐
//!   │ COMPLETED │   (normal tier: created terminal, paid on submit)
//!   └───────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{FieldResponse, Post, PostId, Result, UserId, ValidationId, ValidationTier, VerideaError};

/// Lifecycle status of a validation.
///
/// The only live state is `Pending`; the other three are terminal. Normal
/// validations are created directly in `Completed` (paid-on-submit design).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// Detailed validation awaiting the author's decision.
    Pending,
    /// Detailed validation approved by the author. Reward paid. Terminal.
    Approved,
    /// Normal validation, settled inline at submission. Terminal.
    Completed,
    /// Detailed validation rejected by the author. No payout. Terminal.
    Rejected,
}

impl ValidationStatus {
    /// Can this status transition to the given target?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved | Self::Rejected)
        )
    }

    /// The creation-time status for a validation of the given tier.
    #[must_use]
    pub fn initial_for(tier: ValidationTier) -> Self {
        match tier {
            ValidationTier::Normal => Self::Completed,
            ValidationTier::Detailed => Self::Pending,
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// What a validator submits: the target post, the requested tier, and the
/// review content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub post_id: PostId,
    pub validator_id: UserId,
    pub tier: ValidationTier,
    /// Free-text comment, any tier.
    pub feedback: Option<String>,
    /// Answers to the post's review form. Detailed tier only.
    pub responses: Vec<FieldResponse>,
}

/// A validation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub id: ValidationId,
    pub post_id: PostId,
    pub validator_id: UserId,
    pub tier: ValidationTier,
    pub status: ValidationStatus,
    /// Copied from the post's tier reward at creation time.
    pub reward_amount: Decimal,
    /// Settlement-completion marker: set when the reward has been credited.
    pub is_paid: bool,
    pub feedback: Option<String>,
    pub responses: Vec<FieldResponse>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Validation {
    /// Construct an admitted validation for `post`. The status and the
    /// `is_paid` marker follow the tier: normal is COMPLETED and paid from
    /// creation, detailed is PENDING and unpaid.
    #[must_use]
    pub fn admitted(post: &Post, request: ValidationRequest, now: DateTime<Utc>) -> Self {
        let tier = request.tier;
        Self {
            id: ValidationId::new(),
            post_id: request.post_id,
            validator_id: request.validator_id,
            tier,
            status: ValidationStatus::initial_for(tier),
            reward_amount: post.tier_reward(tier),
            is_paid: tier == ValidationTier::Normal,
            feedback: request.feedback,
            responses: request.responses,
            rejection_reason: None,
            created_at: now,
            resolved_at: None,
        }
    }

    /// Whether this validation still awaits the author's decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ValidationStatus::Pending
    }

    /// Attempt the PENDING → APPROVED transition. Marks the reward paid.
    ///
    /// # Errors
    /// Returns [`VerideaError::NotPending`] if the validation was already
    /// resolved — this is the idempotence guard.
    pub fn mark_approved(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(ValidationStatus::Approved) {
            return Err(VerideaError::NotPending {
                status: self.status,
            });
        }
        self.status = ValidationStatus::Approved;
        self.is_paid = true;
        self.resolved_at = Some(now);
        Ok(())
    }

    /// Attempt the PENDING → REJECTED transition. Stores the reason.
    ///
    /// # Errors
    /// Returns [`VerideaError::NotPending`] if the validation was already
    /// resolved.
    pub fn mark_rejected(&mut self, reason: String, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(ValidationStatus::Rejected) {
            return Err(VerideaError::NotPending {
                status: self.status,
            });
        }
        self.status = ValidationStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.resolved_at = Some(now);
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl ValidationRequest {
    /// A bare request with no feedback or responses.
    pub fn dummy(post_id: PostId, validator_id: UserId, tier: ValidationTier) -> Self {
        Self {
            post_id,
            validator_id,
            tier,
            feedback: None,
            responses: Vec::new(),
        }
    }
}
