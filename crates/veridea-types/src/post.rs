//! Post types: the monetary shape of a published idea.
//!
//! A post carries a fixed `total_budget` (escrowed from the author at
//! publish time), per-tier reward amounts, per-tier validator caps, and
//! per-tier live counters. Rewards and caps are immutable after publish.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐  both tiers full   ┌────────┐
//!   │ OPEN ├───────────────────▶│ CLOSED │
//!   └──────┘                    └────────┘
//! ```
//!
//! OPEN → CLOSED happens exactly once and is irreversible. Expiry does not
//! change the status by itself — an expired-but-OPEN post simply stops
//! admitting validations; sweeping it closed is an external concern.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{FieldSpec, PostId, Result, UserId, VerideaError};

/// The two review tiers a post pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ValidationTier {
    /// Quick review. Paid on submit.
    Normal,
    /// In-depth review with form responses. Paid after author approval.
    Detailed,
}

impl std::fmt::Display for ValidationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Detailed => write!(f, "DETAILED"),
        }
    }
}

/// Lifecycle status of a post.
///
/// Transitions are **monotonic**: `Open → Closed` is the only entry in the
/// table, and it never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostStatus {
    /// Accepting validations (subject to expiry and tier caps).
    Open,
    /// Validation goals met. **Irreversible.**
    Closed,
}

impl PostStatus {
    /// Can this status transition to the given target?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Closed))
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// What a submitter asks to publish. Descriptive attributes come from the
/// post-creation UI and are consumed, not semantically validated — only the
/// numeric/budget fields and the review form matter to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub category: Option<String>,
    /// Escrowed from the author's available balance at publish.
    pub total_budget: Decimal,
    pub normal_reward: Decimal,
    pub detailed_reward: Decimal,
    pub normal_validator_cap: u32,
    pub detailed_validator_cap: u32,
    /// Explicit expiry; defaults to publish time + configured lifetime.
    pub expiry_date: Option<DateTime<Utc>>,
    /// Per-post detailed review form.
    pub review_form: Vec<FieldSpec>,
}

/// A published post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub category: Option<String>,
    pub status: PostStatus,
    pub expiry_date: DateTime<Utc>,
    /// Escrowed amount, already deducted from the author at publish.
    pub total_budget: Decimal,
    /// Fixed per-validation payouts. Immutable after publish.
    pub normal_reward: Decimal,
    pub detailed_reward: Decimal,
    /// Per-tier validator caps. Immutable after publish.
    pub normal_validator_cap: u32,
    pub detailed_validator_cap: u32,
    /// Live counters. Always `<=` their caps.
    pub normal_count: u32,
    pub detailed_count: u32,
    /// Detailed review form answered by detailed-tier validators.
    pub review_form: Vec<FieldSpec>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Build a post from an accepted draft. Counters start at zero,
    /// status at OPEN.
    #[must_use]
    pub fn from_draft(
        author_id: UserId,
        draft: PostDraft,
        default_expiry: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PostId::new(),
            author_id,
            title: draft.title,
            category: draft.category,
            status: PostStatus::Open,
            expiry_date: draft.expiry_date.unwrap_or(default_expiry),
            total_budget: draft.total_budget,
            normal_reward: draft.normal_reward,
            detailed_reward: draft.detailed_reward,
            normal_validator_cap: draft.normal_validator_cap,
            detailed_validator_cap: draft.detailed_validator_cap,
            normal_count: 0,
            detailed_count: 0,
            review_form: draft.review_form,
            created_at: now,
        }
    }

    /// The fixed payout for the given tier.
    #[must_use]
    pub fn tier_reward(&self, tier: ValidationTier) -> Decimal {
        match tier {
            ValidationTier::Normal => self.normal_reward,
            ValidationTier::Detailed => self.detailed_reward,
        }
    }

    /// The validator cap for the given tier.
    #[must_use]
    pub fn tier_cap(&self, tier: ValidationTier) -> u32 {
        match tier {
            ValidationTier::Normal => self.normal_validator_cap,
            ValidationTier::Detailed => self.detailed_validator_cap,
        }
    }

    /// The live validation count for the given tier.
    #[must_use]
    pub fn tier_count(&self, tier: ValidationTier) -> u32 {
        match tier {
            ValidationTier::Normal => self.normal_count,
            ValidationTier::Detailed => self.detailed_count,
        }
    }

    /// Whether the given tier has reached its cap.
    #[must_use]
    pub fn tier_is_full(&self, tier: ValidationTier) -> bool {
        self.tier_count(tier) >= self.tier_cap(tier)
    }

    /// Returns `true` if the post is past its expiry date.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }

    /// Returns `true` if the post currently admits validations:
    /// status OPEN and not expired.
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Open && !self.is_expired_at(now)
    }

    /// Whether both tiers have reached their caps.
    #[must_use]
    pub fn goals_met(&self) -> bool {
        self.normal_count >= self.normal_validator_cap
            && self.detailed_count >= self.detailed_validator_cap
    }

    /// Record one admitted validation against the given tier's counter.
    ///
    /// # Errors
    /// Returns [`VerideaError::TierFull`] if the counter is already at its
    /// cap — the admission gate checks this first, so hitting it here means
    /// a caller bypassed admission.
    pub fn record_validation(&mut self, tier: ValidationTier) -> Result<()> {
        if self.tier_is_full(tier) {
            return Err(VerideaError::TierFull {
                tier,
                cap: self.tier_cap(tier),
            });
        }
        match tier {
            ValidationTier::Normal => self.normal_count += 1,
            ValidationTier::Detailed => self.detailed_count += 1,
        }
        Ok(())
    }

    /// Attempt the OPEN → CLOSED transition.
    ///
    /// # Errors
    /// Returns [`VerideaError::InvalidTransition`] if the post is already
    /// closed.
    pub fn close(&mut self) -> Result<()> {
        if !self.status.can_transition_to(PostStatus::Closed) {
            return Err(VerideaError::InvalidTransition {
                from: self.status.to_string(),
                to: PostStatus::Closed.to_string(),
            });
        }
        self.status = PostStatus::Closed;
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Post {
    /// A minimal OPEN post: caps (2 normal, 1 detailed), rewards 5/20,
    /// budget 50, expiring one day from `created_at`.
    pub fn dummy(author_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: PostId::new(),
            author_id,
            title: "dummy idea".to_string(),
            category: None,
            status: PostStatus::Open,
            expiry_date: now + chrono::Duration::days(1),
            total_budget: Decimal::new(50, 0),
            normal_reward: Decimal::new(5, 0),
            detailed_reward: Decimal::new(20, 0),
            normal_validator_cap: 2,
            detailed_validator_cap: 1,
            normal_count: 0,
            detailed_count: 0,
            review_form: Vec::new(),
            created_at: now,
        }
    }
}
