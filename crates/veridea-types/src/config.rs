//! Configuration for the Veridea marketplace core.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Tunable knobs for admission, settlement, and approval.
///
/// Defaults come from [`constants`]; deployments override via their config
/// layer and hand the result to the engines at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Reputation delta for a completed normal validation.
    pub reputation_normal: i64,
    /// Reputation delta when a detailed validation is approved.
    pub reputation_approved: i64,
    /// Reputation delta when a detailed validation is rejected.
    pub reputation_rejected: i64,
    /// Days until a post expires when the draft gives no explicit date.
    pub default_post_lifetime_days: i64,
    /// Upper bound on a single tier's validator cap.
    pub max_validators_per_tier: u32,
    /// Upper bound on post title length.
    pub max_title_len: usize,
    /// Upper bound on free-text feedback length.
    pub max_feedback_len: usize,
    /// Upper bound on review-form field count.
    pub max_form_fields: usize,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            reputation_normal: constants::REPUTATION_NORMAL_VALIDATION,
            reputation_approved: constants::REPUTATION_DETAILED_APPROVED,
            reputation_rejected: constants::REPUTATION_DETAILED_REJECTED,
            default_post_lifetime_days: constants::DEFAULT_POST_LIFETIME_DAYS,
            max_validators_per_tier: constants::MAX_VALIDATORS_PER_TIER,
            max_title_len: constants::MAX_TITLE_LEN,
            max_feedback_len: constants::MAX_FEEDBACK_LEN,
            max_form_fields: constants::MAX_FORM_FIELDS,
        }
    }
}
