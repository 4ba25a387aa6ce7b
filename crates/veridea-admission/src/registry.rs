//! Post registry — draft validation, budget escrow, and post storage.
//!
//! Publishing is atomic in the escrow manager's sense: the draft checks are
//! pure, the ledger charge is the only fallible mutation, and the post row
//! is inserted only after the charge succeeds. A failed publish leaves no
//! post and no balance change.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use veridea_ledger::LedgerBook;
use veridea_types::{
    FieldKind, MarketplaceConfig, Post, PostDraft, PostId, Result, UserId, VerideaError,
};

/// Stores post rows and enforces the publish-time rules.
pub struct PostRegistry {
    posts: HashMap<PostId, Post>,
    config: MarketplaceConfig,
}

impl PostRegistry {
    #[must_use]
    pub fn new(config: MarketplaceConfig) -> Self {
        Self {
            posts: HashMap::new(),
            config,
        }
    }

    /// Validate a draft, escrow its budget from the author, and store the
    /// post.
    ///
    /// 1. Check the draft (pure — nothing changes on failure)
    /// 2. Charge the budget through the ledger (atomic: balance, idea
    ///    counter, and `POST_PAYMENT` entry together, or nothing)
    /// 3. Insert the post row
    ///
    /// # Errors
    /// `InvalidDraft` for a malformed draft, or whatever the ledger charge
    /// returns (`AccountNotFound`, `InsufficientFunds`).
    pub fn publish(
        &mut self,
        ledger: &mut LedgerBook,
        author_id: UserId,
        draft: PostDraft,
        now: DateTime<Utc>,
    ) -> Result<PostId> {
        self.check_draft(&draft, now)?;

        let default_expiry = now + Duration::days(self.config.default_post_lifetime_days);
        let post = Post::from_draft(author_id, draft, default_expiry, now);
        let post_id = post.id;

        ledger.charge_post_budget(author_id, post.total_budget, post_id, now)?;

        info!(%post_id, %author_id, budget = %post.total_budget, "post published");
        self.posts.insert(post_id, post);
        Ok(post_id)
    }

    /// Look up a post.
    ///
    /// # Errors
    /// Returns `PostNotFound` if absent.
    pub fn get(&self, post_id: PostId) -> Result<&Post> {
        self.posts
            .get(&post_id)
            .ok_or(VerideaError::PostNotFound(post_id))
    }

    /// Mutable lookup, for the settlement engine's counter and status
    /// updates.
    ///
    /// # Errors
    /// Returns `PostNotFound` if absent.
    pub fn get_mut(&mut self, post_id: PostId) -> Result<&mut Post> {
        self.posts
            .get_mut(&post_id)
            .ok_or(VerideaError::PostNotFound(post_id))
    }

    /// All posts by one author.
    #[must_use]
    pub fn by_author(&self, author_id: UserId) -> Vec<&Post> {
        self.posts
            .values()
            .filter(|p| p.author_id == author_id)
            .collect()
    }

    /// Number of posts tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Fail-closed draft validation. Every check rejects with a reason;
    /// descriptive attributes beyond length limits are not interpreted.
    fn check_draft(&self, draft: &PostDraft, now: DateTime<Utc>) -> Result<()> {
        let invalid = |reason: String| VerideaError::InvalidDraft { reason };

        if draft.title.trim().is_empty() {
            return Err(invalid("title must not be empty".to_string()));
        }
        if draft.title.chars().count() > self.config.max_title_len {
            return Err(invalid(format!(
                "title exceeds {} characters",
                self.config.max_title_len
            )));
        }
        if draft.total_budget.is_zero() || draft.total_budget.is_sign_negative() {
            return Err(invalid("total budget must be positive".to_string()));
        }
        if draft.normal_reward.is_sign_negative() || draft.detailed_reward.is_sign_negative() {
            return Err(invalid("rewards must not be negative".to_string()));
        }
        if draft.normal_validator_cap == 0 && draft.detailed_validator_cap == 0 {
            return Err(invalid(
                "at least one tier must accept validators".to_string(),
            ));
        }
        let max_cap = self.config.max_validators_per_tier;
        if draft.normal_validator_cap > max_cap || draft.detailed_validator_cap > max_cap {
            return Err(invalid(format!("validator cap exceeds maximum {max_cap}")));
        }
        if draft.normal_validator_cap > 0 && draft.normal_reward.is_zero() {
            return Err(invalid("normal reward must be positive".to_string()));
        }
        if draft.detailed_validator_cap > 0 && draft.detailed_reward.is_zero() {
            return Err(invalid("detailed reward must be positive".to_string()));
        }
        if let Some(expiry) = draft.expiry_date {
            if expiry <= now {
                return Err(invalid("expiry date must be in the future".to_string()));
            }
        }
        self.check_form(draft)
    }

    fn check_form(&self, draft: &PostDraft) -> Result<()> {
        let invalid = |reason: String| VerideaError::InvalidDraft { reason };

        if draft.review_form.len() > self.config.max_form_fields {
            return Err(invalid(format!(
                "review form exceeds {} fields",
                self.config.max_form_fields
            )));
        }
        let mut seen: Vec<&str> = Vec::with_capacity(draft.review_form.len());
        for spec in &draft.review_form {
            if spec.name.trim().is_empty() {
                return Err(invalid("form field name must not be empty".to_string()));
            }
            if seen.contains(&spec.name.as_str()) {
                return Err(invalid(format!("duplicate form field '{}'", spec.name)));
            }
            seen.push(&spec.name);
            match &spec.kind {
                FieldKind::Text { max_len } if *max_len == 0 => {
                    return Err(invalid(format!(
                        "text field '{}' must allow at least one character",
                        spec.name
                    )));
                }
                FieldKind::Select { options } if options.is_empty() => {
                    return Err(invalid(format!(
                        "select field '{}' needs at least one option",
                        spec.name
                    )));
                }
                FieldKind::Rating { max }
                    if *max == 0 || *max > veridea_types::constants::MAX_RATING_SCALE =>
                {
                    return Err(invalid(format!(
                        "rating field '{}' scale out of range",
                        spec.name
                    )));
                }
                FieldKind::Number { min, max } => {
                    if let (Some(lo), Some(hi)) = (min, max) {
                        if lo > hi {
                            return Err(invalid(format!(
                                "number field '{}' has min > max",
                                spec.name
                            )));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use veridea_types::{FieldSpec, FieldValue};

    use super::*;

    fn setup() -> (PostRegistry, LedgerBook, UserId) {
        let registry = PostRegistry::new(MarketplaceConfig::default());
        let mut ledger = LedgerBook::new();
        let author = UserId::new();
        ledger.open_account(author, Utc::now()).unwrap();
        ledger
            .deposit(author, Decimal::new(100, 0), "grant", Utc::now())
            .unwrap();
        (registry, ledger, author)
    }

    fn draft() -> PostDraft {
        PostDraft {
            title: "solar-powered bike lock".to_string(),
            category: Some("hardware".to_string()),
            total_budget: Decimal::new(20, 0),
            normal_reward: Decimal::new(5, 0),
            detailed_reward: Decimal::new(20, 0),
            normal_validator_cap: 2,
            detailed_validator_cap: 1,
            expiry_date: None,
            review_form: Vec::new(),
        }
    }

    #[test]
    fn publish_escrows_budget_and_stores_post() {
        let (mut registry, mut ledger, author) = setup();

        let post_id = registry
            .publish(&mut ledger, author, draft(), Utc::now())
            .unwrap();

        let acct = ledger.account(author).unwrap();
        assert_eq!(acct.available_balance, Decimal::new(80, 0));
        assert_eq!(acct.total_ideas_submitted, 1);

        let post = registry.get(post_id).unwrap();
        assert_eq!(post.author_id, author);
        assert_eq!(post.total_budget, Decimal::new(20, 0));
        assert_eq!(post.normal_count, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn publish_insufficient_funds_stores_nothing() {
        let (mut registry, mut ledger, author) = setup();
        let mut big = draft();
        big.total_budget = Decimal::new(500, 0);

        let err = registry
            .publish(&mut ledger, author, big, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InsufficientFunds { .. }));
        assert!(registry.is_empty());
        assert_eq!(
            ledger.account(author).unwrap().available_balance,
            Decimal::new(100, 0)
        );
    }

    #[test]
    fn default_expiry_applied() {
        let (mut registry, mut ledger, author) = setup();
        let now = Utc::now();
        let post_id = registry.publish(&mut ledger, author, draft(), now).unwrap();
        let post = registry.get(post_id).unwrap();
        assert_eq!(post.expiry_date, now + Duration::days(30));
    }

    #[test]
    fn empty_title_rejected() {
        let (mut registry, mut ledger, author) = setup();
        let mut bad = draft();
        bad.title = "  ".to_string();
        let err = registry
            .publish(&mut ledger, author, bad, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InvalidDraft { .. }));
    }

    #[test]
    fn zero_budget_rejected() {
        let (mut registry, mut ledger, author) = setup();
        let mut bad = draft();
        bad.total_budget = Decimal::ZERO;
        let err = registry
            .publish(&mut ledger, author, bad, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InvalidDraft { .. }));
    }

    #[test]
    fn both_caps_zero_rejected() {
        let (mut registry, mut ledger, author) = setup();
        let mut bad = draft();
        bad.normal_validator_cap = 0;
        bad.detailed_validator_cap = 0;
        let err = registry
            .publish(&mut ledger, author, bad, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InvalidDraft { .. }));
    }

    #[test]
    fn capped_tier_needs_positive_reward() {
        let (mut registry, mut ledger, author) = setup();
        let mut bad = draft();
        bad.normal_reward = Decimal::ZERO;
        let err = registry
            .publish(&mut ledger, author, bad, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InvalidDraft { .. }));
    }

    #[test]
    fn past_expiry_rejected() {
        let (mut registry, mut ledger, author) = setup();
        let mut bad = draft();
        bad.expiry_date = Some(Utc::now() - Duration::hours(1));
        let err = registry
            .publish(&mut ledger, author, bad, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InvalidDraft { .. }));
    }

    #[test]
    fn malformed_form_rejected() {
        let (mut registry, mut ledger, author) = setup();

        let mut bad = draft();
        bad.review_form = vec![FieldSpec {
            name: "verdict".to_string(),
            label: "Verdict".to_string(),
            required: true,
            kind: FieldKind::Select {
                options: Vec::new(),
            },
        }];
        let err = registry
            .publish(&mut ledger, author, bad, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InvalidDraft { .. }));

        let mut dup = draft();
        let spec = FieldSpec {
            name: "novelty".to_string(),
            label: "Novelty".to_string(),
            required: false,
            kind: FieldKind::Rating { max: 5 },
        };
        dup.review_form = vec![spec.clone(), spec];
        let err = registry
            .publish(&mut ledger, author, dup, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VerideaError::InvalidDraft { .. }));
    }

    #[test]
    fn well_formed_form_accepted() {
        let (mut registry, mut ledger, author) = setup();
        let mut good = draft();
        good.review_form = vec![
            FieldSpec {
                name: "novelty".to_string(),
                label: "Novelty".to_string(),
                required: true,
                kind: FieldKind::Rating { max: 5 },
            },
            FieldSpec {
                name: "verdict".to_string(),
                label: "Verdict".to_string(),
                required: true,
                kind: FieldKind::Select {
                    options: vec!["build".to_string(), "skip".to_string()],
                },
            },
        ];
        let post_id = registry
            .publish(&mut ledger, author, good, Utc::now())
            .unwrap();
        let post = registry.get(post_id).unwrap();
        assert_eq!(post.review_form.len(), 2);
        // Sanity: the stored form drives response validation downstream.
        assert!(post.review_form[0]
            .accepts(&FieldValue::Rating(4))
            .is_ok());
    }

    #[test]
    fn unknown_post_lookup_fails() {
        let (registry, _, _) = setup();
        let err = registry.get(PostId::new()).unwrap_err();
        assert!(matches!(err, VerideaError::PostNotFound(_)));
    }
}
