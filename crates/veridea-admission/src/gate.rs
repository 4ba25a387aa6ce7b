//! Admission gate — the hard gate every validation attempt passes before
//! settlement.
//!
//! ## Design Principles
//!
//! - **Fail-closed**: the first failing check rejects the attempt
//! - **Ordered**: checks run in a fixed order, each with a distinct error
//! - **No bypass**: the settlement engine is the only caller, and it runs
//!   the gate inside the same serialized operation as its writes

use chrono::{DateTime, Utc};
use veridea_types::{
    form, FieldSpec, MarketplaceConfig, Result, Validation, ValidationRequest, ValidationTier,
    VerideaError,
};

use crate::{book::ValidationBook, registry::PostRegistry};

/// Gate for validation attempts. Stateless apart from configuration.
pub struct AdmissionGate {
    config: MarketplaceConfig,
}

impl AdmissionGate {
    #[must_use]
    pub fn new(config: MarketplaceConfig) -> Self {
        Self { config }
    }

    /// Run the admission checks for `request`, in order:
    ///
    /// 1. `AlreadyValidated` — (post, validator) pair already admitted
    /// 2. `PostNotFound`
    /// 3. `SelfValidation` — validator is the post's author
    /// 4. `PostNotOpen` — closed, or past expiry
    /// 5. `TierFull` — the live tier counter is at its cap
    /// 6. `InvalidResponse` — review content malformed (detailed tier must
    ///    satisfy the post's form; normal tier must not carry responses)
    ///
    /// On success, returns the constructed [`Validation`] with the reward
    /// copied from the post's current tier reward. Nothing is stored here —
    /// the settlement engine inserts it together with its balance and
    /// counter writes.
    ///
    /// # Errors
    /// The first failing check above.
    pub fn admit(
        &self,
        book: &ValidationBook,
        registry: &PostRegistry,
        request: &ValidationRequest,
        now: DateTime<Utc>,
    ) -> Result<Validation> {
        if book.has_validated(request.post_id, request.validator_id) {
            return Err(VerideaError::AlreadyValidated {
                post_id: request.post_id,
                validator_id: request.validator_id,
            });
        }
        let post = registry.get(request.post_id)?;
        if post.author_id == request.validator_id {
            return Err(VerideaError::SelfValidation {
                post_id: post.id,
            });
        }
        if !post.is_open_at(now) {
            return Err(VerideaError::PostNotOpen { post_id: post.id });
        }
        if post.tier_is_full(request.tier) {
            return Err(VerideaError::TierFull {
                tier: request.tier,
                cap: post.tier_cap(request.tier),
            });
        }
        self.check_content(request, post.review_form.as_slice())?;

        Ok(Validation::admitted(post, request.clone(), now))
    }

    fn check_content(
        &self,
        request: &ValidationRequest,
        review_form: &[FieldSpec],
    ) -> Result<()> {
        if let Some(feedback) = &request.feedback {
            if feedback.chars().count() > self.config.max_feedback_len {
                return Err(VerideaError::InvalidResponse {
                    reason: format!(
                        "feedback exceeds {} characters",
                        self.config.max_feedback_len
                    ),
                });
            }
        }
        match request.tier {
            ValidationTier::Normal => {
                if !request.responses.is_empty() {
                    return Err(VerideaError::InvalidResponse {
                        reason: "normal validations do not carry form responses".to_string(),
                    });
                }
                Ok(())
            }
            ValidationTier::Detailed => form::validate_responses(review_form, &request.responses),
        }
    }
}
