//! Validation book — validation rows and the (post, validator) uniqueness
//! index.
//!
//! One validation per (post, validator) pair is a core invariant, not a
//! database nicety: the gate's pre-check alone could be raced by two
//! concurrent attempts, so [`ValidationBook::insert`] re-enforces it at the
//! write. Both run inside the same serialized operation.

use std::collections::{HashMap, HashSet};

use veridea_types::{
    PostId, Result, UserId, Validation, ValidationId, ValidationStatus, VerideaError,
};

/// Stores validation rows, indexed by ID and by (post, validator).
pub struct ValidationBook {
    validations: HashMap<ValidationId, Validation>,
    /// Uniqueness index: one entry per admitted (post, validator) pair.
    seen: HashSet<(PostId, UserId)>,
}

impl ValidationBook {
    #[must_use]
    pub fn new() -> Self {
        Self {
            validations: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Whether this validator has already validated this post.
    #[must_use]
    pub fn has_validated(&self, post_id: PostId, validator_id: UserId) -> bool {
        self.seen.contains(&(post_id, validator_id))
    }

    /// Insert an admitted validation, enforcing (post, validator)
    /// uniqueness.
    ///
    /// # Errors
    /// Returns [`VerideaError::AlreadyValidated`] if the pair is already
    /// present — the invariant holds even if a caller skipped the gate's
    /// pre-check.
    pub fn insert(&mut self, validation: Validation) -> Result<ValidationId> {
        let key = (validation.post_id, validation.validator_id);
        if !self.seen.insert(key) {
            return Err(VerideaError::AlreadyValidated {
                post_id: validation.post_id,
                validator_id: validation.validator_id,
            });
        }
        let id = validation.id;
        self.validations.insert(id, validation);
        Ok(id)
    }

    /// Look up a validation.
    ///
    /// # Errors
    /// Returns `ValidationNotFound` if absent.
    pub fn get(&self, id: ValidationId) -> Result<&Validation> {
        self.validations
            .get(&id)
            .ok_or(VerideaError::ValidationNotFound(id))
    }

    /// Mutable lookup, for approval-workflow transitions.
    ///
    /// # Errors
    /// Returns `ValidationNotFound` if absent.
    pub fn get_mut(&mut self, id: ValidationId) -> Result<&mut Validation> {
        self.validations
            .get_mut(&id)
            .ok_or(VerideaError::ValidationNotFound(id))
    }

    /// All validations for one post, in no particular order.
    #[must_use]
    pub fn by_post(&self, post_id: PostId) -> Vec<&Validation> {
        self.validations
            .values()
            .filter(|v| v.post_id == post_id)
            .collect()
    }

    /// PENDING validations for one post (the author's approval queue).
    #[must_use]
    pub fn pending_for_post(&self, post_id: PostId) -> Vec<&Validation> {
        self.validations
            .values()
            .filter(|v| v.post_id == post_id && v.status == ValidationStatus::Pending)
            .collect()
    }

    /// Number of validations tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validations.is_empty()
    }
}

impl Default for ValidationBook {
    fn default() -> Self {
        Self::new()
    }
}
