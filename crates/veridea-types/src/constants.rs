//! System-wide constants for the Veridea settlement engine.

/// Reputation delta for completing a normal validation.
pub const REPUTATION_NORMAL_VALIDATION: i64 = 1;

/// Reputation delta when a detailed validation is approved by the author.
pub const REPUTATION_DETAILED_APPROVED: i64 = 5;

/// Reputation delta when a detailed validation is rejected by the author.
pub const REPUTATION_DETAILED_REJECTED: i64 = -2;

/// Default lifetime of a post before it expires, in days.
pub const DEFAULT_POST_LIFETIME_DAYS: i64 = 30;

/// Maximum validator cap a post may request for a single tier.
pub const MAX_VALIDATORS_PER_TIER: u32 = 500;

/// Maximum length of a post title.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of free-text validator feedback.
pub const MAX_FEEDBACK_LEN: usize = 5_000;

/// Maximum number of fields in a post's detailed review form.
pub const MAX_FORM_FIELDS: usize = 32;

/// Highest `max` a rating field may declare.
pub const MAX_RATING_SCALE: u8 = 10;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Veridea";
