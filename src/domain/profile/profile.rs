//! The normalized profile record.

use serde::{Deserialize, Serialize};

use super::Role;

/// Practical cap on the number of profile tags.
pub const MAX_TAGS: usize = 4;

/// A member's generated profile card.
///
/// Created only by the generation flow's terminal step and immutable once
/// handed off; a later regeneration supersedes the record wholesale rather
/// than merging fields.
///
/// # Invariants
///
/// - The seven required fields (`name`, `role`, `tagline`, `tags`,
///   `description`, `needs`, `offers`) are non-empty after generation;
///   decoding enforces this before a `Profile` is ever constructed.
/// - `tags` holds at most [`MAX_TAGS`] entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub role: Role,
    /// One-sentence intro.
    pub tagline: String,
    /// Short keywords, e.g. "AI", "Seed Round".
    pub tags: Vec<String>,
    /// What they are doing.
    pub description: String,
    /// What they need.
    pub needs: String,
    /// What they can offer.
    pub offers: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}
