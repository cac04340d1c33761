//! Shared types used across the Tamadex crates.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::TamadexError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Newtype for item and character identifiers.
///
/// Identifiers are opaque strings taken from the dataset (or generated by the
/// loader). They must be non-empty and must not carry surrounding whitespace,
/// because they are persisted verbatim as favorites keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Maximum accepted identifier length in bytes.
    pub const MAX_LEN: usize = 128;

    /// Create a new `EntityId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty, too long, or padded with whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, TamadexError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), TamadexError> {
        validate_identifier("entity", id, Self::MAX_LEN)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Newtype for category identifiers.
///
/// Datasets use both slugs (`food`) and display-style names
/// (`Food & Drinks`), so the same rule as [`EntityId`] applies: non-empty,
/// bounded, no surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Maximum accepted identifier length in bytes.
    pub const MAX_LEN: usize = 128;

    /// Create a new `CategoryId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty, too long, or padded with whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, TamadexError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), TamadexError> {
        validate_identifier("category", id, Self::MAX_LEN)
    }
}

fn validate_identifier(kind: &str, id: &str, max_len: usize) -> Result<(), TamadexError> {
    if id.is_empty() {
        return Err(TamadexError::Validation(format!(
            "invalid {kind} ID: must not be empty"
        )));
    }

    if id.len() > max_len {
        return Err(TamadexError::Validation(format!(
            "invalid {kind} ID: must be at most {max_len} bytes, got {}",
            id.len()
        )));
    }

    if id.trim() != id {
        return Err(TamadexError::Validation(format!(
            "invalid {kind} ID: surrounding whitespace in '{id}'"
        )));
    }

    Ok(())
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How rare a character is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rarity {
    /// Default rarity
    Common,
    /// Slightly harder to obtain
    Uncommon,
    /// Rare
    Rare,
    /// Very rare
    VeryRare,
    /// Event or limited release
    Special,
    /// Legendary
    Legendary,
}

impl Rarity {
    /// All rarities, from most to least common.
    pub const ALL: [Rarity; 6] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::VeryRare,
        Self::Special,
        Self::Legendary,
    ];

    /// Get the canonical kebab-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::VeryRare => "very-rare",
            Self::Special => "special",
            Self::Legendary => "legendary",
        }
    }

    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::VeryRare => "Very Rare",
            Self::Special => "Special",
            Self::Legendary => "Legendary",
        }
    }

    /// Badge color used by the character screens.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            Self::Common => "#6B7280",
            Self::Uncommon => "#10B981",
            Self::Rare => "#8B5CF6",
            Self::Legendary => "#F59E0B",
            Self::VeryRare | Self::Special => "#6B7280",
        }
    }
}

impl FromStr for Rarity {
    type Err = TamadexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Legacy exports use snake_case and mixed case spellings.
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|rarity| rarity.as_str() == normalized)
            .ok_or_else(|| TamadexError::Validation(format!("unknown rarity '{s}'")))
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What a search returns when the query is shorter than the policy minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BelowMinimum {
    /// Return the full, unfiltered collection in dataset order
    ReturnAll,
    /// Return nothing
    ReturnNone,
}

/// Per-call-site policy for short or empty search queries.
///
/// The search service itself is policy-free; each screen picks the policy it
/// needs (browse lists show everything for an empty query, the dedicated
/// search screen waits for two characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPolicy {
    /// Minimum number of characters (after trimming) before filtering applies
    pub min_chars: usize,
    /// Result for queries below `min_chars`
    pub below_min: BelowMinimum,
}

impl SearchPolicy {
    /// Empty query returns the whole collection.
    #[must_use]
    pub const fn browse() -> Self {
        Self {
            min_chars: 1,
            below_min: BelowMinimum::ReturnAll,
        }
    }

    /// Queries shorter than `min_chars` return nothing.
    #[must_use]
    pub const fn strict(min_chars: usize) -> Self {
        Self {
            min_chars,
            below_min: BelowMinimum::ReturnNone,
        }
    }

    /// Decide whether `query` should be filtered or short-circuited.
    ///
    /// Returns `None` when the query is long enough to filter on, otherwise
    /// the short-circuit behavior. Whitespace-only queries always
    /// short-circuit.
    #[must_use]
    pub fn short_circuit(&self, query: &str) -> Option<BelowMinimum> {
        let trimmed = query.trim();
        if trimmed.is_empty() || trimmed.chars().count() < self.min_chars {
            Some(self.below_min)
        } else {
            None
        }
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self::browse()
    }
}
