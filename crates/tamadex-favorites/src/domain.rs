//! The two independent favorites domains.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which entity kind a favorites set tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoritesDomain {
    /// Favorited items
    Items,
    /// Favorited characters
    Characters,
}

impl FavoritesDomain {
    /// Both domains.
    pub const ALL: [Self; 2] = [Self::Items, Self::Characters];

    /// Fixed durable storage key.
    ///
    /// These keys are shared with existing installs and must not change.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Items => "tama_favorites",
            Self::Characters => "tama_favorite_characters",
        }
    }

    /// Short name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Characters => "characters",
        }
    }
}

impl fmt::Display for FavoritesDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FavoritesDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "items" | "item" => Ok(Self::Items),
            "characters" | "character" => Ok(Self::Characters),
            other => Err(format!("unknown favorites domain '{other}'")),
        }
    }
}
