//! Cache delete modes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy deciding when a cache entry goes away
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Entries live for the TTL; release is ignored
    #[default]
    Expire,
    /// Entries live until the worker releases them
    Complete,
    /// Entries live for the TTL or until released
    ExpireComplete,
}

impl DeleteMode {
    /// Whether entries get a deadline
    pub fn expires(self) -> bool {
        matches!(self, Self::Expire | Self::ExpireComplete)
    }

    /// Whether `release` removes entries
    pub fn releases(self) -> bool {
        matches!(self, Self::Complete | Self::ExpireComplete)
    }

    /// Config file spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expire => "expire",
            Self::Complete => "complete",
            Self::ExpireComplete => "expire_complete",
        }
    }
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
