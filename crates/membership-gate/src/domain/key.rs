//! Key normalization
//!
//! Every add, test, and store lookup goes through [`NormalizedKey`]. Two raw
//! strings that differ only by surrounding whitespace or letter case map to
//! the same key, so they hash to the same filter positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A trimmed, lower-cased identity string.
///
/// The only way to build one is [`NormalizedKey::new`], which makes it
/// impossible to hash an unnormalized key by accident.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Normalize a raw key: trim surrounding whitespace, then lowercase.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NormalizedKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NormalizedKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
