use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::{Error, Result};
use crate::text::transliterate;

/// Canonical language identifier derived from a MultiTree code string.
///
/// This is the key that ties nodes, languages, and Newick labels together:
/// every `Language_ID` in the node table and every label in the serialized
/// trees is a `LanguageId`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageId(String);

impl LanguageId {
    /// Normalize a raw, comma-separated code string.
    ///
    /// Each fragment is trimmed, `.` becomes `-` and ` ` becomes `_`, and the
    /// result is transliterated to ASCII. Empty fragments are discarded, the
    /// rest are sorted bytewise and joined with `_`. Duplicates survive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCodes`] when no fragment survives.
    ///
    /// # Examples
    ///
    /// ```
    /// use multitree_core::model::LanguageId;
    ///
    /// let id = LanguageId::normalize("b.c, A , D").unwrap();
    /// assert_eq!(id.as_str(), "A_D_b-c");
    /// ```
    pub fn normalize(raw: &str) -> Result<Self> {
        let mut fragments: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| transliterate(&s.replace('.', "-").replace(' ', "_")))
            .filter(|s| !s.is_empty())
            .collect();

        if fragments.is_empty() {
            return Err(Error::EmptyCodes {
                raw: raw.to_string(),
            });
        }

        fragments.sort_unstable();
        Ok(Self(fragments.join("_")))
    }

    /// Wrap an identifier that has already been normalized, e.g. one read
    /// back from a written table.
    #[must_use]
    pub fn from_normalized(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LanguageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
