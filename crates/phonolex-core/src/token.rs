use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a phrase in the dictionary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PhraseToken(pub u32);

impl PhraseToken {
    /// "No token".
    pub const NULL: PhraseToken = PhraseToken(0);
    /// Implicit context used when a lookup is given no prefix.
    pub const SENTENCE_START: PhraseToken = PhraseToken(1);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    /// Reserved tokens never name a dictionary phrase.
    pub fn is_reserved(self) -> bool {
        self.0 <= Self::SENTENCE_START.0
    }
}

impl fmt::Display for PhraseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhraseToken {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PhraseToken)
    }
}
