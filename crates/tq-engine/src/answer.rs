//! Yes/no answer normalization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// Parse a free-text reply. Case-insensitive, surrounding whitespace ignored.
    ///
    /// Returns `None` for anything that is not a recognized token.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "yes" | "y" | "si" | "sí" | "s" | "1" | "true" => Some(Self::Yes),
            "no" | "n" | "0" | "false" => Some(Self::No),
            _ => None,
        }
    }

    /// Canonical form stored in the question trace.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("yes", Some(Answer::Yes))]
    #[case("Y", Some(Answer::Yes))]
    #[case("si", Some(Answer::Yes))]
    #[case("SÍ", Some(Answer::Yes))]
    #[case(" s ", Some(Answer::Yes))]
    #[case("1", Some(Answer::Yes))]
    #[case("True", Some(Answer::Yes))]
    #[case("no", Some(Answer::No))]
    #[case("N", Some(Answer::No))]
    #[case("0", Some(Answer::No))]
    #[case("false", Some(Answer::No))]
    #[case("", None)]
    #[case("maybe", None)]
    #[case("yess", None)]
    #[case("2", None)]
    fn parses_tokens(#[case] raw: &str, #[case] expected: Option<Answer>) {
        assert_eq!(Answer::parse(raw), expected);
    }

    #[test]
    fn canonical_strings() {
        assert_eq!(Answer::Yes.to_string(), "yes");
        assert_eq!(Answer::from(false).as_str(), "no");
    }
}
