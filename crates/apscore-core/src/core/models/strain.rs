use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GramStain {
    Positive,
    Negative,
}

static GRAM_LABELS: Map<&'static str, GramStain> = phf_map! {
    "positive" => GramStain::Positive,
    "+" => GramStain::Positive,
    "gram-positive" => GramStain::Positive,
    "gram positive" => GramStain::Positive,
    "negative" => GramStain::Negative,
    "-" => GramStain::Negative,
    "gram-negative" => GramStain::Negative,
    "gram negative" => GramStain::Negative,
};

impl GramStain {
    pub fn as_str(&self) -> &'static str {
        match self {
            GramStain::Positive => "positive",
            GramStain::Negative => "negative",
        }
    }
}

impl fmt::Display for GramStain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized Gram stain label: '{0}'")]
pub struct ParseGramStainError(pub String);

impl FromStr for GramStain {
    type Err = ParseGramStainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GRAM_LABELS
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ParseGramStainError(s.to_string()))
    }
}

/// The strain-collection accession embedded in a strain name, e.g. `NT5033`.
///
/// Grammar of a strain name carrying a token:
///
/// ```text
/// name   := prefix "(" token ")" suffix
/// token  := "NT" digit+
/// ```
///
/// `prefix` and `suffix` are arbitrary. When a name holds several parenthesized groups,
/// the leftmost group whose content is a complete token wins; other groups (including
/// ones nested around the token) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NtToken(String);

impl NtToken {
    const PREFIX: &'static str = "NT";

    pub fn find_in(strain_name: &str) -> Option<Self> {
        strain_name
            .match_indices('(')
            .find_map(|(open, _)| Self::parse_group(&strain_name[open + 1..]))
    }

    /// Parses `NT<digits>)` at the start of `rest`.
    fn parse_group(rest: &str) -> Option<Self> {
        let digits = rest.strip_prefix(Self::PREFIX)?;
        let len = digits.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 || !digits[len..].starts_with(')') {
            return None;
        }
        Some(Self(format!("{}{}", Self::PREFIX, &digits[..len])))
    }

    /// Builds a token from a reference-table key such as `NT5033`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        let digits = key.strip_prefix(Self::PREFIX)?;
        (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .then(|| Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NtToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a strain name into its result-table column name.
///
/// Lower-cases, turns spaces into underscores and drops parentheses. Applying it to an
/// already normalized name returns the name unchanged.
pub fn feature_name(strain_name: &str) -> String {
    strain_name
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gram_stain_parses_common_labels_case_insensitively() {
        assert_eq!("positive".parse::<GramStain>(), Ok(GramStain::Positive));
        assert_eq!(" Negative ".parse::<GramStain>(), Ok(GramStain::Negative));
        assert_eq!("Gram-Positive".parse::<GramStain>(), Ok(GramStain::Positive));
        assert_eq!("-".parse::<GramStain>(), Ok(GramStain::Negative));
    }

    #[test]
    fn gram_stain_rejects_unknown_label() {
        assert_eq!(
            "variable".parse::<GramStain>(),
            Err(ParseGramStainError("variable".to_string()))
        );
    }

    #[test]
    fn token_is_found_inside_strain_name() {
        let token = NtToken::find_in("Bacteroides fragilis (NT5033)").unwrap();
        assert_eq!(token.as_str(), "NT5033");
    }

    #[test]
    fn leftmost_complete_token_wins() {
        let token = NtToken::find_in("E. coli (K-12) (NT5001) (NT5002)").unwrap();
        assert_eq!(token.as_str(), "NT5001");
    }

    #[test]
    fn nested_parentheses_resolve_to_inner_token() {
        let token = NtToken::find_in("Strain ((NT42))").unwrap();
        assert_eq!(token.as_str(), "NT42");
    }

    #[test]
    fn names_without_complete_token_do_not_match() {
        assert!(NtToken::find_in("Escherichia coli").is_none());
        assert!(NtToken::find_in("E. coli (NT)").is_none());
        assert!(NtToken::find_in("E. coli (NT12").is_none());
        assert!(NtToken::find_in("E. coli (nt12)").is_none());
        assert!(NtToken::find_in("E. coli (NT12a)").is_none());
    }

    #[test]
    fn from_key_accepts_only_bare_tokens() {
        assert_eq!(NtToken::from_key(" NT001 ").unwrap().as_str(), "NT001");
        assert!(NtToken::from_key("NT").is_none());
        assert!(NtToken::from_key("(NT001)").is_none());
    }

    #[test]
    fn feature_name_normalizes_strain_name() {
        assert_eq!(
            feature_name("Bacteroides fragilis (NT5033)"),
            "bacteroides_fragilis_nt5033"
        );
    }

    #[test]
    fn feature_name_is_idempotent() {
        for name in [
            "Bacteroides fragilis (NT5033)",
            "E. coli ((K-12)) NT1",
            "already_normal_nt1",
            "",
        ] {
            let once = feature_name(name);
            assert_eq!(feature_name(&once), once);
        }
    }
}
