//! User-defined aliases for JSON-LD keywords
//!
//! Hosts may rename keywords (e.g. `@id` to `id`) to produce friendlier JSON.
//! The mapping is plain configuration: it deserializes from a JSON object
//! keyed by keyword.

use crate::error::{Result, ShapeError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trellis_vocab::keywords;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").unwrap());

/// Check if a name is a plain word, as required of aliases
pub fn is_word(name: &str) -> bool {
    WORD.is_match(name)
}

/// Keyword to alias overrides
///
/// # Example
///
/// ```
/// use trellis_shape::Keywords;
///
/// let keywords = Keywords::new().with("@id", "id").with("@type", "type");
///
/// assert_eq!(keywords.alias("@id"), "id");
/// assert_eq!(keywords.alias("@value"), "@value");
/// assert_eq!(keywords.keyword("type"), Some("@type"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keywords {
    aliases: BTreeMap<String, String>,
}

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override (builder style)
    pub fn with(mut self, keyword: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(keyword.into(), alias.into());
        self
    }

    /// Check that every key is an aliasable keyword, every alias a distinct plain word
    pub fn validate(&self) -> Result<()> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();

        for (keyword, alias) in &self.aliases {
            if !keywords::ALIASABLE.contains(&keyword.as_str()) {
                return Err(ShapeError::UnknownKeyword(keyword.clone()));
            }

            if !is_word(alias) {
                return Err(ShapeError::MalformedKeywordAlias {
                    keyword: keyword.clone(),
                    alias: alias.clone(),
                });
            }

            if let Some(first) = seen.insert(alias, keyword) {
                return Err(ShapeError::ConflictingKeywordAliases {
                    first: first.to_string(),
                    second: keyword.clone(),
                });
            }
        }

        Ok(())
    }

    /// The alias standing in for a keyword (the keyword itself if not overridden)
    pub fn alias<'a>(&'a self, keyword: &'a str) -> &'a str {
        self.aliases.get(keyword).map(String::as_str).unwrap_or(keyword)
    }

    /// The keyword a JSON property name stands for, if any
    ///
    /// Literal keywords (names starting with `@`) are always recognized, so
    /// `@id` keeps working alongside an `id` override.
    pub fn keyword<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.aliases
            .iter()
            .find(|(_, alias)| alias.as_str() == name)
            .map(|(keyword, _)| keyword.as_str())
            .or_else(|| name.starts_with('@').then_some(name))
    }

    /// Check if a name is taken by a keyword override
    pub fn is_reserved(&self, name: &str) -> bool {
        self.aliases.values().any(|alias| alias == name)
    }

    /// Overrides in keyword order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookups() {
        let keywords = Keywords::new().with("@id", "id");

        assert_eq!(keywords.alias("@id"), "id");
        assert_eq!(keywords.alias("@type"), "@type");

        assert_eq!(keywords.keyword("id"), Some("@id"));
        assert_eq!(keywords.keyword("@id"), Some("@id"));
        assert_eq!(keywords.keyword("@language"), Some("@language"));
        assert_eq!(keywords.keyword("label"), None);

        assert!(keywords.is_reserved("id"));
        assert!(!keywords.is_reserved("label"));
    }

    #[test]
    fn test_validation() {
        assert!(Keywords::new().with("@id", "id").validate().is_ok());

        assert_eq!(
            Keywords::new().with("@graph", "graph").validate(),
            Err(ShapeError::UnknownKeyword("@graph".to_string()))
        );

        assert!(matches!(
            Keywords::new().with("@id", "the id").validate(),
            Err(ShapeError::MalformedKeywordAlias { .. })
        ));

        assert!(matches!(
            Keywords::new().with("@id", "x").with("@type", "x").validate(),
            Err(ShapeError::ConflictingKeywordAliases { .. })
        ));
    }

    #[test]
    fn test_deserialize() {
        let keywords: Keywords = serde_json::from_value(json!({
            "@id": "id",
            "@type": "type"
        }))
        .unwrap();

        assert_eq!(keywords, Keywords::new().with("@id", "id").with("@type", "type"));
    }
}
