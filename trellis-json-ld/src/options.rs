//! Codec options
//!
//! Shared by the decoder, encoder and validators.

use serde::{Deserialize, Serialize};
use trellis_shape::Keywords;

/// Options for JSON-LD coding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodecOptions {
    /// Keyword alias overrides
    pub keywords: Keywords,
    /// Whether the encoder emits an `@context` on the outermost object
    pub embed_context: bool,
    /// Relativization root for encoded IRIs
    ///
    /// Defaults to the `scheme://authority/` root of the focus IRI.
    pub base: Option<String>,
}

impl CodecOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keyword overrides
    pub fn with_keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = keywords;
        self
    }

    /// Set a single keyword override
    pub fn with_keyword(mut self, keyword: impl Into<String>, alias: impl Into<String>) -> Self {
        self.keywords = self.keywords.with(keyword, alias);
        self
    }

    /// Enable `@context` embedding
    pub fn with_context(mut self) -> Self {
        self.embed_context = true;
        self
    }

    /// Set the relativization root
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }
}
