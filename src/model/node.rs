//! Attribution node value records.
//!
//! An [`AttributionNode`] is compared field by field: two occurrences of
//! the same catalog item are the same node only when every rendered field
//! matches, including extra attribution text and resolved license markup.

use super::ItemKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// Connecting phrase of the item-level credit line.
pub const ORIGINAL_LICENSE_PHRASE: &str = "The original component is licensed under";

/// One token of a rendered license expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkupToken {
    /// A license symbol, linked to its appendix entry
    License { key: String, label: String },
    /// Operators, parentheses and spacing
    Text { text: String },
}

/// A resolved license expression ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpressionMarkup {
    tokens: Vec<MarkupToken>,
}

impl ExpressionMarkup {
    pub fn new(tokens: Vec<MarkupToken>) -> Self {
        Self { tokens }
    }

    #[must_use]
    pub fn tokens(&self) -> &[MarkupToken] {
        &self.tokens
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// License keys in first-appearance order, without duplicates
    #[must_use]
    pub fn license_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for token in &self.tokens {
            if let MarkupToken::License { key, .. } = token {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

impl fmt::Display for ExpressionMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                MarkupToken::License { key, .. } => f.write_str(key)?,
                MarkupToken::Text { text } => f.write_str(text)?,
            }
        }
        Ok(())
    }
}

/// Immutable value record for one entry of an attribution document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributionNode {
    pub kind: ItemKind,
    pub display_name: String,
    pub owner: String,
    pub copyright: String,
    pub extra_attribution_text: String,
    /// Relationship-level license credit
    pub relationship_expression: Option<ExpressionMarkup>,
    /// Item-level license credit, set only when it differs from the relationship's
    pub item_expression: Option<ExpressionMarkup>,
    pub notice_text: String,
    /// False for inactive items: the node keeps its slot but renders no body
    pub is_displayed: bool,
    pub homepage_url: Option<String>,
    pub standard_notice: Option<String>,
}

impl AttributionNode {
    /// The license-credit lines this node renders, relationship line first.
    #[must_use]
    pub fn credit_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(expression) = &self.relationship_expression {
            lines.push(expression.to_string());
        }
        if let Some(expression) = &self.item_expression {
            lines.push(format!("{ORIGINAL_LICENSE_PHRASE} {expression}"));
        }
        lines
    }

    /// Every license key referenced by either credit line
    #[must_use]
    pub fn license_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for markup in [&self.relationship_expression, &self.item_expression]
            .into_iter()
            .flatten()
        {
            for key in markup.license_keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Structural hash over every field.
    ///
    /// Strings are length-prefixed so adjacent fields cannot bleed into
    /// each other.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        let mut put = |value: &str| {
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        };
        put(&self.kind.to_string());
        put(&self.display_name);
        put(&self.owner);
        put(&self.copyright);
        put(&self.extra_attribution_text);
        for markup in [&self.relationship_expression, &self.item_expression] {
            match markup {
                Some(markup) => {
                    put("some");
                    for token in markup.tokens() {
                        match token {
                            MarkupToken::License { key, label } => {
                                put("license");
                                put(key);
                                put(label);
                            }
                            MarkupToken::Text { text } => {
                                put("text");
                                put(text);
                            }
                        }
                    }
                    put("end");
                }
                None => put("none"),
            }
        }
        put(&self.notice_text);
        put(if self.is_displayed { "shown" } else { "hidden" });
        for optional in [&self.homepage_url, &self.standard_notice] {
            match optional {
                Some(value) => {
                    put("some");
                    put(value);
                }
                None => put("none"),
            }
        }
        hasher.digest()
    }
}

/// Anchor id of a license appendix entry.
#[must_use]
pub fn license_anchor(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("license_{sanitized}")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn markup(key: &str) -> ExpressionMarkup {
        ExpressionMarkup::new(vec![MarkupToken::License {
            key: key.to_string(),
            label: key.to_uppercase(),
        }])
    }

    pub(crate) fn node(name: &str) -> AttributionNode {
        AttributionNode {
            kind: ItemKind::Component,
            display_name: name.to_string(),
            owner: "Owner".to_string(),
            copyright: String::new(),
            extra_attribution_text: String::new(),
            relationship_expression: Some(markup("mit")),
            item_expression: None,
            notice_text: String::new(),
            is_displayed: true,
            homepage_url: None,
            standard_notice: None,
        }
    }
}
