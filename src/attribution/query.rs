//! Ad-hoc item queries.
//!
//! A query narrows the items of one kind that make it into the document.
//! The assembler only sees the [`ItemQuery`] trait; [`ItemFilter`] is the
//! built-in implementation, configurable from YAML or the command line.

use crate::model::Item;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A filter over catalog items: `filter(items) -> subset`.
pub trait ItemQuery {
    /// Keep the matching items, preserving input order.
    fn filter<'a>(&self, items: &[&'a Item]) -> Vec<&'a Item>;

    /// Whether the query restricts anything at all.
    fn is_active(&self) -> bool {
        true
    }
}

/// Filter criteria for items.
///
/// All set criteria are AND-combined: an item must match every non-`None`
/// field to be kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ItemFilter {
    /// Free-text pattern matched against id, name, version and owner
    pub pattern: Option<String>,
    /// Name substring
    pub name: Option<String>,
    /// Owner substring
    pub owner: Option<String>,
    /// Substring of the declared license expression
    pub license: Option<String>,
    /// Version: exact match or semver range (e.g. ">=2.0, <3")
    pub version: Option<String>,
    /// Only keep active items
    pub active_only: bool,
}

impl ItemFilter {
    /// Check if an item matches all set criteria.
    #[must_use]
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(ref pattern) = self.pattern {
            let pattern = pattern.to_lowercase();
            let haystack = [
                item.id.value(),
                item.name.as_str(),
                item.version.as_str(),
                item.owner.as_str(),
            ];
            if !haystack
                .iter()
                .any(|field| field.to_lowercase().contains(&pattern))
            {
                return false;
            }
        }

        if let Some(ref name) = self.name {
            if !contains_ignore_case(&item.name, name) {
                return false;
            }
        }

        if let Some(ref owner) = self.owner {
            if !contains_ignore_case(&item.owner, owner) {
                return false;
            }
        }

        if let Some(ref license) = self.license {
            if !contains_ignore_case(&item.license_expression, license) {
                return false;
            }
        }

        if let Some(ref version) = self.version {
            if !matches_version(&item.version, version) {
                return false;
            }
        }

        !self.active_only || item.is_active
    }

    /// Returns true if no criteria are set (would match everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.name.is_none()
            && self.owner.is_none()
            && self.license.is_none()
            && self.version.is_none()
            && !self.active_only
    }

    /// Human-readable description of the set criteria.
    #[must_use]
    pub fn description(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref p) = self.pattern {
            parts.push(format!("\"{p}\""));
        }
        if let Some(ref n) = self.name {
            parts.push(format!("name=\"{n}\""));
        }
        if let Some(ref o) = self.owner {
            parts.push(format!("owner=\"{o}\""));
        }
        if let Some(ref l) = self.license {
            parts.push(format!("license=\"{l}\""));
        }
        if let Some(ref v) = self.version {
            parts.push(format!("version={v}"));
        }
        if self.active_only {
            parts.push("active".to_string());
        }
        if parts.is_empty() {
            "*".to_string()
        } else {
            parts.join(" AND ")
        }
    }
}

impl ItemQuery for ItemFilter {
    fn filter<'a>(&self, items: &[&'a Item]) -> Vec<&'a Item> {
        items
            .iter()
            .copied()
            .filter(|item| self.matches(item))
            .collect()
    }

    fn is_active(&self) -> bool {
        !self.is_empty()
    }
}

fn contains_ignore_case(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_version(item_version: &str, filter: &str) -> bool {
    if item_version.is_empty() {
        return false;
    }

    // An operator prefix means a semver range
    let trimmed = filter.trim();
    let has_operator = trimmed.starts_with(['<', '>', '=', '~', '^']) || trimmed.contains(',');

    if has_operator {
        if let (Ok(req), Ok(version)) = (
            semver::VersionReq::parse(trimmed),
            semver::Version::parse(item_version),
        ) {
            return req.matches(&version);
        }
    }

    item_version.eq_ignore_ascii_case(trimmed)
}
