//! CSV report generator.
//!
//! One row per unique node, in document order, for spreadsheet review of
//! what the notice credits.

use super::escape::escape_csv;
use super::{ReportError, ReportFormat, ReportGenerator};
use crate::model::AttributionDocument;
use std::fmt::Write;

/// CSV report generator.
pub struct CsvReporter;

impl CsvReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReporter {
    fn generate(&self, document: &AttributionDocument) -> Result<String, ReportError> {
        let mut content = String::new();
        content.push_str("Kind,Name,Resolved Expression,Included\n");

        for indexed in document.index.iter() {
            let node = &indexed.node;
            let expression = node
                .relationship_expression
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            writeln!(
                content,
                "{},\"{}\",\"{}\",{}",
                node.kind,
                escape_csv(&node.display_name),
                escape_csv(&expression),
                node.is_displayed
            )?;
        }

        Ok(content)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}
