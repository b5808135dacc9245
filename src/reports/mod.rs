//! Renderers for attribution documents.
//!
//! Each renderer is a thin serialization of an already-assembled
//! [`AttributionDocument`]; none of them makes attribution decisions.
//! - HTML: the human-readable notice
//! - JSON: structured data for programmatic integration
//! - CSV: one row per unique node for spreadsheet review
//!
//! # Security
//!
//! The `escape` module provides utilities for safe output generation.
//! All catalog data (names, owners, notices) is escaped before embedding.

mod csv;
pub mod escape;
mod html;
mod json;
mod types;

pub use csv::CsvReporter;
pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use types::ReportFormat;

use crate::model::AttributionDocument;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render a document
    fn generate(&self, document: &AttributionDocument) -> Result<String, ReportError>;

    /// Write the rendered document to a writer
    fn write_report(
        &self,
        document: &AttributionDocument,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate(document)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Html => Box::new(HtmlReporter::new()),
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Csv => Box::new(CsvReporter::new()),
    }
}
