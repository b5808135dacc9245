//! HTML report generator.

use super::escape::{escape_html, escape_html_attr};
use super::{ReportError, ReportFormat, ReportGenerator};
use crate::config::TocMode;
use crate::model::{
    license_anchor, AttributionDocument, AttributionNode, ExpressionMarkup, HierarchyEntry,
    MarkupToken, ORIGINAL_LICENSE_PHRASE,
};
use std::fmt::Write;

/// HTML report generator
pub struct HtmlReporter {
    /// Include inline CSS
    include_styles: bool,
}

impl HtmlReporter {
    /// Create a new HTML reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_styles: true,
        }
    }

    /// Leave styling to the embedding page
    #[must_use]
    pub const fn without_styles(mut self) -> Self {
        self.include_styles = false;
        self
    }

    const fn styles() -> &'static str {
        r"
        <style>
            body {
                font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
                margin: 0;
                padding: 20px;
                line-height: 1.5;
            }

            .container { max-width: 1000px; margin: 0 auto; }
            .header { border-bottom: 2px solid #ccc; margin-bottom: 30px; }
            .toc ul { list-style: none; padding-left: 1.2em; }
            .feature { font-weight: 600; margin-top: 1em; }
            .component { border-bottom: 1px solid #eee; padding: 10px 0; }
            .credit { margin: 4px 0; }
            pre { white-space: pre-wrap; background: #f6f6f6; padding: 8px; }
            .truncated { color: #a15c00; font-style: italic; }
        </style>
        "
    }

    fn write_markup(html: &mut String, markup: &ExpressionMarkup) -> std::fmt::Result {
        for token in markup.tokens() {
            match token {
                MarkupToken::License { key, label } => write!(
                    html,
                    "<a href=\"#{}\">{}</a>",
                    escape_html_attr(&license_anchor(key)),
                    escape_html(label)
                )?,
                MarkupToken::Text { text } => html.push_str(&escape_html(text)),
            }
        }
        Ok(())
    }

    fn write_toc_link(
        html: &mut String,
        document: &AttributionDocument,
        node: &AttributionNode,
    ) -> std::fmt::Result {
        match document.anchor_for(node) {
            Some(anchor) => write!(
                html,
                "<a href=\"#{}\">{}</a>",
                escape_html_attr(anchor),
                escape_html(&node.display_name)
            ),
            None => html.write_str(&escape_html(&node.display_name)),
        }
    }

    fn write_flat_toc(html: &mut String, document: &AttributionDocument) -> std::fmt::Result {
        writeln!(html, "<ul>")?;
        for indexed in document.index.iter().filter(|n| n.node.is_displayed) {
            write!(html, "    <li>")?;
            Self::write_toc_link(html, document, &indexed.node)?;
            writeln!(html, "</li>")?;
        }
        writeln!(html, "</ul>")
    }

    /// Hidden entries get no line; their children stay reachable.
    fn write_nested_entries(
        html: &mut String,
        document: &AttributionDocument,
        entries: &[&HierarchyEntry],
    ) -> std::fmt::Result {
        if entries.is_empty() {
            return Ok(());
        }
        writeln!(html, "<ul>")?;
        for entry in entries {
            let children: Vec<&HierarchyEntry> = entry.child_entries().collect();
            if entry.node.is_displayed {
                write!(html, "<li>")?;
                Self::write_toc_link(html, document, &entry.node)?;
                if entry.truncated {
                    write!(html, " <span class=\"truncated\">(truncated)</span>")?;
                }
                Self::write_nested_entries(html, document, &children)?;
                writeln!(html, "</li>")?;
            } else {
                Self::write_nested_entries(html, document, &children)?;
            }
        }
        writeln!(html, "</ul>")
    }

    fn write_nested_toc(html: &mut String, document: &AttributionDocument) -> std::fmt::Result {
        for group in &document.groups {
            if document.display.group_by_feature && !group.label.is_empty() {
                writeln!(
                    html,
                    "<div class=\"feature\">{}</div>",
                    escape_html(&group.label)
                )?;
            }
            let entries: Vec<&HierarchyEntry> = group.entries.iter().collect();
            Self::write_nested_entries(html, document, &entries)?;
        }
        Ok(())
    }

    fn write_node(html: &mut String, anchor: &str, node: &AttributionNode) -> std::fmt::Result {
        writeln!(
            html,
            "<div class=\"component\" id=\"{}\">",
            escape_html_attr(anchor)
        )?;
        writeln!(html, "    <h3>{}</h3>", escape_html(&node.display_name))?;
        if !node.owner.is_empty() {
            writeln!(html, "    <p>Owner: {}</p>", escape_html(&node.owner))?;
        }
        if let Some(url) = &node.homepage_url {
            writeln!(
                html,
                "    <p>Homepage: <a href=\"{}\">{}</a></p>",
                escape_html_attr(url),
                escape_html(url)
            )?;
        }
        if !node.copyright.is_empty() {
            writeln!(html, "    <pre>{}</pre>", escape_html(&node.copyright))?;
        }
        if let Some(markup) = &node.relationship_expression {
            write!(html, "    <p class=\"credit\">Licensed under ")?;
            Self::write_markup(html, markup)?;
            writeln!(html, "</p>")?;
        }
        if let Some(markup) = &node.item_expression {
            write!(html, "    <p class=\"credit\">{ORIGINAL_LICENSE_PHRASE} ")?;
            Self::write_markup(html, markup)?;
            writeln!(html, "</p>")?;
        }
        if !node.extra_attribution_text.is_empty() {
            writeln!(
                html,
                "    <p>{}</p>",
                escape_html(&node.extra_attribution_text)
            )?;
        }
        if !node.notice_text.is_empty() {
            writeln!(html, "    <pre>{}</pre>", escape_html(&node.notice_text))?;
        }
        if let Some(notice) = &node.standard_notice {
            writeln!(html, "    <pre>{}</pre>", escape_html(notice))?;
        }
        writeln!(html, "</div>")
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for HtmlReporter {
    fn generate(&self, document: &AttributionDocument) -> Result<String, ReportError> {
        let mut html = String::new();
        let header = &document.header;
        let title = if header.product_version.is_empty() {
            header.product_name.clone()
        } else {
            format!("{} {}", header.product_name, header.product_version)
        };

        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"en\">")?;
        writeln!(html, "<head>")?;
        writeln!(html, "    <meta charset=\"UTF-8\">")?;
        writeln!(html, "    <title>Open source attribution: {}</title>", escape_html(&title))?;
        if self.include_styles {
            writeln!(html, "{}", Self::styles())?;
        }
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<div class=\"container\">")?;

        // Header
        writeln!(html, "<div class=\"header\">")?;
        writeln!(html, "    <h1>{}</h1>", escape_html(&title))?;
        if let Some(sentence) = &header.credit_sentence {
            writeln!(html, "    <p>{}</p>", escape_html(sentence))?;
        }
        if let Some(owner) = &header.owner {
            writeln!(html, "    <p>Owner: {}</p>", escape_html(owner))?;
        }
        writeln!(html, "</div>")?;

        // Table of contents
        writeln!(html, "<div class=\"toc\">")?;
        writeln!(html, "<h2>Contents</h2>")?;
        match document.display.toc {
            TocMode::Flat => Self::write_flat_toc(&mut html, document)?,
            TocMode::Nested => Self::write_nested_toc(&mut html, document)?,
        }
        writeln!(html, "</div>")?;

        // Components and packages used
        writeln!(html, "<div class=\"section\">")?;
        for indexed in document.index.iter().filter(|n| n.node.is_displayed) {
            Self::write_node(&mut html, &indexed.anchor, &indexed.node)?;
        }
        writeln!(html, "</div>")?;

        // License appendix
        if !document.licenses.is_empty() {
            writeln!(html, "<div class=\"section\">")?;
            writeln!(html, "<h2>Licenses</h2>")?;
            for license in &document.licenses {
                writeln!(
                    html,
                    "<div class=\"license\" id=\"{}\">",
                    escape_html_attr(&license.anchor)
                )?;
                writeln!(html, "    <h3>{}</h3>", escape_html(&license.short_name))?;
                if !license.name.is_empty() && license.name != license.short_name {
                    writeln!(html, "    <p>{}</p>", escape_html(&license.name))?;
                }
                writeln!(html, "    <pre>{}</pre>", escape_html(&license.full_text))?;
                writeln!(html, "</div>")?;
            }
            writeln!(html, "</div>")?;
        }

        if !document.warnings.is_empty() {
            writeln!(html, "<!--")?;
            for warning in &document.warnings {
                // "--" would close the comment early
                writeln!(html, "    {}", escape_html(&warning.to_string()).replace("--", "- -"))?;
            }
            writeln!(html, "-->")?;
        }

        writeln!(html, "</div>")?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;

        Ok(html)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }
}
