//! Escaping utilities for safe report generation.
//!
//! Catalog data (item names, owners, copyright statements, notice texts)
//! is entered by people and imported from third-party metadata, so it may
//! contain markup or delimiters. Everything user-controllable is escaped
//! before it is embedded in HTML or CSV output.

/// Escape a string for safe inclusion in HTML content.
///
/// # Examples
///
/// ```
/// use attribution_tools::reports::escape::escape_html;
///
/// assert_eq!(escape_html("Copyright (c) <ACME> & \"friends\""),
///     "Copyright (c) &lt;ACME&gt; &amp; &quot;friends&quot;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for safe inclusion in HTML attributes.
///
/// Stricter than content escaping: whitespace that could break attribute
/// parsing is encoded too.
#[must_use]
pub fn escape_html_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            '\t' => result.push_str("&#9;"),
            _ => result.push_str(&escape_html(c.encode_utf8(&mut [0; 4]))),
        }
    }
    result
}

/// Escape a string for a double-quoted CSV field: quotes are doubled per
/// RFC 4180 and newlines flattened.
#[must_use]
pub fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"").replace(['\r', '\n'], " ")
}
