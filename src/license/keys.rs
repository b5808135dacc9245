//! Expression algebra over catalog license keys.
//!
//! Catalog keys are free-form tokens (`mit`, `apache-2.0`,
//! `LicenseRef-acme`), so they cannot go through the SPDX parser. The
//! grammar is the usual one, with `WITH` binding tightest and `AND` binding
//! tighter than `OR`:
//!
//! ```text
//! expr    := and ("OR" and)*
//! and     := with ("AND" with)*
//! with    := primary ("WITH" key)?
//! primary := key | "(" expr ")"
//! ```
//!
//! Operators are matched case-insensitively; keys are kept verbatim.

use super::{LicenseAlgebra, LicenseSymbol, LicenseTree};
use crate::error::{AttributionError, LicenseErrorKind, Result};

/// Algebra for expressions written with catalog license keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyAlgebra;

impl KeyAlgebra {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LicenseAlgebra for KeyAlgebra {
    fn name(&self) -> &'static str {
        "catalog-keys"
    }

    fn parse(&self, expression: &str) -> Result<LicenseTree> {
        let tokens = tokenize(expression);
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            expression,
        };
        let tree = parser.expr()?;
        if parser.pos < tokens.len() {
            return Err(parser.error(format!("unexpected '{}'", tokens[parser.pos].text())));
        }
        Ok(tree)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    And,
    Or,
    With,
    Key(&'a str),
}

impl Token<'_> {
    fn text(&self) -> &str {
        match self {
            Self::Open => "(",
            Self::Close => ")",
            Self::And => "AND",
            Self::Or => "OR",
            Self::With => "WITH",
            Self::Key(key) => key,
        }
    }
}

fn tokenize(expression: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in expression.char_indices() {
        if !(c == '(' || c == ')' || c.is_whitespace()) {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(word_token(&expression[s..i]));
        }
        match c {
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(word_token(&expression[s..]));
    }
    tokens
}

fn word_token(word: &str) -> Token<'_> {
    if word.eq_ignore_ascii_case("and") {
        Token::And
    } else if word.eq_ignore_ascii_case("or") {
        Token::Or
    } else if word.eq_ignore_ascii_case("with") {
        Token::With
    } else {
        Token::Key(word)
    }
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    expression: &'t str,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<&Token<'_>> {
        self.tokens.get(self.pos)
    }

    fn error(&self, reason: impl Into<String>) -> AttributionError {
        AttributionError::license(
            "parsing license expression",
            LicenseErrorKind::InvalidExpression {
                expression: self.expression.to_string(),
                reason: reason.into(),
            },
        )
    }

    fn expr(&mut self) -> Result<LicenseTree> {
        let mut tree = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and()?;
            tree = LicenseTree::or(tree, right);
        }
        Ok(tree)
    }

    fn and(&mut self) -> Result<LicenseTree> {
        let mut tree = self.with()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.with()?;
            tree = LicenseTree::and(tree, right);
        }
        Ok(tree)
    }

    fn with(&mut self) -> Result<LicenseTree> {
        let tree = self.primary()?;
        if self.peek() != Some(&Token::With) {
            return Ok(tree);
        }
        self.pos += 1;
        let LicenseTree::Symbol(symbol) = tree else {
            return Err(self.error("WITH must follow a single license key"));
        };
        match self.tokens.get(self.pos) {
            Some(Token::Key(exception)) => {
                self.pos += 1;
                Ok(LicenseTree::Symbol(LicenseSymbol {
                    exception: Some((*exception).to_string()),
                    ..symbol
                }))
            }
            _ => Err(self.error("expected an exception key after WITH")),
        }
    }

    fn primary(&mut self) -> Result<LicenseTree> {
        match self.tokens.get(self.pos) {
            Some(Token::Key(key)) => {
                self.pos += 1;
                Ok(LicenseTree::symbol(*key))
            }
            Some(Token::Open) => {
                self.pos += 1;
                let tree = self.expr()?;
                if self.tokens.get(self.pos) != Some(&Token::Close) {
                    return Err(self.error("unbalanced parenthesis"));
                }
                self.pos += 1;
                Ok(tree)
            }
            Some(token) => Err(self.error(format!("unexpected '{}'", token.text()))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}
