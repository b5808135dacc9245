//! Parsed license expressions.
//!
//! License expressions only combine symbols with `AND` and `OR`, so they
//! are monotone boolean formulas. Two of them are equivalent exactly when
//! their absorbed disjunctive normal forms are equal, which is what
//! [`LicenseTree::equivalent`] compares.

use std::collections::BTreeSet;
use std::fmt;

/// A license key, optionally qualified by an exception (`key WITH exception`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LicenseSymbol {
    pub key: String,
    pub exception: Option<String>,
}

impl LicenseSymbol {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            exception: None,
        }
    }

    #[must_use]
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }
}

impl fmt::Display for LicenseSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exception {
            Some(exception) => write!(f, "{} WITH {}", self.key, exception),
            None => write!(f, "{}", self.key),
        }
    }
}

/// Disjunctive normal form: a set of alternative conjunctions.
pub type Dnf = BTreeSet<BTreeSet<LicenseSymbol>>;

/// Largest normal form [`LicenseTree::dnf`] will build.
pub const MAX_DNF_TERMS: usize = 4096;

/// Upper bound on full passes over the license choice table.
pub const MAX_SUBSTITUTION_PASSES: usize = 16;

/// Parsed license expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LicenseTree {
    Symbol(LicenseSymbol),
    /// Every operand applies
    And(Vec<LicenseTree>),
    /// Any one operand may be chosen
    Or(Vec<LicenseTree>),
}

impl LicenseTree {
    pub fn symbol(key: impl Into<String>) -> Self {
        Self::Symbol(LicenseSymbol::new(key))
    }

    /// Conjunction of two trees, flattening nested `AND`s.
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        let mut operands = Vec::new();
        for tree in [left, right] {
            match tree {
                Self::And(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        Self::And(operands)
    }

    /// Disjunction of two trees, flattening nested `OR`s.
    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        let mut operands = Vec::new();
        for tree in [left, right] {
            match tree {
                Self::Or(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        Self::Or(operands)
    }

    /// Symbols in first-appearance order, without duplicates.
    #[must_use]
    pub fn symbols(&self) -> Vec<&LicenseSymbol> {
        let mut symbols = Vec::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a LicenseSymbol>) {
        match self {
            Self::Symbol(symbol) => {
                if !out.contains(&symbol) {
                    out.push(symbol);
                }
            }
            Self::And(operands) | Self::Or(operands) => {
                for operand in operands {
                    operand.collect_symbols(out);
                }
            }
        }
    }

    /// License keys in first-appearance order, ignoring exceptions.
    #[must_use]
    pub fn license_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for symbol in self.symbols() {
            if !keys.contains(&symbol.key.as_str()) {
                keys.push(&symbol.key);
            }
        }
        keys
    }

    /// License and exception keys in first-appearance order.
    #[must_use]
    pub fn all_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for symbol in self.symbols() {
            let candidates = std::iter::once(symbol.key.as_str()).chain(symbol.exception.as_deref());
            for key in candidates {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Absorbed disjunctive normal form, or `None` once it would grow past
    /// [`MAX_DNF_TERMS`] terms.
    #[must_use]
    pub fn dnf(&self) -> Option<Dnf> {
        match self {
            Self::Symbol(symbol) => {
                let mut term = BTreeSet::new();
                term.insert(symbol.clone());
                let mut dnf = Dnf::new();
                dnf.insert(term);
                Some(dnf)
            }
            Self::Or(operands) => {
                let mut dnf = Dnf::new();
                for operand in operands {
                    dnf.extend(operand.dnf()?);
                    if dnf.len() > MAX_DNF_TERMS {
                        return None;
                    }
                }
                Some(absorb(dnf))
            }
            Self::And(operands) => {
                let mut dnf = Dnf::new();
                dnf.insert(BTreeSet::new());
                for operand in operands {
                    let right = operand.dnf()?;
                    if dnf.len().saturating_mul(right.len()) > MAX_DNF_TERMS {
                        return None;
                    }
                    let mut product = Dnf::new();
                    for left_term in &dnf {
                        for right_term in &right {
                            product.insert(left_term.union(right_term).cloned().collect());
                        }
                    }
                    dnf = absorb(product);
                }
                Some(dnf)
            }
        }
    }

    /// Evaluate the formula with `granted` deciding each symbol.
    fn evaluate(&self, granted: &dyn Fn(&LicenseSymbol) -> bool) -> bool {
        match self {
            Self::Symbol(symbol) => granted(symbol),
            Self::And(operands) => operands.iter().all(|t| t.evaluate(granted)),
            Self::Or(operands) => operands.iter().any(|t| t.evaluate(granted)),
        }
    }

    /// Flattened tree with sorted, deduplicated operands.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let rebuild = |operands: &[Self], and: bool| {
            let mut flat = Vec::new();
            for operand in operands.iter().map(Self::canonical) {
                match operand {
                    Self::And(inner) if and => flat.extend(inner),
                    Self::Or(inner) if !and => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            flat.sort();
            flat.dedup();
            match (flat.len(), and) {
                (1, _) => flat.remove(0),
                (_, true) => Self::And(flat),
                (_, false) => Self::Or(flat),
            }
        };
        match self {
            Self::Symbol(_) => self.clone(),
            Self::And(operands) => rebuild(operands.as_slice(), true),
            Self::Or(operands) => rebuild(operands.as_slice(), false),
        }
    }

    /// Whether both trees grant the same license combinations.
    ///
    /// Trees that are equal up to operand order and duplicates match
    /// without expanding anything. Two evaluations per symbol (only that
    /// symbol withheld, only that symbol granted) refute most other pairs
    /// cheaply. The remaining pairs compare normal forms; when either
    /// form exceeds [`MAX_DNF_TERMS`] the trees are reported as different.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        let left = self.canonical();
        let right = other.canonical();
        if left == right {
            return true;
        }

        let mut symbols = left.symbols();
        for symbol in right.symbols() {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        for pivot in &symbols {
            let withheld = |s: &LicenseSymbol| s != *pivot;
            let only = |s: &LicenseSymbol| s == *pivot;
            if left.evaluate(&withheld) != right.evaluate(&withheld)
                || left.evaluate(&only) != right.evaluate(&only)
            {
                return false;
            }
        }

        match (left.dnf(), right.dnf()) {
            (Some(l), Some(r)) => l == r,
            _ => {
                tracing::debug!(
                    left = %self,
                    right = %other,
                    "Normal form too large, treating expressions as different"
                );
                false
            }
        }
    }

    /// Replace every subtree equivalent to a rule's `from` with its `to`.
    ///
    /// Rules run one after another in order, each over the output of the
    /// previous one, so a later rule can match what an earlier rule
    /// produced. Passes repeat until the tree stops changing, at most
    /// [`MAX_SUBSTITUTION_PASSES`] times, which bounds cyclic rule sets.
    #[must_use]
    pub fn substitute(&self, rules: &[(Self, Self)]) -> Self {
        let mut current = self.clone();
        for _ in 0..MAX_SUBSTITUTION_PASSES {
            let next = rules
                .iter()
                .fold(current.clone(), |tree, (from, to)| tree.replace(from, to));
            if next.canonical() == current.canonical() {
                break;
            }
            current = next;
        }
        current
    }

    /// One rule, outermost match first; a replacement is not searched again.
    fn replace(&self, from: &Self, to: &Self) -> Self {
        if self.equivalent(from) {
            return to.clone();
        }
        match self {
            Self::Symbol(_) => self.clone(),
            Self::And(operands) => operands
                .iter()
                .map(|t| t.replace(from, to))
                .reduce(Self::and)
                .unwrap_or_else(|| self.clone()),
            Self::Or(operands) => operands
                .iter()
                .map(|t| t.replace(from, to))
                .reduce(Self::or)
                .unwrap_or_else(|| self.clone()),
        }
    }

    pub(crate) const fn is_compound(&self) -> bool {
        !matches!(self, Self::Symbol(_))
    }
}

/// Drop every term that is a strict superset of another term.
fn absorb(dnf: Dnf) -> Dnf {
    let terms: Vec<&BTreeSet<LicenseSymbol>> = dnf.iter().collect();
    terms
        .iter()
        .filter(|term| {
            !terms
                .iter()
                .any(|other| other.len() < term.len() && other.is_subset(term))
        })
        .map(|term| (*term).clone())
        .collect()
}

impl fmt::Display for LicenseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (operands, operator) = match self {
            Self::Symbol(symbol) => return write!(f, "{symbol}"),
            Self::And(operands) => (operands, " AND "),
            Self::Or(operands) => (operands, " OR "),
        };
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                f.write_str(operator)?;
            }
            if operand.is_compound() {
                write!(f, "({operand})")?;
            } else {
                write!(f, "{operand}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(key: &str) -> LicenseTree {
        LicenseTree::symbol(key)
    }

    #[test]
    fn test_commuted_operands_are_equivalent() {
        let left = LicenseTree::and(sym("mit"), sym("apache-2.0"));
        let right = LicenseTree::and(sym("apache-2.0"), sym("mit"));
        assert!(left.equivalent(&right));
    }

    #[test]
    fn test_distribution_is_equivalent() {
        // a AND (b OR c) == (a AND b) OR (a AND c)
        let left = LicenseTree::and(sym("a"), LicenseTree::or(sym("b"), sym("c")));
        let right = LicenseTree::or(
            LicenseTree::and(sym("a"), sym("b")),
            LicenseTree::and(sym("a"), sym("c")),
        );
        assert!(left.equivalent(&right));
    }

    #[test]
    fn test_absorption() {
        // a OR (a AND b) == a
        let left = LicenseTree::or(sym("a"), LicenseTree::and(sym("a"), sym("b")));
        assert!(left.equivalent(&sym("a")));
    }

    #[test]
    fn test_and_is_not_or() {
        let and = LicenseTree::and(sym("a"), sym("b"));
        let or = LicenseTree::or(sym("a"), sym("b"));
        assert!(!and.equivalent(&or));
        assert!(!and.equivalent(&sym("a")));
    }

    #[test]
    fn test_exception_distinguishes_symbols() {
        let plain = sym("gpl-2.0");
        let with = LicenseTree::Symbol(LicenseSymbol::new("gpl-2.0").with_exception("classpath"));
        assert!(!plain.equivalent(&with));
        assert_eq!(with.license_keys(), vec!["gpl-2.0"]);
        assert_eq!(with.all_keys(), vec!["gpl-2.0", "classpath"]);
    }

    #[test]
    fn test_symbols_first_appearance_order() {
        let tree = LicenseTree::or(
            LicenseTree::and(sym("b"), sym("a")),
            LicenseTree::and(sym("a"), sym("c")),
        );
        assert_eq!(tree.license_keys(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_substitute_replaces_equivalent_subtree() {
        let tree = LicenseTree::and(sym("x"), LicenseTree::or(sym("a"), sym("b")));
        let rules = vec![(LicenseTree::or(sym("b"), sym("a")), sym("a"))];
        let substituted = tree.substitute(&rules);
        assert!(substituted.equivalent(&LicenseTree::and(sym("x"), sym("a"))));
    }

    #[test]
    fn test_later_rule_matches_earlier_replacement() {
        let rules = vec![(sym("x"), sym("y")), (LicenseTree::or(sym("y"), sym("z")), sym("z"))];
        let substituted = LicenseTree::or(sym("x"), sym("z")).substitute(&rules);
        assert_eq!(substituted, sym("z"));
    }

    #[test]
    fn test_cyclic_rules_terminate() {
        let rules = vec![
            (sym("a"), LicenseTree::and(sym("a"), sym("b"))),
            (sym("b"), sym("c")),
            (sym("c"), sym("b")),
        ];
        let substituted = sym("a").substitute(&rules);
        assert!(substituted.license_keys().contains(&"a"));
    }

    fn wide_product(pairs: usize, reversed: bool) -> LicenseTree {
        let mut operands: Vec<LicenseTree> = (0..pairs)
            .map(|i| LicenseTree::or(sym(&format!("a{i}")), sym(&format!("b{i}"))))
            .collect();
        if reversed {
            operands.reverse();
        }
        LicenseTree::And(operands)
    }

    #[test]
    fn test_wide_product_compares_without_expansion() {
        let tree = wide_product(16, false);
        assert!(tree.dnf().is_none());
        assert!(tree.equivalent(&tree.clone()));
        assert!(tree.equivalent(&wide_product(16, true)));
        assert!(!tree.equivalent(&wide_product(15, false)));
    }

    #[test]
    fn test_canonical_flattens_sorts_and_dedupes() {
        let tree = LicenseTree::Or(vec![
            sym("b"),
            LicenseTree::Or(vec![sym("a"), sym("b")]),
        ]);
        assert_eq!(tree.canonical(), LicenseTree::Or(vec![sym("a"), sym("b")]));
        assert_eq!(LicenseTree::And(vec![sym("a"), sym("a")]).canonical(), sym("a"));
    }

    #[test]
    fn test_display_parenthesizes_compound_operands() {
        let tree = LicenseTree::and(sym("x"), LicenseTree::or(sym("a"), sym("b")));
        assert_eq!(tree.to_string(), "x AND (a OR b)");
        let flat = LicenseTree::and(LicenseTree::and(sym("a"), sym("b")), sym("c"));
        assert_eq!(flat.to_string(), "a AND b AND c");
    }
}
