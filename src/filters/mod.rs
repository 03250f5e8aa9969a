//! Filter expressions for selecting records.
//!
//! A filter is a comma separated list of selectors that must all match:
//!
//! ```text
//! labels.env==prod,runtime.name~=^io\.containerd\.
//! ```
//!
//! A selector is a dotted field path, optionally followed by an operator and
//! a value. Without an operator the selector tests that the field is
//! present. `==` and `!=` compare strings, `~=` matches a regular
//! expression. Path segments and values may be double quoted, which lets a
//! label key contain dots: `labels."io.example/owner"==team-a`.
//!
//! Several filters combine with OR through [`FilterSet`].

mod adaptor;
mod parser;


pub use adaptor::Adaptor;
pub use parser::{ParseError, parse};

use regex::Regex;

#[derive(Debug, Clone)]
pub enum Operator {
    Present,
    Equal(String),
    NotEqual(String),
    Matches(Regex),
}

#[derive(Debug, Clone)]
pub struct Selector {
    pub fieldpath: Vec<String>,
    pub operator: Operator,
}

impl Selector {
    pub fn matches(&self, adaptor: &dyn Adaptor) -> bool {
        let value = adaptor.field(&self.fieldpath);
        match &self.operator {
            Operator::Present => value.is_some(),
            Operator::Equal(expected) => value.as_deref() == Some(expected.as_str()),
            Operator::NotEqual(expected) => value.as_deref().unwrap_or_default() != expected.as_str(),
            Operator::Matches(re) => value.is_some_and(|v| re.is_match(&v)),
        }
    }
}

/// Selectors joined by AND.
#[derive(Debug, Clone)]
pub struct Filter {
    selectors: Vec<Selector>,
}

impl Filter {
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn matches(&self, adaptor: &dyn Adaptor) -> bool {
        self.selectors.iter().all(|s| s.matches(adaptor))
    }
}

/// Filters joined by OR. An empty set matches everything.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn parse<S: AsRef<str>>(exprs: &[S]) -> Result<Self, ParseError> {
        let filters = exprs
            .iter()
            .map(|expr| parse(expr.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { filters })
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn matches(&self, adaptor: &dyn Adaptor) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f.matches(adaptor))
    }
}
