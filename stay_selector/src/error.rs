// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised for malformed selector expressions.

use alloc::string::{String, ToString};
use core::fmt;

/// Human-readable list of the operators the selector syntax understands.
pub const SUPPORTED_OPERATORS: &str = "`&` (and), `|` (or), `!` (not), `(` `)` (grouping)";

/// What went wrong while parsing a selector.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectorErrorKind {
    /// The expression has no operands at all.
    Empty,
    /// A `(` was never closed.
    UnbalancedOpen,
    /// A `)` has no matching `(`.
    UnbalancedClose,
    /// The given operator (or `)`) appeared where an operand was expected.
    MissingOperand(char),
    /// Two operands (or an operand and a group) are adjacent with no operator between them.
    MissingOperator,
    /// The expression ends with an operator.
    TrailingOperator,
}

impl fmt::Display for SelectorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("expression is empty"),
            Self::UnbalancedOpen => f.write_str("unclosed `(`"),
            Self::UnbalancedClose => f.write_str("`)` without matching `(`"),
            Self::MissingOperand(c) => write!(f, "expected an operand before `{c}`"),
            Self::MissingOperator => f.write_str("expected an operator between operands"),
            Self::TrailingOperator => f.write_str("expression ends with an operator"),
        }
    }
}

/// A malformed selector expression.
///
/// The message names the offending selector text and the supported operators.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectorError {
    selector: String,
    kind: SelectorErrorKind,
}

impl SelectorError {
    pub(crate) fn new(selector: &str, kind: SelectorErrorKind) -> Self {
        Self {
            selector: selector.to_string(),
            kind,
        }
    }

    /// The selector text that failed to parse.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The reason parsing failed.
    pub fn kind(&self) -> &SelectorErrorKind {
        &self.kind
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid selector `{}`: {}; supported operators are {}",
            self.selector, self.kind, SUPPORTED_OPERATORS
        )
    }
}

impl core::error::Error for SelectorError {}
