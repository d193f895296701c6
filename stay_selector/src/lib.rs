// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stay Selector: a small infix boolean algebra over dynamic sets.
//!
//! A selector is an expression such as `a | (b & !c)` whose operands are bare tokens.
//! Each token is converted to a subset of a caller-supplied universe, and the operators
//! combine those subsets:
//!
//! - `&` (AND): intersection.
//! - `|` (OR): union.
//! - `!` (NOT): complement against the full universe.
//! - `(` and `)`: grouping.
//!
//! Any run of non-operator characters is one operand; surrounding whitespace is trimmed.
//! The evaluator does not know what operands mean, so the same machinery resolves class
//! selectors over scene nodes and state expressions over interaction-state names.
//!
//! ## Precedence
//!
//! Operators carry a priority: `&` is 1, `|` is 2 and `!` is 3. A higher priority binds
//! tighter, so `a & b | c` reads as `a & (b | c)` and `!a | b` reads as `(!a) | b`.
//! Use parentheses when in doubt.
//!
//! ## Results
//!
//! The result is always a subset of the universe and is returned in universe order,
//! whatever order the operand subsets arrive in.
//!
//! ```
//! use stay_selector::evaluate;
//!
//! let states = ["default-state", "drawing", "selected"];
//! let subset = |token: &str| -> Vec<&str> {
//!     states.iter().copied().filter(|s| *s == token).collect()
//! };
//!
//! let resolved = evaluate("default-state | selected", &states, subset).unwrap();
//! assert_eq!(resolved, ["default-state", "selected"]);
//!
//! let resolved = evaluate("!drawing", &states, subset).unwrap();
//! assert_eq!(resolved, ["default-state", "selected"]);
//!
//! // Unknown tokens resolve to the empty set; malformed syntax is an error.
//! assert!(evaluate("drawing & unknown", &states, subset).unwrap().is_empty());
//! assert!(evaluate("(drawing", &states, subset).is_err());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;

use alloc::vec::Vec;

pub use error::{SUPPORTED_OPERATORS, SelectorError, SelectorErrorKind};

/// Binary and unary operators of the selector algebra.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operator {
    /// `&`: set intersection.
    And,
    /// `|`: set union.
    Or,
    /// `!`: complement against the universe.
    Not,
}

impl Operator {
    /// Binding priority; a higher value binds tighter.
    pub const fn priority(self) -> u8 {
        match self {
            Self::And => 1,
            Self::Or => 2,
            Self::Not => 3,
        }
    }

    /// The character spelling this operator.
    pub const fn symbol(self) -> char {
        match self {
            Self::And => '&',
            Self::Or => '|',
            Self::Not => '!',
        }
    }
}

/// A lexical token of a selector expression.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Token<'a> {
    /// A trimmed run of non-operator characters.
    Operand(&'a str),
    /// One of `&`, `|`, `!`.
    Operator(Operator),
    /// `(`.
    Open,
    /// `)`.
    Close,
}

/// Returns `true` if `c` is reserved by the selector syntax.
pub const fn is_operator_char(c: char) -> bool {
    matches!(c, '&' | '|' | '!' | '(' | ')')
}

/// Returns `true` if `text` contains any character reserved by the selector syntax.
pub fn contains_operator(text: &str) -> bool {
    text.chars().any(is_operator_char)
}

/// Split `expr` into tokens.
///
/// Operands are trimmed and whitespace-only runs are dropped, so `a | b` and `a|b`
/// tokenize identically.
pub fn tokenize(expr: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        if !is_operator_char(c) {
            continue;
        }
        push_operand(&mut out, &expr[start..i]);
        out.push(match c {
            '&' => Token::Operator(Operator::And),
            '|' => Token::Operator(Operator::Or),
            '!' => Token::Operator(Operator::Not),
            '(' => Token::Open,
            _ => Token::Close,
        });
        start = i + c.len_utf8();
    }
    push_operand(&mut out, &expr[start..]);
    out
}

fn push_operand<'a>(out: &mut Vec<Token<'a>>, run: &'a str) {
    let run = run.trim();
    if !run.is_empty() {
        out.push(Token::Operand(run));
    }
}

/// Check the syntax of `expr` without resolving any operand.
pub fn validate(expr: &str) -> Result<(), SelectorError> {
    evaluate_by(expr, &[()], |_, _| true, |_| Vec::new()).map(|_| ())
}

/// Evaluate `expr` over `universe`, comparing elements with [`PartialEq`].
///
/// `subset` converts a bare operand token into the matching elements.
/// See [`evaluate_by`] for a variant with an explicit equality predicate.
pub fn evaluate<T, F>(expr: &str, universe: &[T], subset: F) -> Result<Vec<T>, SelectorError>
where
    T: Clone + PartialEq,
    F: FnMut(&str) -> Vec<T>,
{
    evaluate_by(expr, universe, |a, b| a == b, subset)
}

/// Evaluate `expr` over `universe` using `eq` to compare elements.
///
/// This is a two-stack shunting-yard evaluation: operand subsets go on one stack and
/// pending operators on the other. An operator is applied as soon as a following
/// operator of lower or equal priority (or a closing parenthesis, or the end of input)
/// makes its operands final.
pub fn evaluate_by<T, E, F>(
    expr: &str,
    universe: &[T],
    eq: E,
    mut subset: F,
) -> Result<Vec<T>, SelectorError>
where
    T: Clone,
    E: Fn(&T, &T) -> bool,
    F: FnMut(&str) -> Vec<T>,
{
    enum Pending {
        Op(Operator),
        Open,
    }

    let fail = |kind| SelectorError::new(expr, kind);
    let tokens = tokenize(expr);
    if tokens.is_empty() {
        return Err(fail(SelectorErrorKind::Empty));
    }

    let mut sets = SetStack {
        universe,
        eq: &eq,
        stack: Vec::new(),
    };
    let mut pending: Vec<Pending> = Vec::new();
    // True when the next token must start an operand (a token, `!` or `(`).
    let mut expect_operand = true;

    for token in tokens {
        match token {
            Token::Operand(text) => {
                if !expect_operand {
                    return Err(fail(SelectorErrorKind::MissingOperator));
                }
                sets.stack.push(subset(text));
                expect_operand = false;
            }
            Token::Open => {
                if !expect_operand {
                    return Err(fail(SelectorErrorKind::MissingOperator));
                }
                pending.push(Pending::Open);
            }
            Token::Close => {
                if expect_operand {
                    return Err(fail(SelectorErrorKind::MissingOperand(')')));
                }
                loop {
                    match pending.pop() {
                        Some(Pending::Op(op)) => sets.apply(op),
                        Some(Pending::Open) => break,
                        None => return Err(fail(SelectorErrorKind::UnbalancedClose)),
                    }
                }
            }
            Token::Operator(Operator::Not) => {
                if !expect_operand {
                    return Err(fail(SelectorErrorKind::MissingOperator));
                }
                pending.push(Pending::Op(Operator::Not));
            }
            Token::Operator(op) => {
                if expect_operand {
                    return Err(fail(SelectorErrorKind::MissingOperand(op.symbol())));
                }
                while let Some(Pending::Op(top)) = pending.last() {
                    if top.priority() < op.priority() {
                        break;
                    }
                    let top = *top;
                    pending.pop();
                    sets.apply(top);
                }
                pending.push(Pending::Op(op));
                expect_operand = true;
            }
        }
    }

    if expect_operand {
        return Err(fail(SelectorErrorKind::TrailingOperator));
    }
    while let Some(p) = pending.pop() {
        match p {
            Pending::Op(op) => sets.apply(op),
            Pending::Open => return Err(fail(SelectorErrorKind::UnbalancedOpen)),
        }
    }

    let result = sets.stack.pop().unwrap_or_default();
    debug_assert!(sets.stack.is_empty(), "operand stack must reduce to one set");
    Ok(universe
        .iter()
        .filter(|u| result.iter().any(|r| eq(u, r)))
        .cloned()
        .collect())
}

/// Operand stack plus the context needed to apply operators to it.
struct SetStack<'a, T, E> {
    universe: &'a [T],
    eq: &'a E,
    stack: Vec<Vec<T>>,
}

impl<T, E> SetStack<'_, T, E>
where
    T: Clone,
    E: Fn(&T, &T) -> bool,
{
    // Operand counts are guaranteed by the `expect_operand` bookkeeping in the caller.
    fn apply(&mut self, op: Operator) {
        let eq = self.eq;
        let contains = |set: &[T], item: &T| set.iter().any(|s| eq(s, item));
        let rhs = self.stack.pop().unwrap_or_default();
        let result = match op {
            Operator::Not => self
                .universe
                .iter()
                .filter(|u| !contains(&rhs, u))
                .cloned()
                .collect(),
            Operator::And => {
                let lhs = self.stack.pop().unwrap_or_default();
                lhs.into_iter().filter(|l| contains(&rhs, l)).collect()
            }
            Operator::Or => {
                let mut lhs = self.stack.pop().unwrap_or_default();
                for r in rhs {
                    if !contains(&lhs, &r) {
                        lhs.push(r);
                    }
                }
                lhs
            }
        };
        self.stack.push(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec;

    const U: [u32; 6] = [1, 2, 3, 4, 5, 6];

    fn digits(token: &str) -> Vec<u32> {
        match token {
            "odd" => vec![1, 3, 5],
            "even" => vec![2, 4, 6],
            "low" => vec![1, 2, 3],
            "six" => vec![6],
            _ => Vec::new(),
        }
    }

    #[test]
    fn tokenizer_splits_on_operators_and_trims() {
        assert_eq!(
            tokenize(" a |(b& !c ) "),
            vec![
                Token::Operand("a"),
                Token::Operator(Operator::Or),
                Token::Open,
                Token::Operand("b"),
                Token::Operator(Operator::And),
                Token::Operator(Operator::Not),
                Token::Operand("c"),
                Token::Close,
            ]
        );
        assert_eq!(tokenize("a b"), vec![Token::Operand("a b")]);
    }

    #[test]
    fn single_operand_resolves_in_universe_order() {
        assert_eq!(evaluate("odd", &U, digits).unwrap(), vec![1, 3, 5]);
        assert!(evaluate("nothing", &U, digits).unwrap().is_empty());
    }

    #[test]
    fn and_or_not() {
        assert_eq!(evaluate("odd & low", &U, digits).unwrap(), vec![1, 3]);
        assert_eq!(evaluate("even | low", &U, digits).unwrap(), vec![1, 2, 3, 4, 6]);
        assert_eq!(evaluate("!odd", &U, digits).unwrap(), vec![2, 4, 6]);
        assert_eq!(evaluate("!!odd", &U, digits).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn or_binds_tighter_than_and() {
        // odd & (low | six) = {1, 3}; (odd & low) | six would add 6.
        assert_eq!(evaluate("odd & low | six", &U, digits).unwrap(), vec![1, 3]);
        assert_eq!(
            evaluate("(odd & low) | six", &U, digits).unwrap(),
            vec![1, 3, 6]
        );
    }

    #[test]
    fn not_binds_tightest() {
        assert_eq!(evaluate("!odd | six", &U, digits).unwrap(), vec![2, 4, 6]);
        assert_eq!(evaluate("!(odd | six)", &U, digits).unwrap(), vec![2, 4]);
    }

    #[test]
    fn subsets_outside_the_universe_are_dropped() {
        let result = evaluate("x", &U, |_| vec![42, 2]).unwrap();
        assert_eq!(result, vec![2]);
    }

    #[test]
    fn custom_equality_predicate() {
        let universe: Vec<String> = ["Alpha", "beta", "GAMMA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = evaluate_by(
            "ALPHA | gamma",
            &universe,
            |a: &String, b: &String| a.eq_ignore_ascii_case(b),
            |t| vec![t.to_string()],
        )
        .unwrap();
        assert_eq!(result, vec!["Alpha", "GAMMA"]);
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        let cases = [
            ("", SelectorErrorKind::Empty),
            ("   ", SelectorErrorKind::Empty),
            ("(odd", SelectorErrorKind::UnbalancedOpen),
            ("odd)", SelectorErrorKind::UnbalancedClose),
            ("odd &", SelectorErrorKind::TrailingOperator),
            ("odd !", SelectorErrorKind::MissingOperator),
            ("& odd", SelectorErrorKind::MissingOperand('&')),
            ("odd || even", SelectorErrorKind::MissingOperand('|')),
            ("()", SelectorErrorKind::MissingOperand(')')),
            ("odd (even)", SelectorErrorKind::MissingOperator),
        ];
        for (expr, kind) in cases {
            let err = evaluate(expr, &U, digits).unwrap_err();
            assert_eq!(err.kind(), &kind, "expression {expr:?}");
            assert_eq!(err.selector(), expr);
        }
    }

    #[test]
    fn validate_checks_syntax_only() {
        assert!(validate("anything & (at | all)").is_ok());
        assert!(validate("a & (b").is_err());
    }

    #[test]
    fn operator_detection() {
        assert!(contains_operator("a|b"));
        assert!(!contains_operator("annotation:selected"));
    }
}
