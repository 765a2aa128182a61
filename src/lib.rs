// Declare modules publicly so they are part of the library interface
pub mod evaluator;
pub mod lexer;
pub mod options;
pub mod pretty_print;
pub mod source;
pub mod types;

pub use evaluator::{EvalError, EvalResult, Grouper, Scope, SyntaxErrorKind};
pub use lexer::{Call, LexerError, LexerErrorKind, Token, TokenKind, tokenize, tokenize_with};
pub use options::{CallScan, EvalOptions, Precedence};
pub use source::{Normalized, Span};
pub use types::{BinaryOp, Func};

/// Evaluates `expression` with the default options.
///
/// Bracket and call nesting is limited to [`options::DEFAULT_MAX_DEPTH`]
/// levels; anything deeper fails with [`SyntaxErrorKind::NestingTooDeep`].
/// Use [`evaluate_with`] and [`EvalOptions::with_max_depth`] to change it.
///
/// ```
/// assert_eq!(scopecalc::evaluate("2 + 3 * 4"), Ok(14.0));
/// assert_eq!(scopecalc::evaluate("5 - 2 + 1"), Ok(2.0));
/// assert!(scopecalc::evaluate("(2 + 3").is_err());
/// ```
pub fn evaluate(expression: &str) -> EvalResult<f64> {
    evaluate_with(expression, &EvalOptions::default())
}

/// Strips whitespace, lexes and reduces `expression`. Error spans point into
/// `expression` itself, not into the stripped text.
/// Nesting deeper than `options.max_depth` fails with
/// [`SyntaxErrorKind::NestingTooDeep`].
pub fn evaluate_with(expression: &str, options: &EvalOptions) -> EvalResult<f64> {
    let source = Normalized::new(expression);
    tokenize_with(source.text(), 0, options.call_scan)
        .map_err(EvalError::from)
        .and_then(|tokens| Grouper::new(tokens, options).evaluate())
        .map_err(|err| err.map_span(|span| source.original_span(span)))
}
