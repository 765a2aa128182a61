use logos::{Lexer, Logos};
use std::fmt;
use thiserror::Error;

use crate::Span;
use crate::options::CallScan;
use crate::source::Normalized;
use crate::types::{BinaryOp, Func};

// Whitespace is removed by `Normalized` before the lexer ever sees the text,
// so there is no skip rule here.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = CallScan)]
#[logos(error = LexerErrorKind)]
pub enum TokenKind {
    #[regex(r"([0-9]*\.)?[0-9]+", |lex| {
        let slice = lex.slice();
        slice
            .parse::<f64>()
            .map_err(|_| LexerErrorKind::InvalidNumberFormat(slice.to_string()))
    })]
    Number(f64),
    #[token("+")]
    Add,
    #[token("-")]
    Sub,
    #[token("*")]
    Mul,
    #[token("/")]
    Div,
    #[token("^")]
    Pow,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("sin(", |lex| lex_call(lex, Func::Sin))]
    #[token("cos(", |lex| lex_call(lex, Func::Cos))]
    Call(Call),
}

/// A function call whose argument has been captured but not tokenized yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub func: Func,
    pub argument: String,
    /// Offset of the argument's first byte in the stripped input.
    pub offset: usize,
}

impl Call {
    /// Tokenizes the argument. Spans of the returned tokens are relative to
    /// the same stripped input as the call itself.
    pub fn tokenize(&self, scan: CallScan) -> LexerRangedResult<Vec<Token>> {
        tokenize_with(&self.argument, self.offset, scan)
    }
}

// The head `sin(` has already matched; extend the token over the argument and
// its closing paren.
fn lex_call(lex: &mut Lexer<TokenKind>, func: Func) -> LexerResult<Call> {
    let rest = lex.remainder();
    let close = match lex.extras {
        CallScan::Greedy => rest.rfind(')'),
        CallScan::Balanced => matching_close(rest),
    }
    .ok_or(LexerErrorKind::UnclosedCall(func))?;
    if close == 0 {
        return Err(LexerErrorKind::EmptyCall(func));
    }
    let call = Call {
        func,
        argument: rest[..close].to_string(),
        offset: lex.span().end,
    };
    lex.bump(close + 1);
    Ok(call)
}

// Byte index of the `)` closing an already opened paren
fn matching_close(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (at, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(at);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn number(value: f64, span: Span) -> Self {
        Token {
            kind: TokenKind::Number(value),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplyError {
    #[error("'{0}' is not a binary operator")]
    NotAnOperator(TokenKind),
    #[error("'{0}' is not a number")]
    NotANumber(TokenKind),
}

impl TokenKind {
    pub fn is_number(&self) -> bool {
        matches!(self, TokenKind::Number(_))
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            TokenKind::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            TokenKind::Add => Some(BinaryOp::Add),
            TokenKind::Sub => Some(BinaryOp::Sub),
            TokenKind::Mul => Some(BinaryOp::Mul),
            TokenKind::Div => Some(BinaryOp::Div),
            TokenKind::Pow => Some(BinaryOp::Pow),
            _ => None,
        }
    }

    pub fn is_binary_op(&self) -> bool {
        self.binary_op().is_some()
    }

    /// Applies this operator token to two number tokens.
    ///
    /// Brackets, calls and numbers cannot be applied; the evaluator never
    /// asks them to, so `NotAnOperator` indicates a bug rather than bad input.
    pub fn apply(&self, left: &TokenKind, right: &TokenKind) -> Result<f64, ApplyError> {
        let op = self
            .binary_op()
            .ok_or_else(|| ApplyError::NotAnOperator(self.clone()))?;
        let operand = |kind: &TokenKind| {
            kind.number()
                .ok_or_else(|| ApplyError::NotANumber(kind.clone()))
        };
        Ok(op.apply(operand(left)?, operand(right)?))
    }
}

// Implement Display for easy printing
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Add => write!(f, "+"),
            TokenKind::Sub => write!(f, "-"),
            TokenKind::Mul => write!(f, "*"),
            TokenKind::Div => write!(f, "/"),
            TokenKind::Pow => write!(f, "^"),
            TokenKind::OpenParen => write!(f, "("),
            TokenKind::CloseParen => write!(f, ")"),
            TokenKind::Call(call) => write!(f, "{}({})", call.func, call.argument),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Error)]
pub enum LexerErrorKind {
    #[default]
    #[error("unknown symbol")]
    UnknownSymbol,
    #[error("unclosed call to '{0}'")]
    UnclosedCall(Func),
    #[error("empty argument for '{0}'")]
    EmptyCall(Func),
    #[error("invalid number format: '{0}'")]
    InvalidNumberFormat(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error} near: '{near}'")]
pub struct LexerError {
    pub error: LexerErrorKind,
    pub span: Span,
    /// The input from the failing position onwards.
    pub near: String,
}

// Result type alias for convenience
type LexerResult<T> = Result<T, LexerErrorKind>;

// Result type alias for convenience
pub type LexerRangedResult<T> = Result<T, LexerError>;

/// Strips whitespace from `input` and tokenizes what is left with the
/// default (greedy) call scanning. Spans refer to the stripped text.
pub fn tokenize(input: &str) -> LexerRangedResult<Vec<Token>> {
    tokenize_with(Normalized::new(input).text(), 0, CallScan::default())
}

/// Tokenizes already stripped `text` whose first byte sits at `base` in the
/// full stripped input.
pub fn tokenize_with(text: &str, base: usize, scan: CallScan) -> LexerRangedResult<Vec<Token>> {
    TokenKind::lexer_with_extras(text, scan)
        .spanned()
        .map(|(result, range)| {
            let span = Span::from(range.clone()).offset(base);
            match result {
                Ok(mut kind) => {
                    if let TokenKind::Call(call) = &mut kind {
                        call.offset += base;
                    }
                    Ok(Token { kind, span })
                }
                Err(error) => Err(LexerError {
                    error,
                    span,
                    near: text[range.start..].to_string(),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to simplify testing token sequences
    fn assert_tokens(input: &str, expected: Vec<TokenKind>) {
        match tokenize(input) {
            Ok(tokens) => {
                let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
                assert_eq!(kinds, expected, "Input: '{}'", input);
            }
            Err(e) => panic!("Lexing failed for input '{}': {}", input, e),
        }
    }

    // Helper to simplify testing for lexer errors
    fn assert_lexer_error(input: &str, expected_error_variant: LexerErrorKind) -> LexerError {
        match tokenize(input) {
            Ok(tokens) => panic!(
                "Expected lexing to fail for input '{}', but got tokens: {:?}",
                input, tokens
            ),
            Err(e) => {
                assert_eq!(
                    std::mem::discriminant(&e.error),
                    std::mem::discriminant(&expected_error_variant),
                    "Input: '{}', Expected error variant like {:?}, got: {:?}",
                    input,
                    expected_error_variant,
                    e
                );
                e
            }
        }
    }

    fn call(func: Func, argument: &str, offset: usize) -> TokenKind {
        TokenKind::Call(Call {
            func,
            argument: argument.to_string(),
            offset,
        })
    }

    #[test]
    fn test_empty_input() {
        assert_tokens("", vec![]);
        assert_tokens("  \t\n", vec![]);
    }

    #[test]
    fn test_numbers() {
        assert_tokens("123", vec![TokenKind::Number(123.0)]);
        assert_tokens("12.5", vec![TokenKind::Number(12.5)]);
        assert_tokens(".5", vec![TokenKind::Number(0.5)]);
        assert_tokens("007", vec![TokenKind::Number(7.0)]);
        assert_tokens(
            "1.5.3",
            vec![TokenKind::Number(1.5), TokenKind::Number(0.3)],
        );
    }

    #[test]
    fn test_whitespace_inside_numbers() {
        assert_tokens("1 2", vec![TokenKind::Number(12.0)]);
        assert_tokens("1 . 5", vec![TokenKind::Number(1.5)]);
    }

    #[test]
    fn test_operators_and_brackets() {
        assert_tokens(
            "(1+2)-3*4/5^6",
            vec![
                TokenKind::OpenParen,
                TokenKind::Number(1.0),
                TokenKind::Add,
                TokenKind::Number(2.0),
                TokenKind::CloseParen,
                TokenKind::Sub,
                TokenKind::Number(3.0),
                TokenKind::Mul,
                TokenKind::Number(4.0),
                TokenKind::Div,
                TokenKind::Number(5.0),
                TokenKind::Pow,
                TokenKind::Number(6.0),
            ],
        );
        // adjacency is the evaluator's problem, not the lexer's
        assert_tokens("+*", vec![TokenKind::Add, TokenKind::Mul]);
    }

    #[test]
    fn test_calls() {
        assert_tokens("sin(0)", vec![call(Func::Sin, "0", 4)]);
        assert_tokens("cos( 1 + 2 )", vec![call(Func::Cos, "1+2", 4)]);
        assert_tokens(
            "2*sin((1+2)*3)",
            vec![
                TokenKind::Number(2.0),
                TokenKind::Mul,
                call(Func::Sin, "(1+2)*3", 6),
            ],
        );
    }

    #[test]
    fn test_greedy_call_runs_to_last_close() {
        assert_tokens("sin(1)+cos(0)", vec![call(Func::Sin, "1)+cos(0", 4)]);
        assert_tokens("sin(1)+2)", vec![call(Func::Sin, "1)+2", 4)]);
    }

    #[test]
    fn test_balanced_call_stops_at_matching_close() {
        let tokens = tokenize_with("sin(1)+cos((0))", 0, CallScan::Balanced).unwrap();
        let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                call(Func::Sin, "1", 4),
                TokenKind::Add,
                call(Func::Cos, "(0)", 11),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("2 * sin(1+2)").unwrap();
        let spans: Vec<Span> = tokens.iter().map(|t| t.span).collect();
        assert_eq!(
            spans,
            vec![Span::new(0, 1), Span::new(1, 2), Span::new(2, 10)]
        );
    }

    #[test]
    fn test_call_argument_spans_are_global() {
        let tokens = tokenize("2*sin((1+2)*3)").unwrap();
        let TokenKind::Call(inner) = &tokens[2].kind else {
            panic!("expected a call, got {:?}", tokens[2]);
        };
        let inner = inner.tokenize(CallScan::Greedy).unwrap();
        assert_eq!(inner[0].kind, TokenKind::OpenParen);
        assert_eq!(inner[0].span, Span::new(6, 7));
        assert_eq!(inner[1].kind, TokenKind::Number(1.0));
        assert_eq!(inner[1].span, Span::new(7, 8));
    }

    #[test]
    fn test_unknown_symbol() {
        let e = assert_lexer_error("2+@", LexerErrorKind::UnknownSymbol);
        assert_eq!(e.near, "@");
        assert_eq!(e.span.start, 2);
        assert_eq!(e.to_string(), "unknown symbol near: '@'");

        let e = assert_lexer_error("tan(1)", LexerErrorKind::UnknownSymbol);
        assert_eq!(e.near, "tan(1)");
        assert_lexer_error("1.+2", LexerErrorKind::UnknownSymbol);
        assert_lexer_error("x", LexerErrorKind::UnknownSymbol);
    }

    #[test]
    fn test_malformed_calls() {
        assert_lexer_error("sin()", LexerErrorKind::EmptyCall(Func::Sin));
        assert_lexer_error("cos(1", LexerErrorKind::UnclosedCall(Func::Cos));
        assert_eq!(
            tokenize_with("sin(1", 0, CallScan::Balanced)
                .unwrap_err()
                .error,
            LexerErrorKind::UnclosedCall(Func::Sin)
        );
        assert_eq!(
            tokenize_with("sin((1)", 0, CallScan::Balanced)
                .unwrap_err()
                .error,
            LexerErrorKind::UnclosedCall(Func::Sin)
        );
    }

    #[test]
    fn test_apply() {
        let two = TokenKind::Number(2.0);
        let three = TokenKind::Number(3.0);
        assert_eq!(TokenKind::Pow.apply(&two, &three), Ok(8.0));
        assert_eq!(TokenKind::Sub.apply(&two, &three), Ok(-1.0));
        assert_eq!(
            TokenKind::OpenParen.apply(&two, &three),
            Err(ApplyError::NotAnOperator(TokenKind::OpenParen))
        );
        assert_eq!(
            TokenKind::Add.apply(&two, &TokenKind::Mul),
            Err(ApplyError::NotANumber(TokenKind::Mul))
        );
    }

    #[test]
    fn test_predicates() {
        assert!(TokenKind::Number(1.0).is_number());
        assert!(!TokenKind::Add.is_number());
        assert!(TokenKind::Div.is_binary_op());
        assert!(!TokenKind::CloseParen.is_binary_op());
        assert!(!call(Func::Cos, "1", 4).is_binary_op());
        assert_eq!(TokenKind::Number(4.5).number(), Some(4.5));
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::Pow.to_string(), "^");
        assert_eq!(call(Func::Sin, "1+2", 4).to_string(), "sin(1+2)");
    }
}
