use std::vec::IntoIter;
use thiserror::Error;

use crate::lexer::{Call, LexerError, Token, TokenKind};
use crate::options::EvalOptions;
use crate::source::Span;
use crate::types::BinaryOp;

// --- Evaluation Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected close bracket")]
    UnexpectedCloseBracket,
    // an open bracket that is never closed
    #[error("unexpected open bracket")]
    UnexpectedOpenBracket,
    #[error("invalid expression")]
    InvalidExpression,
    #[error("expression nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Lex(#[from] LexerError),
    #[error("{kind}")]
    Syntax { kind: SyntaxErrorKind, span: Span },
}

impl EvalError {
    pub fn syntax(kind: SyntaxErrorKind, span: Span) -> Self {
        EvalError::Syntax { kind, span }
    }

    pub fn span(&self) -> Span {
        match self {
            EvalError::Lex(err) => err.span,
            EvalError::Syntax { span, .. } => *span,
        }
    }

    /// Rewrites the span, e.g. from stripped-text offsets to the caller's input.
    pub fn map_span(self, f: impl FnOnce(Span) -> Span) -> Self {
        match self {
            EvalError::Lex(err) => EvalError::Lex(LexerError {
                span: f(err.span),
                ..err
            }),
            EvalError::Syntax { kind, span } => EvalError::Syntax { kind, span: f(span) },
        }
    }
}

// Result type alias for convenience
pub type EvalResult<T = Token> = Result<T, EvalError>;

fn invalid(span: Span) -> EvalError {
    EvalError::syntax(SyntaxErrorKind::InvalidExpression, span)
}

fn value_of(token: Token) -> EvalResult<f64> {
    match token.kind {
        TokenKind::Number(value) => Ok(value),
        _ => Err(invalid(token.span)),
    }
}

/// Where the scope being reduced was opened.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Start of input, or the start of a call argument.
    Root,
    /// An open bracket at the given span.
    Bracket(Span),
}

impl Scope {
    pub fn is_root(self) -> bool {
        matches!(self, Scope::Root)
    }
}

/// Resolves brackets and calls in a token sequence and reduces it to a
/// single number.
///
/// The grouper owns the remaining tokens; a nested bracket scope keeps
/// draining the same iterator until it meets its `)`, so when the recursive
/// call returns the outer scope resumes right after the bracket.
pub struct Grouper<'o> {
    tokens: IntoIter<Token>,
    options: &'o EvalOptions,
    depth: usize,
}

impl<'o> Grouper<'o> {
    pub fn new(tokens: Vec<Token>, options: &'o EvalOptions) -> Self {
        Grouper::nested(tokens, options, 0)
    }

    fn nested(tokens: Vec<Token>, options: &'o EvalOptions, depth: usize) -> Self {
        Grouper {
            tokens: tokens.into_iter(),
            options,
            depth,
        }
    }

    /// Reduces the whole sequence as the root scope.
    pub fn evaluate(mut self) -> EvalResult<f64> {
        let result = self.reduce_scope(Scope::Root)?;
        value_of(result)
    }

    /// Drains tokens until the scope closes and returns the scope's value as
    /// a number token spanning the scope.
    pub fn reduce_scope(&mut self, scope: Scope) -> EvalResult {
        let mut elements = Vec::new();
        while let Some(Token { kind, span }) = self.tokens.next() {
            match kind {
                TokenKind::Call(call) => {
                    let value = self.reduce_call(&call, span)?;
                    elements.push(value);
                }
                TokenKind::OpenParen => {
                    let value =
                        self.descend(span, |grouper| grouper.reduce_scope(Scope::Bracket(span)))?;
                    elements.push(value);
                }
                TokenKind::CloseParen => {
                    return match scope {
                        Scope::Root => Err(EvalError::syntax(
                            SyntaxErrorKind::UnexpectedCloseBracket,
                            span,
                        )),
                        Scope::Bracket(open) => self.reduce(elements, open.merge(span)),
                    };
                }
                kind => elements.push(Token { kind, span }),
            }
        }

        match scope {
            Scope::Root => {
                let span = elements
                    .iter()
                    .map(|t| t.span)
                    .reduce(Span::merge)
                    .unwrap_or_default();
                self.reduce(elements, span)
            }
            Scope::Bracket(open) => Err(EvalError::syntax(
                SyntaxErrorKind::UnexpectedOpenBracket,
                open,
            )),
        }
    }

    // Call arguments are lexed only now, and reduced as a root scope of their own.
    fn reduce_call(&mut self, call: &Call, span: Span) -> EvalResult {
        let tokens = call.tokenize(self.options.call_scan)?;
        let argument = self.descend(span, |grouper| {
            Grouper::nested(tokens, grouper.options, grouper.depth).evaluate()
        })?;
        Ok(Token::number(call.func.apply(argument), span))
    }

    fn descend<T>(
        &mut self,
        at: Span,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        if self.depth >= self.options.max_depth {
            return Err(EvalError::syntax(
                SyntaxErrorKind::NestingTooDeep(self.options.max_depth),
                at,
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn reduce(&self, mut elements: Vec<Token>, span: Span) -> EvalResult {
        for ops in self.options.precedence.passes() {
            elements = reduce_pass(elements, ops)?;
        }
        let mut rest = elements.into_iter();
        match (rest.next(), rest.next()) {
            (Some(only), None) => Ok(Token::number(value_of(only)?, span)),
            (Some(_), Some(extra)) => Err(invalid(extra.span)),
            (None, _) => Err(invalid(span)),
        }
    }
}

/// One left-to-right pass replacing every `left op right` window whose
/// operator is in `ops` by its result. Results feed the next window, so
/// `2^3^2` is `(2^3)^2`.
fn reduce_pass(elements: Vec<Token>, ops: &[BinaryOp]) -> EvalResult<Vec<Token>> {
    let mut reduced: Vec<Token> = Vec::with_capacity(elements.len());
    let mut rest = elements.into_iter();
    while let Some(token) = rest.next() {
        match token.kind.binary_op() {
            Some(op) if ops.contains(&op) => {
                let (Some(left), Some(right)) = (reduced.pop(), rest.next()) else {
                    return Err(invalid(token.span));
                };
                let value = token
                    .kind
                    .apply(&left.kind, &right.kind)
                    .map_err(|_| invalid(token.span))?;
                reduced.push(Token::number(value, left.span.merge(right.span)));
            }
            _ => reduced.push(token),
        }
    }
    Ok(reduced)
}
