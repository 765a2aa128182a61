use std::io::{self, Write};
use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};

use crate::{EvalError, LexerErrorKind, SyntaxErrorKind};

const SOURCE_ID: &str = "expr";

impl EvalError {
    fn report(&self, color: bool) -> Report<'static, (&'static str, Range<usize>)> {
        let span = self.span().to_range();
        let builder = Report::build(ReportKind::Error, (SOURCE_ID, span.clone()))
            .with_config(Config::default().with_color(color));
        let builder = match self {
            EvalError::Lex(lex_err) => builder
                .with_message(format!("Lexer error: {}", lex_err.error))
                .with_label(Label::new((SOURCE_ID, span)).with_message(
                    match &lex_err.error {
                        LexerErrorKind::UnknownSymbol => {
                            format!("no token starts here: '{}'", lex_err.near)
                        }
                        LexerErrorKind::UnclosedCall(func) => {
                            format!("this {}( has no closing bracket", func)
                        }
                        LexerErrorKind::EmptyCall(func) => {
                            format!("{}() needs an argument", func)
                        }
                        LexerErrorKind::InvalidNumberFormat(_) => {
                            "this is not a valid number".to_string()
                        }
                    },
                )),
            EvalError::Syntax { kind, .. } => builder
                .with_message(format!("Syntax error: {}", kind))
                .with_label(Label::new((SOURCE_ID, span)).with_message(match kind {
                    SyntaxErrorKind::UnexpectedCloseBracket => {
                        "this bracket closes nothing".to_string()
                    }
                    SyntaxErrorKind::UnexpectedOpenBracket => {
                        "this bracket is never closed".to_string()
                    }
                    SyntaxErrorKind::InvalidExpression => {
                        "cannot reduce the expression here".to_string()
                    }
                    SyntaxErrorKind::NestingTooDeep(limit) => {
                        format!("nesting limit of {} reached here", limit)
                    }
                })),
        };
        builder.finish()
    }

    /// Writes an ariadne report for this error. `input` must be the text
    /// that was evaluated, since spans point into it.
    pub fn write_report(&self, input: &str, color: bool, w: impl Write) -> io::Result<()> {
        self.report(color).write((SOURCE_ID, Source::from(input)), w)
    }

    /// Renders the report to a string, falling back to the plain `Display`
    /// message if ariadne fails to write it.
    pub fn render(&self, input: &str, color: bool) -> String {
        let mut out = Vec::new();
        match self.write_report(input, color, &mut out) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => self.to_string(),
        }
    }

    pub fn pretty_print(&self, input: &str) -> io::Result<()> {
        self.report(true).eprint((SOURCE_ID, Source::from(input)))
    }
}
