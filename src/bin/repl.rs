use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};
use scopecalc::{CallScan, EvalOptions, Func, Precedence, evaluate_with};

const HISTORY_FILE: &str = "scopecalc_history.txt";
const EDIT_MODE_VAR: &str = "SCOPECALC_EDIT_MODE";

struct FuncCompleter;

impl rustyline::completion::Completer for FuncCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let head = &line[..pos];
        let word_start = head.trim_end_matches(|c: char| c.is_ascii_alphabetic()).len();
        let prefix = &head[word_start..];
        if prefix.is_empty() {
            return Ok((pos, vec![]));
        }
        Ok((
            pos,
            Func::ALL
                .iter()
                .map(|func| func.name())
                .filter(|name| name.starts_with(prefix))
                .map(|name| format!("{}(", &name[prefix.len()..]))
                .collect(),
        ))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputValidator {
    #[rustyline(Validator)]
    validator: BracketValidator,
    #[rustyline(Highlighter)]
    highlighter: BracketHighlighter,
    #[rustyline(Completer)]
    completer: FuncCompleter,
}

struct BracketValidator;

// Ok(number of unclosed '('), or Err(byte offset of the first stray ')')
fn check_brackets(input: &str) -> Result<usize, usize> {
    let mut depth = 0usize;
    for (at, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Err(at),
            ')' => depth -= 1,
            _ => {}
        }
    }
    Ok(depth)
}

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(match check_brackets(ctx.input()) {
            Err(at) => ValidationResult::Invalid(Some(format!(
                "  - Unmatched ')' at position {}",
                at
            ))),
            Ok(0) => ValidationResult::Valid(None),
            Ok(_) => ValidationResult::Incomplete,
        })
    }
}

struct BracketHighlighter;

// Colours the bracket pair next to the cursor blue and stray `)` red.
// `pos` is the cursor's byte offset in `line`.
fn highlight_brackets(line: &str, pos: usize) -> String {
    // (byte offset in `line`, byte offset in `highlighted`) of each open bracket
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut highlighted = String::with_capacity(line.len());

    for (at, c) in line.char_indices() {
        match c {
            '(' => {
                stack.push((at, highlighted.len()));
                highlighted.push(c);
            }
            ')' => match stack.pop() {
                Some((open_at, open_out)) if pos == open_at + 1 || pos == at + 1 => {
                    highlighted.push_str("\x1b[34m)\x1b[0m"); // Blue for matching brackets
                    highlighted.replace_range(open_out..open_out + 1, "\x1b[1;34m(\x1b[0m");
                }
                Some(_) => highlighted.push(c),
                None => highlighted.push_str("\x1b[31m)\x1b[0m"), // Red for unmatched closing brackets
            },
            _ => highlighted.push(c),
        }
    }
    highlighted
}

impl Highlighter for BracketHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        std::borrow::Cow::Owned(highlight_brackets(line, pos))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

// Returns true when the line was a settings command
fn apply_command(line: &str, options: &mut EvalOptions) -> bool {
    let current = *options;
    *options = match line {
        ":sequential" => current.with_precedence(Precedence::Sequential),
        ":conventional" => current.with_precedence(Precedence::Conventional),
        ":greedy" => current.with_call_scan(CallScan::Greedy),
        ":balanced" => current.with_call_scan(CallScan::Balanced),
        _ => return false,
    };
    println!(
        "precedence: {:?}, calls: {:?}",
        options.precedence, options.call_scan
    );
    true
}

fn main() -> rustyline::Result<()> {
    println!("scopecalc REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl-D to quit.");
    println!("Commands: :sequential :conventional :greedy :balanced");

    let mut options = EvalOptions::default();
    let h = InputValidator {
        highlighter: BracketHighlighter,
        validator: BracketValidator,
        completer: FuncCompleter,
    };
    let edit_mode = match std::env::var(EDIT_MODE_VAR) {
        Ok(mode) if mode.eq_ignore_ascii_case("vi") => rustyline::EditMode::Vi,
        _ => rustyline::EditMode::Emacs,
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(edit_mode)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(h));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(HISTORY_FILE).is_err() {
        println!("No previous history.");
    }

    loop {
        match rl.readline("calc> ") {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }
                if apply_command(trimmed_input, &mut options) {
                    continue;
                }

                match evaluate_with(&line, &options) {
                    Ok(value) => println!("{}", value),
                    Err(e) => {
                        if e.pretty_print(&line).is_err() {
                            eprintln!("Error: {}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(HISTORY_FILE)
}
