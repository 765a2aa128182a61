use std::process::ExitCode;

// Use the library crate (whose name is defined in Cargo.toml)
use scopecalc::evaluate;

fn main() -> ExitCode {
    let input = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if input.trim().is_empty() {
        eprintln!("Usage: scopecalc <expression>");
        eprintln!("Example: scopecalc '2 + 3 * sin(0)'");
        return ExitCode::FAILURE;
    }

    match evaluate(&input) {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.pretty_print(&input).is_err() {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
