//! Status indicators and message formatting.

use featbuild_core::Decision;
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy)]
enum Status {
    Success,
    Error,
}

impl Status {
    fn format(&self, message: &str) -> String {
        match self {
            Status::Success => format!("{} {}", "✓".green(), message.green().bold()),
            Status::Error => format!("{} {}", "✗".red(), message.red().bold()),
        }
    }
}

/// Prints a success message.
pub fn print_success(message: &str) {
    println!("  {}", Status::Success.format(message));
}

/// Prints an error message to stderr.
pub fn print_error(message: &str) {
    eprintln!("  {}", Status::Error.format(message));
}

/// Prints one `SKIP <feature>` or `BUILD <feature>` line.
pub fn print_decision(decision: &Decision) {
    println!("{} {}", decision.kind, decision.feature);
}
