// CLI module
// Command-line interface, argument parsing and command execution

mod args;
mod commands;

pub use args::{page_delay, CliArgs, Command};
pub use commands::execute;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing required arguments, or
/// `--help`), clap displays an error message or help text and exits the
/// process.
///
/// # Returns
///
/// Returns a `CliArgs` struct with the parsed command-line arguments.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
