//! Diagnostic rendering for the terminal.

#![allow(clippy::print_stderr, clippy::print_stdout)]

use colored::Colorize;
use safedi_common::GraphError;

/// Prints a sorted diagnostic set to stderr, one error per line, followed by
/// a summary line.
pub fn report(errors: &[GraphError]) {
    for error in errors {
        eprintln!("{} {error}", "error:".red().bold());
    }
    let plural = if errors.len() == 1 { "error" } else { "errors" };
    eprintln!(
        "{}",
        format!("SafeDI found {} {plural}.", errors.len()).red().bold()
    );
}

pub fn print_version() {
    println!("safedi {}", env!("CARGO_PKG_VERSION"));
}
