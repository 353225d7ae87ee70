#![allow(clippy::print_stderr)]

use clap::Parser;
use safedi_cli::args::SafeDiArgs;

fn main() {
    safedi_cli::tracing_config::init();
    let args = SafeDiArgs::parse();
    match safedi_cli::driver::run(&args) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    }
}
