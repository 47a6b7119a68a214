use std::process::ExitCode;

use colored::Colorize;
use json2model::cli::CommandLineInterface;

fn main() -> ExitCode {
    match CommandLineInterface::load().run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
