//! Binary entrypoint for the `taskboard` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env is fine; configuration falls back to the environment.
    let _ = dotenvy::dotenv();
    match taskboard::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
