//! Binary entry point for the kiln build daemon.

use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    match kilnd::run(env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if let Some(usage) = error.usage_request() {
                let _ = usage.print();
                return ExitCode::SUCCESS;
            }
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
