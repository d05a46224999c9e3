use std::process::ExitCode;

use metaconform::ui::output;

fn main() -> ExitCode {
    match metaconform::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
