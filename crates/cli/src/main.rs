use std::process::ExitCode;

fn main() -> ExitCode {
    cartlift_cli::run()
}
