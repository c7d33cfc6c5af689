use std::process::ExitCode;

fn main() -> ExitCode {
    cabby_cli::run()
}
