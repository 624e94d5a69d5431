use std::process::ExitCode;

fn main() -> ExitCode {
    smokesignal_cli::run()
}
