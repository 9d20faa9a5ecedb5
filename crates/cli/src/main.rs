use std::process::ExitCode;

fn main() -> ExitCode {
    kinocr_cli::run()
}
