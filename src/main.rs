use std::process::ExitCode;

fn main() -> ExitCode {
    match br_macro_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
