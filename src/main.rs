use std::process::ExitCode;

fn main() -> ExitCode {
    match wind_risk_pricer::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
