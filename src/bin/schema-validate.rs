use std::process::ExitCode;

use env_logger::Env;

use schema_validator::config::Config;
use schema_validator::runner::{self, RunReport};
use schema_validator::watch;

/// Records were rejected or entities mismatched
const EXIT_INVALID: u8 = 1;
/// The schema or a source file could not be loaded
const EXIT_ERROR: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::from_args_and_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(&config.log_level)).init();

    if let Some(path) = &config.project_config_path {
        log::debug!("Using project config {}", path.display());
    }

    if config.print_order {
        return match runner::describe_order(&config) {
            Ok(levels) => {
                print!("{levels}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    if config.watch {
        let result = watch::watch(&config, |pass| match pass {
            Ok(report) => print!("{}", report.rendered),
            Err(e) => log::error!("Validation pass failed: {:#}", e),
        })
        .await;
        return match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    match runner::run_from_config(&config) {
        Ok(RunReport { outcome, rendered }) => {
            print!("{rendered}");
            if outcome.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_INVALID)
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
