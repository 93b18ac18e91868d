use lmc_vm::cli::Invocation;
use lmc_vm::terminal::Console;
use log::warn;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match Invocation::from_args(std::env::args_os()) {
        Invocation::ShowHelp(text) | Invocation::ShowVersion(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Invocation::UsageError { reason, usage } => {
            warn!("{reason}");
            print!("{usage}");
            ExitCode::SUCCESS
        }
        Invocation::Run(config) => {
            match lmc_vm::run_image(&config.image, config.options, Console::stdio()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
