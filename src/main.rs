use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use belssb_meter::cli::{
    handle_config_command, handle_discover_command, handle_submit, DiscoverArgs, SubmitArgs,
};
use belssb_meter::config::ConfigLayer;
use belssb_meter::error::{MeterError, EXIT_SUBMISSION_FAILED, EXIT_SUCCESS};
use belssb_meter::logging;

#[derive(Parser)]
#[command(
    name = "belssb-submit",
    version,
    about = "Submit electricity meter readings to BELSSB (belssb.ru)",
    long_about = "Fills in and submits the BELSSB meter reading form with a headless \
                  Chromium driven by Playwright. Values come from flags, BELSSB_* \
                  environment variables and a YAML config file, in that order.\n\n\
                  Exit codes: 0 = submitted, 1 = submission failed, 2 = invalid input."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    submit: SubmitArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the form structure (inputs, buttons, iframes, shadow hosts) of the page
    Discover(DiscoverArgs),

    /// Show the config file location and the resolved settings
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.submit.debug);

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("Error: {}", err);
            let code = err
                .downcast_ref::<MeterError>()
                .map(MeterError::exit_code)
                .unwrap_or(EXIT_SUBMISSION_FAILED);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Discover(args)) => {
            let layer = ConfigLayer::from_env().or(cli.submit.file_layer()?);
            handle_discover_command(layer, &args, cli.submit.debug)?;
        }
        Some(Commands::Config) => {
            handle_config_command(&cli.submit)?;
        }
        None => {
            handle_submit(&cli.submit)?;
        }
    }

    Ok(())
}
