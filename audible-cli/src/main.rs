mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::CommandExecutor,
    config::AppConfig,
    error::{AppError, Result},
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json_errors = match &args.command {
        Commands::Extract { output, .. } => output.is_some_and(|format| format.is_json()),
        _ => false,
    };

    if let Err(e) = run(args).await {
        report_error(&e, json_errors);
        process::exit(1);
    }
}

/// Prints a failure either as a JSON object on stdout or as a plain `Error:` line on stderr.
fn report_error(e: &AppError, json: bool) {
    if json {
        let error_json = serde_json::json!({
            "status": "error",
            "message": e.to_string(),
        });
        println!("{error_json}");
        return;
    }

    if !e.is_user_error() {
        error!(error = %e, "Extraction aborted");
    }

    #[cfg(feature = "colored-output")]
    let label = "Error:".red().bold().to_string();
    #[cfg(not(feature = "colored-output"))]
    let label = "Error:";

    eprintln!("{label} {e}");
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet);

    // reset never reads the existing file
    if let Commands::Config { reset: true, .. } = args.command {
        let path = AppConfig::reset(args.config.as_deref())?;
        println!("Configuration at {} restored to defaults", path.display());
        return Ok(());
    }

    let config = AppConfig::load(args.config.as_deref())?;
    debug!("Loaded configuration: {:?}", config);

    match args.command {
        Commands::Extract {
            url,
            cookies,
            cookies_file,
            output,
            output_file,
        } => {
            let output = output.unwrap_or(config.output_format);
            let client_options = config.client_options(args.timeout, args.user_agent.as_deref());
            let cookies_file = cookies_file.or_else(|| config.cookies_file.clone());
            let show_progress = output == OutputFormat::Pretty && !args.quiet;

            CommandExecutor::new(&config)
                .extract_single(
                    &url,
                    cookies.as_deref(),
                    cookies_file.as_deref(),
                    output,
                    output_file.as_deref(),
                    &client_options,
                    show_progress,
                )
                .await?;
        }

        Commands::Config { show: true, .. } => print!("{}", config.show()?),
        Commands::Config { .. } => eprintln!("Nothing to do: pass --show or --reset"),

        Commands::Completions { shell } => {
            let mut command = <Args as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut command, "audible-cli", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    // stdout carries the extracted record, logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
}
