//! orderqc - Main entry point

use clap::Parser;
use orderqc::{Cli, Pipeline, Status, EXIT_QUALITY_FAILED};
use orderqc_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::{error, info};

fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Verbose: debug to console. Otherwise only warnings and errors.
    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .output(LogOutput::Console)
        .log_file_prefix("orderqc")
        .build();

    // Environment variables take precedence
    let log_config = match log_config.clone().with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring logging environment: {e}");
            log_config
        },
    };

    // The run does not depend on logging being available
    let guard = init_logging(&log_config).ok();

    let code = match run(&cli) {
        Ok(Status::Failed) if cli.strict => EXIT_QUALITY_FAILED,
        Ok(_) => 0,
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("Error: {}", e);
            1
        },
    };

    // flush file logs before exiting
    drop(guard);
    process::exit(code);
}

fn run(cli: &Cli) -> orderqc::Result<Status> {
    let config = cli.pipeline_config();
    info!(
        input = %config.input_path.display(),
        output_dir = %config.output_dir.display(),
        "Starting run"
    );

    let pipeline = Pipeline::from_config(config)?;
    let stdout = std::io::stdout();
    let outcome = pipeline.run(&mut stdout.lock())?;

    for file in &outcome.outputs {
        info!(target_set = %file.target, rows = file.rows, path = %file.path.display(), "Output written");
    }
    Ok(outcome.status())
}
