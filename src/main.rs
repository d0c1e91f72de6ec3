//! Network Speed Probe - command-line entry point

use clap::Parser;
use network_speed_probe::{app::App, cli::Cli, error::ErrorReporter, AppError};
use std::{error::Error, process};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = App::new(cli).run().await {
        reporter.report_error(&e);

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format (see --show-env-example)");
            eprintln!("  - Endpoint URLs must start with http:// or https://");
            eprintln!("  - Retries must be between 1 and 10, timeout between 1 and 300 seconds");
        }
        AppError::Storage(_) | AppError::Io(_) => {
            eprintln!();
            eprintln!("History storage help:");
            eprintln!("  - Check that the history file location is writable");
            eprintln!("  - Use --history-file to point at a different file");
            eprintln!("  - A corrupt history file can be moved aside; a new one will be created");
        }
        AppError::Network(_) => {
            eprintln!();
            eprintln!("HTTP client help:");
            eprintln!("  - Check the HTTPS_PROXY / HTTP_PROXY variables");
            eprintln!("  - Probe failures are reported as Error in the results, not here");
        }
        _ => {}
    }
}
