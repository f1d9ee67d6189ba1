use aiscribe_cli::cli::Cli;
use aiscribe_cli::commands;
use clap::Parser;
use colored::*;
use error_common::{ErrorReport, ScribeError};
use logger_redacted::LoggerConfig;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let json = cli.json;

    let mut log_config = LoggerConfig::from_env();
    if cli.verbose {
        log_config.log_level = "debug".to_string();
    } else if std::env::var("AISCRIBE_LOG").is_err() {
        // Keep stderr quiet for interactive use unless asked
        log_config.log_level = "warn".to_string();
    }
    let _log_guard = match logger_redacted::init(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("⚠️  {} {e}", "Logging disabled:".bright_yellow());
            None
        }
    };

    match commands::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, json);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error, json: bool) {
    let report = match err.downcast_ref::<ScribeError>() {
        Some(scribe) => scribe.to_report(),
        None => ErrorReport {
            success: false,
            error: format!("{err:#}"),
            code: error_common::codes::system::INTERNAL.to_string(),
        },
    };

    if json {
        match serde_json::to_string(&report) {
            Ok(body) => println!("{body}"),
            Err(_) => println!("{{\"success\":false}}"),
        }
    } else {
        eprintln!(
            "❌ {} {} {}",
            "Error:".bright_red(),
            report.error,
            format!("[{}]", report.code).dimmed()
        );
    }
}
