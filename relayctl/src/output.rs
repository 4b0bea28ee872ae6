//! Output formatting utilities for relayctl

use crate::cli::OutputFormat;
use crate::error::CliError;
use colored::*;
use promptrelay_core::FinishReason;
use promptrelay_http::RelayBody;
use serde::Serialize;

/// Display a buffered relay reply
pub fn display_reply(body: &RelayBody, format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => {
            println!("{}", body.output().unwrap_or_default());
            if let Some(reason) = &body.finish_reason {
                if *reason != FinishReason::Stop {
                    eprintln!("{} {}", "finish reason:".bold(), format_finish_reason(reason));
                }
            }
        }
        OutputFormat::Json => print_json(body)?,
    }
    Ok(())
}

/// Display the effective configuration
pub fn display_config(config: &serde_json::Value, format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => {
            println!("{}", "Relay Configuration".bold().blue());
            if let Some(map) = config.as_object() {
                for (key, value) in map {
                    println!("{:<24} {}", format!("{}:", key).bold(), format_value(value));
                }
            }
        }
        OutputFormat::Json => print_json(config)?,
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Configuration(format!("Failed to serialize to JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Format finish reason with color
fn format_finish_reason(reason: &FinishReason) -> String {
    match reason {
        FinishReason::Stop => reason.to_string().green().to_string(),
        FinishReason::MaxTokens => reason.to_string().yellow().to_string(),
        FinishReason::Safety => reason.to_string().red().to_string(),
        FinishReason::Other(_) => reason.to_string().yellow().to_string(),
    }
}

fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
