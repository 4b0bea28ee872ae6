//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use promptrelay_core::{FinishReasonPolicy, PromptField};
use promptrelay_http::DeliveryMode;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relayctl")]
#[command(about = "PromptRelay server and client")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay server
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<SocketAddr>,
        /// Response mode
        #[arg(short, long, value_enum)]
        delivery: Option<DeliveryArg>,
        /// Gemini model name
        #[arg(short, long)]
        model: Option<String>,
        /// Treatment of non-STOP finish reasons
        #[arg(long, value_enum)]
        finish_reason_policy: Option<PolicyArg>,
        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },
    /// Send a prompt to a running relay
    Prompt {
        /// Prompt text
        text: String,
        /// Relay URL
        #[arg(short, long)]
        endpoint: Option<String>,
        /// Request field to carry the prompt
        #[arg(long, value_enum, default_value = "message")]
        field: FieldArg,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeliveryArg {
    Buffered,
    Streaming,
}

impl From<DeliveryArg> for DeliveryMode {
    fn from(arg: DeliveryArg) -> Self {
        match arg {
            DeliveryArg::Buffered => DeliveryMode::Buffered,
            DeliveryArg::Streaming => DeliveryMode::Streaming,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Lenient,
    Strict,
}

impl From<PolicyArg> for FinishReasonPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Lenient => FinishReasonPolicy::Lenient,
            PolicyArg::Strict => FinishReasonPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FieldArg {
    Message,
    Prompt,
}

impl From<FieldArg> for PromptField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Message => PromptField::Message,
            FieldArg::Prompt => PromptField::Prompt,
        }
    }
}
