//! Prompt command implementation

use crate::client::{RelayClient, RelayReply};
use crate::config::RelayctlConfig;
use crate::error::CliError;
use crate::output;
use promptrelay_core::PromptField;
use std::time::Duration;
use tracing::info;

/// Handle prompt command
pub async fn handle_prompt_command(
    text: &str,
    field: PromptField,
    config: &RelayctlConfig,
) -> Result<(), CliError> {
    let client = RelayClient::new(config.endpoint.clone(), Duration::from_secs(config.timeout))?;

    info!("Sending {} chars to {} as `{}`", text.chars().count(), config.endpoint, field);

    let mut stdout = std::io::stdout();
    match client.prompt(field, text, &mut stdout).await? {
        RelayReply::Buffered(body) => output::display_reply(&body, &config.default_format),
        RelayReply::Streamed { bytes } => {
            info!("Stream finished after {} bytes", bytes);
            Ok(())
        }
    }
}
