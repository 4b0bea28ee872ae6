//! Config command implementation

use crate::config::RelayctlConfig;
use crate::error::CliError;
use crate::output;

/// Print the effective configuration with the key redacted
pub fn handle_config_command(config: &RelayctlConfig) -> Result<(), CliError> {
    output::display_config(&config.redacted(), &config.default_format)
}
