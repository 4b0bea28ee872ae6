//! Configuration management for relayctl

use crate::cli::{Cli, Commands, OutputFormat};
use crate::error::CliError;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use promptrelay_connector_gemini::GeminiConfig;
use promptrelay_core::{ApiKey, FinishReasonPolicy};
use promptrelay_core::types::DEFAULT_MAX_PROMPT_CHARS;
use promptrelay_http::{DeliveryMode, RelayServerConfig};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable holding the provider key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for relayctl
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RelayctlConfig {
    /// Address `serve` listens on
    pub bind_address: SocketAddr,
    /// Origins allowed to call the relay
    pub allowed_origins: Vec<String>,
    /// Maximum prompt length in characters
    pub max_prompt_chars: usize,
    /// Response mode for `serve`
    pub delivery: DeliveryMode,
    /// Treatment of non-STOP finish reasons
    pub finish_reason_policy: FinishReasonPolicy,
    /// Provider settings
    pub gemini: GeminiConfig,
    /// Provider API key
    pub api_key: Option<ApiKey>,
    /// Relay URL used by `prompt`
    pub endpoint: String,
    /// Client request timeout in seconds
    pub timeout: u64,
    /// Default output format
    pub default_format: OutputFormat,
}

impl Default for RelayctlConfig {
    fn default() -> Self {
        let server = RelayServerConfig::default();
        Self {
            bind_address: server.bind_address,
            allowed_origins: server.allowed_origins,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            delivery: server.delivery,
            finish_reason_policy: server.finish_reason_policy,
            gemini: GeminiConfig::default(),
            api_key: None,
            endpoint: "http://localhost:8080".to_string(),
            timeout: 90,
            default_format: OutputFormat::Text,
        }
    }
}

impl RelayctlConfig {
    /// Load configuration from file and environment.
    ///
    /// Sources, later ones winning: `relayctl.yaml` in the working directory,
    /// the `--config` file, `RELAY_`-prefixed variables (`__` nests, e.g.
    /// `RELAY_GEMINI__MODEL`), and `GEMINI_API_KEY`.
    pub fn load(config_path: &Option<std::path::PathBuf>) -> Result<Self, CliError> {
        let mut figment = Figment::new();

        let default_config_paths = [
            "relayctl.yaml",
            "relayctl.yml",
            ".relayctl.yaml",
            ".relayctl.yml",
        ];

        for path in &default_config_paths {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CliError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        figment = figment
            .merge(Env::prefixed("RELAY_").split("__"))
            .merge(Env::raw().only(&[API_KEY_ENV]).map(|_| "api_key".into()));

        figment
            .extract()
            .map_err(|e| CliError::Configuration(format!("Failed to parse configuration: {}", e)))
    }

    /// Apply CLI argument overrides to the configuration
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(format) = args.format {
            self.default_format = format;
        }

        match &args.command {
            Commands::Serve {
                bind,
                delivery,
                model,
                finish_reason_policy,
                allow_origins,
            } => {
                if let Some(bind) = bind {
                    self.bind_address = *bind;
                }
                if let Some(delivery) = delivery {
                    self.delivery = (*delivery).into();
                }
                if let Some(model) = model {
                    self.gemini.model = model.clone();
                }
                if let Some(policy) = finish_reason_policy {
                    self.finish_reason_policy = (*policy).into();
                }
                if !allow_origins.is_empty() {
                    self.allowed_origins = allow_origins.clone();
                }
            }
            Commands::Prompt { endpoint, .. } => {
                if let Some(endpoint) = endpoint {
                    self.endpoint = endpoint.clone();
                }
            }
            Commands::Config => {}
        }

        self
    }

    /// Split into the server and connector configurations
    pub fn into_parts(self) -> (RelayServerConfig, GeminiConfig) {
        let server = RelayServerConfig {
            bind_address: self.bind_address,
            allowed_origins: self.allowed_origins,
            max_prompt_chars: self.max_prompt_chars,
            delivery: self.delivery,
            finish_reason_policy: self.finish_reason_policy,
            api_key: self.api_key,
        };
        (server, self.gemini)
    }

    /// Effective settings with the key redacted
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::json!({
            "bind_address": self.bind_address.to_string(),
            "allowed_origins": self.allowed_origins,
            "max_prompt_chars": self.max_prompt_chars,
            "delivery": self.delivery,
            "finish_reason_policy": self.finish_reason_policy,
            "gemini": self.gemini,
            "api_key": if self.api_key.is_some() { "<set>" } else { "<missing>" },
            "endpoint": self.endpoint,
            "timeout": self.timeout,
            "default_format": self.default_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use figment::Jail;
    use promptrelay_core::prelude::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = RelayctlConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.max_prompt_chars, 5000);
        assert_eq!(config.delivery, DeliveryMode::Buffered);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_from_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let mut temp_file = NamedTempFile::new().unwrap();
            writeln!(temp_file, "bind_address: 127.0.0.1:9000").unwrap();
            writeln!(temp_file, "max_prompt_chars: 2000").unwrap();
            writeln!(temp_file, "delivery: streaming").unwrap();
            writeln!(temp_file, "allowed_origins: [\"https://deskside.example\"]").unwrap();
            writeln!(temp_file, "gemini:").unwrap();
            writeln!(temp_file, "  model: gemini-2.0-flash").unwrap();

            let config = RelayctlConfig::load(&Some(temp_file.path().to_path_buf()))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.bind_address.port(), 9000);
            assert_eq!(config.max_prompt_chars, 2000);
            assert_eq!(config.delivery, DeliveryMode::Streaming);
            assert_eq!(config.allowed_origins, vec!["https://deskside.example".to_string()]);
            assert_eq!(config.gemini.model, "gemini-2.0-flash");
            assert_eq!(config.gemini.max_output_tokens, 8192);
            Ok(())
        });
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let path = std::path::PathBuf::from("/definitely/not/here/relayctl.yaml");
        assert!(matches!(
            RelayctlConfig::load(&Some(path)),
            Err(CliError::Configuration(_))
        ));
    }

    #[test]
    fn test_environment_overrides_file_and_supplies_key() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("relayctl.yaml", "max_prompt_chars: 2000\nfinish_reason_policy: strict\n")?;
            jail.set_env("RELAY_MAX_PROMPT_CHARS", "3000");
            jail.set_env("RELAY_GEMINI__TIMEOUT_MS", "1500");
            jail.set_env("GEMINI_API_KEY", "AIza-test");

            let config = RelayctlConfig::load(&None).map_err(|e| e.to_string())?;
            assert_eq!(config.max_prompt_chars, 3000);
            assert_eq!(config.finish_reason_policy, FinishReasonPolicy::Strict);
            assert_eq!(config.gemini.timeout_ms, 1500);
            assert_eq!(config.api_key.as_ref().map(|k| k.expose_secret().as_str()), Some("AIza-test"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_key_is_not_fatal() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config = RelayctlConfig::load(&None).map_err(|e| e.to_string())?;
            assert!(config.api_key.is_none());
            assert_eq!(config.redacted()["api_key"], "<missing>");
            Ok(())
        });
    }

    #[test]
    fn test_serve_overrides() {
        let args = Cli::parse_from([
            "relayctl",
            "serve",
            "--delivery",
            "streaming",
            "--model",
            "gemini-pro",
            "--finish-reason-policy",
            "strict",
        ]);
        let config = RelayctlConfig::default().with_overrides(&args);
        assert_eq!(config.delivery, DeliveryMode::Streaming);
        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.finish_reason_policy, FinishReasonPolicy::Strict);

        let (server, gemini) = config.into_parts();
        assert_eq!(server.delivery, DeliveryMode::Streaming);
        assert_eq!(gemini.model, "gemini-pro");
    }

    #[test]
    fn test_redacted_hides_key() {
        let config = RelayctlConfig {
            api_key: Some(ApiKey::new("AIza-secret".to_string())),
            ..Default::default()
        };
        let shown = config.redacted().to_string();
        assert!(!shown.contains("AIza-secret"));
        assert!(shown.contains("<set>"));
    }
}
