//! How buffered generations that end on a non-`STOP` finish reason are treated

use crate::errors::ProviderError;
use crate::types::Completion;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Policy for completions whose finish reason is not `STOP`.
///
/// Empty content is always an error; this only decides what happens when the
/// candidate produced text but stopped for another reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReasonPolicy {
    /// Return the text with the finish reason attached and log a warning
    #[default]
    Lenient,
    /// Surface any non-`STOP` finish reason as a provider error
    Strict,
}

impl FinishReasonPolicy {
    pub fn apply(&self, completion: Completion) -> Result<Completion, ProviderError> {
        if completion.finish_reason.is_stop() {
            return Ok(completion);
        }

        match self {
            FinishReasonPolicy::Lenient => {
                warn!(
                    "Generation finished with {} after {} characters",
                    completion.finish_reason,
                    completion.text.chars().count()
                );
                Ok(completion)
            }
            FinishReasonPolicy::Strict => Err(ProviderError::StoppedEarly {
                finish_reason: completion.finish_reason,
                partial_text: completion.text,
            }),
        }
    }
}

impl std::str::FromStr for FinishReasonPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(FinishReasonPolicy::Lenient),
            "strict" => Ok(FinishReasonPolicy::Strict),
            other => Err(format!("unknown finish reason policy: {}", other)),
        }
    }
}
