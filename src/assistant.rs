//! AI fill and Q/A on top of [`CompletionClient`].
//!
//! Both operations are soft-failing: once the retry budget is spent they
//! return a fixed sentinel string instead of an error, and the sentinel is
//! shown to the user in place of real content.

use crate::completion::{CompletionClient, CompletionParams};
use crate::config::AutofillConfig;
use crate::error::AutofillError;
use crate::prompts::{answer_prompt, fill_prompt};
use tracing::{info, warn};

/// Returned by [`FormAssistant::fill_missing`] when every attempt failed.
pub const FILL_FAILED: &str = "AI filling failed.";

/// Returned by [`FormAssistant::answer_question`] when every attempt failed.
pub const ANSWER_FAILED: &str = "AI failed to answer.";

/// Fills placeholder values and answers questions about a form.
#[derive(Debug, Clone)]
pub struct FormAssistant {
    client: CompletionClient,
    fill: CompletionParams,
    answer: CompletionParams,
}

impl FormAssistant {
    pub fn new(client: CompletionClient, fill: CompletionParams, answer: CompletionParams) -> Self {
        Self {
            client,
            fill,
            answer,
        }
    }

    pub fn from_config(config: &AutofillConfig) -> Result<Self, AutofillError> {
        Ok(Self::new(
            CompletionClient::from_config(config)?,
            config.fill,
            config.answer,
        ))
    }

    /// Ask the model to replace `N/A` / `nan` / `---` style placeholders.
    ///
    /// Returns the trimmed model output, or [`FILL_FAILED`].
    pub async fn fill_missing(&self, form_text: &str) -> String {
        info!(
            "Requesting AI fill ({} chars, model {})",
            form_text.len(),
            self.client.model()
        );
        match self.client.complete(&fill_prompt(form_text), self.fill).await {
            Ok(filled) => filled,
            Err(exhausted) => {
                warn!(
                    "AI fill gave up after {} attempts: {}",
                    exhausted.attempts(),
                    exhausted.last().map(ToString::to_string).unwrap_or_default()
                );
                FILL_FAILED.to_string()
            }
        }
    }

    /// Answer `question` from `form_text` alone.
    ///
    /// Returns the trimmed answer, or [`ANSWER_FAILED`].
    pub async fn answer_question(&self, form_text: &str, question: &str) -> String {
        info!("Asking: {}", question);
        match self
            .client
            .complete(&answer_prompt(form_text, question), self.answer)
            .await
        {
            Ok(answer) => answer,
            Err(exhausted) => {
                warn!(
                    "Q/A gave up after {} attempts: {}",
                    exhausted.attempts(),
                    exhausted.last().map(ToString::to_string).unwrap_or_default()
                );
                ANSWER_FAILED.to_string()
            }
        }
    }
}

/// True if `text` is one of the failure sentinels.
pub fn is_sentinel(text: &str) -> bool {
    text == FILL_FAILED || text == ANSWER_FAILED
}
