use async_trait::async_trait;
use glean_common::{GleanError, Result};

use crate::prompt::{build_prompt, Action};

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt as a single user message and return the reply text.
    async fn complete(&self, prompt: &str, credential: &str, model: &str) -> Result<String>;

    /// Template `text` for `action` and run it through [`CompletionClient::complete`].
    ///
    /// Fails with [`GleanError::MissingCredential`] before any network traffic
    /// when the credential is blank.
    async fn process(
        &self,
        text: &str,
        action: Action,
        credential: &str,
        model: &str,
    ) -> Result<String> {
        if credential.trim().is_empty() {
            return Err(GleanError::MissingCredential);
        }
        let prompt = build_prompt(action, text);
        tracing::debug!(%action, model, prompt_len = prompt.len(), "completion.process");
        self.complete(&prompt, credential, model).await
    }
}
