use crate::config::prompt::PromptConfig;
use crate::error::SubmitError;
use crate::llm::CompletionSettings;
use crate::llm::chat::ChatClient;
use crate::models::chat::Turn;
use crate::session::SessionStore;

use log::{ info, error };
use std::sync::Arc;

/// Runs one user turn at a time against the completion service.
#[derive(Clone)]
pub struct ChatAgent {
    chat_client: Arc<dyn ChatClient>,
    settings: CompletionSettings,
    prompts: PromptConfig,
}

impl ChatAgent {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        settings: CompletionSettings,
        prompts: PromptConfig
    ) -> Self {
        Self { chat_client, settings, prompts }
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    pub fn prompts(&self) -> &PromptConfig {
        &self.prompts
    }

    /// Seeds the session with the configured system instruction if needed.
    pub fn initialize_session(&self, session: &mut SessionStore) {
        session.initialize(&self.prompts.system_instruction);
    }

    /// Appends the user turn and the reply. Completion failures become the
    /// fallback reply and are only logged, so a non-empty submission always
    /// grows the session by exactly two turns.
    pub async fn submit<'a>(
        &self,
        session: &'a mut SessionStore,
        user_text: &str
    ) -> Result<&'a [Turn], SubmitError> {
        if user_text.trim().is_empty() {
            return Err(SubmitError::EmptyMessage);
        }

        self.initialize_session(session);
        session.append(Turn::user(user_text));

        let reply = match self.chat_client.complete(session.turns(), &self.settings).await {
            Ok(text) => {
                info!("Completion returned {} chars", text.chars().count());
                text
            }
            Err(e) => {
                error!("Completion failed via {}: {}", self.chat_client.get_base_url(), e);
                self.prompts.fallback_message.clone()
            }
        };
        session.append(Turn::assistant(reply));

        Ok(session.turns())
    }
}
