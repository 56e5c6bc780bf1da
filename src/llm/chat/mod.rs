pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use super::{ CompletionSettings, LlmConfig };
use crate::error::{ CompletionError, ConfigurationError };
use crate::models::chat::Turn;
use self::openai::OpenAIChatClient;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the whole conversation and returns the reply text.
    async fn complete(
        &self,
        turns: &[Turn],
        settings: &CompletionSettings
    ) -> Result<String, CompletionError>;

    /// Cheap authenticated call used once at startup to check the credential.
    async fn probe(&self) -> Result<(), CompletionError>;

    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ConfigurationError> {
    let api_key = config.api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigurationError::Missing)?;
    let client = OpenAIChatClient::new(api_key, config.base_url.clone()).map_err(|e|
        ConfigurationError::Invalid(e.to_string())
    )?;
    Ok(Arc::new(client))
}

/// Checks the credential against the service, mapping any failure to a
/// configuration error.
pub async fn verify_credential(client: &dyn ChatClient) -> Result<(), ConfigurationError> {
    client.probe().await.map_err(|e| ConfigurationError::Invalid(e.to_string()))
}
