pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod render;
pub mod server;
pub mod session;

use agent::ChatAgent;
use cli::Args;
use config::prompt::load_prompts;
use llm::{ CompletionSettings, LlmConfig };
use llm::chat::{ new_client as new_chat_client, verify_credential, ChatClient };
use error::ConfigurationError;
use render::CredentialStatus;
use server::{ AppState, Server };
use session::SessionRegistry;
use log::{ info, warn, error };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Builds the completion client and runs the startup credential check. A
/// client that fails the check is still returned with a halted status so the
/// server can show the warning page.
async fn initialize_chat_client(
    args: &Args
) -> Result<(Arc<dyn ChatClient>, CredentialStatus), ConfigurationError> {
    let config = LlmConfig {
        api_key: Some(args.chat_api_key.clone()),
        base_url: Some(args.chat_base_url.clone()),
    };
    let client = new_chat_client(&config)?;

    if args.skip_probe {
        warn!("Skipping API key check; failures will surface per message.");
        return Ok((client, CredentialStatus::Unchecked));
    }

    let status = CredentialStatus::from_probe(verify_credential(client.as_ref()).await);
    match &status {
        CredentialStatus::Halted(e) => error!("Chat is locked: {}", e),
        _ => info!("API key verified against {}", client.get_base_url()),
    }
    Ok((client, status))
}

async fn build_state(args: &Args) -> Result<AppState, Box<dyn Error + Send + Sync>> {
    let prompts = load_prompts(args.prompt_preset, args.prompts_path.as_deref())?;
    let settings = CompletionSettings {
        model: args.chat_model.clone(),
        max_tokens: args.max_tokens,
        temperature: args.temperature,
    };

    let state = match initialize_chat_client(args).await {
        Ok((client, credential)) =>
            AppState::new(ChatAgent::new(client, settings, prompts), credential),
        Err(e) => {
            warn!("Chat is locked: {}", e);
            AppState::locked(e)
        }
    };
    let sessions = SessionRegistry::with_idle_timeout(Duration::from_secs(args.session_idle_secs));
    Ok(state.with_sessions(sessions))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Base URL: {}", args.chat_base_url);
    info!("Chat Model: {}", args.chat_model);
    info!("Max Tokens: {}", args.max_tokens);
    info!("Temperature: {}", args.temperature);
    info!("Prompt Preset: {:?}", args.prompt_preset);
    info!("Prompts Path: {:?}", args.prompts_path);
    info!("API Key Provided: {}", !args.chat_api_key.trim().is_empty());
    info!("Session Idle Timeout: {}s", args.session_idle_secs);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let state = build_state(&args).await?;

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    Server::new(addr, state, args).run().await
}
