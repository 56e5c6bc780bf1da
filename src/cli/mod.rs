use clap::Parser;
use std::path::PathBuf;

use crate::config::prompt::PromptPreset;
use crate::llm::{ DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Completion Service Args ---
    /// API key for the completion service. Without a valid key the chat stays locked.
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Base URL of the OpenAI-compatible API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub chat_base_url: String,

    /// Model name for chat completion
    #[arg(long, env = "CHAT_MODEL", default_value = DEFAULT_MODEL)]
    pub chat_model: String,

    /// Upper bound on tokens generated per reply.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Skip the startup credential check (the key is still required).
    #[arg(long, env = "SKIP_PROBE", default_value = "false")]
    pub skip_probe: bool,

    // --- Prompt Args ---
    /// System instruction preset seeded into every new session.
    #[arg(long, env = "PROMPT_PRESET", value_enum, default_value_t = PromptPreset::Travel)]
    pub prompt_preset: PromptPreset,

    /// Optional JSON file overriding `system_instruction` and/or `fallback_message`.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<PathBuf>,

    // --- Server Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8501")]
    pub server_addr: String,

    /// Seconds a browser session may stay idle before its conversation is discarded.
    #[arg(long, env = "SESSION_IDLE_SECS", default_value_t = 86_400)]
    pub session_idle_secs: u64,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
