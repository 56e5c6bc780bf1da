pub mod api;

use crate::agent::ChatAgent;
use crate::cli::Args;
use crate::error::ConfigurationError;
use crate::render::CredentialStatus;
use crate::session::SessionRegistry;

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{ routing::get, Router };
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Clone)]
pub struct AppState {
    agent: Option<ChatAgent>,
    pub sessions: SessionRegistry,
    pub credential: Arc<CredentialStatus>,
}

impl AppState {
    pub fn new(agent: ChatAgent, credential: CredentialStatus) -> Self {
        Self {
            agent: Some(agent),
            sessions: SessionRegistry::new(),
            credential: Arc::new(credential),
        }
    }

    /// State for a server that could not build a completion client at all.
    pub fn locked(error: ConfigurationError) -> Self {
        Self {
            agent: None,
            sessions: SessionRegistry::new(),
            credential: Arc::new(CredentialStatus::Halted(error)),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = sessions;
        self
    }

    /// The agent, unless the credential check halted the chat.
    pub fn agent(&self) -> Option<&ChatAgent> {
        if self.credential.is_halted() {
            return None;
        }
        self.agent.as_ref()
    }

    pub fn model(&self) -> &str {
        self.agent.as_ref().map(|a| a.settings().model.as_str()).unwrap_or_default()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/conversation", get(api::conversation_handler))
        .route("/chat", axum::routing::post(api::chat_api_handler))
        .layer(cors);

    Router::new()
        .route("/", get(api::index_handler).post(api::submit_form_handler))
        .route("/healthz", get(api::health_handler))
        .nest("/api", api)
        .with_state(state)
}

pub struct Server {
    addr: String,
    state: AppState,
    args: Args,
}

impl Server {
    pub fn new(addr: String, state: AppState, args: Args) -> Self {
        Self { addr, state, args }
    }

    pub async fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = router(self.state);

        if self.args.enable_tls {
            let (cert_path, key_path) = match (&self.args.tls_cert_path, &self.args.tls_key_path) {
                (Some(cert), Some(key)) => (cert, key),
                (Some(_), None) | (None, Some(_)) => {
                    error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                    return Err("Missing TLS certificate or key path".into());
                }
                (None, None) => {
                    error!("--enable-tls was set but no certificate/key paths provided.");
                    return Err("TLS enabled without cert/key".into());
                }
            };
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                cert_path,
                key_path
            );
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            info!("Chat server listening on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        } else {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
                e
            })?;
            info!("Chat server listening on: http://{}", addr);
            axum::serve(listener, app.into_make_service()).await?;
        }

        Ok(())
    }
}
