use crate::agent::ChatAgent;
use crate::models::chat::Turn;
use crate::render::{ render_page, PageContext };
use crate::session::SessionHandle;
use super::AppState;

use axum::{
    extract::{ Form, Json, State },
    http::{ header::{ COOKIE, SET_COOKIE }, HeaderMap, HeaderValue, StatusCode },
    response::{ Html, IntoResponse, Response },
};
use serde::{ Deserialize, Serialize };
use log::{ info, warn };

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub content: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    turns: Vec<Turn>,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

fn error_json(code: StatusCode, message: impl Into<String>) -> Response {
    (code, Json(ErrorResponse { success: false, message: message.into() })).into_response()
}

pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let mut kv = pair.trim().splitn(2, '=');
            match (kv.next(), kv.next()) {
                (Some(SESSION_COOKIE), Some(value)) if !value.is_empty() => Some(value.to_string()),
                _ => None,
            }
        })
        .next()
}

fn with_session_cookie(
    mut response: Response,
    state: &AppState,
    session_id: &str,
    created: bool
) -> Response {
    if created {
        let cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE,
            session_id,
            state.sessions.idle_timeout().as_secs()
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => warn!("Could not encode session cookie: {}", e),
        }
    }
    response
}

/// Looks up (or opens) the caller's session and makes sure it is seeded.
async fn open_session(
    state: &AppState,
    agent: &ChatAgent,
    headers: &HeaderMap
) -> (String, SessionHandle, bool) {
    let cookie = session_cookie(headers);
    let (id, handle, created) = state.sessions.open(cookie.as_deref()).await;
    agent.initialize_session(&mut *handle.lock().await);
    (id, handle, created)
}

fn page(state: &AppState, turns: &[Turn]) -> String {
    render_page(&PageContext {
        credential: &state.credential,
        model: state.model(),
        turns,
    })
}

fn locked_page(state: &AppState, code: StatusCode) -> Response {
    (code, Html(page(state, &[]))).into_response()
}

fn locked_json(state: &AppState) -> Response {
    let warning = state.credential.warning().unwrap_or("chat is unavailable");
    error_json(StatusCode::SERVICE_UNAVAILABLE, warning)
}

pub async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(agent) = state.agent() else {
        return locked_page(&state, StatusCode::OK);
    };
    let (id, handle, created) = open_session(&state, agent, &headers).await;
    let body = page(&state, handle.lock().await.turns());
    with_session_cookie(Html(body).into_response(), &state, &id, created)
}

pub async fn submit_form_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>
) -> Response {
    let Some(agent) = state.agent() else {
        return locked_page(&state, StatusCode::SERVICE_UNAVAILABLE);
    };
    let (id, handle, created) = open_session(&state, agent, &headers).await;
    let mut session = handle.lock().await;

    if let Err(e) = agent.submit(&mut session, &form.message).await {
        info!("Ignoring submission for session {}: {}", id, e);
    }
    let body = page(&state, session.turns());
    with_session_cookie(Html(body).into_response(), &state, &id, created)
}

pub async fn conversation_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(agent) = state.agent() else {
        return locked_json(&state);
    };
    let (id, handle, created) = open_session(&state, agent, &headers).await;
    let visible: Vec<Turn> = handle
        .lock().await
        .turns()
        .iter()
        .filter(|t| t.is_visible())
        .cloned()
        .collect();
    with_session_cookie(Json(visible).into_response(), &state, &id, created)
}

pub async fn chat_api_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>
) -> Response {
    let Some(agent) = state.agent() else {
        return locked_json(&state);
    };
    let (id, handle, created) = open_session(&state, agent, &headers).await;

    let mut session = handle.lock().await;
    let response = match agent.submit(&mut session, &req.content).await {
        Ok(turns) => {
            let reply = turns
                .last()
                .map(|t| t.content().to_string())
                .unwrap_or_default();
            let turns = turns.iter().filter(|t| t.is_visible()).cloned().collect();
            Json(ChatResponse { reply, turns }).into_response()
        }
        Err(e) => error_json(StatusCode::BAD_REQUEST, e.to_string()),
    };
    with_session_cookie(response, &state, &id, created)
}

pub async fn health_handler() -> impl IntoResponse {
    "ok"
}
