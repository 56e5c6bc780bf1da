use axum::{
    extract::State,
    http::{ header::AUTHORIZATION, HeaderMap, StatusCode },
    response::{ IntoResponse, Response },
    routing::{ get, post },
    Json, Router,
};
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };

use travel_chat::agent::ChatAgent;
use travel_chat::config::prompt::{ PromptConfig, FALLBACK_MESSAGE };
use travel_chat::error::{ CompletionError, ConfigurationError };
use travel_chat::llm::CompletionSettings;
use travel_chat::llm::chat::openai::OpenAIChatClient;
use travel_chat::llm::chat::{ verify_credential, ChatClient };
use travel_chat::models::chat::Role;
use travel_chat::session::SessionStore;

/// How the local completion service answers `/v1/chat/completions`.
#[derive(Clone, Copy)]
enum Reply {
    Ok,
    ServerError,
    Garbage,
    NoChoices,
}

#[derive(Clone)]
struct ServiceState {
    reply: Reply,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn models(headers: HeaderMap) -> StatusCode {
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some("Bearer sk-good") => StatusCode::OK,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn completions(State(state): State<ServiceState>, Json(body): Json<Value>) -> Response {
    state.requests.lock().unwrap().push(body);
    match state.reply {
        Reply::Ok =>
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "제주 여행 코스: ..." } }]
            })).into_response(),
        Reply::ServerError =>
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        Reply::Garbage => "<html>not json</html>".into_response(),
        Reply::NoChoices => Json(json!({ "choices": [] })).into_response(),
    }
}

async fn spawn_service(reply: Reply) -> (String, Arc<Mutex<Vec<Value>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1/models", get(models))
        .route("/v1/chat/completions", post(completions))
        .with_state(ServiceState { reply, requests: Arc::clone(&requests) });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), requests)
}

fn client(base_url: &str, key: &str) -> OpenAIChatClient {
    OpenAIChatClient::new(key.to_string(), Some(base_url.to_string())).unwrap()
}

fn agent(base_url: &str) -> ChatAgent {
    ChatAgent::new(
        Arc::new(client(base_url, "sk-good")),
        CompletionSettings::default(),
        PromptConfig::default()
    )
}

#[tokio::test]
async fn unauthorized_models_call_is_invalid_credential() {
    let (base, _) = spawn_service(Reply::Ok).await;

    let result = verify_credential(&client(&base, "sk-revoked")).await;
    assert!(matches!(result, Err(ConfigurationError::Invalid(_))));

    assert_eq!(verify_credential(&client(&base, "sk-good")).await, Ok(()));
}

#[tokio::test]
async fn unreachable_service_is_invalid_credential() {
    let result = verify_credential(&client("http://127.0.0.1:9", "sk-good")).await;
    assert!(matches!(result, Err(ConfigurationError::Invalid(_))));
}

#[tokio::test]
async fn successful_completion_sends_history_and_sampling() {
    let (base, requests) = spawn_service(Reply::Ok).await;
    let agent = agent(&base);
    let mut session = SessionStore::new();
    agent.initialize_session(&mut session);

    let turns = agent.submit(&mut session, "3박4일 제주 여행 코스 추천해줘").await.unwrap();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2].role(), Role::Assistant);
    assert_eq!(turns[2].content(), "제주 여행 코스: ...");

    let requests = requests.lock().unwrap();
    let body = &requests[0];
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["max_tokens"], 700);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "3박4일 제주 여행 코스 추천해줘");
}

#[tokio::test]
async fn server_error_is_status_error() {
    let (base, _) = spawn_service(Reply::ServerError).await;
    let turns = vec![travel_chat::models::chat::Turn::user("hi")];

    let err = client(&base, "sk-good")
        .complete(&turns, &CompletionSettings::default()).await
        .unwrap_err();
    match err {
        CompletionError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn failing_service_appends_fallback_turn() {
    for reply in [Reply::ServerError, Reply::Garbage, Reply::NoChoices] {
        let (base, _) = spawn_service(reply).await;
        let agent = agent(&base);
        let mut session = SessionStore::new();
        agent.initialize_session(&mut session);

        let turns = agent.submit(&mut session, "hello").await.unwrap();

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].role(), Role::Assistant);
        assert_eq!(turns[2].content(), FALLBACK_MESSAGE);
    }
}
