use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};

use super::ChatClient;
use crate::error::CompletionError;
use crate::llm::{ CompletionSettings, DEFAULT_BASE_URL };
use crate::models::chat::Turn;

pub struct OpenAIChatClient {
    http: HttpClient,
    base_url: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct OpenAIMessage {
    role: String,
    content: Option<String>,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

impl OpenAIChatClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, CompletionError> {
        let api_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|e| CompletionError::InvalidCredential(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }
}

fn to_wire(turns: &[Turn]) -> Vec<OpenAIMessage> {
    turns
        .iter()
        .map(|turn| OpenAIMessage {
            role: turn.role().as_str().to_string(),
            content: Some(turn.content().to_string()),
        })
        .collect()
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, CompletionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(CompletionError::Status { status, body })
}

fn first_reply(resp: OpenAIResponse) -> Result<String, CompletionError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(CompletionError::EmptyResponse)
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        turns: &[Turn],
        settings: &CompletionSettings
    ) -> Result<String, CompletionError> {
        let url = self.endpoint("/v1/chat/completions");
        let req = OpenAIChatRequest {
            model: &settings.model,
            messages: to_wire(turns),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        };
        debug!("Sending {} messages to {} (model {})", req.messages.len(), url, settings.model);

        let resp = self.http.post(&url).json(&req).send().await?;
        let resp = check_status(resp).await?.json::<OpenAIResponse>().await?;
        first_reply(resp)
    }

    async fn probe(&self) -> Result<(), CompletionError> {
        let resp = self.http.get(self.endpoint("/v1/models")).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_full_history_and_sampling() {
        let turns = vec![Turn::system("sys"), Turn::user("hi"), Turn::assistant("hello")];
        let settings = CompletionSettings::default();
        let req = OpenAIChatRequest {
            model: &settings.model,
            messages: to_wire(&turns),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["max_tokens"], 700);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][2]["content"], "hello");
        assert!(value["messages"][1].get("timestamp").is_none());
    }

    #[test]
    fn first_reply_extracts_content() {
        let resp: OpenAIResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"제주 여행 코스: ..."}}]}"#
        ).unwrap();
        assert_eq!(first_reply(resp).unwrap(), "제주 여행 코스: ...");
    }

    #[test]
    fn missing_content_is_empty_response() {
        let resp: OpenAIResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#
        ).unwrap();
        assert!(matches!(first_reply(resp), Err(CompletionError::EmptyResponse)));

        let resp: OpenAIResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_reply(resp), Err(CompletionError::EmptyResponse)));
    }

    #[test]
    fn base_url_defaults_and_trims() {
        let client = OpenAIChatClient::new("sk-test".into(), None).unwrap();
        assert_eq!(client.get_base_url(), "https://api.openai.com");

        let client = OpenAIChatClient::new("sk-test".into(), Some("http://localhost:11434/".into())).unwrap();
        assert_eq!(client.endpoint("/v1/models"), "http://localhost:11434/v1/models");
    }
}
