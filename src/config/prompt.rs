use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use log::info;

pub const TRAVEL_INSTRUCTION: &str =
    "당신은 여행에 대한 정보를 안내하는 챗봇입니다. \
여행지 추천, 준비물, 예산, 교통, 문화, 음식 등 모든 주제를 친절하게 설명합니다.";

pub const OFF_TOPIC_REDIRECTION: &str =
    "여행과 관련 없는 질문을 받으면 정중하게 여행 관련 질문을 해 달라고 안내합니다.";

pub const FALLBACK_MESSAGE: &str =
    "⚠️ 응답 생성 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Prompt field '{0}' must not be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PromptPreset {
    /// General travel guide.
    #[default]
    Travel,
    /// Travel guide that steers off-topic questions back to travel.
    TravelFocused,
}

impl PromptPreset {
    pub fn instruction(&self) -> String {
        match self {
            PromptPreset::Travel => TRAVEL_INSTRUCTION.to_string(),
            PromptPreset::TravelFocused => format!("{} {}", TRAVEL_INSTRUCTION, OFF_TOPIC_REDIRECTION),
        }
    }
}

/// Fixed texts used by the chat: the seeded system instruction and the reply
/// shown when a completion fails.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptConfig {
    pub system_instruction: String,
    pub fallback_message: String,
}

impl PromptConfig {
    pub fn from_preset(preset: PromptPreset) -> Self {
        Self {
            system_instruction: preset.instruction(),
            fallback_message: FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self::from_preset(PromptPreset::default())
    }
}

#[derive(Deserialize, Debug, Default)]
struct PromptOverrides {
    system_instruction: Option<String>,
    fallback_message: Option<String>,
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<Option<String>, PromptError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(PromptError::EmptyField(field)),
        other => Ok(other),
    }
}

fn apply_overrides(base: PromptConfig, raw: &str) -> Result<PromptConfig, PromptError> {
    let overrides: PromptOverrides = serde_json::from_str(raw)?;
    let system_instruction = non_empty(overrides.system_instruction, "system_instruction")?;
    let fallback_message = non_empty(overrides.fallback_message, "fallback_message")?;

    Ok(PromptConfig {
        system_instruction: system_instruction.unwrap_or(base.system_instruction),
        fallback_message: fallback_message.unwrap_or(base.fallback_message),
    })
}

pub fn load_prompts(
    preset: PromptPreset,
    path: Option<&Path>
) -> Result<PromptConfig, PromptError> {
    let base = PromptConfig::from_preset(preset);
    let Some(path) = path else {
        return Ok(base);
    };

    let raw = fs::read_to_string(path)?;
    let config = apply_overrides(base, &raw)?;
    info!("Loaded prompt overrides from: {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_preset_adds_redirection() {
        let plain = PromptPreset::Travel.instruction();
        let focused = PromptPreset::TravelFocused.instruction();

        assert_eq!(plain, TRAVEL_INSTRUCTION);
        assert!(focused.starts_with(TRAVEL_INSTRUCTION));
        assert!(focused.ends_with(OFF_TOPIC_REDIRECTION));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let config = apply_overrides(
            PromptConfig::default(),
            r#"{ "system_instruction": "You are a hiking guide." }"#
        ).unwrap();

        assert_eq!(config.system_instruction, "You are a hiking guide.");
        assert_eq!(config.fallback_message, FALLBACK_MESSAGE);
    }

    #[test]
    fn blank_override_is_rejected() {
        let err = apply_overrides(PromptConfig::default(), r#"{ "fallback_message": "  " }"#)
            .unwrap_err();
        assert!(matches!(err, PromptError::EmptyField("fallback_message")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_prompts(PromptPreset::Travel, Some(Path::new("/nonexistent/prompts.json")))
            .unwrap_err();
        assert!(matches!(err, PromptError::Io(_)));
    }
}
