use super::{ escape_html, render_transcript };
use crate::error::ConfigurationError;
use crate::models::chat::Turn;

const PAGE_CSS: &str = r#"<style>
body { background: linear-gradient(180deg, #f7fbff 0%, #fffef9 100%); font-family: sans-serif; margin: 0; }
.layout { display:flex; min-height:100vh; }
.sidebar { width:260px; padding:20px; background:#f0f2f6; }
.main { flex:1; padding:20px 40px; }
.header { display:flex; align-items:center; gap:12px; margin-bottom: 10px; }
.logo { font-size:32px; }
.subtitle { color:#666; }
.badge { padding:8px 12px; border-radius:8px; margin:10px 0; }
.badge.success { background:#e6f4ea; color:#1e7e34; }
.badge.warning { background:#fff8e1; color:#8a6d00; }
.badge.error { background:#fdecea; color:#b00020; }

.chat-container { max-width:900px; margin:20px auto; }
.chat-wrapper:after { content: ""; display: table; clear: both; }

.user-msg, .assistant-msg {
    padding: 12px 16px;
    border-radius: 12px;
    margin: 10px 0;
    max-width: 75%;
    line-height: 1.5;
}

.user-msg {
    background: linear-gradient(90deg,#efe6ff,#f7eaff);
    float:right;
}

.assistant-msg {
    background: linear-gradient(90deg,#e8f6ff,#f4fbff);
    float:left;
}

.meta { font-size:12px; color:#666; margin-bottom:6px; }
.time { font-size:11px; color:#999; }
form textarea { width:100%; box-sizing:border-box; }
</style>"#;

const HEADER: &str = r#"<div class="header">
  <div class="logo">🧳✈️</div>
  <div>
    <h1 style="margin:0">여행 안내 챗봇</h1>
    <div class="subtitle">여행지 추천 · 준비물 · 현지 정보까지 친절하게 안내합니다.</div>
  </div>
</div>
"#;

const EXAMPLE_PROMPT: &str = "3박4일 제주 여행 코스 추천해줘";
const INPUT_PLACEHOLDER: &str = "예: 3박4일 도쿄 여행 추천, 예산 100만원, 음식 위주";

/// Outcome of the startup credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    Verified,
    /// Key present but the probe was skipped by configuration.
    Unchecked,
    Halted(ConfigurationError),
}

impl CredentialStatus {
    pub fn from_probe(result: Result<(), ConfigurationError>) -> Self {
        match result {
            Ok(()) => CredentialStatus::Verified,
            Err(e) => CredentialStatus::Halted(e),
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, CredentialStatus::Halted(_))
    }

    /// User-facing warning when the chat is locked.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            CredentialStatus::Halted(ConfigurationError::Missing) =>
                Some("OpenAI API Key를 입력해주세요."),
            CredentialStatus::Halted(ConfigurationError::Invalid(_)) =>
                Some("잘못된 API Key입니다. 다시 확인해주세요."),
            _ => None,
        }
    }

    fn badge(&self) -> String {
        match self {
            CredentialStatus::Verified =>
                "<div class=\"badge success\">OpenAI 키 확인 완료</div>".to_string(),
            CredentialStatus::Unchecked =>
                "<div class=\"badge warning\">OpenAI 키 확인을 건너뛰었습니다.</div>".to_string(),
            CredentialStatus::Halted(ConfigurationError::Missing) =>
                format!("<div class=\"badge warning\">{}</div>", self.warning().unwrap_or_default()),
            CredentialStatus::Halted(ConfigurationError::Invalid(_)) =>
                format!("<div class=\"badge error\">{}</div>", self.warning().unwrap_or_default()),
        }
    }
}

pub struct PageContext<'a> {
    pub credential: &'a CredentialStatus,
    pub model: &'a str,
    pub turns: &'a [Turn],
}

fn render_sidebar(ctx: &PageContext<'_>) -> String {
    format!(
        "<aside class=\"sidebar\">\n<h2>⚙️ 설정</h2>\n{badge}\n<div>모델: <code>{model}</code></div>\n<hr/>\n\
         <div>💡 예시: <strong>{example}</strong></div>\n</aside>\n",
        badge = ctx.credential.badge(),
        model = escape_html(ctx.model),
        example = escape_html(EXAMPLE_PROMPT)
    )
}

fn render_form() -> String {
    format!(
        "<form method=\"post\" action=\"/\">\n\
         <label for=\"message\">질문을 입력하세요:</label>\n\
         <textarea id=\"message\" name=\"message\" rows=\"5\" placeholder=\"{placeholder}\"></textarea>\n\
         <button type=\"submit\">전송</button>\n\
         </form>\n",
        placeholder = escape_html(INPUT_PLACEHOLDER)
    )
}

/// Full HTML document. While the credential is halted only the warning is
/// shown; the input form and transcript are withheld.
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let body = if ctx.credential.is_halted() {
        String::new()
    } else {
        format!("{}{}", render_form(), render_transcript(ctx.turns))
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n<meta charset=\"utf-8\"/>\n\
         <title>여행 안내 챗봇 🧳</title>\n{css}\n</head>\n<body>\n<div class=\"layout\">\n\
         {sidebar}<main class=\"main\">\n{header}{body}</main>\n</div>\n</body>\n</html>\n",
        css = PAGE_CSS,
        sidebar = render_sidebar(ctx),
        header = HEADER,
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halted_page_has_warning_and_no_form() {
        let status = CredentialStatus::Halted(ConfigurationError::Missing);
        let turns = vec![Turn::system("sys")];
        let html = render_page(&PageContext { credential: &status, model: "gpt-4o", turns: &turns });

        assert!(html.contains("OpenAI API Key를 입력해주세요."));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn verified_page_shows_form_and_transcript() {
        let status = CredentialStatus::Verified;
        let turns = vec![Turn::system("sys"), Turn::user("<b>bold?</b>")];
        let html = render_page(&PageContext { credential: &status, model: "gpt-4o", turns: &turns });

        assert!(html.contains("OpenAI 키 확인 완료"));
        assert!(html.contains("<form method=\"post\""));
        assert!(html.contains("&lt;b&gt;bold?&lt;/b&gt;"));
        assert!(!html.contains("<b>bold?</b>"));
    }

    #[test]
    fn invalid_key_shows_error_badge() {
        let status = CredentialStatus::from_probe(Err(ConfigurationError::Invalid("401".into())));
        assert!(status.is_halted());
        assert_eq!(status.warning(), Some("잘못된 API Key입니다. 다시 확인해주세요."));
    }
}
