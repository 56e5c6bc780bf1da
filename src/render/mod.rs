mod page;

pub use page::{ render_page, CredentialStatus, PageContext };

use crate::models::chat::{ Role, Turn };

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Escapes HTML-special characters so untrusted text is shown literally.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes `text` and turns line breaks into `<br/>`.
pub fn text_to_html(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br/>")
}

fn role_label(role: Role) -> Option<(&'static str, &'static str)> {
    match role {
        Role::User => Some(("user-msg", "👤 사용자")),
        Role::Assistant => Some(("assistant-msg", "🤖 챗봇")),
        Role::System => None,
    }
}

pub fn render_turn(turn: &Turn) -> Option<String> {
    let (class, label) = role_label(turn.role())?;
    let time_label = turn
        .timestamp()
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_default();

    Some(format!(
        "<div class=\"chat-wrapper\">\n\
         <div class=\"{class}\" data-role=\"{role}\">\n\
         <div class=\"meta\">{label} <span class=\"time\">{time}</span></div>\n\
         {content}\n\
         </div>\n\
         </div>\n",
        class = class,
        role = turn.role(),
        label = label,
        time = time_label,
        content = text_to_html(turn.content())
    ))
}

/// Renders the visible transcript in conversation order. System turns are skipped.
pub fn render_transcript(turns: &[Turn]) -> String {
    let mut html = String::from("<div class=\"chat-container\">\n");
    for block in turns.iter().filter_map(render_turn) {
        html.push_str(&block);
    }
    html.push_str("</div>\n");
    html
}
