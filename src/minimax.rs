use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::json;
use tracing::debug;

const BASE_URL: &str = "https://api.minimax.io/v1";
const MODEL: &str = "MiniMax-M2.5";

static THINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

/// Chat-completions client for MiniMax M2.5 (OpenAI-compatible API).
/// One request/response exchange per call, no retries.
pub struct MiniMax {
    http: reqwest::Client,
    api_key: String,
}

impl MiniMax {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MINIMAX_API_KEY")
            .map_err(|_| anyhow!("MINIMAX_API_KEY environment variable must be set"))?;
        Ok(MiniMax {
            http: reqwest::Client::new(),
            api_key,
        })
    }

    /// Send one system + user message pair and return the assistant reply
    /// with any reasoning-trace wrapper stripped.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": MODEL,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let resp = self
            .http
            .post(format!("{BASE_URL}/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let reply: serde_json::Value = resp.json().await?;
        debug!(model = MODEL, "chat completion received");

        let content = reply
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| anyhow!("no message content in MiniMax response: {reply}"))?;

        Ok(strip_think_tags(content))
    }
}

/// Remove <think>...</think> reasoning blocks from M2.5 output.
pub fn strip_think_tags(text: &str) -> String {
    THINK_RE.replace_all(text, "").trim().to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_think_block() {
        let text = "<think>let me reason about this</think>\nHi Jane,";
        assert_eq!(strip_think_tags(text), "Hi Jane,");
    }

    #[test]
    fn strips_multiline_think_block() {
        let text = "<think>line one\nline two\n</think>\n\nThe answer.";
        assert_eq!(strip_think_tags(text), "The answer.");
    }

    #[test]
    fn strips_multiple_blocks() {
        let text = "<think>a</think>one<think>b</think> two";
        assert_eq!(strip_think_tags(text), "one two");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_think_tags("  plain reply  "), "plain reply");
    }
}
