use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::minimax::MiniMax;

static FENCE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```(?:json)?\s*").unwrap());
static FENCE_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*```$").unwrap());
static OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// One scene of the generated video: spoken narration for TTS plus an
/// image-generation prompt for the visual. Wire format is camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub scene_number: u32,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub visual_prompt: String,
    #[serde(default)]
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoScript {
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub full_narration: String,
}

impl VideoScript {
    pub fn total_seconds(&self) -> u32 {
        self.scenes.iter().map(|s| s.duration_seconds).sum()
    }
}

/// The model's reply contained no parseable JSON even after fence stripping
/// and brace extraction. Carries the verbatim reply for diagnosis.
#[derive(Debug, Error)]
#[error("script model did not return valid JSON.\nRaw response:\n{raw}")]
pub struct ScriptParseError {
    pub raw: String,
}

const SCRIPT_SYSTEM: &str = "You are a world-class sales video scriptwriter for B2B outreach. \
You write personalized 60-second video scripts that get replies. \
Every script references specific prospect details — never generic. \
You respond ONLY with valid JSON — no markdown, no code fences, no explanation.";

const SCRIPT_SHAPE: &str = r#"{
  "scenes": [
    {
      "sceneNumber": 1,
      "narration": "...",
      "visualPrompt": "...",
      "durationSeconds": 12
    },
    {
      "sceneNumber": 2,
      "narration": "...",
      "visualPrompt": "...",
      "durationSeconds": 22
    },
    {
      "sceneNumber": 3,
      "narration": "...",
      "visualPrompt": "...",
      "durationSeconds": 12
    }
  ],
  "fullNarration": "<scene 1 + scene 2 + scene 3 narration joined>"
}"#;

/// Generate a structured 3-scene personalized video script.
///
/// Scene layout: Hook (10-15s), Pain + Solution (20-25s), CTA (10-15s).
/// The narration is spoken verbatim by TTS; the visual prompt feeds an
/// image generator.
pub async fn generate(
    minimax: &MiniMax,
    summary: &str,
    email: &str,
    sender_name: &str,
    product_description: &str,
) -> Result<VideoScript> {
    let domain = email.split_once('@').map(|(_, d)| d).unwrap_or("");
    let company_hint = domain
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .unwrap_or_else(|| "their company".to_string());

    let prompt = format!(
        "Write a 3-scene personalized sales video script for a prospect at {company_hint}.\n\n\
         SENDER: {sender_name}\n\n\
         PRODUCT:\n{product_description}\n\n\
         PROSPECT RESEARCH:\n{summary}\n\n\
         SCENE RULES:\n\
         - Total narration: under 150 words (~60 seconds spoken)\n\
         - Scene 1 — Hook (10-15s): Address prospect BY NAME. Reference ONE specific \
           detail from their research (recent news, product, funding, or challenge).\n\
         - Scene 2 — Pain + Solution (20-25s): Name a concrete pain point for their \
           role/industry. Position the product as the direct fix.\n\
         - Scene 3 — CTA (10-15s): {sender_name} signs off. \
           Mention their company name. Clear, low-friction CTA (15-min call or quick demo).\n\
         - narration must be plain spoken text only — NO markdown, asterisks, \
           parenthetical directions, or special formatting. \
           It will be read aloud by TTS exactly as written.\n\
         - visualPrompt: vivid AI image generation prompt describing the scene — \
           subject, setting, lighting, color palette, camera angle. \
           NO text, no logos, no real person names. Cinematic, photorealistic style.\n\
         - durationSeconds: estimated spoken time (~2.5 words per second)\n\n\
         Return ONLY this JSON structure (no code fences, no extra text):\n{SCRIPT_SHAPE}"
    );

    let raw = minimax.chat(SCRIPT_SYSTEM, &prompt).await?;
    debug!(bytes = raw.len(), "script reply received");
    Ok(coerce_script(&raw)?)
}

/// Coerce free-form model output into the fixed script shape.
///
/// Strips wrapping code fences, tries a direct parse, then falls back to the
/// first brace-delimited substring. Both failing is a hard error carrying the
/// raw reply. A missing or empty fullNarration is synthesized from the scene
/// narrations in sceneNumber order.
pub fn coerce_script(raw: &str) -> Result<VideoScript, ScriptParseError> {
    let cleaned = strip_fences(raw);

    let parsed: Option<VideoScript> = serde_json::from_str(&cleaned).ok().or_else(|| {
        OBJECT_RE
            .find(&cleaned)
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
    });

    let mut script = parsed.ok_or_else(|| ScriptParseError {
        raw: raw.to_string(),
    })?;

    if script.full_narration.trim().is_empty() {
        script.full_narration = join_narration(&script.scenes);
    }
    Ok(script)
}

/// Remove a leading ```/```json fence and a trailing ``` fence, if present.
fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let opened = FENCE_OPEN_RE.replace(trimmed, "");
    FENCE_CLOSE_RE.replace(&opened, "").into_owned()
}

/// Scene narrations joined with single spaces, ordered by sceneNumber.
fn join_narration(scenes: &[Scene]) -> String {
    let mut ordered: Vec<&Scene> = scenes.iter().collect();
    ordered.sort_by_key(|s| s.scene_number);
    ordered
        .iter()
        .map(|s| s.narration.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "scenes": [
            {"sceneNumber": 1, "narration": "A.", "visualPrompt": "v1", "durationSeconds": 12},
            {"sceneNumber": 2, "narration": "B.", "visualPrompt": "v2", "durationSeconds": 22},
            {"sceneNumber": 3, "narration": "C.", "visualPrompt": "v3", "durationSeconds": 12}
        ],
        "fullNarration": "A. B. C."
    }"#;

    #[test]
    fn parses_plain_json() {
        let script = coerce_script(VALID).unwrap();
        assert_eq!(script.scenes.len(), 3);
        assert_eq!(script.scenes[1].narration, "B.");
        assert_eq!(script.full_narration, "A. B. C.");
        assert_eq!(script.total_seconds(), 46);
    }

    #[test]
    fn ignores_code_fences() {
        let fenced = format!("```json\n{VALID}\n```");
        let script = coerce_script(&fenced).unwrap();
        assert_eq!(script.scenes.len(), 3);
    }

    #[test]
    fn ignores_untagged_fences() {
        let fenced = format!("```\n{VALID}\n```");
        assert_eq!(coerce_script(&fenced).unwrap().scenes.len(), 3);
    }

    #[test]
    fn falls_back_to_brace_extraction() {
        let chatty = format!("Sure! Here is your script:\n{VALID}\nHope that helps.");
        let script = coerce_script(&chatty).unwrap();
        assert_eq!(script.scenes.len(), 3);
        assert_eq!(script.full_narration, "A. B. C.");
    }

    #[test]
    fn garbage_is_a_hard_error_carrying_raw_text() {
        let raw = "I cannot produce a script right now.";
        let err = coerce_script(raw).unwrap_err();
        assert_eq!(err.raw, raw);
        assert!(err.to_string().contains(raw));
    }

    #[test]
    fn unparseable_braces_still_carry_raw_text() {
        let raw = "here you go {definitely: not json}";
        let err = coerce_script(raw).unwrap_err();
        assert_eq!(err.raw, raw);
    }

    #[test]
    fn synthesizes_full_narration_in_scene_number_order() {
        let out_of_order = r#"{
            "scenes": [
                {"sceneNumber": 2, "narration": "B.", "visualPrompt": "", "durationSeconds": 20},
                {"sceneNumber": 1, "narration": "A.", "visualPrompt": "", "durationSeconds": 10},
                {"sceneNumber": 3, "narration": "C.", "visualPrompt": "", "durationSeconds": 10}
            ]
        }"#;
        let script = coerce_script(out_of_order).unwrap();
        assert_eq!(script.full_narration, "A. B. C.");
    }

    #[test]
    fn keeps_provided_full_narration() {
        let script = coerce_script(VALID).unwrap();
        assert_eq!(script.full_narration, "A. B. C.");
    }

    #[test]
    fn shapeless_json_passes_through() {
        // No schema validation beyond JSON shape: an empty object is a
        // valid (empty) script
        let script = coerce_script("{}").unwrap();
        assert!(script.scenes.is_empty());
        assert_eq!(script.full_narration, "");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let with_extras = r#"{
            "scenes": [
                {"sceneNumber": 1, "narration": "A.", "visualPrompt": "v", "durationSeconds": 12, "mood": "warm"}
            ],
            "fullNarration": "A.",
            "model": "whatever"
        }"#;
        assert_eq!(coerce_script(with_extras).unwrap().scenes.len(), 1);
    }

    #[test]
    fn scene_serializes_camel_case() {
        let script = coerce_script(VALID).unwrap();
        let json = serde_json::to_string(&script.scenes[0]).unwrap();
        assert!(json.contains("sceneNumber"));
        assert!(json.contains("visualPrompt"));
        assert!(json.contains("durationSeconds"));
    }
}
