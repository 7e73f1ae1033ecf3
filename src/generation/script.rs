//! Script request preparation

use base64::Engine;

use super::types::ScriptRequest;

/// Book text above this many characters is cut before generation
pub const SAFETY_THRESHOLD: usize = 200_000;

/// Prompt used when the user does not supply one
pub const DEFAULT_SCRIPT_PROMPT: &str = "I host a reading and emotions podcast called \
\"Nothing Impossible\". Please read through this book and write a podcast script for me. \
The language should be natural and fluent, engaging, easy to follow, warm and moving, \
and the episode should run about one hour. Also write the show notes for this episode.";

/// Script request ready to send, with the truncation warning if one applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedScript {
    pub request: ScriptRequest,
    pub warning: Option<String>,
}

/// Build a `generateScript` payload.
///
/// Plain-text content longer than [`SAFETY_THRESHOLD`] characters is cut to
/// that length and re-encoded; the returned warning says so.
pub fn prepare_script_request(
    content_base64: &str,
    text: Option<&str>,
    mime_type: &str,
    prompt: Option<&str>,
) -> PreparedScript {
    let custom_prompt = prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_SCRIPT_PROMPT)
        .to_string();

    let mut final_base64 = content_base64.to_string();
    let mut warning = None;

    if let Some(text) = text.filter(|_| mime_type == "text/plain") {
        let length = text.chars().count();
        if length > SAFETY_THRESHOLD {
            let truncated: String = text.chars().take(SAFETY_THRESHOLD).collect();
            final_base64 = base64::engine::general_purpose::STANDARD.encode(truncated.as_bytes());
            warning = Some(format!(
                "The book text is too long ({length} characters); only the first \
                 {SAFETY_THRESHOLD} characters were sent for generation."
            ));
            tracing::warn!(length, limit = SAFETY_THRESHOLD, "Truncated book text");
        }
    }

    PreparedScript {
        request: ScriptRequest {
            final_base64,
            final_mime_type: mime_type.to_string(),
            custom_prompt,
        },
        warning,
    }
}
