// src/application/dto/parser.rs
// Parsers for stored and freshly received advisor responses

use super::ChatResponse;
use crate::domain::errors::{AdvisorError, AdvisorResult};
use crate::domain::models::Decision;

/// Extract the reply text from a chat-completion response.
pub fn content_of(response: &serde_json::Value) -> AdvisorResult<String> {
    let parsed: ChatResponse = serde_json::from_value(response.clone())
        .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AdvisorError::MalformedResponse("response has no choices".to_string()))?;
    Ok(choice.message.content)
}

/// Parse a full chat-completion response into the decision it carries.
///
/// The decision JSON lives in the first choice's message content,
/// sometimes wrapped in a Markdown code fence.
pub fn parse_response(response: &serde_json::Value) -> AdvisorResult<Decision> {
    let content = content_of(response)?;
    let stripped = strip_code_fences(&content);
    let inner: serde_json::Value = serde_json::from_str(stripped)
        .map_err(|e| AdvisorError::MalformedResponse(format!("decision content: {}", e)))?;
    Ok(Decision::new(inner))
}

/// Parse the raw text of a stored review file.
pub fn parse_stored(raw: &str) -> AdvisorResult<Decision> {
    let response: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;
    parse_response(&response)
}

/// Remove a surrounding ```json fence, when present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.trim_end_matches('`').trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_with_content(content: &str) -> serde_json::Value {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "model": "grok-4",
        })
    }

    #[test]
    fn parses_bare_json_content() {
        let response = response_with_content(r#"{"trades": []}"#);
        let decision = parse_response(&response).unwrap();
        assert_eq!(decision.trades().unwrap().len(), 0);
    }

    #[test]
    fn parses_fenced_json_content() {
        let response =
            response_with_content("```json\n{\"trades\": [], \"daily_summary\": \"quiet\"}\n```");
        let decision = parse_response(&response).unwrap();
        assert_eq!(decision.daily_summary(), Some("quiet"));
    }

    #[test]
    fn rejects_response_without_choices() {
        let response = json!({ "choices": [] });
        assert!(matches!(
            parse_response(&response),
            Err(AdvisorError::MalformedResponse(_))
        ));
    }

    #[test]
    fn rejects_non_json_content() {
        let response = response_with_content("not json at all");
        assert!(parse_response(&response).is_err());
    }
}
