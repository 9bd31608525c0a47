use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Extract the completion text from a non-streaming `/api/generate` response
pub fn generate_response_text(response: &Value) -> String {
    response
        .get("response")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Extract the assistant reply from a `/api/chat` response
pub fn chat_response_content(response: &Value) -> String {
    response
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Convert an `/api/tags` response into the set of model names
pub fn tags_to_model_names(response: Value) -> serde_json::Result<BTreeSet<String>> {
    let tags: TagsResponse = serde_json::from_value(response)?;
    Ok(tags.models.into_iter().map(|model| model.name).collect())
}
