use serde::{Deserialize, Serialize};

/// Body of a non-success response.
///
/// The orchestrator reports failures as `{"detail": "..."}`.  Validation
/// failures carry a list instead of a string; those leave `detail` empty so
/// the caller falls back to the status phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    #[serde(default, deserialize_with = "string_or_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Parse an error body, returning the detail when it is a string.
    pub fn detail_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.detail)
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}
