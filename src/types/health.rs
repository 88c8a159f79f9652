use serde::{Deserialize, Serialize};

/// Success body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` or `degraded`.
    pub status: String,

    /// Status of the tool server the orchestrator depends on.
    #[serde(rename = "mcp_server")]
    pub dependency_status: String,

    /// Number of tools the orchestrator can reach.
    pub tool_count: usize,

    /// Number of live conversations.
    pub conversation_count: usize,
}

impl HealthStatus {
    /// Returns true when the orchestrator reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
