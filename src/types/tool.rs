use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool advertised by the orchestrator's catalog.
///
/// The catalog reaches the client in one of two shapes: the flat descriptor
/// produced by the tool server, or the function-calling envelope
/// `{"type": "function", "function": {...}}` the orchestrator proxies for
/// the language model.  Both deserialize into this type; it always
/// serializes flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ToolWire")]
pub struct ToolDescriptor {
    /// Qualified name, `<domain>.<action>`.
    pub name: String,

    /// Description intended for the language model.
    pub description: String,

    /// JSON Schema of the tool input.
    pub input_schema: Value,

    /// JSON Schema of the tool output.
    pub output_schema: Value,
}

impl ToolDescriptor {
    /// Create a descriptor with empty schemas.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: empty_schema(),
            output_schema: empty_schema(),
        }
    }

    /// The domain prefix of this tool's qualified name.
    pub fn domain(&self) -> &str {
        crate::domains::domain_of(&self.name)
    }

    /// The action part of the qualified name, after the domain.
    pub fn action(&self) -> &str {
        self.name
            .split_once(crate::domains::DOMAIN_SEPARATOR)
            .map(|(_, action)| action)
            .unwrap_or(&self.name)
    }
}

/// Success body of `GET /tools`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolListResponse {
    /// The advertised tools.
    pub tools: Vec<ToolDescriptor>,

    /// Number of tools, as reported by the server.
    #[serde(default)]
    pub count: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ToolWire {
    Function {
        function: FunctionSpec,
    },
    Flat {
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default = "empty_schema")]
        input_schema: Value,
        #[serde(default = "empty_schema")]
        output_schema: Value,
    },
}

#[derive(Deserialize)]
struct FunctionSpec {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "empty_schema")]
    parameters: Value,
}

impl From<ToolWire> for ToolDescriptor {
    fn from(wire: ToolWire) -> Self {
        match wire {
            ToolWire::Function { function } => ToolDescriptor {
                name: function.name,
                description: function.description,
                input_schema: function.parameters,
                output_schema: empty_schema(),
            },
            ToolWire::Flat {
                name,
                description,
                input_schema,
                output_schema,
            } => ToolDescriptor {
                name,
                description,
                input_schema,
                output_schema,
            },
        }
    }
}

fn empty_schema() -> Value {
    Value::Object(Map::new())
}
