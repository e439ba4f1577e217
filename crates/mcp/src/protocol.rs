//! Wire types for the five protocol operations.
//!
//! The protocol is modeled on JSON-RPC 2.0 but carried over plain HTTP:
//! one endpoint per operation, JSON bodies, and a structured
//! `{code, message, data?}` error object with the HTTP status derived from
//! the error kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /mcp/initialize`. All fields optional; an empty body is a
/// legal negotiation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeRequest {
    pub client_name: Option<String>,
    pub client_version: Option<String>,
    /// Correlation id echoed back in error responses.
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Static capability map: which feature groups this server supports.
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub resources: ResourceCapabilities,
    pub tools: ToolCapabilities,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceCapabilities {
    pub list: bool,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolCapabilities {
    pub list: bool,
    pub call: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitializeResponse {
    pub server: ServerInfo,
    pub capabilities: Capabilities,
}

impl InitializeResponse {
    #[must_use]
    pub fn current() -> Self {
        Self {
            server: ServerInfo {
                name: "remilk",
                version: env!("CARGO_PKG_VERSION"),
            },
            capabilities: Capabilities {
                resources: ResourceCapabilities {
                    list: true,
                    read: true,
                },
                tools: ToolCapabilities {
                    list: true,
                    call: true,
                },
            },
        }
    }
}

/// Body of `POST /mcp/call_tool`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallToolRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Correlation id echoed back in error responses.
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallToolResponse {
    pub result: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadResourceResponse {
    pub content: String,
    pub mime_type: &'static str,
}
