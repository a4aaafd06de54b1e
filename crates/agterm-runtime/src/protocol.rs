//! JSON-RPC 2.0 framing for the MCP stdio transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// An incoming message. Without an `id` it is a notification and gets no
/// response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    /// Only used when answering a message whose id could not be read.
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    pub id: RequestId,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn from_error(id: RequestId, err: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(err.into()),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
}

impl From<RpcError> for ErrorObject {
    fn from(err: RpcError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Protocol-level failures. Tool failures are not RPC errors; they travel
/// inside a successful `tools/call` result with `isError` set.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RpcError {
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::InternalError(_) => -32603,
        }
    }
}

pub fn parse_request(text: &str) -> Result<Request, RpcError> {
    let request: Request =
        serde_json::from_str(text).map_err(|e| RpcError::ParseError(e.to_string()))?;
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(RpcError::InvalidRequest(format!(
            "expected jsonrpc version '{JSONRPC_VERSION}', got '{}'",
            request.jsonrpc
        )));
    }
    Ok(request)
}
