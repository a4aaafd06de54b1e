//! MCP server: newline-delimited JSON-RPC over stdio.
//!
//! Requests are read one line at a time but handled concurrently, one task
//! each, so a slow bridge call never holds up the next request. All
//! responses go through a single writer task.

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::protocol::{self, Request, RequestId, Response, RpcError};
use crate::service::Terminals;
use crate::tools;

const SERVER_NAME: &str = "agterm";
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Serve on the process's stdin/stdout until stdin closes.
pub async fn run_stdio(terminals: Terminals) -> anyhow::Result<()> {
    tracing::info!("MCP server listening on stdio");
    serve(terminals, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve requests from `input`, writing responses to `output`. Returns once
/// `input` hits EOF and every in-flight request has answered.
pub async fn serve<R, W>(terminals: Terminals, input: R, output: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Response>();
    let writer = tokio::spawn(write_responses(rx, output));

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        tracing::debug!("received: {line}");

        let request = match protocol::parse_request(line) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("rejected message: {err}");
                let _ = tx.send(Response::from_error(RequestId::Null, err));
                continue;
            }
        };
        if request.is_notification() {
            tracing::debug!(method = %request.method, "notification");
            continue;
        }

        let terminals = terminals.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = handle_request(&terminals, request).await {
                let _ = tx.send(response);
            }
        });
    }

    tracing::info!("stdin closed, draining in-flight requests");
    drop(tx);
    writer.await??;
    Ok(())
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<Response>, mut output: W) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        tracing::debug!("sending: {line}");
        line.push('\n');
        output.write_all(line.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}

async fn handle_request(terminals: &Terminals, request: Request) -> Option<Response> {
    let id = request.id?;
    let params = request.params.unwrap_or(Value::Null);
    let response = match request.method.as_str() {
        "initialize" => Response::success(id, initialize_result()),
        "ping" => Response::success(id, json!({})),
        "tools/list" => Response::success(id, json!({ "tools": tools::all_tools() })),
        "tools/call" => handle_tools_call(terminals, id, params).await,
        method => {
            tracing::warn!("unknown method: {method}");
            Response::from_error(id, RpcError::MethodNotFound(method.to_string()))
        }
    };
    Some(response)
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

async fn handle_tools_call(terminals: &Terminals, id: RequestId, params: Value) -> Response {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return Response::from_error(id, RpcError::InvalidParams("missing 'name' field".into()));
    };
    if tools::get_tool(name).is_none() {
        return Response::from_error(id, RpcError::InvalidParams(format!("unknown tool: {name}")));
    }
    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    tracing::debug!(tool = name, "tool call");
    let result = tools::call_tool(terminals, name, arguments).await;
    match serde_json::to_value(&result) {
        Ok(value) => Response::success(id, value),
        Err(e) => Response::from_error(id, RpcError::InternalError(e.to_string())),
    }
}
