//! Line-delimited JSON-RPC transport over stdin/stdout, the shape most
//! MCP clients launch a local server with: one JSON request per line in,
//! one JSON response per line out, no framing beyond the newline.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::RegistryResult;
use crate::registry::Registry;

use super::handle_request;
use super::protocol::{McpError, McpRequest, McpResponse};

pub async fn serve(registry: Registry) -> RegistryResult<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    tracing::info!("stdio transport ready, reading JSON-RPC requests from stdin");

    while let Some(line) = lines.next_line().await.map_err(|err| crate::error::RegistryError::TransportError { message: err.to_string() })? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<McpRequest>(&line) {
            Ok(request) => handle_request(&registry, request).await,
            Err(err) => McpResponse::failure(serde_json::Value::Null, McpError::invalid_params(format!("malformed JSON-RPC request: {err}"))),
        };

        let encoded = serde_json::to_string(&response).map_err(|err| crate::error::RegistryError::TransportError { message: err.to_string() })?;
        stdout
            .write_all(encoded.as_bytes())
            .await
            .map_err(|err| crate::error::RegistryError::TransportError { message: err.to_string() })?;
        stdout.write_all(b"\n").await.map_err(|err| crate::error::RegistryError::TransportError { message: err.to_string() })?;
        stdout.flush().await.map_err(|err| crate::error::RegistryError::TransportError { message: err.to_string() })?;
    }

    tracing::info!("stdin closed, stdio transport shutting down");
    Ok(())
}
