//! CLI entrypoint for the HTTP streaming transport. Reads `PORT` from
//! the environment (default 8080); no other arguments.

use std::process::ExitCode;

use toolhost_service::{build_registry, dispatch, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let (registry, _categories) = match build_registry().await {
        Ok(built) => built,
        Err(err) => {
            tracing::error!(error = %err, "failed to build tool registry");
            return ExitCode::FAILURE;
        }
    };

    match dispatch::http::serve(registry).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "HTTP transport terminated with an error");
            ExitCode::FAILURE
        }
    }
}
