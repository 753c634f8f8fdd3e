//! CLI entrypoint for the line-framed stdio transport: no arguments, no
//! flags. Exits 0 on clean stdin closure, non-zero on fatal startup
//! failure (e.g. a malformed configuration file it can't recover from).

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

    match dispatch::stdio::serve(registry).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "stdio transport terminated with an error");
            ExitCode::FAILURE
        }
    }
}
