//! File management adapters, sandboxed to a single root directory so a
//! malicious `path` argument can't walk outside it.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::error::{RegistryError, RegistryResult};
use crate::loader::adapters::AdapterCtor;
use crate::registry::schema::{ParamSpec, ParamType, generate_input_schema};
use crate::registry::{Invoker, ToolCategory, ToolMetadata};

use super::util::required_str;

pub fn entries() -> Vec<(&'static str, AdapterCtor)> {
    vec![
        ("read_file", read_file as AdapterCtor),
        ("write_file", write_file as AdapterCtor),
        ("list_files", list_files as AdapterCtor),
    ]
}

fn files_root() -> PathBuf {
    std::env::var("TOOLHOST_FILES_ROOT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./data"))
}

/// Resolve a caller-supplied relative path against the sandbox root,
/// rejecting anything that escapes it via `..` or an absolute path.
fn resolve_sandboxed(relative: &str, tool: &str) -> RegistryResult<PathBuf> {
    if Path::new(relative).is_absolute() || relative.split('/').any(|part| part == "..") {
        return Err(RegistryError::InvalidArgument {
            name: tool.to_string(),
            message: format!("path `{relative}` escapes the sandboxed files root"),
        });
    }
    Ok(files_root().join(relative))
}

fn read_file() -> (ToolMetadata, Invoker) {
    let params = [ParamSpec::required("path", ParamType::String).described("Path relative to the files root")];
    let metadata = ToolMetadata::new("read_file", "Read a text file's contents", ToolCategory::Files)
        .with_tags(["files".to_string(), "io".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = std::sync::Arc::new(move |args| {
        Box::pin(async move {
            let relative = required_str(&args, "path", "read_file")?;
            let path = resolve_sandboxed(relative, "read_file")?;

            let contents = tokio::fs::read_to_string(&path).await.map_err(|err| RegistryError::AdapterFailure {
                name: "read_file".to_string(),
                message: format!("{relative}: {err}"),
            })?;

            Ok(json!({ "path": relative, "contents": contents }))
        })
    });

    (metadata, invoker)
}

fn write_file() -> (ToolMetadata, Invoker) {
    let params = [
        ParamSpec::required("path", ParamType::String).described("Path relative to the files root"),
        ParamSpec::required("contents", ParamType::String).described("Text to write"),
    ];
    let metadata = ToolMetadata::new("write_file", "Write text to a file, creating parent directories as needed", ToolCategory::Files)
        .with_tags(["files".to_string(), "io".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = std::sync::Arc::new(move |args| {
        Box::pin(async move {
            let relative = required_str(&args, "path", "write_file")?;
            let contents = required_str(&args, "contents", "write_file")?;
            let path = resolve_sandboxed(relative, "write_file")?;

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|err| RegistryError::AdapterFailure {
                    name: "write_file".to_string(),
                    message: err.to_string(),
                })?;
            }

            tokio::fs::write(&path, contents).await.map_err(|err| RegistryError::AdapterFailure {
                name: "write_file".to_string(),
                message: format!("{relative}: {err}"),
            })?;

            Ok(json!({ "path": relative, "bytes_written": contents.len() }))
        })
    });

    (metadata, invoker)
}

fn list_files() -> (ToolMetadata, Invoker) {
    let params = [ParamSpec::optional("path", ParamType::String).described("Directory relative to the files root; defaults to its top level")];
    let metadata = ToolMetadata::new("list_files", "List files in a directory under the files root", ToolCategory::Files)
        .with_tags(["files".to_string(), "io".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = std::sync::Arc::new(move |args| {
        Box::pin(async move {
            let relative = args.get("path").and_then(serde_json::Value::as_str).unwrap_or("");
            let path = if relative.is_empty() { files_root() } else { resolve_sandboxed(relative, "list_files")? };

            let mut entries = tokio::fs::read_dir(&path).await.map_err(|err| RegistryError::AdapterFailure {
                name: "list_files".to_string(),
                message: err.to_string(),
            })?;

            let mut names = Vec::new();
            while let Some(entry) = entries.next_entry().await.map_err(|err| RegistryError::AdapterFailure {
                name: "list_files".to_string(),
                message: err.to_string(),
            })? {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
            names.sort();

            Ok(json!({ "path": relative, "entries": names }))
        })
    });

    (metadata, invoker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_sandboxed_rejects_parent_traversal() {
        assert!(resolve_sandboxed("../etc/passwd", "read_file").is_err());
    }

    #[test]
    fn resolve_sandboxed_rejects_absolute_paths() {
        assert!(resolve_sandboxed("/etc/passwd", "read_file").is_err());
    }

    #[test]
    fn resolve_sandboxed_accepts_plain_relative_paths() {
        assert!(resolve_sandboxed("notes/today.txt", "read_file").is_ok());
    }
}
