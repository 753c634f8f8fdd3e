//! Converts an adapter's return value into content blocks for the RPC
//! envelope.
//!
//! The source falls back to JSON-serializing arbitrary adapter return
//! values. Here that's a trait adapters can opt into: `ResultEncode` has
//! a default implementation for `serde_json::Value` covering the common
//! case, and adapters that already produce content blocks (image tools,
//! embedded-resource tools) implement it directly instead of going
//! through JSON.

use serde::Serialize;

/// A tagged unit of RPC output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
    Image { data: String, mime_type: String },
    Resource { uri: String, mime_type: String, text: Option<String> },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        ContentBlock::Image { data: data.into(), mime_type: mime_type.into() }
    }

    pub fn resource(uri: impl Into<String>, mime_type: impl Into<String>, text: Option<String>) -> Self {
        ContentBlock::Resource { uri: uri.into(), mime_type: mime_type.into(), text }
    }

    /// The error-carrying block every call-time failure is rendered as:
    /// a single text block whose payload begins `Error executing tool
    /// <name>: `.
    pub fn error(name: &str, message: &str) -> Self {
        ContentBlock::text(format!("Error executing tool {name}: {message}"))
    }
}

/// Converts a tool's return value into content blocks.
pub trait ResultEncode {
    fn encode(self) -> Vec<ContentBlock>;
}

impl ResultEncode for serde_json::Value {
    fn encode(self) -> Vec<ContentBlock> {
        match self {
            serde_json::Value::String(s) => vec![ContentBlock::text(s)],
            serde_json::Value::Number(n) => vec![ContentBlock::text(n.to_string())],
            serde_json::Value::Bool(b) => vec![ContentBlock::text(b.to_string())],
            serde_json::Value::Null => vec![ContentBlock::text("null")],
            other => {
                let pretty = serde_json::to_string_pretty(&other)
                    .unwrap_or_else(|_| other.to_string());
                vec![ContentBlock::text(pretty)]
            }
        }
    }
}

/// Pass-through: a tool that already returns content blocks encodes as
/// itself.
impl ResultEncode for Vec<ContentBlock> {
    fn encode(self) -> Vec<ContentBlock> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_string_encodes_to_single_text_block() {
        let blocks = json!("hello").encode();
        assert_eq!(blocks.len(), 1);
        matches!(blocks[0], ContentBlock::Text { .. });
    }

    #[test]
    fn mapping_encodes_to_pretty_printed_json_text_block() {
        let blocks = json!({"a": 1, "b": [1, 2]}).encode();
        assert_eq!(blocks.len(), 1);
        if let ContentBlock::Text { text } = &blocks[0] {
            assert!(text.contains("\"a\""));
        } else {
            panic!("expected text block");
        }
    }

    #[test]
    fn content_blocks_pass_through_unchanged() {
        let blocks = vec![ContentBlock::text("already a block")];
        let encoded = blocks.clone().encode();
        assert_eq!(encoded.len(), 1);
    }

    #[test]
    fn error_block_begins_with_standard_prefix() {
        let block = ContentBlock::error("does_not_exist", "not found");
        if let ContentBlock::Text { text } = block {
            assert!(text.starts_with("Error executing tool does_not_exist:"));
        } else {
            panic!("expected text block");
        }
    }
}
