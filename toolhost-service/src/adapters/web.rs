//! Web search and content extraction adapters.

use serde_json::{Value, json};

use crate::error::{RegistryError, RegistryResult};
use crate::loader::adapters::AdapterCtor;
use crate::registry::schema::{ParamSpec, ParamType, generate_input_schema};
use crate::registry::{Invoker, ToolCategory, ToolMetadata};

use super::util::{optional_str, optional_u64, required_str};

pub fn entries() -> Vec<(&'static str, AdapterCtor)> {
    vec![
        ("search_web", search_web as AdapterCtor),
        ("search_duckduckgo", search_duckduckgo as AdapterCtor),
        ("extract_content_from_url", extract_content_from_url as AdapterCtor),
        ("search_rss", search_rss as AdapterCtor),
    ]
}

/// DuckDuckGo's Instant Answer API. JSON, no API key, no HTML scraping —
/// the pragmatic equivalent of the source's `ddgs`-backed search without
/// pulling in an HTML parser this crate has no other use for.
fn search_duckduckgo() -> (ToolMetadata, Invoker) {
    let params = [
        ParamSpec::required("query", ParamType::String).described("Search query"),
        ParamSpec::optional("max_results", ParamType::Integer).described("Maximum number of results (default 10)"),
    ];
    let metadata = ToolMetadata::new("search_duckduckgo", "Search the web via DuckDuckGo", ToolCategory::Web)
        .with_tags(["search".to_string(), "web".to_string(), "duckduckgo".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let client = reqwest::Client::new();
    let invoker: Invoker = std::sync::Arc::new(move |args| {
        let client = client.clone();
        Box::pin(async move {
            let query = required_str(&args, "query", "search_duckduckgo")?;
            let max_results = optional_u64(&args, "max_results", 10).min(50);

            let response = client
                .get("https://api.duckduckgo.com/")
                .query(&[("q", query), ("format", "json"), ("no_redirect", "1"), ("no_html", "1")])
                .send()
                .await
                .map_err(|err| RegistryError::AdapterFailure {
                    name: "search_duckduckgo".to_string(),
                    message: err.to_string(),
                })?;

            let body: Value = response.json().await.map_err(|err| RegistryError::AdapterFailure {
                name: "search_duckduckgo".to_string(),
                message: err.to_string(),
            })?;

            let mut results = Vec::new();
            if let Some(topics) = body.get("RelatedTopics").and_then(Value::as_array) {
                for topic in topics.iter().take(max_results as usize) {
                    if let Some(text) = topic.get("Text").and_then(Value::as_str) {
                        results.push(json!({
                            "title": text,
                            "url": topic.get("FirstURL").and_then(Value::as_str).unwrap_or_default(),
                            "source": "duckduckgo",
                        }));
                    }
                }
            }

            Ok(json!({ "query": query, "results": results }))
        })
    });

    (metadata, invoker)
}

/// A thin aggregator over the single configured web-search backend.
/// The source's `unified_search` fans out over several engines and
/// merges/deduplicates; this keeps the same entrypoint name with one
/// backend wired in, leaving room to add more without renaming the
/// tool clients already call.
fn search_web() -> (ToolMetadata, Invoker) {
    let (_, duckduckgo_invoker) = search_duckduckgo();
    let params = [
        ParamSpec::required("query", ParamType::String).described("Search query"),
        ParamSpec::optional("max_results", ParamType::Integer).described("Maximum number of results (default 10)"),
    ];
    let metadata = ToolMetadata::new("search_web", "Unified web search across configured backends", ToolCategory::Web)
        .with_priority(crate::registry::ToolPriority::High)
        .with_defer_loading(false)
        .with_tags(["search".to_string(), "web".to_string()])
        .with_input_schema(generate_input_schema(&params));

    (metadata, duckduckgo_invoker)
}

fn extract_content_from_url() -> (ToolMetadata, Invoker) {
    let params = [
        ParamSpec::required("url", ParamType::String).described("Page URL to fetch and extract text from"),
        ParamSpec::optional("max_chars", ParamType::Integer).described("Truncate extracted text to this length"),
    ];
    let metadata = ToolMetadata::new("extract_content_from_url", "Fetch a page and extract its readable text", ToolCategory::Web)
        .with_tags(["web".to_string(), "extraction".to_string(), "html".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let client = reqwest::Client::new();
    let invoker: Invoker = std::sync::Arc::new(move |args| {
        let client = client.clone();
        Box::pin(async move {
            let url = required_str(&args, "url", "extract_content_from_url")?;
            let max_chars = optional_u64(&args, "max_chars", 5000) as usize;

            let response = client.get(url).send().await.map_err(|err| RegistryError::AdapterFailure {
                name: "extract_content_from_url".to_string(),
                message: err.to_string(),
            })?;

            let body = response.text().await.map_err(|err| RegistryError::AdapterFailure {
                name: "extract_content_from_url".to_string(),
                message: err.to_string(),
            })?;

            let text = strip_tags(&body);
            let truncated: String = text.chars().take(max_chars).collect();

            Ok(json!({ "url": url, "text": truncated }))
        })
    });

    (metadata, invoker)
}

/// Minimal tag stripper: good enough for "give me the readable text",
/// not a substitute for a real DOM. Collapses script/style bodies and
/// whitespace runs.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut in_tag = false;
    let mut in_script_or_style = false;
    let lower = html.to_ascii_lowercase();
    let mut chars = html.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '<' => {
                if lower[i..].starts_with("<script") || lower[i..].starts_with("<style") {
                    in_script_or_style = true;
                } else if lower[i..].starts_with("</script") || lower[i..].starts_with("</style") {
                    in_script_or_style = false;
                }
                in_tag = true;
            }
            '>' => in_tag = false,
            _ if in_tag || in_script_or_style => {}
            _ => out.push(ch),
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn search_rss() -> (ToolMetadata, Invoker) {
    let params = [
        ParamSpec::required("feed_url", ParamType::String).described("RSS/Atom feed URL"),
        ParamSpec::optional("limit", ParamType::Integer).described("Maximum number of entries (default 10)"),
    ];
    let metadata = ToolMetadata::new("search_rss", "Fetch and parse entries from an RSS/Atom feed", ToolCategory::Web)
        .with_tags(["web".to_string(), "rss".to_string(), "feed".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let client = reqwest::Client::new();
    let invoker: Invoker = std::sync::Arc::new(move |args| {
        let client = client.clone();
        Box::pin(async move {
            let feed_url = required_str(&args, "feed_url", "search_rss")?;
            let limit = optional_u64(&args, "limit", 10) as usize;

            let body = client
                .get(feed_url)
                .send()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "search_rss".to_string(), message: err.to_string() })?
                .text()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "search_rss".to_string(), message: err.to_string() })?;

            let items = parse_rss_items(&body, limit).map_err(|err| RegistryError::AdapterFailure {
                name: "search_rss".to_string(),
                message: err,
            })?;

            Ok(json!({ "feed_url": feed_url, "items": items }))
        })
    });

    (metadata, invoker)
}

/// Walks `<item>`/`<entry>` elements and pulls out title/link/description,
/// tolerant of both RSS 2.0 and Atom shapes.
fn parse_rss_items(xml: &str, limit: usize) -> Result<Vec<Value>, String> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut link = String::new();
    let mut description = String::new();
    let mut in_item = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) | Ok(Event::Empty(tag)) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).to_string();
                if name == "item" || name == "entry" {
                    in_item = true;
                    title.clear();
                    link.clear();
                    description.clear();
                }
                current_tag = name;
            }
            Ok(Event::Text(text)) if in_item => {
                let value = text.unescape().unwrap_or_default().to_string();
                match current_tag.as_str() {
                    "title" => title.push_str(&value),
                    "link" => link.push_str(&value),
                    "description" | "summary" => description.push_str(&value),
                    _ => {}
                }
            }
            Ok(Event::End(tag)) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).to_string();
                if name == "item" || name == "entry" {
                    in_item = false;
                    items.push(json!({ "title": title, "link": link, "description": description }));
                    if items.len() >= limit {
                        break;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.to_string()),
            _ => {}
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rss_items_extracts_title_and_link() {
        let xml = r#"<rss><channel><item><title>Hello</title><link>http://example.com</link></item></channel></rss>"#;
        let items = parse_rss_items(xml, 10).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Hello");
    }

    #[test]
    fn parse_rss_items_respects_limit() {
        let xml = r#"<rss><channel><item><title>A</title></item><item><title>B</title></item></channel></rss>"#;
        let items = parse_rss_items(xml, 1).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn strip_tags_drops_markup_and_script_bodies() {
        let html = "<html><head><script>evil()</script></head><body><p>Hello <b>World</b></p></body></html>";
        let text = strip_tags(html);
        assert_eq!(text, "Hello World");
    }

    #[test]
    fn search_web_metadata_is_immediate_and_high_priority() {
        let (metadata, _) = search_web();
        assert!(!metadata.defer_loading);
        assert_eq!(metadata.priority, crate::registry::ToolPriority::High);
    }
}
