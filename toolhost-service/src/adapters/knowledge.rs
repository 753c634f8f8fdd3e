//! Knowledge and academic-research adapters.

use serde_json::{Value, json};

use crate::error::{RegistryError, RegistryResult};
use crate::loader::adapters::AdapterCtor;
use crate::registry::schema::{ParamSpec, ParamType, generate_input_schema};
use crate::registry::{Invoker, ToolCategory, ToolMetadata};

use super::util::{optional_u64, required_str};

pub fn entries() -> Vec<(&'static str, AdapterCtor)> {
    vec![
        ("search_wikipedia", search_wikipedia as AdapterCtor),
        ("get_wikipedia_summary", get_wikipedia_summary as AdapterCtor),
    ]
}

fn search_wikipedia() -> (ToolMetadata, Invoker) {
    let params = [
        ParamSpec::required("query", ParamType::String).described("Search query"),
        ParamSpec::optional("limit", ParamType::Integer).described("Maximum number of results (default 10)"),
    ];
    let metadata = ToolMetadata::new("search_wikipedia", "Search Wikipedia article titles", ToolCategory::Knowledge)
        .with_tags(["wikipedia".to_string(), "knowledge".to_string(), "encyclopedia".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let client = reqwest::Client::new();
    let invoker: Invoker = std::sync::Arc::new(move |args| {
        let client = client.clone();
        Box::pin(async move {
            let query = required_str(&args, "query", "search_wikipedia")?;
            let limit = optional_u64(&args, "limit", 10).min(50);

            let body: Value = client
                .get("https://en.wikipedia.org/w/api.php")
                .query(&[
                    ("action", "query"),
                    ("list", "search"),
                    ("format", "json"),
                    ("srsearch", query),
                    ("srlimit", &limit.to_string()),
                ])
                .send()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "search_wikipedia".to_string(), message: err.to_string() })?
                .json()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "search_wikipedia".to_string(), message: err.to_string() })?;

            let results = body
                .get("query")
                .and_then(|q| q.get("search"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|item| {
                    json!({
                        "title": item.get("title").cloned().unwrap_or(Value::Null),
                        "snippet": item.get("snippet").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect::<Vec<_>>();

            Ok(json!({ "query": query, "results": results }))
        })
    });

    (metadata, invoker)
}

fn get_wikipedia_summary() -> (ToolMetadata, Invoker) {
    let params = [ParamSpec::required("title", ParamType::String).described("Exact Wikipedia article title")];
    let metadata = ToolMetadata::new("get_wikipedia_summary", "Fetch a Wikipedia article's lead summary", ToolCategory::Knowledge)
        .with_tags(["wikipedia".to_string(), "knowledge".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let client = reqwest::Client::new();
    let invoker: Invoker = std::sync::Arc::new(move |args| {
        let client = client.clone();
        Box::pin(async move {
            let title = required_str(&args, "title", "get_wikipedia_summary")?;
            let encoded = urlencoding::encode(title);
            let url = format!("https://en.wikipedia.org/api/rest_v1/page/summary/{encoded}");

            let body: Value = client
                .get(&url)
                .send()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "get_wikipedia_summary".to_string(), message: err.to_string() })?
                .json()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "get_wikipedia_summary".to_string(), message: err.to_string() })?;

            Ok(json!({
                "title": body.get("title").cloned().unwrap_or(Value::Null),
                "extract": body.get("extract").cloned().unwrap_or(Value::Null),
                "url": body
                    .get("content_urls")
                    .and_then(|u| u.get("desktop"))
                    .and_then(|d| d.get("page"))
                    .cloned()
                    .unwrap_or(Value::Null),
            }))
        })
    });

    (metadata, invoker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_wikipedia_has_a_required_query_param() {
        let (metadata, _) = search_wikipedia();
        let schema = metadata.input_schema.unwrap();
        assert_eq!(schema["required"], json!(["query"]));
    }
}
