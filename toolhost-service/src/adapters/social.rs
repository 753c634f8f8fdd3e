//! GitHub and Reddit adapters.

use serde_json::{Value, json};

use crate::error::{RegistryError, RegistryResult};
use crate::loader::adapters::AdapterCtor;
use crate::registry::schema::{ParamSpec, ParamType, generate_input_schema};
use crate::registry::{Invoker, ToolCategory, ToolMetadata};

use super::util::{optional_u64, required_str};

pub fn entries() -> Vec<(&'static str, AdapterCtor)> {
    vec![
        ("search_github_repos", search_github_repos as AdapterCtor),
        ("search_reddit", search_reddit as AdapterCtor),
    ]
}

fn search_github_repos() -> (ToolMetadata, Invoker) {
    let params = [
        ParamSpec::required("query", ParamType::String).described("GitHub repository search query"),
        ParamSpec::optional("limit", ParamType::Integer).described("Maximum number of results (default 10)"),
    ];
    let metadata = ToolMetadata::new("search_github_repos", "Search GitHub repositories", ToolCategory::Social)
        .with_tags(["github".to_string(), "code".to_string(), "vcs".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let client = reqwest::Client::builder()
        .user_agent("toolhost-service")
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    let invoker: Invoker = std::sync::Arc::new(move |args| {
        let client = client.clone();
        Box::pin(async move {
            let query = required_str(&args, "query", "search_github_repos")?;
            let limit = optional_u64(&args, "limit", 10).min(50);

            let body: Value = client
                .get("https://api.github.com/search/repositories")
                .query(&[("q", query), ("per_page", &limit.to_string())])
                .send()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "search_github_repos".to_string(), message: err.to_string() })?
                .json()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "search_github_repos".to_string(), message: err.to_string() })?;

            let results = body
                .get("items")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|repo| {
                    json!({
                        "full_name": repo.get("full_name").cloned().unwrap_or(Value::Null),
                        "description": repo.get("description").cloned().unwrap_or(Value::Null),
                        "stars": repo.get("stargazers_count").cloned().unwrap_or(Value::Null),
                        "url": repo.get("html_url").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect::<Vec<_>>();

            Ok(json!({ "query": query, "results": results }))
        })
    });

    (metadata, invoker)
}

fn search_reddit() -> (ToolMetadata, Invoker) {
    let params = [
        ParamSpec::required("query", ParamType::String).described("Reddit search query"),
        ParamSpec::optional("subreddit", ParamType::String).described("Restrict search to a single subreddit"),
        ParamSpec::optional("limit", ParamType::Integer).described("Maximum number of results (default 10)"),
    ];
    let metadata = ToolMetadata::new("search_reddit", "Search Reddit posts", ToolCategory::Social)
        .with_tags(["reddit".to_string(), "social".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let client = reqwest::Client::builder()
        .user_agent("toolhost-service")
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    let invoker: Invoker = std::sync::Arc::new(move |args| {
        let client = client.clone();
        Box::pin(async move {
            let query = required_str(&args, "query", "search_reddit")?;
            let limit = optional_u64(&args, "limit", 10).min(50);
            let subreddit = args.get("subreddit").and_then(Value::as_str);

            let url = match subreddit {
                Some(sub) => format!("https://www.reddit.com/r/{sub}/search.json"),
                None => "https://www.reddit.com/search.json".to_string(),
            };

            let body: Value = client
                .get(&url)
                .query(&[("q", query), ("limit", &limit.to_string()), ("restrict_sr", if subreddit.is_some() { "1" } else { "0" })])
                .send()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "search_reddit".to_string(), message: err.to_string() })?
                .json()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "search_reddit".to_string(), message: err.to_string() })?;

            let results = body
                .get("data")
                .and_then(|d| d.get("children"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|child| child.get("data").cloned())
                .map(|post| {
                    json!({
                        "title": post.get("title").cloned().unwrap_or(Value::Null),
                        "subreddit": post.get("subreddit").cloned().unwrap_or(Value::Null),
                        "score": post.get("score").cloned().unwrap_or(Value::Null),
                        "url": post.get("url").cloned().unwrap_or(Value::Null),
                        "permalink": post.get("permalink").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect::<Vec<_>>();

            Ok(json!({ "query": query, "results": results }))
        })
    });

    (metadata, invoker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_github_repos_schema_has_required_query() {
        let (metadata, _) = search_github_repos();
        let schema = metadata.input_schema.unwrap();
        assert_eq!(schema["required"], json!(["query"]));
    }

    #[test]
    fn search_reddit_subreddit_param_is_optional() {
        let (metadata, _) = search_reddit();
        let schema = metadata.input_schema.unwrap();
        assert!(!schema["required"].as_array().unwrap().contains(&json!("subreddit")));
    }
}
