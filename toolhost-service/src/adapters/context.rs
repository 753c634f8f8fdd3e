//! Date/time and geolocation adapters.

use chrono::Utc;
use serde_json::{Value, json};

use crate::error::{RegistryError, RegistryResult};
use crate::loader::adapters::AdapterCtor;
use crate::registry::schema::{ParamSpec, ParamType, generate_input_schema};
use crate::registry::{Invoker, ToolCategory, ToolMetadata};

use super::util::{optional_str, required_str};

pub fn entries() -> Vec<(&'static str, AdapterCtor)> {
    vec![
        ("get_current_datetime", get_current_datetime as AdapterCtor),
        ("get_location_by_ip", get_location_by_ip as AdapterCtor),
    ]
}

fn get_current_datetime() -> (ToolMetadata, Invoker) {
    let params = [ParamSpec::optional("timezone", ParamType::String).described("IANA timezone name; defaults to UTC")];
    let metadata = ToolMetadata::new("get_current_datetime", "Get the current date and time", ToolCategory::Context)
        .with_priority(crate::registry::ToolPriority::High)
        .with_defer_loading(false)
        .with_tags(["datetime".to_string(), "context".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = std::sync::Arc::new(move |args| {
        Box::pin(async move {
            let timezone = optional_str(&args, "timezone", "UTC");
            let now = Utc::now();
            Ok(json!({
                "timezone": timezone,
                "iso8601": now.to_rfc3339(),
                "unix_timestamp": now.timestamp(),
            }))
        })
    });

    (metadata, invoker)
}

fn get_location_by_ip() -> (ToolMetadata, Invoker) {
    let params = [ParamSpec::required("ip", ParamType::String).described("IPv4 or IPv6 address to geolocate")];
    let metadata = ToolMetadata::new("get_location_by_ip", "Resolve an IP address's approximate geolocation", ToolCategory::Context)
        .with_tags(["geolocation".to_string(), "context".to_string(), "network".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let client = reqwest::Client::new();
    let invoker: Invoker = std::sync::Arc::new(move |args| {
        let client = client.clone();
        Box::pin(async move {
            let ip = required_str(&args, "ip", "get_location_by_ip")?;
            let url = format!("http://ip-api.com/json/{ip}");

            let body: Value = client
                .get(&url)
                .send()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "get_location_by_ip".to_string(), message: err.to_string() })?
                .json()
                .await
                .map_err(|err| RegistryError::AdapterFailure { name: "get_location_by_ip".to_string(), message: err.to_string() })?;

            if body.get("status").and_then(Value::as_str) == Some("fail") {
                return Err(RegistryError::InvalidArgument {
                    name: "get_location_by_ip".to_string(),
                    message: body.get("message").and_then(Value::as_str).unwrap_or("lookup failed").to_string(),
                });
            }

            Ok(json!({
                "ip": ip,
                "country": body.get("country").cloned().unwrap_or(Value::Null),
                "region": body.get("regionName").cloned().unwrap_or(Value::Null),
                "city": body.get("city").cloned().unwrap_or(Value::Null),
                "lat": body.get("lat").cloned().unwrap_or(Value::Null),
                "lon": body.get("lon").cloned().unwrap_or(Value::Null),
            }))
        })
    });

    (metadata, invoker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_current_datetime_has_no_required_params() {
        let (metadata, _) = get_current_datetime();
        let schema = metadata.input_schema.unwrap();
        assert!(schema["required"].as_array().unwrap().is_empty());
    }
}
