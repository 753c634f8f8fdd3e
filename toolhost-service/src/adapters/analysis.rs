//! Analysis and processing adapters: no network calls, pure
//! computation over the caller's input.

use serde_json::json;

use crate::error::{RegistryError, RegistryResult};
use crate::loader::adapters::AdapterCtor;
use crate::registry::schema::{ParamSpec, ParamType, generate_input_schema};
use crate::registry::{Invoker, ToolCategory, ToolMetadata};

use super::util::{optional_u64, required_str};

pub fn entries() -> Vec<(&'static str, AdapterCtor)> {
    vec![
        ("assess_source_credibility", assess_source_credibility as AdapterCtor),
        ("summarize_text", summarize_text as AdapterCtor),
        ("calculator", calculator as AdapterCtor),
    ]
}

/// A small, transparent heuristic rather than a trained classifier:
/// known-reputable domain suffixes score higher, everything else gets a
/// neutral baseline. Good enough to rank sources, not a fact-checker.
fn assess_source_credibility() -> (ToolMetadata, Invoker) {
    const REPUTABLE_SUFFIXES: &[&str] = &[".gov", ".edu", "wikipedia.org", "reuters.com", "apnews.com", "bbc.com", "nature.com"];

    let params = [ParamSpec::required("url", ParamType::String).described("URL whose source to assess")];
    let metadata = ToolMetadata::new("assess_source_credibility", "Score a URL's source credibility", ToolCategory::Analysis)
        .with_priority(crate::registry::ToolPriority::High)
        .with_defer_loading(false)
        .with_tags(["analysis".to_string(), "credibility".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = std::sync::Arc::new(move |args| {
        Box::pin(async move {
            let url = required_str(&args, "url", "assess_source_credibility")?;
            let host = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"))
                .unwrap_or(url)
                .split('/')
                .next()
                .unwrap_or(url)
                .to_lowercase();

            let reputable = REPUTABLE_SUFFIXES.iter().any(|suffix| host.ends_with(suffix) || host.contains(suffix));
            let score = if reputable { 0.85 } else { 0.5 };

            Ok(json!({
                "url": url,
                "host": host,
                "credibility_score": score,
                "reputable_source": reputable,
            }))
        })
    });

    (metadata, invoker)
}

/// Extractive, not generative: picks the leading sentences up to the
/// requested length rather than calling out to a model. A real
/// summarizer would sit behind this same `Invoker` signature.
fn summarize_text() -> (ToolMetadata, Invoker) {
    let params = [
        ParamSpec::required("text", ParamType::String).described("Text to summarize"),
        ParamSpec::optional("max_sentences", ParamType::Integer).described("Maximum sentences to keep (default 3)"),
    ];
    let metadata = ToolMetadata::new("summarize_text", "Produce an extractive summary of input text", ToolCategory::Analysis)
        .with_tags(["analysis".to_string(), "summarization".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = std::sync::Arc::new(move |args| {
        Box::pin(async move {
            let text = required_str(&args, "text", "summarize_text")?;
            let max_sentences = optional_u64(&args, "max_sentences", 3) as usize;

            let sentences: Vec<&str> = text
                .split(['.', '!', '?'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();

            let summary = sentences
                .iter()
                .take(max_sentences)
                .cloned()
                .collect::<Vec<_>>()
                .join(". ");

            Ok(json!({
                "summary": if summary.is_empty() { summary } else { format!("{summary}.") },
                "original_sentence_count": sentences.len(),
            }))
        })
    });

    (metadata, invoker)
}

fn calculator() -> (ToolMetadata, Invoker) {
    let params = [ParamSpec::required("expression", ParamType::String).described("Arithmetic expression, e.g. `2 * (3 + 4)`")];
    let metadata = ToolMetadata::new("calculator", "Evaluate a basic arithmetic expression", ToolCategory::Analysis)
        .with_tags(["analysis".to_string(), "math".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = std::sync::Arc::new(move |args| {
        Box::pin(async move {
            let expression = required_str(&args, "expression", "calculator")?;
            let value = evaluate_arithmetic(expression).map_err(|message| RegistryError::InvalidArgument {
                name: "calculator".to_string(),
                message,
            })?;

            Ok(json!({ "expression": expression, "result": value }))
        })
    });

    (metadata, invoker)
}

/// Recursive-descent evaluator over `+ - * / ( )` and floating-point
/// literals. Deliberately minimal: no variables, no functions, no
/// implicit multiplication.
fn evaluate_arithmetic(expression: &str) -> Result<f64, String> {
    struct Parser<'a> {
        chars: std::iter::Peekable<std::str::Chars<'a>>,
    }

    impl<'a> Parser<'a> {
        fn skip_ws(&mut self) {
            while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
                self.chars.next();
            }
        }

        fn parse_expr(&mut self) -> Result<f64, String> {
            let mut value = self.parse_term()?;
            loop {
                self.skip_ws();
                match self.chars.peek() {
                    Some('+') => {
                        self.chars.next();
                        value += self.parse_term()?;
                    }
                    Some('-') => {
                        self.chars.next();
                        value -= self.parse_term()?;
                    }
                    _ => break,
                }
            }
            Ok(value)
        }

        fn parse_term(&mut self) -> Result<f64, String> {
            let mut value = self.parse_factor()?;
            loop {
                self.skip_ws();
                match self.chars.peek() {
                    Some('*') => {
                        self.chars.next();
                        value *= self.parse_factor()?;
                    }
                    Some('/') => {
                        self.chars.next();
                        let divisor = self.parse_factor()?;
                        if divisor == 0.0 {
                            return Err("division by zero".to_string());
                        }
                        value /= divisor;
                    }
                    _ => break,
                }
            }
            Ok(value)
        }

        fn parse_factor(&mut self) -> Result<f64, String> {
            self.skip_ws();
            match self.chars.peek() {
                Some('(') => {
                    self.chars.next();
                    let value = self.parse_expr()?;
                    self.skip_ws();
                    if self.chars.next() != Some(')') {
                        return Err("unbalanced parentheses".to_string());
                    }
                    Ok(value)
                }
                Some('-') => {
                    self.chars.next();
                    Ok(-self.parse_factor()?)
                }
                _ => self.parse_number(),
            }
        }

        fn parse_number(&mut self) -> Result<f64, String> {
            self.skip_ws();
            let mut digits = String::new();
            while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit() || *c == '.') {
                digits.push(self.chars.next().unwrap());
            }
            if digits.is_empty() {
                return Err("expected a number".to_string());
            }
            digits.parse::<f64>().map_err(|_| format!("invalid number `{digits}`"))
        }
    }

    let mut parser = Parser { chars: expression.chars().peekable() };
    let value = parser.parse_expr()?;
    parser.skip_ws();
    if parser.chars.peek().is_some() {
        return Err("unexpected trailing input".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_arithmetic_handles_precedence_and_parens() {
        assert_eq!(evaluate_arithmetic("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate_arithmetic("(2 + 3) * 4").unwrap(), 20.0);
    }

    #[test]
    fn evaluate_arithmetic_rejects_division_by_zero() {
        assert!(evaluate_arithmetic("1 / 0").is_err());
    }

    #[test]
    fn assess_source_credibility_is_immediate_and_high_priority() {
        let (metadata, _) = assess_source_credibility();
        assert!(!metadata.defer_loading);
        assert_eq!(metadata.priority, crate::registry::ToolPriority::High);
    }
}
