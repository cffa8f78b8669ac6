//! API option source
//!
//! Fetches a JSON document from a remote endpoint or a local file, selects
//! elements through an optional fetch expression, and renders one choice
//! per element with the element bound as `item`.
//!
//! The endpoint itself is a template, so field definitions can point at
//! per-page endpoints (`{{ site.api }}/tags.json`).

use std::fs;
use std::path::Path;

use once_cell::unsync::OnceCell;
use serde::Deserialize;
use serde_json::Value;

use crate::bindings::Bindings;
use crate::datum::Datum;
use crate::error::OptionsError;
use crate::jsonpath;
use crate::remote::{HttpRemote, Remote};
use crate::source::{Choice, FieldSpec, OptionSource};
use crate::template;

/// Declarative form of an API source, as written in field definitions
#[derive(Debug, Clone, Deserialize)]
pub struct ApiOptionsConfig {
    /// Endpoint URL or local path; may itself be a template
    pub url: String,
    /// Path into the fetched document; absent means the document root
    #[serde(default)]
    pub fetch: Option<String>,
    pub text: FieldSpec,
    pub value: FieldSpec,
}

/// Options fetched from a JSON endpoint (remote URL or local file)
pub struct ApiOptions {
    url: String,
    fetch: Option<String>,
    data: Bindings,
    text: FieldSpec,
    value: FieldSpec,
    remote: Box<dyn Remote>,
    cache: OnceCell<Vec<Choice>>,
}

impl ApiOptions {
    pub fn new(
        url: impl Into<String>,
        text: impl Into<FieldSpec>,
        value: impl Into<FieldSpec>,
    ) -> Self {
        Self {
            url: url.into(),
            fetch: None,
            data: Bindings::new(),
            text: text.into(),
            value: value.into(),
            remote: Box::new(HttpRemote::new()),
            cache: OnceCell::new(),
        }
    }

    /// Build from a deserialized field definition
    pub fn from_config(config: ApiOptionsConfig) -> Self {
        let mut source = Self::new(config.url, config.text, config.value);
        source.fetch = config.fetch;
        source
    }

    /// Supply the template binding context
    pub fn with_data(mut self, data: Bindings) -> Self {
        self.data = data;
        self
    }

    /// Select a sub-tree of the fetched document
    pub fn with_fetch(mut self, fetch: impl Into<String>) -> Self {
        self.fetch = Some(fetch.into());
        self
    }

    /// Swap the remote collaborator (tests use [`crate::MockRemote`])
    pub fn with_remote(mut self, remote: Box<dyn Remote>) -> Self {
        self.remote = remote;
        self
    }

    /// Endpoint with its template rendered against the binding context
    pub fn url(&self) -> String {
        template::render(&self.url, &self.data, true)
    }

    /// Configured fetch expression
    pub fn fetch(&self) -> Option<&str> {
        self.fetch.as_deref()
    }

    fn resolve(&self) -> Result<Vec<Choice>, OptionsError> {
        let url = self.url();

        let content = if is_absolute_url(&url) {
            self.remote.get(&url)?
        } else {
            let path = Path::new(&url);
            if !path.is_file() {
                return Err(OptionsError::FileNotFound { path: url });
            }

            tracing::debug!(path = %url, "Reading local options file");
            let content = fs::read_to_string(path)?;

            // an existing but empty file is "no options yet", not a failure
            if content.is_empty() {
                return Ok(Vec::new());
            }
            content
        };

        let document = parse_document(&content)?;
        let selected = match &self.fetch {
            Some(expression) => jsonpath::resolve(&document, expression)?.unwrap_or(Value::Null),
            None => document,
        };

        let mut choices = Vec::new();
        for element in elements(&selected) {
            let scoped = self.data.with("item", Datum::Json(element.clone()));
            choices.push(Choice {
                text: template::render(self.text.for_alias("text", "item")?, &scoped, true),
                value: template::render(self.value.for_alias("value", "item")?, &scoped, false),
            });
        }

        tracing::debug!(count = choices.len(), "Resolved API options");
        Ok(choices)
    }
}

impl OptionSource for ApiOptions {
    fn data(&self) -> &Bindings {
        &self.data
    }

    fn text(&self) -> &FieldSpec {
        &self.text
    }

    fn value(&self) -> &FieldSpec {
        &self.value
    }

    fn options(&self) -> Result<&[Choice], OptionsError> {
        self.cache
            .get_or_try_init(|| self.resolve())
            .map(Vec::as_slice)
    }
}

/// Only http(s) URLs count as remote; everything else is a local path
fn is_absolute_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Parse the body, requiring an object or array at the top level
fn parse_document(content: &str) -> Result<Value, OptionsError> {
    let document: Value =
        serde_json::from_str(content).map_err(|err| OptionsError::InvalidFormat {
            details: err.to_string(),
        })?;

    if !document.is_object() && !document.is_array() {
        return Err(OptionsError::InvalidFormat {
            details: "expected a JSON object or array at the top level".to_string(),
        });
    }

    Ok(document)
}

/// Elements of the selected value: array elements, object member values
fn elements(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(elements) => elements.iter().collect(),
        Value::Object(members) => members.values().collect(),
        _ => Vec::new(),
    }
}
