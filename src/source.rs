//! Option source contract
//!
//! Every concrete source resolves to an ordered list of [`Choice`] records.
//! The contract is cache-first: `options()` computes at most once per
//! instance and later calls return the stored list unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bindings::Bindings;
use crate::error::OptionsError;

/// One selectable choice, ready for the serialization boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub value: String,
}

impl Choice {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// A text/value template definition.
///
/// Field definitions write either a single template string or a mapping
/// keyed by alias, so heterogeneous query results can render differently
/// per resolved type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    /// One template for every item
    Template(String),
    /// Per-alias template overrides
    PerAlias(HashMap<String, String>),
}

impl FieldSpec {
    /// Resolve the template for an alias.
    ///
    /// `field` names the definition (`"text"` or `"value"`) for the error
    /// message only.
    pub fn for_alias(&self, field: &'static str, alias: &str) -> Result<&str, OptionsError> {
        match self {
            FieldSpec::Template(template) => Ok(template),
            FieldSpec::PerAlias(map) => {
                map.get(alias)
                    .map(String::as_str)
                    .ok_or_else(|| OptionsError::MissingTemplate {
                        field,
                        alias: alias.to_string(),
                    })
            }
        }
    }
}

impl From<&str> for FieldSpec {
    fn from(template: &str) -> Self {
        FieldSpec::Template(template.to_string())
    }
}

impl From<String> for FieldSpec {
    fn from(template: String) -> Self {
        FieldSpec::Template(template)
    }
}

impl From<HashMap<String, String>> for FieldSpec {
    fn from(map: HashMap<String, String>) -> Self {
        FieldSpec::PerAlias(map)
    }
}

/// Contract every option source satisfies
pub trait OptionSource {
    /// Template binding context; never mutated by the engine
    fn data(&self) -> &Bindings;

    /// Raw, unrendered text template spec
    fn text(&self) -> &FieldSpec;

    /// Raw, unrendered value template spec
    fn value(&self) -> &FieldSpec;

    /// Resolve the options (idempotent, cache-first)
    fn options(&self) -> Result<&[Choice], OptionsError>;

    /// Owned copy of the options for the serialization boundary
    fn to_array(&self) -> Result<Vec<Choice>, OptionsError> {
        Ok(self.options()?.to_vec())
    }
}
