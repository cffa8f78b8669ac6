//! Query option source
//!
//! Evaluates a query expression against the bound object graph, normalizes
//! the result into a uniform item collection, resolves each item's alias,
//! and renders the text/value templates with the item bound under that
//! alias. Per-alias template specs let one field definition display each
//! resolved type differently.

use std::fmt;
use std::sync::Arc;

use once_cell::unsync::OnceCell;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::bindings::Bindings;
use crate::datum::{Datum, ItemRef, Items, JsonItem, QueryItem, ScalarEntry};
use crate::error::OptionsError;
use crate::query;
use crate::source::{Choice, FieldSpec, OptionSource};
use crate::template;

/// Alias every unregistered item type falls back to
pub const DEFAULT_ALIAS: &str = "item";

/// Ordered type-tag → alias table.
///
/// Insertion order governs fallback precedence for ancestor matches, so
/// this stays a vector of pairs rather than a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasMap(Vec<(String, String)>);

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, alias: impl Into<String>) {
        self.0.push((tag.into(), alias.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(String, String)>> for AliasMap {
    fn from(entries: Vec<(String, String)>) -> Self {
        Self(entries)
    }
}

impl<'de> Deserialize<'de> for AliasMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AliasMapVisitor;

        impl<'de> Visitor<'de> for AliasMapVisitor {
            type Value = AliasMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a type → alias mapping or a sequence of pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = access.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(AliasMap(entries))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(pair) = access.next_element::<(String, String)>()? {
                    entries.push(pair);
                }
                Ok(AliasMap(entries))
            }
        }

        deserializer.deserialize_any(AliasMapVisitor)
    }
}

/// Declarative form of a query source, as written in field definitions
#[derive(Debug, Clone, Deserialize)]
pub struct QueryOptionsConfig {
    pub query: String,
    #[serde(default)]
    pub aliases: AliasMap,
    pub text: FieldSpec,
    pub value: FieldSpec,
}

/// Options resolved from a query over the bound object graph
pub struct QueryOptions {
    query: String,
    aliases: AliasMap,
    data: Bindings,
    text: FieldSpec,
    value: FieldSpec,
    cache: OnceCell<Vec<Choice>>,
}

impl QueryOptions {
    pub fn new(
        query: impl Into<String>,
        text: impl Into<FieldSpec>,
        value: impl Into<FieldSpec>,
    ) -> Self {
        Self {
            query: query.into(),
            aliases: AliasMap::new(),
            data: Bindings::new(),
            text: text.into(),
            value: value.into(),
            cache: OnceCell::new(),
        }
    }

    /// Build from a deserialized field definition
    pub fn from_config(config: QueryOptionsConfig) -> Self {
        let mut source = Self::new(config.query, config.text, config.value);
        source.aliases = config.aliases;
        source
    }

    /// Supply the template binding context
    pub fn with_data(mut self, data: Bindings) -> Self {
        self.data = data;
        self
    }

    /// Register one type-tag → alias entry
    pub fn with_alias(mut self, tag: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(tag, alias);
        self
    }

    /// Replace the whole alias table
    pub fn with_aliases(mut self, aliases: impl Into<AliasMap>) -> Self {
        self.aliases = aliases.into();
        self
    }

    /// Configured query expression
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Registered type-tag → alias entries
    pub fn aliases(&self) -> &[(String, String)] {
        self.aliases.as_slice()
    }

    /// Resolve an item's alias.
    ///
    /// Exact tag match first, then the first registered entry the item
    /// counts as a kind of (covering ancestor types in heterogeneous
    /// collections), then the default alias.
    pub fn resolve(&self, item: &dyn QueryItem) -> &str {
        // fast path: exact tag match
        let tag = item.type_tag();
        if let Some((_, alias)) = self.aliases.iter().find(|(candidate, _)| candidate == tag) {
            return alias;
        }

        // slow but precise: insertion-order kind scan
        for (candidate, alias) in self.aliases.iter() {
            if item.is_kind(candidate) {
                return alias;
            }
        }

        DEFAULT_ALIAS
    }

    /// Normalize a raw query result into the uniform item collection.
    ///
    /// Plain JSON sequences and keyed maps are lifted element by element:
    /// scalars become [`ScalarEntry`] records (index or member name as the
    /// key), structured elements become [`JsonItem`]s. Anything else is not
    /// option material.
    fn normalize(&self, raw: Option<Datum>) -> Result<Items, OptionsError> {
        match raw {
            Some(Datum::Items(items)) => Ok(items),
            Some(Datum::Json(Value::Array(elements))) => Ok(elements
                .into_iter()
                .enumerate()
                .map(|(index, element)| lift(Value::from(index), element))
                .collect()),
            Some(Datum::Json(Value::Object(members))) => Ok(members
                .into_iter()
                .map(|(key, member)| lift(Value::from(key), member))
                .collect()),
            _ => Err(OptionsError::InvalidQueryResult),
        }
    }

    fn resolve_options(&self) -> Result<Vec<Choice>, OptionsError> {
        let raw = query::evaluate(&self.query, &self.data)?;
        let items = self.normalize(raw)?;

        let mut choices = Vec::new();
        for item in items.iter() {
            let alias = self.resolve(item.as_ref());
            let scoped = self.data.with(alias, Datum::Item(Arc::clone(item)));

            choices.push(Choice {
                text: template::render(self.text.for_alias("text", alias)?, &scoped, true),
                value: template::render(self.value.for_alias("value", alias)?, &scoped, false),
            });
        }

        tracing::debug!(query = %self.query, count = choices.len(), "Resolved query options");
        Ok(choices)
    }
}

impl OptionSource for QueryOptions {
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
            .get_or_try_init(|| self.resolve_options())
            .map(Vec::as_slice)
    }
}

/// Lift one collection element into item shape
fn lift(key: Value, element: Value) -> ItemRef {
    if element.is_object() || element.is_array() {
        Arc::new(JsonItem::new(element))
    } else {
        Arc::new(ScalarEntry::new(key, element))
    }
}
