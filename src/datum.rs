//! Tagged value model for query results and template bindings
//!
//! Option sources operate over three shapes of data:
//! - plain JSON values (fetched documents, scalar config data)
//! - domain items implementing [`QueryItem`] (pages, users, entries...)
//! - uniform collections of such items ([`Items`])
//!
//! [`Datum`] is the closed union of those shapes. Keeping it closed lets the
//! template renderer and the query walker stay type-safe instead of
//! dispatching on open-ended runtime types.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Shared handle to a resolved domain item
pub type ItemRef = Arc<dyn QueryItem>;

/// A domain object that queries can traverse and templates can read.
///
/// Implementors carry an explicit type tag instead of relying on runtime
/// type inspection; alias resolution matches on the tag first and falls back
/// to [`QueryItem::is_kind`] for ancestor/capability matches.
pub trait QueryItem: fmt::Debug {
    /// Exact type name of the item (e.g. `"page"`, `"article"`)
    fn type_tag(&self) -> &str;

    /// Whether the item counts as the given kind.
    ///
    /// Covers ancestor types and capabilities beyond the exact tag, so a
    /// heterogeneous collection can resolve through one shared alias.
    fn is_kind(&self, tag: &str) -> bool {
        tag == self.type_tag()
    }

    /// Field accessor used by query traversal and template placeholders
    fn get(&self, field: &str) -> Option<Datum>;

    /// String form used when a placeholder resolves to the item itself
    fn display(&self) -> Option<String> {
        None
    }
}

/// A value flowing through query evaluation and template rendering
#[derive(Debug, Clone)]
pub enum Datum {
    /// Plain JSON data
    Json(Value),
    /// A single domain item
    Item(ItemRef),
    /// A uniform collection of domain items
    Items(Items),
}

impl Datum {
    /// Wrap a JSON value
    pub fn json(value: impl Into<Value>) -> Self {
        Datum::Json(value.into())
    }

    /// Wrap a domain item
    pub fn item(item: impl QueryItem + 'static) -> Self {
        Datum::Item(Arc::new(item))
    }

    /// Get the JSON value, if this is one
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Datum::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        Datum::Json(value)
    }
}

/// Uniform ordered collection of items.
///
/// Every option source renders from one of these after raw query results are
/// normalized, so iteration order is the output order.
#[derive(Debug, Clone, Default)]
pub struct Items {
    items: Vec<ItemRef>,
}

impl Items {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ItemRef) {
        self.items.push(item);
    }

    pub fn get(&self, index: usize) -> Option<&ItemRef> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemRef> {
        self.items.iter()
    }
}

impl From<Vec<ItemRef>> for Items {
    fn from(items: Vec<ItemRef>) -> Self {
        Self { items }
    }
}

impl FromIterator<ItemRef> for Items {
    fn from_iter<T: IntoIterator<Item = ItemRef>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// A scalar collection element lifted into item shape.
///
/// Wrapping gives scalars the same `key`/`value` accessors object items
/// have, so `{{ item.key }}` / `{{ item.value }}` template in the same way
/// regardless of what the query returned.
#[derive(Debug, Clone)]
pub struct ScalarEntry {
    key: Value,
    value: Value,
}

impl ScalarEntry {
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl QueryItem for ScalarEntry {
    fn type_tag(&self) -> &str {
        "entry"
    }

    fn get(&self, field: &str) -> Option<Datum> {
        match field {
            "key" => Some(Datum::Json(self.key.clone())),
            "value" => Some(Datum::Json(self.value.clone())),
            _ => None,
        }
    }

    fn display(&self) -> Option<String> {
        scalar_text(&self.value)
    }
}

/// A structured JSON element inside a collection, viewed as an item
#[derive(Debug, Clone)]
pub struct JsonItem {
    value: Value,
}

impl JsonItem {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl QueryItem for JsonItem {
    fn type_tag(&self) -> &str {
        "json"
    }

    fn get(&self, field: &str) -> Option<Datum> {
        self.value.get(field).cloned().map(Datum::Json)
    }

    fn display(&self) -> Option<String> {
        scalar_text(&self.value)
    }
}

/// Text form of a scalar JSON value; `None` for null and structured values.
///
/// Strings render without quotes, numbers and booleans via their JSON form.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}
