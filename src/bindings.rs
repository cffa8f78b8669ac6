//! Template binding context (alias → value)
//!
//! `Bindings` holds the named values templates and queries can reach. The
//! engine never mutates the context it is handed; per-item rendering works
//! on scoped copies extended with the resolved item.

use std::collections::HashMap;

use serde_json::Value;

use crate::datum::{Datum, ItemRef};

/// Named values available to queries and template placeholders
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: HashMap<String, Datum>,
}

impl Bindings {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name to any datum
    pub fn set(&mut self, name: impl Into<String>, datum: Datum) {
        self.entries.insert(name.into(), datum);
    }

    /// Bind a name to a plain JSON value
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.set(name, Datum::Json(value.into()));
    }

    /// Bind a name to a domain item
    pub fn set_item(&mut self, name: impl Into<String>, item: ItemRef) {
        self.set(name, Datum::Item(item));
    }

    /// Look up a bound name
    pub fn get(&self, name: &str) -> Option<&Datum> {
        self.entries.get(name)
    }

    /// Scoped copy with one extra binding, used for per-item rendering.
    ///
    /// The extra binding shadows an existing one of the same name.
    pub fn with(&self, name: impl Into<String>, datum: Datum) -> Self {
        let mut scoped = self.clone();
        scoped.set(name, datum);
        scoped
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get() {
        let mut data = Bindings::new();
        data.set_value("site", json!({"title": "Home"}));

        assert!(data.get("site").is_some());
        assert!(data.get("unknown").is_none());
    }

    #[test]
    fn with_leaves_original_untouched() {
        let mut data = Bindings::new();
        data.set_value("kept", "yes");

        let scoped = data.with("item", Datum::json("extra"));

        assert!(scoped.get("item").is_some());
        assert!(scoped.get("kept").is_some());
        assert!(data.get("item").is_none());
    }

    #[test]
    fn with_shadows_existing_binding() {
        let mut data = Bindings::new();
        data.set_value("item", "old");

        let scoped = data.with("item", Datum::json("new"));
        assert_eq!(scoped.get("item").unwrap().as_json(), Some(&json!("new")));
        assert_eq!(data.get("item").unwrap().as_json(), Some(&json!("old")));
    }

    #[test]
    fn is_empty() {
        let mut data = Bindings::new();
        assert!(data.is_empty());

        data.set_value("k", 1);
        assert!(!data.is_empty());
    }
}
