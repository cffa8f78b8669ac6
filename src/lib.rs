//! Picklist - dynamic option sources for select fields
//!
//! Resolves ordered `{text, value}` choices from declarative sources: a
//! JSON endpoint (remote or local) or a query over an in-process object
//! graph, with string templates for the displayed text and the stored
//! value.

pub mod bindings;
pub mod datum;
pub mod error;
pub mod jsonpath;
pub mod options_api;
pub mod options_query;
pub mod query;
pub mod remote;
pub mod source;
pub mod template;

pub use bindings::Bindings;
pub use datum::{Datum, ItemRef, Items, JsonItem, QueryItem, ScalarEntry};
pub use error::{FixSuggestion, OptionsError};
pub use options_api::{ApiOptions, ApiOptionsConfig};
pub use options_query::{AliasMap, QueryOptions, QueryOptionsConfig, DEFAULT_ALIAS};
pub use remote::{HttpRemote, MockRemote, Remote};
pub use source::{Choice, FieldSpec, OptionSource};
