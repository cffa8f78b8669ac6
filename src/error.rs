//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All failures an option source can surface.
///
/// Resolution is all-or-nothing: any of these aborts `options()` without a
/// partial choice list. The single designed exception (an existing but empty
/// local endpoint file) is not an error and returns an empty list instead.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Local file '{path}' was not found")]
    FileNotFound { path: String },

    #[error("Missing \"{field}\" template for alias '{alias}'")]
    MissingTemplate { field: &'static str, alias: String },

    #[error("Invalid options format: {details}")]
    InvalidFormat { details: String },

    #[error("Invalid query result data")]
    InvalidQueryResult,

    #[error("Query '{expression}' is not supported (use a.b or a[0].b)")]
    QueryUnsupported { expression: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote fetch failed: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<reqwest::Error> for OptionsError {
    fn from(err: reqwest::Error) -> Self {
        OptionsError::Fetch(Box::new(err))
    }
}

impl FixSuggestion for OptionsError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            OptionsError::FileNotFound { .. } => {
                Some("Check the endpoint path, or create the file (an empty file is a valid \"no options yet\" state)")
            }
            OptionsError::MissingTemplate { .. } => {
                Some("Add an entry for the alias to the text/value mapping, or use a single template string")
            }
            OptionsError::InvalidFormat { .. } => {
                Some("The endpoint must return a JSON object or array at the top level")
            }
            OptionsError::InvalidQueryResult => {
                Some("Point the query at a collection or a keyed map, not a single value")
            }
            OptionsError::QueryUnsupported { .. } => {
                Some("Use simple paths like field.subfield or items[0].field")
            }
            OptionsError::Io(_) => Some("Check file permissions"),
            OptionsError::Fetch(_) => Some("Check the endpoint URL is reachable and returns a success status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_piece() {
        let err = OptionsError::FileNotFound {
            path: "options.json".to_string(),
        };
        assert!(err.to_string().contains("options.json"));

        let err = OptionsError::MissingTemplate {
            field: "text",
            alias: "page".to_string(),
        };
        assert!(err.to_string().contains("text"));
        assert!(err.to_string().contains("page"));
    }

    #[test]
    fn every_variant_has_a_suggestion() {
        let err = OptionsError::InvalidQueryResult;
        assert!(err.fix_suggestion().is_some());

        let err = OptionsError::QueryUnsupported {
            expression: "$..*".to_string(),
        };
        assert!(err.fix_suggestion().is_some());
    }
}
