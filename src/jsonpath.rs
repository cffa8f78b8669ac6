//! Minimal path expression parser
//!
//! The subset option queries need:
//! - `a.b.c` dot notation (optional `$.` prefix)
//! - `a[0].b` array index
//! - `items.0` numeric dot segment, equivalent to `items[0]`
//!
//! Filters, wildcards and slices are out; a path that uses them fails with
//! [`OptionsError::QueryUnsupported`] instead of silently matching nothing.

use serde_json::Value;

use crate::error::OptionsError;

/// One step of a parsed path
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object field access: `.field`
    Field(String),
    /// Array index access: `[0]`
    Index(usize),
}

/// Parse a path expression into segments.
///
/// `"$"` and the empty path parse to no segments (the root).
pub fn parse(path: &str) -> Result<Vec<Segment>, OptionsError> {
    let unsupported = || OptionsError::QueryUnsupported {
        expression: path.to_string(),
    };

    let trimmed = if let Some(stripped) = path.strip_prefix("$.") {
        stripped
    } else if path == "$" {
        return Ok(vec![]);
    } else {
        path
    };

    if trimmed.is_empty() {
        return Ok(vec![]);
    }

    let mut segments = Vec::new();

    for part in trimmed.split('.') {
        if part.is_empty() {
            return Err(unsupported());
        }

        if let Some(bracket) = part.find('[') {
            let field = &part[..bracket];
            if !field.is_empty() {
                segments.push(Segment::Field(field.to_string()));
            }

            if !part.ends_with(']') {
                return Err(unsupported());
            }

            let index: usize = part[bracket + 1..part.len() - 1]
                .parse()
                .map_err(|_| unsupported())?;
            segments.push(Segment::Index(index));
        } else if let Ok(index) = part.parse::<usize>() {
            segments.push(Segment::Index(index));
        } else {
            segments.push(Segment::Field(part.to_string()));
        }
    }

    Ok(segments)
}

/// Walk segments into a JSON value; `None` when the path dead-ends.
pub fn apply(value: &Value, segments: &[Segment]) -> Option<Value> {
    let mut current = value;

    for segment in segments {
        current = match segment {
            Segment::Field(name) => current.get(name)?,
            Segment::Index(idx) => current.get(*idx)?,
        };
    }

    Some(current.clone())
}

/// Parse and apply in one step
pub fn resolve(value: &Value, path: &str) -> Result<Option<Value>, OptionsError> {
    let segments = parse(path)?;
    Ok(apply(value, &segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_dot_notation() {
        let segments = parse("$.price.currency").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Field("price".to_string()),
                Segment::Field("currency".to_string()),
            ]
        );
    }

    #[test]
    fn parses_without_prefix() {
        assert_eq!(parse("name").unwrap(), vec![Segment::Field("name".to_string())]);
    }

    #[test]
    fn parses_bracket_index() {
        let segments = parse("items[2].slug").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Field("items".to_string()),
                Segment::Index(2),
                Segment::Field("slug".to_string()),
            ]
        );
    }

    #[test]
    fn numeric_dot_segment_is_an_index() {
        let segments = parse("items.1").unwrap();
        assert_eq!(
            segments,
            vec![Segment::Field("items".to_string()), Segment::Index(1)]
        );
    }

    #[test]
    fn root_parses_to_no_segments() {
        assert!(parse("$").unwrap().is_empty());
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(matches!(
            parse("a..b"),
            Err(OptionsError::QueryUnsupported { .. })
        ));
    }

    #[test]
    fn rejects_unclosed_bracket() {
        assert!(parse("items[0").is_err());
        assert!(parse("items[x]").is_err());
    }

    #[test]
    fn applies_through_objects_and_arrays() {
        let doc = json!({"companies": [{"name": "Acme"}, {"name": "Globex"}]});

        assert_eq!(
            resolve(&doc, "companies[1].name").unwrap(),
            Some(json!("Globex"))
        );
        assert_eq!(resolve(&doc, "companies.0.name").unwrap(), Some(json!("Acme")));
    }

    #[test]
    fn missing_path_is_none_not_an_error() {
        let doc = json!({"a": 1});
        assert_eq!(resolve(&doc, "b.c").unwrap(), None);
    }

    #[test]
    fn root_resolves_to_the_document() {
        let doc = json!([1, 2, 3]);
        assert_eq!(resolve(&doc, "$").unwrap(), Some(doc.clone()));
    }
}
