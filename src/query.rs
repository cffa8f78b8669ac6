//! Query evaluation against the bindings object graph
//!
//! A query expression is a path whose first segment names a binding and
//! whose remaining segments step through whatever that binding holds: JSON
//! fields and indexes, item field accessors, or positions in an item
//! collection.

use crate::bindings::Bindings;
use crate::datum::Datum;
use crate::error::OptionsError;
use crate::jsonpath::{self, Segment};

/// Evaluate a query expression against the bound object graph.
///
/// Returns `Ok(None)` when the path dead-ends (unknown binding, missing
/// field, index out of range). What "no match" means is the caller's call:
/// an API source treats it as an empty document selection, a query source
/// as invalid result data.
pub fn evaluate(expression: &str, data: &Bindings) -> Result<Option<Datum>, OptionsError> {
    let segments = jsonpath::parse(expression)?;
    let mut iter = segments.iter();

    // the first segment must name a binding, not an index
    let root = match iter.next() {
        Some(Segment::Field(name)) => name,
        _ => {
            return Err(OptionsError::QueryUnsupported {
                expression: expression.to_string(),
            })
        }
    };

    let Some(mut current) = data.get(root).cloned() else {
        return Ok(None);
    };

    for segment in iter {
        current = match step(&current, segment) {
            Some(next) => next,
            None => return Ok(None),
        };
    }

    Ok(Some(current))
}

/// One traversal step through a datum
fn step(datum: &Datum, segment: &Segment) -> Option<Datum> {
    match (datum, segment) {
        (Datum::Json(value), Segment::Field(name)) => value.get(name).cloned().map(Datum::Json),
        (Datum::Json(value), Segment::Index(idx)) => value.get(*idx).cloned().map(Datum::Json),
        (Datum::Item(item), Segment::Field(name)) => item.get(name),
        (Datum::Items(items), Segment::Index(idx)) => items.get(*idx).cloned().map(Datum::Item),
        _ => None,
    }
}
