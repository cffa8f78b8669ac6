//! Single-pass template renderer with caching
//!
//! Templates interpolate `{{ path }}` placeholders against a [`Bindings`]
//! context. Tokenized templates are cached globally, so rendering the same
//! text/value template once per item tokenizes it exactly once.
//!
//! Two escaping policies exist: display text renders with HTML escaping,
//! raw values render verbatim. Escaping applies to interpolated values
//! only, never to template literals. Placeholders that resolve to nothing
//! are kept verbatim in the output so broken paths stay diagnosable.

use std::ops::Range;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::bindings::Bindings;
use crate::datum::{scalar_text, Datum};
use crate::query;

/// A parsed template fragment
#[derive(Debug, Clone)]
pub enum Token {
    /// Literal text (range in the original template)
    Literal(Range<usize>),
    /// `{{ path }}` placeholder
    Placeholder {
        /// Trimmed inner path expression
        path: String,
        /// Range of the whole placeholder including braces, kept for
        /// verbatim output when the path resolves to nothing
        raw: Range<usize>,
    },
}

/// Template engine with a token cache
pub struct TemplateEngine {
    cache: DashMap<String, Arc<Vec<Token>>>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Parse a template into tokens (cache-first)
    pub fn tokenize(&self, template: &str) -> Arc<Vec<Token>> {
        if let Some(cached) = self.cache.get(template) {
            return Arc::clone(&cached);
        }

        let tokens = Arc::new(tokenize_template(template));
        self.cache.insert(template.to_string(), tokens.clone());
        tokens
    }

    /// Render a template against the bindings.
    ///
    /// With `escape` set, interpolated values are HTML-escaped.
    pub fn render(&self, template: &str, data: &Bindings, escape: bool) -> String {
        let tokens = self.tokenize(template);
        let mut result = String::with_capacity(template.len() * 2);

        for token in tokens.iter() {
            match token {
                Token::Literal(range) => result.push_str(&template[range.clone()]),
                Token::Placeholder { path, raw } => {
                    match resolve_placeholder(path, data) {
                        Some(text) if escape => result.push_str(&escape_html(&text)),
                        Some(text) => result.push_str(&text),
                        // keep the placeholder when the path resolves to nothing
                        None => result.push_str(&template[raw.clone()]),
                    }
                }
            }
        }

        result
    }
}

fn tokenize_template(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest_start = 0;

    while let Some(found) = template[rest_start..].find("{{") {
        let open = rest_start + found;
        let Some(found) = template[open + 2..].find("}}") else {
            // unterminated placeholder, the rest is literal
            break;
        };
        let close = open + 2 + found;

        if open > rest_start {
            tokens.push(Token::Literal(rest_start..open));
        }
        tokens.push(Token::Placeholder {
            path: template[open + 2..close].trim().to_string(),
            raw: open..close + 2,
        });
        rest_start = close + 2;
    }

    if rest_start < template.len() {
        tokens.push(Token::Literal(rest_start..template.len()));
    }

    tokens
}

/// Resolve one placeholder path to its text form.
///
/// Malformed paths count as unresolved rather than failing the whole
/// render. Items interpolate through their `display()` form; collections
/// and structured JSON have no text form.
fn resolve_placeholder(path: &str, data: &Bindings) -> Option<String> {
    let datum = query::evaluate(path, data).ok().flatten()?;

    match datum {
        Datum::Json(value) => scalar_text(&value),
        Datum::Item(item) => item.display(),
        Datum::Items(_) => None,
    }
}

/// HTML-escape interpolated display text
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Global template engine instance
pub static TEMPLATES: Lazy<TemplateEngine> = Lazy::new(TemplateEngine::new);

/// Convenience function for rendering through the global engine
pub fn render(template: &str, data: &Bindings, escape: bool) -> String {
    TEMPLATES.render(template, data, escape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Bindings {
        let mut data = Bindings::new();
        data.set_value("item", json!({"name": "Amps & Volts", "id": "a1"}));
        data.set_value("count", 3);
        data
    }

    #[test]
    fn literal_only_passes_through() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render("plain text", &data(), true), "plain text");
    }

    #[test]
    fn interpolates_bound_values() {
        let engine = TemplateEngine::new();
        assert_eq!(
            engine.render("#{{ item.id }}: {{ count }}", &data(), false),
            "#a1: 3"
        );
    }

    #[test]
    fn inner_whitespace_is_trimmed() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render("{{item.id}}", &data(), false), "a1");
        assert_eq!(engine.render("{{  item.id  }}", &data(), false), "a1");
    }

    #[test]
    fn escape_applies_to_values_not_literals() {
        let engine = TemplateEngine::new();
        let rendered = engine.render("<b>{{ item.name }}</b>", &data(), true);
        assert_eq!(rendered, "<b>Amps &amp; Volts</b>");
    }

    #[test]
    fn raw_mode_keeps_value_verbatim() {
        let engine = TemplateEngine::new();
        let rendered = engine.render("{{ item.name }}", &data(), false);
        assert_eq!(rendered, "Amps & Volts");
    }

    #[test]
    fn unresolved_placeholder_is_kept() {
        let engine = TemplateEngine::new();
        assert_eq!(
            engine.render("x {{ item.missing }} y", &data(), true),
            "x {{ item.missing }} y"
        );
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render("broken {{ item.id", &data(), true), "broken {{ item.id");
    }

    #[test]
    fn item_placeholder_uses_display() {
        use crate::datum::ScalarEntry;

        let mut data = Bindings::new();
        data.set("item", Datum::item(ScalarEntry::new("a", 1)));

        let engine = TemplateEngine::new();
        assert_eq!(engine.render("{{ item }}={{ item.value }}", &data, false), "1=1");
    }

    #[test]
    fn cache_reuses_tokenized_templates() {
        let engine = TemplateEngine::new();
        let template = "{{ item.id }} of {{ count }}";

        let first = engine.tokenize(template);
        let second = engine.tokenize(template);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
