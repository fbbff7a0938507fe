//! Proxy URL templates
//!
//! Lets users front provider image URLs with their own proxy or CDN, e.g.
//! `https://proxy.example/image-proxy/{{userId}}?url={{url | url_encode}}`.
//!
//! Templates use Liquid-style pipes. They are rewritten into Handlebars
//! helper calls (`{{ url | url_encode }}` becomes `{{url_encode url}}`) and
//! rendered with HTML escaping disabled. Rendering never fails the caller:
//! any template error falls back to the raw URL.

use std::sync::LazyLock;

use handlebars::{handlebars_helper, no_escape, Handlebars};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};
use serde::Serialize;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `{{ variable | filter | filter }}`
static PIPE_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*((?:\|\s*[A-Za-z_][A-Za-z0-9_]*\s*)+)\}\}")
        .expect("pipe expression regex is valid")
});

/// Percent-encode like `encodeURIComponent`, with spaces as `+`.
#[must_use]
pub fn url_encode(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT)
        .to_string()
        .replace("%20", "+")
}

#[must_use]
pub fn url_decode(value: &str) -> String {
    percent_decode_str(&value.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

handlebars_helper!(url_encode_helper: |value: str| url_encode(value));
handlebars_helper!(url_decode_helper: |value: str| url_decode(value));
handlebars_helper!(upcase_helper: |value: str| value.to_uppercase());
handlebars_helper!(downcase_helper: |value: str| value.to_lowercase());

/// Variables available to proxy templates.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVars<'a> {
    pub url: &'a str,
    pub user_id: &'a str,
}

/// Renders user supplied proxy templates.
pub struct ProxyTemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl ProxyTemplateRenderer {
    #[must_use]
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);
        handlebars.register_helper("url_encode", Box::new(url_encode_helper));
        handlebars.register_helper("url_decode", Box::new(url_decode_helper));
        handlebars.register_helper("upcase", Box::new(upcase_helper));
        handlebars.register_helper("downcase", Box::new(downcase_helper));

        Self { handlebars }
    }

    /// Render `template` for one image URL.
    ///
    /// An empty template passes the URL through unchanged.
    #[must_use]
    pub fn render(&self, template: &str, vars: &TemplateVars<'_>) -> String {
        if template.trim().is_empty() {
            return vars.url.to_string();
        }

        match self.handlebars.render_template(&translate_pipes(template), vars) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!(template = %template, error = %e, "Failed to render proxy template, using raw URL");
                vars.url.to_string()
            }
        }
    }
}

impl Default for ProxyTemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProxyTemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyTemplateRenderer").finish_non_exhaustive()
    }
}

/// Rewrite Liquid pipes into nested Handlebars helper calls.
fn translate_pipes(template: &str) -> String {
    PIPE_EXPRESSION
        .replace_all(template, |caps: &Captures<'_>| {
            let mut expression = caps[1].to_string();
            for filter in caps[2].split('|').map(str::trim).filter(|f| !f.is_empty()) {
                expression = format!("({filter} {expression})");
            }
            // Outermost call needs no parentheses
            let inner = &expression[1..expression.len() - 1];
            format!("{{{{{inner}}}}}")
        })
        .into_owned()
}
