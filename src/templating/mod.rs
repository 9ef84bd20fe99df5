//! Template collaborator: turning `.ejs` / `.hbs` files into script text.
//!
//! Template files take part in the dependency tree like any other module, but
//! their contents are not JavaScript. Before concatenation the graph builder
//! hands them to a [`TemplateRenderer`], which returns a script that registers
//! the template under a JST namespace:
//!
//! ```javascript
//! var jst = jst || {};
//! (function(){
//! jst["views/item"] = _.template("<li><%= name %></li>");
//! })();
//! ```
//!
//! The default [`JstRenderer`] compiles templates on the client at load time:
//! `.ejs` sources go through `_.template` (underscore) and `.hbs` sources through
//! `Handlebars.compile`. Pages using templates therefore need the matching
//! runtime loaded first. Other strategies (such as server-side precompilation)
//! plug in by implementing [`TemplateRenderer`].
//!
//! Directives are always parsed from the original template text, never from the
//! rendered script.

use std::path::Path;
use tera::{Context as TeraContext, Tera};

use crate::constants::{DEFAULT_TEMPLATE_NAMESPACE, TEMPLATE_EXTENSIONS};
use crate::core::{GcpError, GcpResult};
use crate::utils::fs::relative_path;

/// Wrapper emitted around every compiled template.
const JST_WRAPPER: &str = r#"var {{ namespace }} = {{ namespace }} || {};
(function(){
{{ namespace }}[{{ name }}] = {{ compiler }}({{ source }});
})();"#;

/// Template dialects recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateDialect {
    /// Underscore / EJS style templates (`.ejs`)
    Underscore,
    /// Handlebars templates (`.hbs`)
    Handlebars,
}

impl TemplateDialect {
    /// Detect the dialect of a file from its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ejs") => Some(Self::Underscore),
            Some("hbs") => Some(Self::Handlebars),
            _ => None,
        }
    }

    /// Client-side function that compiles this dialect's source.
    #[must_use]
    pub const fn client_compiler(self) -> &'static str {
        match self {
            Self::Underscore => "_.template",
            Self::Handlebars => "Handlebars.compile",
        }
    }
}

/// Converts template source into script text.
///
/// Implementations must be shareable across concurrent compilation runs.
pub trait TemplateRenderer: Send + Sync {
    /// Render `code` (the contents of `file_path`) into script text.
    ///
    /// `base_dir` is the directory template names are computed relative to.
    ///
    /// # Errors
    ///
    /// Returns [`GcpError::TemplateRender`] if the template cannot be converted.
    fn render(&self, code: &str, base_dir: &Path, file_path: &Path) -> GcpResult<String>;
}

/// Default renderer registering templates under a JST namespace.
#[derive(Debug, Clone)]
pub struct JstRenderer {
    namespace: String,
    template_dir: String,
}

impl Default for JstRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_NAMESPACE, "")
    }
}

impl JstRenderer {
    /// Create a renderer.
    ///
    /// # Arguments
    ///
    /// * `namespace` - Global object the templates are registered on (`jst` by default)
    /// * `template_dir` - Sub-directory of the base directory that template names
    ///   are relative to; empty for the base directory itself
    pub fn new(namespace: impl Into<String>, template_dir: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            template_dir: template_dir.into(),
        }
    }

    /// The namespace templates are registered on.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registration name of a template: its path relative to
    /// `base_dir/template_dir`, with `/` separators and no template extension.
    #[must_use]
    pub fn template_name(&self, base_dir: &Path, file_path: &Path) -> String {
        let root = base_dir.join(&self.template_dir);
        let relative = relative_path(&root, file_path);
        TEMPLATE_EXTENSIONS
            .iter()
            .find_map(|ext| relative.strip_suffix(*ext))
            .unwrap_or(relative.as_str())
            .to_string()
    }
}

impl TemplateRenderer for JstRenderer {
    fn render(&self, code: &str, base_dir: &Path, file_path: &Path) -> GcpResult<String> {
        let dialect = TemplateDialect::from_path(file_path).ok_or_else(|| {
            GcpError::TemplateRender {
                path: file_path.display().to_string(),
                reason: "unsupported template extension".to_string(),
            }
        })?;

        let render_error = |reason: String| GcpError::TemplateRender {
            path: file_path.display().to_string(),
            reason,
        };

        let name = self.template_name(base_dir, file_path);
        let name_literal = js_string_literal(&name).map_err(|e| render_error(e.to_string()))?;
        let source_literal = js_string_literal(code).map_err(|e| render_error(e.to_string()))?;

        let mut context = TeraContext::new();
        context.insert("namespace", &self.namespace);
        context.insert("name", &name_literal);
        context.insert("compiler", dialect.client_compiler());
        context.insert("source", &source_literal);

        let script =
            Tera::one_off(JST_WRAPPER, &context, false).map_err(|e| render_error(e.to_string()))?;

        tracing::debug!("Compiled template {} as {}[{}]", file_path.display(), self.namespace, name_literal);
        Ok(script)
    }
}

/// Double-quoted JavaScript string literal for `text`.
///
/// JSON leaves U+2028 and U+2029 unescaped, but older JavaScript engines reject
/// them inside string literals.
fn js_string_literal(text: &str) -> serde_json::Result<String> {
    Ok(serde_json::to_string(text)?.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029"))
}
