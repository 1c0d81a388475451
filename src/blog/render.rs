//! Handlebars-backed page rendering

use handlebars::Handlebars;
use quire_core::{Error, TemplateRenderer};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Template file suffix picked up from the template directory
pub const TEMPLATE_EXTENSION: &str = "html";

/// Renders `Reply::Template` pages. Templates are registered under their
/// path relative to the template directory, extension included (`test.html`).
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        Self { handlebars }
    }

    /// Renderer with every `*.html` file below `dir` registered.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::Template(format!(
                "template directory not found: {}",
                dir.display()
            )));
        }

        let mut renderer = Self::new();
        renderer.load_dir(dir, dir)?;
        Ok(renderer)
    }

    fn load_dir(&mut self, root: &Path, dir: &Path) -> Result<(), Error> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                self.load_dir(root, &path)?;
            } else if path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION) {
                let name = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                let source = fs::read_to_string(&path)?;
                self.register(&name, &source)?;
            }
        }
        Ok(())
    }

    pub fn register(&mut self, name: &str, source: &str) -> Result<(), Error> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| Error::Template(format!("{}: {}", name, e)))?;
        debug!(template = name, "template registered");
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, name: &str, context: &Value) -> Result<String, Error> {
        self.handlebars
            .render(name, context)
            .map_err(|e| Error::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_registered() {
        let mut renderer = HandlebarsRenderer::new();
        renderer
            .register("list.html", "{{#each users}}<li>{{name}}</li>{{/each}}")
            .unwrap();

        let html = renderer
            .render("list.html", &json!({"users": [{"name": "A"}, {"name": "<b>"}]}))
            .unwrap();
        assert_eq!(html, "<li>A</li><li>&lt;b&gt;</li>");
    }

    #[test]
    fn test_unknown_template_is_template_error() {
        let renderer = HandlebarsRenderer::new();
        let err = renderer.render("missing.html", &json!({})).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_site_templates_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("site/templates");
        let renderer = HandlebarsRenderer::from_dir(dir).unwrap();
        assert!(renderer.has_template("test.html"));
    }

    #[test]
    fn test_missing_dir() {
        assert!(HandlebarsRenderer::from_dir("/nonexistent/quire/templates").is_err());
    }
}
