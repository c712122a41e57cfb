//! Compiled templates and the Handlebars binding.

use std::io::Write;
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{Result, TemplateError};
use crate::functions::Functions;

/// Logical template name for a filename: the filename without its final
/// extension.
///
/// ```
/// use trellis_templating::template_name;
///
/// assert_eq!(template_name("base.html"), "base");
/// assert_eq!(template_name("test/abc.html"), "test/abc");
/// assert_eq!(template_name("noext"), "noext");
/// ```
pub fn template_name(filename: &str) -> &str {
    let file_start = filename.rfind('/').map(|i| i + 1).unwrap_or(0);
    match filename[file_start..].rfind('.') {
        Some(dot) => &filename[..file_start + dot],
        None => filename,
    }
}

/// Engine settings applied to every registry an environment builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Treat missing fields as render errors.
    pub strict_mode: bool,
    /// HTML-escape `{{expr}}` output.
    pub escape_html: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strict_mode: false,
            escape_html: true,
        }
    }
}

/// A compiled template set ready to execute against data.
///
/// Cloning is cheap; clones share the same compiled registry.
#[derive(Clone)]
pub struct Template {
    name: String,
    registry: Arc<Handlebars<'static>>,
}

impl Template {
    /// Compile `source` as the root of a fresh set under `name`.
    pub(crate) fn compile_root(
        name: &str,
        source: &str,
        functions: &Functions,
        settings: EngineSettings,
    ) -> Result<Self> {
        let mut registry = functions.registry();
        registry.set_strict_mode(settings.strict_mode);
        if !settings.escape_html {
            registry.register_escape_fn(handlebars::no_escape);
        }

        register(&mut registry, name, source)?;
        Ok(Self {
            name: name.to_string(),
            registry: Arc::new(registry),
        })
    }

    /// Compile `source` as an addition to this set, returning the extended set.
    ///
    /// `self` is left untouched so it can keep serving as the parent of other
    /// children.
    pub(crate) fn extend(&self, name: &str, source: &str) -> Result<Self> {
        let mut registry = (*self.registry).clone();
        register(&mut registry, name, source)?;
        Ok(Self {
            name: name.to_string(),
            registry: Arc::new(registry),
        })
    }

    /// Name of the entry template.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the set contains a template called `name`.
    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Names of all templates in the set, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .registry
            .get_templates()
            .keys()
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Execute the entry template with `data`, writing the output to `writer`.
    pub fn execute<W, T>(&self, writer: &mut W, data: &T) -> Result<()>
    where
        W: Write + ?Sized,
        T: Serialize,
    {
        self.execute_template(writer, &self.name, data)
    }

    /// Execute the named template of the set.
    ///
    /// Output is rendered fully before anything is written, so a failed
    /// execution leaves `writer` untouched.
    pub fn execute_template<W, T>(&self, writer: &mut W, name: &str, data: &T) -> Result<()>
    where
        W: Write + ?Sized,
        T: Serialize,
    {
        let output = self.render_template(name, data)?;
        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    /// Render the named template of the set into a string.
    pub fn render_template<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.registry
            .render(name, data)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    /// Whether both handles point at the same compiled set.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.registry, &b.registry)
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("templates", &self.template_names())
            .finish()
    }
}

fn register(registry: &mut Handlebars<'static>, name: &str, source: &str) -> Result<()> {
    registry
        .register_template_string(name, source)
        .map_err(|e| TemplateError::Parse {
            name: name.to_string(),
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("base.html", "base" ; "simple extension")]
    #[test_case("test/abc.html", "test/abc" ; "nested path")]
    #[test_case("noext", "noext" ; "no extension")]
    #[test_case("archive.tar.gz", "archive.tar" ; "only final extension")]
    #[test_case("dir.d/page", "dir.d/page" ; "dot in directory only")]
    #[test_case(".hidden", "" ; "leading dot is an extension")]
    fn test_template_name(filename: &str, expected: &str) {
        assert_eq!(template_name(filename), expected);
    }

    proptest! {
        #[test]
        fn test_template_name_strips_appended_extension(
            stem in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            ext in "[a-z]{1,4}",
        ) {
            let filename = format!("{stem}.{ext}");
            prop_assert_eq!(template_name(&filename), stem.as_str());
        }
    }

    fn root(source: &str) -> Template {
        Template::compile_root("base", source, &Functions::new(), EngineSettings::default())
            .unwrap()
    }

    #[test]
    fn test_execute_entry() {
        let t = root("Hello, {{name}}!");
        let mut out = Vec::new();
        t.execute(&mut out, &json!({ "name": "World" })).unwrap();
        assert_eq!(out, b"Hello, World!");
    }

    #[test]
    fn test_extend_keeps_parent_untouched() {
        let base = root("<main>{{#> content}}default{{/content}}</main>");
        let child = base
            .extend("page.html", r#"{{#*inline "content"}}page{{/inline}}{{> base}}"#)
            .unwrap();

        assert_eq!(child.name(), "page.html");
        assert_eq!(child.template_names(), vec!["base", "page.html"]);
        assert!(!base.has_template("page.html"));
        assert_eq!(child.render_template("page.html", &()).unwrap(), "<main>page</main>");
        assert_eq!(base.render_template("base", &()).unwrap(), "<main>default</main>");
    }

    #[test]
    fn test_parse_error_names_template() {
        let err = Template::compile_root(
            "base",
            "{{#if}}",
            &Functions::new(),
            EngineSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::Parse { ref name, .. } if name == "base"));
    }

    #[test]
    fn test_failed_execution_writes_nothing() {
        let t = Template::compile_root(
            "base",
            "before {{missing.field}} after",
            &Functions::new(),
            EngineSettings {
                strict_mode: true,
                escape_html: true,
            },
        )
        .unwrap();

        let mut out = Vec::new();
        let err = t.execute(&mut out, &json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_escape_settings() {
        let escaped = root("{{v}}");
        assert_eq!(
            escaped.render_template("base", &json!({ "v": "<b>" })).unwrap(),
            "&lt;b&gt;"
        );

        let raw = Template::compile_root(
            "base",
            "{{v}}",
            &Functions::new(),
            EngineSettings {
                strict_mode: false,
                escape_html: false,
            },
        )
        .unwrap();
        assert_eq!(raw.render_template("base", &json!({ "v": "<b>" })).unwrap(), "<b>");
    }

    #[test]
    fn test_ptr_eq() {
        let t = root("x");
        let same = t.clone();
        let other = root("x");
        assert!(Template::ptr_eq(&t, &same));
        assert!(!Template::ptr_eq(&t, &other));
    }
}
