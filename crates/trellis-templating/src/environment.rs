//! The template environment: resolves filenames to compiled templates, caches
//! them and renders them.

use std::io::Write;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use crate::base::BaseTemplate;
use crate::config::TemplatingConfig;
use crate::error::{Result, TemplateError};
use crate::functions::Functions;
use crate::loader::{FsLoader, Loader};
use crate::response::ResponseWriter;
use crate::store::{StoreStats, TemplateStore};
use crate::template::{EngineSettings, Template};

/// Template rendered by [`Environment::render_not_found`].
pub const NOT_FOUND_TEMPLATE: &str = "404.html";

/// Template rendered by [`Environment::render_error`].
pub const ERROR_TEMPLATE: &str = "500.html";

/// Construction options for an [`Environment`].
#[derive(Clone)]
pub struct Options {
    /// Filename of the base template all other templates inherit from.
    pub base: String,
    /// Keep compiled templates for the life of the environment.
    pub cache: bool,
    /// Functions templates can call.
    pub functions: Functions,
    /// Source of template bytes.
    pub loader: Option<Arc<dyn Loader>>,
    /// Engine behavior shared by every compiled template.
    pub settings: EngineSettings,
}

impl Options {
    /// Options for `base` with caching on and no loader.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            cache: true,
            functions: Functions::new(),
            loader: None,
            settings: EngineSettings::default(),
        }
    }

    /// Options described by `config`, reading templates from `config.root`.
    pub fn from_config(config: &TemplatingConfig) -> Self {
        Self::new(config.base.clone())
            .with_cache(config.cache)
            .with_settings(config.engine_settings())
            .with_loader(FsLoader::new(config.root.clone()))
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_functions(mut self, functions: Functions) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Use an already shared loader.
    pub fn with_shared_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new(TemplatingConfig::default().base)
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("base", &self.base)
            .field("cache", &self.cache)
            .field("functions", &self.functions)
            .field("loader", &self.loader.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Resolves template filenames to compiled templates and renders them.
///
/// Every non-base template is compiled on top of the base layout. With caching
/// on, the base and each template are compiled once and reused; with caching
/// off, every load reads and compiles again and nothing is stored.
///
/// An `Environment` is meant to be shared between request handlers
/// (`Arc<Environment>`); all methods take `&self`.
pub struct Environment {
    options: Options,
    store: TemplateStore,
    base: BaseTemplate,
}

impl Environment {
    /// Build an environment. No template is read until first use.
    pub fn new(options: Options) -> Self {
        let base = BaseTemplate::new(options.base.clone());
        Self {
            options,
            store: TemplateStore::new(),
            base,
        }
    }

    /// Build an environment from configuration.
    pub fn from_config(config: &TemplatingConfig) -> Self {
        Self::new(Options::from_config(config))
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Render `filename` with `data` into `writer`.
    ///
    /// On failure the error message is written to `writer` in place of the
    /// page, and the error is returned.
    pub fn render<W, T>(&self, writer: &mut W, filename: &str, data: &T) -> Result<()>
    where
        W: Write + ?Sized,
        T: Serialize,
    {
        if let Err(err) = self.render_template(writer, filename, data) {
            warn!(template = filename, error = %err, "Template render failed");
            if let Err(write_err) = writer.write_all(err.to_string().as_bytes()) {
                debug!(template = filename, error = %write_err, "Failed to write error text");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Set status 404 and render [`NOT_FOUND_TEMPLATE`] with `msg`.
    pub fn render_not_found<R>(&self, writer: &mut R, msg: &str) -> Result<()>
    where
        R: ResponseWriter + ?Sized,
    {
        writer.write_status(StatusCode::NOT_FOUND);
        self.render(writer, NOT_FOUND_TEMPLATE, &msg)
    }

    /// Set status 500 and render [`ERROR_TEMPLATE`] with `msg`.
    pub fn render_error<R>(&self, writer: &mut R, msg: &str) -> Result<()>
    where
        R: ResponseWriter + ?Sized,
    {
        writer.write_status(StatusCode::INTERNAL_SERVER_ERROR);
        self.render(writer, ERROR_TEMPLATE, &msg)
    }

    /// Load `filename` and execute it with `data`, writing to `writer`.
    ///
    /// The compiled template's own entry is executed, not the layout. A child
    /// picks up the base layout only by ending in `{{> <base stem>}}` (for a
    /// base of `base.html`, `{{> base}}`); a child without that partial
    /// renders on its own.
    pub fn render_template<W, T>(&self, writer: &mut W, filename: &str, data: &T) -> Result<()>
    where
        W: Write + ?Sized,
        T: Serialize,
    {
        let template = self.load_template(filename)?;
        template.execute(writer, data)
    }

    /// Resolve `filename` to its compiled template.
    ///
    /// Fails with [`TemplateError::NoLoader`] for any filename when no loader
    /// is configured.
    pub fn load_template(&self, filename: &str) -> Result<Template> {
        if self.options.loader.is_none() {
            return Err(TemplateError::NoLoader);
        }

        if !self.options.cache {
            return self.compile(filename);
        }

        self.store
            .get_or_try_insert_with(filename, || self.compile(filename))
    }

    /// Filenames with a cached compiled template, sorted.
    pub fn cached_templates(&self) -> Vec<String> {
        self.store.keys()
    }

    /// Whether `filename` has a cached compiled template.
    pub fn is_cached(&self, filename: &str) -> bool {
        self.store.contains(filename)
    }

    pub fn cache_stats(&self) -> StoreStats {
        self.store.stats()
    }

    fn compile(&self, filename: &str) -> Result<Template> {
        if filename == self.base.filename() {
            self.load_base()
        } else {
            self.load_child(filename)
        }
    }

    fn load_base(&self) -> Result<Template> {
        self.base.get_or_try_compile(self.options.cache, || {
            let source = self.load_source(self.base.filename())?;
            let template = Template::compile_root(
                self.base.name(),
                &source,
                &self.options.functions,
                self.options.settings,
            )?;
            debug!(base = self.base.filename(), name = template.name(), "Compiled base template");
            Ok(template)
        })
    }

    fn load_child(&self, filename: &str) -> Result<Template> {
        let base = self
            .load_base()
            .map_err(|source| TemplateError::BaseUnavailable {
                base: self.base.filename().to_string(),
                source: Box::new(source),
            })?;

        let source = self.load_source(filename)?;
        let template = base.extend(filename, &source)?;
        debug!(template = filename, base = base.name(), "Compiled template");
        Ok(template)
    }

    fn load_source(&self, filename: &str) -> Result<String> {
        let loader = self.options.loader.as_ref().ok_or(TemplateError::NoLoader)?;
        let bytes = loader.load(filename)?;
        String::from_utf8(bytes).map_err(|source| TemplateError::Encoding {
            name: filename.to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("options", &self.options)
            .field("store", &self.store)
            .field("base_cached", &self.base.cached().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use crate::response::BufferedResponse;

    fn env(cache: bool) -> Environment {
        let loader = MemoryLoader::new()
            .with("base.html", "<h1>{{#> title}}Site{{/title}}</h1>")
            .with("index.html", r#"{{#*inline "title"}}Home{{/inline}}{{> base}}"#)
            .with("404.html", "missing: {{this}}")
            .with("broken.html", "{{#each}}");

        Environment::new(Options::new("base.html").with_cache(cache).with_loader(loader))
    }

    #[test]
    fn test_no_io_at_construction() {
        let env = Environment::new(Options::new("base.html"));
        assert!(env.cached_templates().is_empty());
        assert!(env.base.cached().is_none());
    }

    #[test]
    fn test_no_loader_fails_every_filename_directly() {
        let env = Environment::new(Options::new("base.html"));
        for name in ["base.html", "index.html", NOT_FOUND_TEMPLATE] {
            assert!(matches!(env.load_template(name), Err(TemplateError::NoLoader)));
        }
        assert_eq!(env.cache_stats(), StoreStats::default());
    }

    #[test]
    fn test_child_without_base_partial_renders_alone() {
        let env = Environment::new(
            Options::new("base.html").with_loader(
                MemoryLoader::new()
                    .with("base.html", "<h1>{{#> title}}Site{{/title}}</h1>")
                    .with("bare.html", "just {{this}}"),
            ),
        );
        let mut out = Vec::new();
        env.render(&mut out, "bare.html", &"text").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "just text");
    }

    #[test]
    fn test_render_child_over_base() {
        let mut out = Vec::new();
        env(true).render(&mut out, "index.html", &()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<h1>Home</h1>");
    }

    #[test]
    fn test_render_base_directly() {
        let mut out = Vec::new();
        env(true).render(&mut out, "base.html", &()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<h1>Site</h1>");
    }

    #[test]
    fn test_render_writes_error_text() {
        let mut out = Vec::new();
        let err = env(true).render(&mut out, "broken.html", &()).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
        assert_eq!(String::from_utf8(out).unwrap(), err.to_string());
    }

    struct ClosedWriter;

    impl Write for ClosedWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_error_survives_failed_error_write() {
        let err = env(true).render(&mut ClosedWriter, "gone.html", &()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_render_not_found_sets_status() {
        let mut response = BufferedResponse::new();
        env(true).render_not_found(&mut response, "no such page").unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "missing: no such page");
    }

    #[test]
    fn test_render_error_without_template_falls_back_to_message() {
        let mut response = BufferedResponse::new();
        let err = env(true).render_error(&mut response, "boom").unwrap_err();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_not_found());
        assert_eq!(response.text(), "template not found: 500.html");
    }

    #[test]
    fn test_base_is_shared_parent_when_cached() {
        let env = env(true);
        env.load_template("index.html").unwrap();
        env.load_template("404.html").unwrap();

        let base = env.load_template("base.html").unwrap();
        let cached_base = env.base.cached().unwrap();
        assert!(Template::ptr_eq(&base, cached_base));
    }

    #[test]
    fn test_uncached_stores_nothing() {
        let env = env(false);
        let a = env.load_template("index.html").unwrap();
        let b = env.load_template("index.html").unwrap();

        assert!(!Template::ptr_eq(&a, &b));
        assert!(env.cached_templates().is_empty());
        assert!(env.base.cached().is_none());
    }
}
