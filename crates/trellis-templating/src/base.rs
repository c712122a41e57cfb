//! The base layout every other template is compiled against.

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::error::Result;
use crate::template::{template_name, Template};

/// Holds the designated base layout and, when caching, its compiled form.
#[derive(Debug)]
pub(crate) struct BaseTemplate {
    filename: String,
    cached: OnceCell<Template>,
}

impl BaseTemplate {
    pub(crate) fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            cached: OnceCell::new(),
        }
    }

    pub(crate) fn filename(&self) -> &str {
        &self.filename
    }

    /// Name of the root template in the base set.
    pub(crate) fn name(&self) -> &str {
        template_name(&self.filename)
    }

    /// The compiled base, if cached.
    pub(crate) fn cached(&self) -> Option<&Template> {
        self.cached.get()
    }

    /// Return the base, compiling it with `compile` unless a cached copy exists.
    ///
    /// With `cache` off nothing is kept and every call compiles afresh.
    pub(crate) fn get_or_try_compile<F>(&self, cache: bool, compile: F) -> Result<Template>
    where
        F: FnOnce() -> Result<Template>,
    {
        if !cache {
            return compile();
        }

        if let Some(base) = self.cached.get() {
            trace!(base = %self.filename, "Base template cache hit");
            return Ok(base.clone());
        }

        self.cached.get_or_try_init(compile).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, TemplateError};
    use crate::functions::Functions;
    use crate::template::EngineSettings;
    use std::cell::Cell;

    fn compile() -> Result<Template> {
        Template::compile_root("base", "layout", &Functions::new(), EngineSettings::default())
    }

    #[test]
    fn test_names() {
        let base = BaseTemplate::new("layouts/base.html");
        assert_eq!(base.filename(), "layouts/base.html");
        assert_eq!(base.name(), "layouts/base");
    }

    #[test]
    fn test_cached_once() {
        let base = BaseTemplate::new("base.html");
        let calls = Cell::new(0);

        let a = base
            .get_or_try_compile(true, || {
                calls.set(calls.get() + 1);
                compile()
            })
            .unwrap();
        let b = base
            .get_or_try_compile(true, || {
                calls.set(calls.get() + 1);
                compile()
            })
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Template::ptr_eq(&a, &b));
        assert!(base.cached().is_some());
    }

    #[test]
    fn test_uncached_recompiles() {
        let base = BaseTemplate::new("base.html");
        let calls = Cell::new(0);

        for _ in 0..3 {
            base.get_or_try_compile(false, || {
                calls.set(calls.get() + 1);
                compile()
            })
            .unwrap();
        }

        assert_eq!(calls.get(), 3);
        assert!(base.cached().is_none());
    }

    #[test]
    fn test_failure_is_not_cached() {
        let base = BaseTemplate::new("base.html");

        let err = base
            .get_or_try_compile(true, || {
                Err(TemplateError::from(LoadError::NotFound("base.html".into())))
            })
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(base.cached().is_none());

        assert!(base.get_or_try_compile(true, compile).is_ok());
        assert!(base.cached().is_some());
    }
}
