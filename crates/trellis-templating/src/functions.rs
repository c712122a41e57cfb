//! Named functions callable from template source.

use handlebars::{Handlebars, HelperDef};

/// Table of Handlebars helpers made available to every compiled template.
///
/// Built up front and handed to the environment, which never mutates it.
#[derive(Clone, Default)]
pub struct Functions {
    prototype: Handlebars<'static>,
    names: Vec<String>,
}

impl Functions {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `helper` under `name`, replacing any previous registration.
    pub fn register<H>(&mut self, name: &str, helper: H) -> &mut Self
    where
        H: HelperDef + Send + Sync + 'static,
    {
        self.prototype.register_helper(name, Box::new(helper));
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<H>(mut self, name: &str, helper: H) -> Self
    where
        H: HelperDef + Send + Sync + 'static,
    {
        self.register(name, helper);
        self
    }

    /// Registered function names, in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether a function called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// A fresh registry carrying only these functions.
    pub(crate) fn registry(&self) -> Handlebars<'static> {
        self.prototype.clone()
    }
}

impl std::fmt::Debug for Functions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Functions").field("names", &self.names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlebars::{handlebars_helper, Context, Helper, HelperResult, Output, RenderContext};

    handlebars_helper!(upper: |s: str| s.to_uppercase());

    fn shout(
        h: &Helper,
        _: &Handlebars,
        _: &Context,
        _: &mut RenderContext,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
        out.write(&format!("{text}!"))?;
        Ok(())
    }

    #[test]
    fn test_register_tracks_names() {
        let functions = Functions::new()
            .with("upper", upper)
            .with("shout", shout)
            .with("upper", upper);

        assert_eq!(functions.names(), ["upper", "shout"]);
        assert!(functions.contains("shout"));
        assert_eq!(functions.len(), 2);
    }

    #[test]
    fn test_registry_carries_helpers() {
        let functions = Functions::new().with("upper", upper).with("shout", shout);
        let mut registry = functions.registry();
        registry
            .register_template_string("t", "{{upper name}} {{shout name}}")
            .unwrap();

        let out = registry
            .render("t", &serde_json::json!({ "name": "hey" }))
            .unwrap();
        assert_eq!(out, "HEY hey!");
    }

    #[test]
    fn test_registries_are_independent() {
        let functions = Functions::new();
        let mut a = functions.registry();
        a.register_template_string("only-in-a", "a").unwrap();
        assert!(!functions.registry().has_template("only-in-a"));
    }
}
