//! Cached, layout-based template rendering for Trellis.
//!
//! An [`Environment`] resolves a template filename to a compiled Handlebars
//! template set, compiling every page on top of one shared base layout:
//!
//! ```text
//! templates/
//! ├── base.html     <html>{{#> content}}{{/content}}</html>
//! ├── index.html    {{#*inline "content"}}Hello {{name}}{{/inline}}{{> base}}
//! ├── 404.html
//! └── 500.html
//! ```
//!
//! Template bytes come from a pluggable [`Loader`] (file system, bundled
//! assets, memory). Compiled templates are cached per filename unless caching
//! is turned off.
//!
//! ```
//! use trellis_templating::{Environment, MemoryLoader, Options};
//!
//! let loader = MemoryLoader::new()
//!     .with("base.html", "<p>{{#> content}}{{/content}}</p>")
//!     .with("index.html", r#"{{#*inline "content"}}Hello {{name}}{{/inline}}{{> base}}"#);
//! let env = Environment::new(Options::new("base.html").with_loader(loader));
//!
//! let mut out = Vec::new();
//! env.render(&mut out, "index.html", &serde_json::json!({ "name": "Trellis" })).unwrap();
//! assert_eq!(out, b"<p>Hello Trellis</p>");
//! ```

mod base;
pub mod config;
pub mod environment;
pub mod error;
pub mod functions;
pub mod loader;
pub mod response;
pub mod store;
pub mod template;

pub use config::{ConfigError, TemplatingConfig};
pub use environment::{Environment, Options, ERROR_TEMPLATE, NOT_FOUND_TEMPLATE};
pub use error::{LoadError, Result, TemplateError};
pub use functions::Functions;
pub use loader::{asset_loader, fs_loader, AssetLoader, FsLoader, Loader, MemoryLoader};
pub use response::{BufferedResponse, ResponseWriter};
pub use store::{StoreStats, TemplateStore};
pub use template::{template_name, EngineSettings, Template};

/// Re-exported so callers can write helpers without a direct dependency.
pub use handlebars;
