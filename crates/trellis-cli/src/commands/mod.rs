//! Command implementations.

mod check;
mod render;

pub use check::CheckCommand;
pub use render::RenderCommand;
