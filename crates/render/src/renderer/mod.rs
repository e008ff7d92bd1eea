//! HTML renderer for compiled MDX documents.

mod context;
mod jsx;
mod render;

pub use context::{Context, Scope};
pub use render::{render_document, render_node};
