#![deny(missing_docs)]
//! mdx-to-md render: runs compiled documents to HTML and flattens HTML to Markdown.

/// Components shipped with the crate.
pub mod components;
/// HTML post-processing and translation.
pub mod markdown;
/// Component registry.
pub mod registry;
/// HTML renderer for mdast documents.
pub mod renderer;
/// Document instantiation.
pub mod runtime;

pub use components::Screenshot;
pub use markdown::{HtmlTranslator, ImageRewrite, rewrite_images};
pub use registry::{Component, ComponentRegistry, Props};
pub use runtime::{MdxComponent, Runtime};
