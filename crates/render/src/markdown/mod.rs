//! From rendered HTML to Markdown.

mod images;
mod translate;

pub use images::{ImageRewrite, rewrite_images};
pub use translate::HtmlTranslator;
