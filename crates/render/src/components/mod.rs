//! Components bundled with mdx-to-md.

mod screenshot;

pub use screenshot::Screenshot;
