#![deny(missing_docs)]
//! Converts MDX documents into static Markdown, for generating files such
//! as `README.md` from MDX sources.
//!
//! A conversion bundles the document with its imports, renders it to HTML
//! and translates that HTML back to Markdown. Images come through as
//! `![alt](src)` with their original paths.

/// Batch conversion.
pub mod batch;
/// Serializable settings.
pub mod config;
/// Conversion options.
pub mod options;

pub use batch::{BatchOptions, BatchProcessingResult, BatchResult, BatchStats, mdx_to_md_batch};
pub use config::{ConfigError, ConvertConfig};
pub use mdx_to_md_core::MdxError;
pub use options::{BuildOptionsTransform, MdxToMdOptions, package_components_dir};

use mdx_to_md_core::{BundleRequest, bundle_mdx};
use mdx_to_md_render::{HtmlTranslator, Runtime, rewrite_images};
use std::fs;
use std::path::Path;

/// Convert the MDX document at `path` to Markdown.
///
/// ```no_run
/// let markdown = mdx_to_md::mdx_to_md("docs/README.mdx", None)?;
/// std::fs::write("README.md", markdown)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn mdx_to_md(
    path: impl AsRef<Path>,
    options: Option<&MdxToMdOptions>,
) -> Result<String, MdxError> {
    let path = path.as_ref();
    let defaults;
    let options = match options {
        Some(options) => options,
        None => {
            defaults = MdxToMdOptions::default();
            &defaults
        }
    };

    let source = fs::read_to_string(path).map_err(|source| MdxError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    log::debug!("converting {}", path.display());
    let document = bundle_mdx(BundleRequest {
        source,
        entry: path.to_path_buf(),
        build: options.build_options(path, dir),
        frontmatter: options.gray_matter_options.clone(),
        mdx: options.mdx_options.clone(),
    })?;

    let runtime = Runtime::new(options.components.clone());
    let html = runtime.instantiate(&document).render_to_string()?;
    let images = rewrite_images(&html)?;
    let markdown = HtmlTranslator::default().translate(&images.html)?;
    Ok(images.restore(&markdown))
}
