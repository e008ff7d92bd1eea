#![deny(missing_docs)]
//! mdx-to-md core: frontmatter, MDX parsing, import resolution and bundling.

/// Compilation of a document and its import graph.
pub mod bundle;
/// Core error and diagnostic types.
pub mod error;
/// Top-level import/export scanning.
pub mod esm;
/// Build-time expression evaluation.
pub mod expr;
/// YAML frontmatter extraction helpers.
pub mod frontmatter;
/// Markdown parsing utilities and extension hooks.
pub mod parse;
/// Resolve/load hooks and the built-in plugins.
pub mod plugin;
/// Component path resolution.
pub mod resolve;

pub use bundle::{BuildOptions, BundleRequest, CompiledDocument, ModuleId, ModuleValue, bundle_mdx};
pub use error::{MdxError, SourceLocation};
pub use esm::{EsmError, ModuleSyntax, scan_module};
pub use expr::{Defines, Evaluator, Expr, ExprError, Scope, parse_expression};
pub use frontmatter::{
    FrontmatterError, FrontmatterExtraction, FrontmatterOptions, extract_frontmatter,
    extract_frontmatter_with,
};
pub use parse::{
    AstTransform, MdxOptions, ParseOptions, ParserPipeline, TextTransform, check_mdx_syntax,
    parse_mdast, parse_mdast_with_options,
};
pub use plugin::{
    COMPONENT_NAMESPACE, ComponentPlugin, FILE_NAMESPACE, IMAGE_NAMESPACE, ImagePlugin,
    LoadArgs, LoadOutcome, Loader, Plugin, PluginBuild, ResolveArgs, ResolveOutcome,
    builtin_plugins,
};
pub use resolve::{ComponentNotFound, ComponentResolver, SearchLocation, SearchedBase};
