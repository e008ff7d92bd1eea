//! Filesystem resolution of components-namespace imports.
//!
//! A reference such as `@/components/screenshot` is looked up, in order,
//! next to the importing file, under the project root, under the project's
//! `components/` directory, and under the `components/` directory shipped
//! with this package. Each base is tried verbatim, with a source extension
//! appended, and as a directory holding an `index` file.

use std::fmt;
use std::path::{Path, PathBuf};

/// Default namespace prefix for component imports.
pub const DEFAULT_COMPONENT_PREFIX: &str = "@/components/";

/// Source extensions tried after the verbatim path, in priority order.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["jsx", "tsx", "js", "ts"];

/// Where a base candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLocation {
    /// Relative to the importing file's directory.
    ImporterDirectory,
    /// Relative to the project root.
    ProjectRoot,
    /// Under `<project root>/components`, prefix stripped.
    ProjectComponents,
    /// Under the package's bundled `components` directory, prefix stripped.
    PackageComponents,
}

impl SearchLocation {
    fn label(self) -> &'static str {
        match self {
            SearchLocation::ImporterDirectory => "importer directory",
            SearchLocation::ProjectRoot => "project root",
            SearchLocation::ProjectComponents => "project components directory",
            SearchLocation::PackageComponents => "package components directory",
        }
    }
}

/// A base path together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchedBase {
    /// Rule that produced the base.
    pub location: SearchLocation,
    /// Base path before extension variants are applied.
    pub path: PathBuf,
}

/// Raised when a components-namespace import matches no file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNotFound {
    /// The import path as written.
    pub reference: String,
    /// Every base location that was searched, in priority order.
    pub searched: Vec<SearchedBase>,
}

impl fmt::Display for ComponentNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not resolve component \"{}\". Searched:", self.reference)?;
        for base in &self.searched {
            write!(f, "\n  - {} ({})", base.path.display(), base.location.label())?;
        }
        Ok(())
    }
}

impl std::error::Error for ComponentNotFound {}

/// Yields `base`, `base.<ext>` and `base/index.<ext>` in priority order.
pub fn file_variants(base: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    let with_extension = SOURCE_EXTENSIONS
        .iter()
        .map(move |ext| append_extension(base, ext));
    let index_files = SOURCE_EXTENSIONS
        .iter()
        .map(move |ext| base.join(format!("index.{ext}")));
    std::iter::once(base.to_path_buf())
        .chain(with_extension)
        .chain(index_files)
}

/// Returns the first existing regular file among [`file_variants`].
pub fn find_file(base: &Path) -> Option<PathBuf> {
    file_variants(base).find(|candidate| candidate.is_file())
}

// `Path::with_extension` would replace a dotted component name's suffix.
fn append_extension(base: &Path, ext: &str) -> PathBuf {
    let mut raw = base.as_os_str().to_os_string();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Resolves components-namespace references against a fixed search order.
#[derive(Debug, Clone)]
pub struct ComponentResolver {
    prefix: String,
    project_root: PathBuf,
    package_components: PathBuf,
    entry: PathBuf,
}

impl ComponentResolver {
    /// Create a resolver.
    ///
    /// `entry` is the top-level document, used when an import carries no
    /// importer of its own.
    pub fn new(
        project_root: impl Into<PathBuf>,
        package_components: impl Into<PathBuf>,
        entry: impl Into<PathBuf>,
    ) -> Self {
        Self {
            prefix: DEFAULT_COMPONENT_PREFIX.to_string(),
            project_root: project_root.into(),
            package_components: package_components.into(),
            entry: entry.into(),
        }
    }

    /// Replace the namespace prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The namespace prefix that routes imports to this resolver.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `reference` belongs to the components namespace.
    pub fn matches(&self, reference: &str) -> bool {
        reference.starts_with(&self.prefix)
    }

    /// The four base locations for `reference`, in priority order.
    pub fn bases(&self, reference: &str, importer: Option<&Path>) -> Vec<SearchedBase> {
        let importer = importer.unwrap_or(&self.entry);
        let importer_dir = importer.parent().unwrap_or_else(|| Path::new(""));
        let stripped = reference
            .strip_prefix(&self.prefix)
            .unwrap_or(reference)
            .trim_start_matches('/');

        vec![
            SearchedBase {
                location: SearchLocation::ImporterDirectory,
                path: importer_dir.join(reference),
            },
            SearchedBase {
                location: SearchLocation::ProjectRoot,
                path: self.project_root.join(reference),
            },
            SearchedBase {
                location: SearchLocation::ProjectComponents,
                path: self.project_root.join("components").join(stripped),
            },
            SearchedBase {
                location: SearchLocation::PackageComponents,
                path: self.package_components.join(stripped),
            },
        ]
    }

    /// Every candidate file, lazily, in the order they are checked.
    pub fn candidates(
        &self,
        reference: &str,
        importer: Option<&Path>,
    ) -> impl Iterator<Item = PathBuf> {
        self.bases(reference, importer)
            .into_iter()
            .flat_map(|base| file_variants(&base.path).collect::<Vec<_>>())
    }

    /// Resolve `reference` to the first existing candidate file.
    pub fn resolve(
        &self,
        reference: &str,
        importer: Option<&Path>,
    ) -> Result<PathBuf, ComponentNotFound> {
        match self
            .candidates(reference, importer)
            .find(|candidate| candidate.is_file())
        {
            Some(found) => {
                log::debug!("resolved {} to {}", reference, found.display());
                Ok(found)
            }
            None => Err(ComponentNotFound {
                reference: reference.to_string(),
                searched: self.bases(reference, importer),
            }),
        }
    }
}
