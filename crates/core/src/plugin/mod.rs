//! Build-time resolve/load interception.
//!
//! Plugins register predicate-guarded hooks on a [`PluginBuild`]. During a
//! bundle every import path is offered to the resolve hooks in registration
//! order, and every resolved module to the load hooks of its namespace. The
//! first hook returning `Some` wins; an `Err` aborts the bundle as-is.

mod component;
mod image;

pub use component::{COMPONENT_NAMESPACE, ComponentPlugin};
pub use image::{IMAGE_NAMESPACE, ImagePlugin};

use crate::MdxError;
use crate::resolve::ComponentResolver;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Namespace of modules that live on disk.
pub const FILE_NAMESPACE: &str = "file";

/// How loaded module contents are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    /// JavaScript module.
    Js,
    /// JavaScript with JSX.
    Jsx,
    /// TypeScript module.
    Ts,
    /// TypeScript with JSX.
    Tsx,
    /// JSON document exported as `default`.
    Json,
    /// Raw text exported as `default`.
    Text,
    /// Asset whose public URL is exported as `default`.
    File,
}

impl Loader {
    /// Pick a loader from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "js" | "mjs" | "cjs" => Loader::Js,
            "jsx" => Loader::Jsx,
            "ts" | "mts" | "cts" => Loader::Ts,
            "tsx" => Loader::Tsx,
            "json" => Loader::Json,
            "txt" | "md" => Loader::Text,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "avif" => Loader::File,
            _ => return None,
        })
    }

    /// Whether contents are ECMAScript source.
    pub fn is_script(self) -> bool {
        matches!(self, Loader::Js | Loader::Jsx | Loader::Ts | Loader::Tsx)
    }
}

/// Arguments passed to resolve hooks.
#[derive(Debug, Clone, Copy)]
pub struct ResolveArgs<'a> {
    /// The import path as written.
    pub path: &'a str,
    /// The module issuing the import, if it is a file.
    pub importer: Option<&'a Path>,
    /// Directory relative imports are resolved against.
    pub resolve_dir: &'a Path,
}

/// Where a resolve hook redirected an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutcome {
    /// Resolved path (a real file, or a virtual key inside `namespace`).
    pub path: PathBuf,
    /// Namespace the module is loaded from.
    pub namespace: String,
}

/// Arguments passed to load hooks.
#[derive(Debug, Clone, Copy)]
pub struct LoadArgs<'a> {
    /// Resolved path.
    pub path: &'a Path,
    /// Namespace assigned at resolution.
    pub namespace: &'a str,
}

/// Contents produced by a load hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Module source.
    pub contents: String,
    /// How `contents` are interpreted.
    pub loader: Loader,
}

type ResolveCallback =
    dyn Fn(&ResolveArgs<'_>) -> Result<Option<ResolveOutcome>, MdxError> + Send + Sync;
type LoadCallback = dyn Fn(&LoadArgs<'_>) -> Result<Option<LoadOutcome>, MdxError> + Send + Sync;

struct ResolveHook {
    plugin: String,
    filter: Regex,
    callback: Box<ResolveCallback>,
}

struct LoadHook {
    plugin: String,
    filter: Regex,
    namespace: String,
    callback: Box<LoadCallback>,
}

/// A build extension, installed once per bundle.
pub trait Plugin: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;
    /// Register hooks.
    fn setup(&self, build: &mut PluginBuild);
}

/// Ordered hook registry handed to [`Plugin::setup`].
#[derive(Default)]
pub struct PluginBuild {
    current: String,
    resolve_hooks: Vec<ResolveHook>,
    load_hooks: Vec<LoadHook>,
}

impl PluginBuild {
    /// Install `plugins` in order.
    pub fn install(plugins: &[Arc<dyn Plugin>]) -> Self {
        let mut build = Self::default();
        for plugin in plugins {
            build.current = plugin.name().to_string();
            plugin.setup(&mut build);
        }
        build.current.clear();
        build
    }

    /// Register a resolve hook for import paths matching `filter`.
    pub fn on_resolve<F>(&mut self, filter: Regex, callback: F)
    where
        F: Fn(&ResolveArgs<'_>) -> Result<Option<ResolveOutcome>, MdxError> + Send + Sync + 'static,
    {
        self.resolve_hooks.push(ResolveHook {
            plugin: self.current.clone(),
            filter,
            callback: Box::new(callback),
        });
    }

    /// Register a load hook for paths in `namespace` matching `filter`.
    pub fn on_load<F>(&mut self, filter: Regex, namespace: impl Into<String>, callback: F)
    where
        F: Fn(&LoadArgs<'_>) -> Result<Option<LoadOutcome>, MdxError> + Send + Sync + 'static,
    {
        self.load_hooks.push(LoadHook {
            plugin: self.current.clone(),
            filter,
            namespace: namespace.into(),
            callback: Box::new(callback),
        });
    }

    /// Offer `args` to the resolve hooks; the first `Some` wins.
    pub fn resolve(&self, args: &ResolveArgs<'_>) -> Result<Option<ResolveOutcome>, MdxError> {
        for hook in &self.resolve_hooks {
            if !hook.filter.is_match(args.path) {
                continue;
            }
            if let Some(outcome) = (hook.callback)(args)? {
                log::debug!(
                    "[{}] resolved {} to {}:{}",
                    hook.plugin,
                    args.path,
                    outcome.namespace,
                    outcome.path.display()
                );
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }

    /// Offer `args` to the load hooks of its namespace; the first `Some` wins.
    pub fn load(&self, args: &LoadArgs<'_>) -> Result<Option<LoadOutcome>, MdxError> {
        let path = args.path.to_string_lossy();
        for hook in &self.load_hooks {
            if hook.namespace != args.namespace || !hook.filter.is_match(&path) {
                continue;
            }
            if let Some(outcome) = (hook.callback)(args)? {
                log::debug!("[{}] loaded {}:{}", hook.plugin, args.namespace, path);
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }
}

/// The built-in plugins, in the priority order they must be installed.
pub fn builtin_plugins(resolver: Arc<ComponentResolver>) -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(ImagePlugin),
        Arc::new(ComponentPlugin::new(resolver)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rename;

    impl Plugin for Rename {
        fn name(&self) -> &str {
            "rename"
        }

        fn setup(&self, build: &mut PluginBuild) {
            build.on_resolve(Regex::new(r"^virtual:").unwrap(), |args| {
                Ok(Some(ResolveOutcome {
                    path: PathBuf::from(args.path.trim_start_matches("virtual:")),
                    namespace: "virtual".to_string(),
                }))
            });
            build.on_load(Regex::new(".*").unwrap(), "virtual", |args| {
                Ok(Some(LoadOutcome {
                    contents: format!("export default {:?}", args.path.display().to_string()),
                    loader: Loader::Js,
                }))
            });
        }
    }

    struct Decline;

    impl Plugin for Decline {
        fn name(&self) -> &str {
            "decline"
        }

        fn setup(&self, build: &mut PluginBuild) {
            build.on_resolve(Regex::new(".*").unwrap(), |_| Ok(None));
        }
    }

    fn args<'a>(path: &'a str) -> ResolveArgs<'a> {
        ResolveArgs {
            path,
            importer: None,
            resolve_dir: Path::new("."),
        }
    }

    #[test]
    fn unmatched_paths_fall_through() {
        let build = PluginBuild::install(&[Arc::new(Rename) as Arc<dyn Plugin>]);
        assert_eq!(build.resolve(&args("./local")).unwrap(), None);
    }

    #[test]
    fn declining_hook_defers_to_the_next() {
        let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(Decline), Arc::new(Rename)];
        let build = PluginBuild::install(&plugins);
        let outcome = build.resolve(&args("virtual:thing")).unwrap().unwrap();
        assert_eq!(outcome.namespace, "virtual");
        assert_eq!(outcome.path, PathBuf::from("thing"));
    }

    #[test]
    fn load_hooks_are_scoped_by_namespace() {
        let build = PluginBuild::install(&[Arc::new(Rename) as Arc<dyn Plugin>]);
        let path = Path::new("thing");
        let loaded = build
            .load(&LoadArgs {
                path,
                namespace: "virtual",
            })
            .unwrap()
            .unwrap();
        assert_eq!(loaded.contents, "export default \"thing\"");

        let other = build
            .load(&LoadArgs {
                path,
                namespace: FILE_NAMESPACE,
            })
            .unwrap();
        assert!(other.is_none());
    }

    #[test]
    fn loader_from_extension() {
        assert_eq!(Loader::from_path(Path::new("a/b.tsx")), Some(Loader::Tsx));
        assert_eq!(Loader::from_path(Path::new("data.JSON")), Some(Loader::Json));
        assert_eq!(Loader::from_path(Path::new("doc.mdx")), None);
        assert!(Loader::Jsx.is_script());
        assert!(!Loader::File.is_script());
    }
}
