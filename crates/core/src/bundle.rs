//! Compiles an MDX document and its import graph into a [`CompiledDocument`].
//!
//! There is no JavaScript output: imported modules are scanned for their
//! interface and every export is reduced to a [`ModuleValue`] that the
//! runtime can bind. Resolution and loading go through the plugin hooks
//! first and fall back to the filesystem.

use crate::error::{MdxError, SourceLocation};
use crate::esm::{EsmError, ExportKind, ImportSpecifier, ModuleSyntax, scan_module};
use crate::expr::{Defines, Evaluator, Scope};
use crate::frontmatter::{FrontmatterOptions, extract_frontmatter_with};
use crate::parse::{MdxOptions, ParserPipeline, check_mdx_syntax};
use crate::plugin::{FILE_NAMESPACE, LoadArgs, Loader, Plugin, PluginBuild, ResolveArgs};
use crate::resolve::find_file;
use markdown::mdast::Node;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Component as PathComponent, Path, PathBuf};
use std::sync::Arc;

/// The build configuration handed to plugins and the default loaders.
#[derive(Clone, Default)]
pub struct BuildOptions {
    /// Directory the document's relative imports are resolved against.
    pub cwd: PathBuf,
    /// Output directory `file`-loaded asset URLs are relative to.
    pub outdir: PathBuf,
    /// Prefix of `file`-loaded asset URLs.
    pub public_path: String,
    /// Compile-time substitutions; values are JavaScript expressions.
    pub define: BTreeMap<String, String>,
    /// Plugins, in installation order.
    pub plugins: Vec<Arc<dyn Plugin>>,
}

impl std::fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plugins: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("BuildOptions")
            .field("cwd", &self.cwd)
            .field("outdir", &self.outdir)
            .field("public_path", &self.public_path)
            .field("define", &self.define)
            .field("plugins", &plugins)
            .finish()
    }
}

/// Everything needed to compile one document.
#[derive(Debug, Clone, Default)]
pub struct BundleRequest {
    /// Document source, frontmatter included.
    pub source: String,
    /// Path of the document.
    pub entry: PathBuf,
    /// Build configuration.
    pub build: BuildOptions,
    /// Frontmatter extraction options.
    pub frontmatter: FrontmatterOptions,
    /// Parser options and transforms.
    pub mdx: MdxOptions,
}

/// A value exported by a module.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleValue {
    /// Plain data.
    Value(JsonValue),
    /// A component, rendered through the registry under this name.
    Component(String),
    /// All exports of a module.
    Namespace(BTreeMap<String, ModuleValue>),
    /// An initializer that could not be evaluated at build time.
    Opaque(String),
    /// An export of a bare (package) specifier.
    External(String),
}

impl ModuleValue {
    /// The data view of this value, if it has one.
    pub fn to_json(&self) -> Option<JsonValue> {
        match self {
            ModuleValue::Value(value) => Some(value.clone()),
            ModuleValue::Namespace(exports) => Some(JsonValue::Object(
                exports
                    .iter()
                    .filter_map(|(name, value)| Some((name.clone(), value.to_json()?)))
                    .collect::<Map<_, _>>(),
            )),
            _ => None,
        }
    }
}

impl Scope for BTreeMap<String, ModuleValue> {
    fn lookup(&self, name: &str) -> Option<JsonValue> {
        self.get(name).and_then(ModuleValue::to_json)
    }
}

/// Identity of a loaded module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    /// Namespace assigned at resolution.
    pub namespace: String,
    /// Path inside that namespace.
    pub path: PathBuf,
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace == FILE_NAMESPACE {
            write!(f, "{}", self.path.display())
        } else {
            write!(f, "{}:{}", self.namespace, self.path.display())
        }
    }
}

/// The result of bundling: the document tree plus everything it binds.
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    /// Path of the document.
    pub entry: PathBuf,
    /// Parsed body (frontmatter removed).
    pub root: Node,
    /// Frontmatter data; an empty object when absent.
    pub frontmatter: JsonValue,
    /// Names in scope for the body: imports, top-level declarations and
    /// `frontmatter`.
    pub bindings: BTreeMap<String, ModuleValue>,
    /// The document's own exports.
    pub exports: BTreeMap<String, ModuleValue>,
    /// Parsed compile-time substitutions.
    pub defines: Defines,
    /// Modules loaded while bundling, in load order.
    pub modules: Vec<ModuleId>,
}

type Exports = BTreeMap<String, ModuleValue>;

enum Resolved {
    Module(ModuleId),
    External(String),
}

enum Loaded {
    Module { id: ModuleId, exports: Exports },
    /// Still being loaded further up the stack.
    Pending(ModuleId),
    External(String),
}

/// Bundles an MDX document.
///
/// Frontmatter is extracted first, the body is parsed with the MDX
/// constructs enabled, and every `import` in the document's ESM blocks is
/// resolved and loaded recursively.
///
/// # Example
///
/// ```ignore
/// use mdx_to_md_core::bundle::{BundleRequest, bundle_mdx};
///
/// let doc = bundle_mdx(BundleRequest {
///     source: "---\ntitle: Hi\n---\n# {frontmatter.title}\n".into(),
///     entry: "README.mdx".into(),
///     ..Default::default()
/// })?;
/// assert_eq!(doc.frontmatter["title"], "Hi");
/// ```
pub fn bundle_mdx(request: BundleRequest) -> Result<CompiledDocument, MdxError> {
    let BundleRequest {
        source,
        entry,
        build,
        frontmatter,
        mdx,
    } = request;

    let extraction = extract_frontmatter_with(&source, &frontmatter)?;
    let body = &source[extraction.body_start..];
    let line_offset = source[..extraction.body_start].matches('\n').count();
    let pipeline = ParserPipeline::from_mdx_options(&mdx);
    let prepared = pipeline.prepare(body);
    let root = pipeline.parse_prepared(&prepared)?;

    let defines = Defines::parse(&build.define).map_err(|err| MdxError::bundle(err.to_string()))?;
    let file = entry.display().to_string();

    let mut syntax = ModuleSyntax::default();
    for node in root.children().map(Vec::as_slice).unwrap_or_default() {
        let Node::MdxjsEsm(esm) = node else {
            continue;
        };
        let start_line = esm.position.as_ref().map(|p| p.start.line).unwrap_or(1);
        let block = scan_module(&esm.value).map_err(|err| {
            esm_error(&file, &err, line_offset + start_line - 1)
        })?;
        merge_syntax(&mut syntax, block);
    }
    check_mdx_syntax(&prepared, &mdx.parse, &file, line_offset)?;

    let mut bundler = Bundler::new(&build, &defines);
    let mut bindings = Exports::new();
    bindings.insert(
        "frontmatter".to_string(),
        ModuleValue::Value(extraction.value.clone()),
    );
    let exports = bundler.link(&syntax, &entry, &build.cwd, &mut bindings)?;

    log::debug!(
        "bundled {} ({} modules, {} bindings)",
        entry.display(),
        bundler.order.len(),
        bindings.len()
    );
    let modules = bundler.order;

    Ok(CompiledDocument {
        entry,
        root,
        frontmatter: extraction.value,
        bindings,
        exports,
        defines,
        modules,
    })
}

fn merge_syntax(into: &mut ModuleSyntax, block: ModuleSyntax) {
    into.imports.extend(block.imports);
    into.exports.extend(block.exports);
    into.star_exports.extend(block.star_exports);
    into.locals.extend(block.locals);
}

fn esm_error(file: &str, err: &EsmError, line_offset: usize) -> MdxError {
    MdxError::bundle_at(
        err.message.clone(),
        SourceLocation::with_file(file.to_string(), err.line + line_offset, err.column),
    )
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

/// `Callout` for `callout.jsx`, `my-card/index.tsx` becomes `MyCard`.
fn component_name_for(path: &Path) -> String {
    let stem = match path.file_stem().and_then(|s| s.to_str()) {
        Some("index") => path
            .parent()
            .and_then(Path::file_name)
            .and_then(|s| s.to_str()),
        other => other,
    }
    .unwrap_or("Component");

    stem.split(|c: char| c == '-' || c == '_' || c == '.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn relative_to(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|part| match part {
            PathComponent::Normal(name) => Some(name.to_string_lossy().into_owned()),
            PathComponent::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

struct Bundler<'a> {
    build: PluginBuild,
    options: &'a BuildOptions,
    defines: &'a Defines,
    cache: HashMap<ModuleId, Exports>,
    loading: HashSet<ModuleId>,
    order: Vec<ModuleId>,
}

impl<'a> Bundler<'a> {
    fn new(options: &'a BuildOptions, defines: &'a Defines) -> Self {
        Self {
            build: PluginBuild::install(&options.plugins),
            options,
            defines,
            cache: HashMap::new(),
            loading: HashSet::new(),
            order: Vec::new(),
        }
    }

    fn resolve(
        &self,
        specifier: &str,
        importer: Option<&Path>,
        resolve_dir: &Path,
    ) -> Result<Resolved, MdxError> {
        let args = ResolveArgs {
            path: specifier,
            importer,
            resolve_dir,
        };
        if let Some(outcome) = self.build.resolve(&args)? {
            return Ok(Resolved::Module(ModuleId {
                namespace: outcome.namespace,
                path: outcome.path,
            }));
        }

        if !is_relative(specifier) {
            log::debug!("treating {} as external", specifier);
            return Ok(Resolved::External(specifier.to_string()));
        }

        let base: PathBuf = resolve_dir.join(specifier).components().collect();
        match find_file(&base) {
            Some(path) => Ok(Resolved::Module(ModuleId {
                namespace: FILE_NAMESPACE.to_string(),
                path,
            })),
            None => Err(MdxError::bundle(format!("Could not resolve \"{specifier}\""))),
        }
    }

    fn import(
        &mut self,
        specifier: &str,
        importer: Option<&Path>,
        resolve_dir: &Path,
    ) -> Result<Loaded, MdxError> {
        match self.resolve(specifier, importer, resolve_dir)? {
            Resolved::External(name) => Ok(Loaded::External(name)),
            Resolved::Module(id) => self.load(id),
        }
    }

    fn load(&mut self, id: ModuleId) -> Result<Loaded, MdxError> {
        if let Some(exports) = self.cache.get(&id) {
            return Ok(Loaded::Module {
                exports: exports.clone(),
                id,
            });
        }
        if self.loading.contains(&id) {
            log::debug!("import cycle through {}", id);
            return Ok(Loaded::Pending(id));
        }

        self.loading.insert(id.clone());
        let exports = self.load_uncached(&id);
        self.loading.remove(&id);
        let exports = exports?;

        log::debug!("loaded {} ({} exports)", id, exports.len());
        self.cache.insert(id.clone(), exports.clone());
        self.order.push(id.clone());
        Ok(Loaded::Module { id, exports })
    }

    fn load_uncached(&mut self, id: &ModuleId) -> Result<Exports, MdxError> {
        let args = LoadArgs {
            path: &id.path,
            namespace: &id.namespace,
        };
        let (contents, loader) = match self.build.load(&args)? {
            Some(outcome) => (Some(outcome.contents), outcome.loader),
            None if id.path.is_file() => {
                let loader = Loader::from_path(&id.path).ok_or_else(|| {
                    MdxError::bundle(format!("No loader is configured for \"{}\"", id))
                })?;
                (None, loader)
            }
            None => {
                return Err(MdxError::bundle(format!(
                    "Do not know how to load path: {}",
                    id
                )));
            }
        };

        if loader == Loader::File {
            let url = relative_to(&id.path, &self.options.outdir);
            let url = match self.options.public_path.trim_end_matches('/') {
                "" => url,
                prefix => format!("{prefix}/{url}"),
            };
            return Ok(default_export(ModuleValue::Value(JsonValue::String(url))));
        }

        let contents = match contents {
            Some(contents) => contents,
            None => fs::read_to_string(&id.path).map_err(|err| {
                MdxError::bundle(format!("Could not read \"{}\": {}", id, err))
            })?,
        };

        match loader {
            Loader::Json => {
                let value: JsonValue = serde_json::from_str(&contents).map_err(|err| {
                    MdxError::bundle_at(
                        err.to_string(),
                        SourceLocation::with_file(id.to_string(), err.line(), err.column()),
                    )
                })?;
                let mut exports = Exports::new();
                if let JsonValue::Object(map) = &value {
                    for (key, item) in map {
                        exports.insert(key.clone(), ModuleValue::Value(item.clone()));
                    }
                }
                exports.insert("default".to_string(), ModuleValue::Value(value));
                Ok(exports)
            }
            Loader::Text => Ok(default_export(ModuleValue::Value(JsonValue::String(
                contents,
            )))),
            _ => {
                let syntax = scan_module(&contents)
                    .map_err(|err| esm_error(&id.to_string(), &err, 0))?;
                let on_disk = id.path.is_file();
                let importer = on_disk.then_some(id.path.as_path());
                let resolve_dir = match id.path.parent() {
                    Some(parent) if on_disk => parent.to_path_buf(),
                    _ => self.options.cwd.clone(),
                };
                let mut scope = Exports::new();
                self.link_module(&syntax, importer, &resolve_dir, &id.path, &mut scope)
            }
        }
    }

    /// Link the document: imports, declarations and exports.
    fn link(
        &mut self,
        syntax: &ModuleSyntax,
        entry: &Path,
        cwd: &Path,
        scope: &mut Exports,
    ) -> Result<Exports, MdxError> {
        self.link_module(syntax, Some(entry), cwd, entry, scope)
    }

    fn link_module(
        &mut self,
        syntax: &ModuleSyntax,
        importer: Option<&Path>,
        resolve_dir: &Path,
        module_path: &Path,
        scope: &mut Exports,
    ) -> Result<Exports, MdxError> {
        for import in &syntax.imports {
            let loaded = self.import(&import.source, importer, resolve_dir)?;
            for specifier in &import.specifiers {
                let value = bind_import(specifier, &loaded)?;
                scope.insert(specifier.local().to_string(), value);
            }
        }

        self.declare_locals(syntax, module_path, scope);

        let mut exports = Exports::new();
        for export in &syntax.exports {
            let value = match &export.kind {
                ExportKind::Reexport { source, imported } => {
                    let loaded = self.import(source, importer, resolve_dir)?;
                    let specifier = if imported == "default" {
                        ImportSpecifier::Default {
                            local: export.name.clone(),
                        }
                    } else {
                        ImportSpecifier::Named {
                            imported: imported.clone(),
                            local: export.name.clone(),
                        }
                    };
                    bind_import(&specifier, &loaded)?
                }
                ExportKind::ReexportNamespace { source } => {
                    let loaded = self.import(source, importer, resolve_dir)?;
                    bind_import(
                        &ImportSpecifier::Namespace {
                            local: export.name.clone(),
                        },
                        &loaded,
                    )?
                }
                ExportKind::Local(local) => scope
                    .get(local)
                    .cloned()
                    .unwrap_or_else(|| ModuleValue::Opaque(local.clone())),
                kind => match scope.get(&export.name) {
                    Some(declared) => declared.clone(),
                    None => self.value_of(kind, module_path, scope),
                },
            };
            exports.insert(export.name.clone(), value);
        }

        for source in &syntax.star_exports {
            if let Loaded::Module {
                exports: inner, ..
            } = self.import(source, importer, resolve_dir)?
            {
                for (name, value) in inner {
                    if name != "default" {
                        exports.entry(name).or_insert(value);
                    }
                }
            }
        }

        Ok(exports)
    }

    /// Top-level declarations may refer to each other in any order; keep
    /// evaluating until no pending declaration makes progress.
    fn declare_locals(&self, syntax: &ModuleSyntax, module_path: &Path, scope: &mut Exports) {
        let mut pending: Vec<(&String, &ExportKind)> = syntax.locals.iter().collect();
        loop {
            let before = pending.len();
            pending.retain(|(name, kind)| match self.try_value(kind, module_path, scope) {
                Some(value) => {
                    scope.insert((*name).clone(), value);
                    false
                }
                None => true,
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
        for (name, kind) in pending {
            scope.insert(name.clone(), self.value_of(kind, module_path, scope));
        }
    }

    fn try_value(&self, kind: &ExportKind, module_path: &Path, scope: &Exports) -> Option<ModuleValue> {
        match kind {
            ExportKind::Expression(src) => Evaluator::new(scope, self.defines)
                .evaluate_str(src)
                .ok()
                .map(ModuleValue::Value),
            ExportKind::Local(other) => scope.get(other).cloned(),
            other => Some(self.value_of(other, module_path, scope)),
        }
    }

    fn value_of(&self, kind: &ExportKind, module_path: &Path, scope: &Exports) -> ModuleValue {
        match kind {
            ExportKind::Component { name: Some(name) } => ModuleValue::Component(name.clone()),
            ExportKind::Component { name: None } => {
                ModuleValue::Component(component_name_for(module_path))
            }
            ExportKind::Expression(src) => match Evaluator::new(scope, self.defines).evaluate_str(src) {
                Ok(value) => ModuleValue::Value(value),
                Err(err) => {
                    log::debug!("keeping `{}` opaque: {}", src, err);
                    ModuleValue::Opaque(src.clone())
                }
            },
            ExportKind::Local(other) => scope
                .get(other)
                .cloned()
                .unwrap_or_else(|| ModuleValue::Opaque(other.clone())),
            ExportKind::Reexport { source, .. } | ExportKind::ReexportNamespace { source } => {
                ModuleValue::External(source.clone())
            }
        }
    }
}

fn default_export(value: ModuleValue) -> Exports {
    let mut exports = Exports::new();
    exports.insert("default".to_string(), value);
    exports
}

fn bind_import(specifier: &ImportSpecifier, loaded: &Loaded) -> Result<ModuleValue, MdxError> {
    let (id, exports) = match loaded {
        Loaded::External(name) => return Ok(ModuleValue::External(name.clone())),
        Loaded::Pending(id) => {
            return Ok(ModuleValue::Opaque(format!("{} (circular)", id)));
        }
        Loaded::Module { id, exports } => (id, exports),
    };

    let name = match specifier {
        ImportSpecifier::Namespace { .. } => return Ok(ModuleValue::Namespace(exports.clone())),
        ImportSpecifier::Default { .. } => "default",
        ImportSpecifier::Named { imported, .. } => imported.as_str(),
    };
    exports.get(name).cloned().ok_or_else(|| {
        MdxError::bundle(format!(
            "No matching export in \"{}\" for import \"{}\"",
            id, name
        ))
    })
}
