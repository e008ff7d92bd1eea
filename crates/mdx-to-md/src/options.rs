//! Caller options for a conversion.

use mdx_to_md_core::{
    BuildOptions, ComponentResolver, FrontmatterOptions, MdxOptions, Plugin, builtin_plugins,
};
use mdx_to_md_render::ComponentRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Adjusts the build options before the fixed settings are applied.
pub type BuildOptionsTransform = Arc<dyn Fn(BuildOptions) -> BuildOptions + Send + Sync>;

/// Define keys every conversion pins.
pub const FIXED_DEFINES: [(&str, &str); 2] = [
    ("process.env.NODE_ENV", "\"production\""),
    ("process.env.__TESTING__", "true"),
];

/// The `components/` directory shipped with this crate.
pub fn package_components_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/components"))
}

/// Options for [`crate::mdx_to_md`].
#[derive(Clone)]
pub struct MdxToMdOptions {
    /// Runs on the default build options. Output directory, public path and
    /// the fixed defines are applied afterwards; plugins it adds run after
    /// [`MdxToMdOptions::plugins`].
    pub esbuild_options: Option<BuildOptionsTransform>,
    /// Frontmatter extraction options.
    pub gray_matter_options: FrontmatterOptions,
    /// Parser options and transforms.
    pub mdx_options: MdxOptions,
    /// Plugins installed after the built-in ones.
    pub plugins: Vec<Arc<dyn Plugin>>,
    /// Renderers for imported components.
    pub components: ComponentRegistry,
    /// Project root for component resolution; the current directory when unset.
    pub project_root: Option<PathBuf>,
    /// Import prefix routed to component resolution, `@/components/` when unset.
    pub component_prefix: Option<String>,
}

impl Default for MdxToMdOptions {
    fn default() -> Self {
        Self {
            esbuild_options: None,
            gray_matter_options: FrontmatterOptions::default(),
            mdx_options: MdxOptions::default(),
            plugins: Vec::new(),
            components: ComponentRegistry::with_defaults(),
            project_root: None,
            component_prefix: None,
        }
    }
}

impl std::fmt::Debug for MdxToMdOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plugins: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("MdxToMdOptions")
            .field("esbuild_options", &self.esbuild_options.is_some())
            .field("gray_matter_options", &self.gray_matter_options)
            .field("mdx_options", &self.mdx_options)
            .field("plugins", &plugins)
            .field("components", &self.components)
            .field("project_root", &self.project_root)
            .field("component_prefix", &self.component_prefix)
            .finish()
    }
}

impl MdxToMdOptions {
    /// Component resolver for a conversion of `entry`.
    pub fn resolver(&self, entry: &Path) -> ComponentResolver {
        let project_root = self
            .project_root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();
        let resolver = ComponentResolver::new(project_root, package_components_dir(), entry);
        match &self.component_prefix {
            Some(prefix) => resolver.with_prefix(prefix.clone()),
            None => resolver,
        }
    }

    /// Build options for a conversion of `entry`, which lives in `dir`.
    pub fn build_options(&self, entry: &Path, dir: &Path) -> BuildOptions {
        let defaults = BuildOptions {
            cwd: dir.to_path_buf(),
            ..BuildOptions::default()
        };
        let mut build = match &self.esbuild_options {
            Some(transform) => transform(defaults),
            None => defaults,
        };

        build.outdir = dir.to_path_buf();
        build.public_path = ".".to_string();
        for (key, value) in FIXED_DEFINES {
            build.define.insert(key.to_string(), value.to_string());
        }

        let added = std::mem::take(&mut build.plugins);
        let resolver = Arc::new(self.resolver(entry));
        build.plugins = builtin_plugins(resolver)
            .into_iter()
            .chain(self.plugins.iter().cloned())
            .chain(added)
            .collect();
        build
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdx_to_md_core::PluginBuild;

    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn setup(&self, _build: &mut PluginBuild) {}
    }

    #[test]
    fn fixed_settings_override_the_transform() {
        let options = MdxToMdOptions {
            esbuild_options: Some(Arc::new(|mut build: BuildOptions| {
                build.public_path = "/static".into();
                build.outdir = "out".into();
                build
                    .define
                    .insert("process.env.NODE_ENV".into(), "\"development\"".into());
                build.define.insert("VERSION".into(), "\"2\"".into());
                build
            })),
            ..Default::default()
        };
        let build = options.build_options(Path::new("docs/README.mdx"), Path::new("docs"));

        assert_eq!(build.cwd, PathBuf::from("docs"));
        assert_eq!(build.outdir, PathBuf::from("docs"));
        assert_eq!(build.public_path, ".");
        assert_eq!(build.define["process.env.NODE_ENV"], "\"production\"");
        assert_eq!(build.define["process.env.__TESTING__"], "true");
        assert_eq!(build.define["VERSION"], "\"2\"");
    }

    #[test]
    fn plugin_order() {
        let options = MdxToMdOptions {
            plugins: vec![Arc::new(Named("caller"))],
            esbuild_options: Some(Arc::new(|mut build: BuildOptions| {
                build.plugins.push(Arc::new(Named("transform")));
                build
            })),
            ..Default::default()
        };
        let build = options.build_options(Path::new("README.mdx"), Path::new("."));
        let names: Vec<&str> = build.plugins.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            ["image-resolver", "component-resolver", "caller", "transform"]
        );
    }

    #[test]
    fn package_components_ship_screenshot() {
        assert!(package_components_dir().join("screenshot/index.jsx").is_file());
    }
}
