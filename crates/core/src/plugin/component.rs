use super::{Plugin, PluginBuild, ResolveOutcome};
use crate::resolve::ComponentResolver;
use regex::Regex;
use std::sync::Arc;

/// Informational namespace for resolved component modules.
pub const COMPONENT_NAMESPACE: &str = "components";

/// Routes components-namespace imports through a [`ComponentResolver`].
#[derive(Debug, Clone)]
pub struct ComponentPlugin {
    resolver: Arc<ComponentResolver>,
    filter: Regex,
}

impl ComponentPlugin {
    /// Wrap a resolver.
    pub fn new(resolver: Arc<ComponentResolver>) -> Self {
        let filter = Regex::new(&format!("^{}", regex::escape(resolver.prefix())))
            .expect("escaped prefix is a valid filter");
        Self { resolver, filter }
    }
}

impl Plugin for ComponentPlugin {
    fn name(&self) -> &str {
        "component-resolver"
    }

    fn setup(&self, build: &mut PluginBuild) {
        let resolver = Arc::clone(&self.resolver);
        build.on_resolve(self.filter.clone(), move |args| {
            let path = resolver.resolve(args.path, args.importer)?;
            Ok(Some(ResolveOutcome {
                path,
                namespace: COMPONENT_NAMESPACE.to_string(),
            }))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MdxError;
    use crate::plugin::ResolveArgs;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn scratch(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "mdx-to-md-component-plugin-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    fn resolver(root: &Path) -> ComponentResolver {
        ComponentResolver::new(
            root.join("project"),
            root.join("package/components"),
            root.join("project/readme.mdx"),
        )
    }

    fn build(root: &Path) -> PluginBuild {
        let plugin = ComponentPlugin::new(Arc::new(resolver(root)));
        PluginBuild::install(&[Arc::new(plugin) as Arc<dyn Plugin>])
    }

    #[test]
    fn redirects_to_the_resolved_file() {
        let root = scratch("redirect");
        let file = root.join("project/components/Note.jsx");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "export function Note() {}").unwrap();

        let outcome = build(&root)
            .resolve(&ResolveArgs {
                path: "@/components/Note",
                importer: None,
                resolve_dir: &root,
            })
            .unwrap()
            .unwrap();
        assert_eq!(outcome.path, file);
        assert_eq!(outcome.namespace, COMPONENT_NAMESPACE);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn failure_surfaces_component_not_found() {
        let root = scratch("failure");
        let err = build(&root)
            .resolve(&ResolveArgs {
                path: "@/components/Missing",
                importer: None,
                resolve_dir: &root,
            })
            .unwrap_err();
        match err {
            MdxError::ComponentNotFound(not_found) => {
                assert_eq!(not_found.reference, "@/components/Missing");
                assert_eq!(not_found.searched.len(), 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn prefixes_with_regex_metacharacters_are_matched_literally() {
        let root = scratch("metachar");
        let file = root.join("project/components/Badge.jsx");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "export function Badge() {}").unwrap();

        let plugin = ComponentPlugin::new(Arc::new(resolver(&root).with_prefix("$(ui)+")));
        let build = PluginBuild::install(&[Arc::new(plugin) as Arc<dyn Plugin>]);
        let args = |path: &'static str| ResolveArgs {
            path,
            importer: None,
            resolve_dir: &root,
        };

        let outcome = build.resolve(&args("$(ui)+/Badge")).unwrap().unwrap();
        assert_eq!(outcome.path, file);
        assert!(build.resolve(&args("uiui/Badge")).unwrap().is_none());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn other_imports_are_not_claimed() {
        let root = scratch("unclaimed");
        let outcome = build(&root)
            .resolve(&ResolveArgs {
                path: "./components/Note",
                importer: None,
                resolve_dir: &root,
            })
            .unwrap();
        assert!(outcome.is_none());
        let _ = fs::remove_dir_all(&root);
    }
}
