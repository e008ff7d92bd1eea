use super::{LoadOutcome, Loader, Plugin, PluginBuild, ResolveOutcome};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// Virtual namespace holding image references.
pub const IMAGE_NAMESPACE: &str = "image-url";

static IMAGE_FILTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(png|jpe?g|gif|svg)$").expect("valid image filter"));
static ANY: Lazy<Regex> = Lazy::new(|| Regex::new(".*").expect("valid catch-all filter"));

/// Keeps images out of the bundle: an image import becomes a module whose
/// default export is the import path exactly as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePlugin;

impl Plugin for ImagePlugin {
    fn name(&self) -> &str {
        "image-resolver"
    }

    fn setup(&self, build: &mut PluginBuild) {
        build.on_resolve(IMAGE_FILTER.clone(), |args| {
            Ok(Some(ResolveOutcome {
                path: PathBuf::from(args.path),
                namespace: IMAGE_NAMESPACE.to_string(),
            }))
        });
        build.on_load(ANY.clone(), IMAGE_NAMESPACE, |args| {
            let literal = serde_json::Value::String(args.path.to_string_lossy().into_owned());
            Ok(Some(LoadOutcome {
                contents: format!("export default {}", literal),
                loader: Loader::Js,
            }))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{LoadArgs, ResolveArgs};
    use std::path::Path;
    use std::sync::Arc;

    fn build() -> PluginBuild {
        PluginBuild::install(&[Arc::new(ImagePlugin) as Arc<dyn Plugin>])
    }

    fn resolve(build: &PluginBuild, path: &str) -> Option<ResolveOutcome> {
        build
            .resolve(&ResolveArgs {
                path,
                importer: None,
                resolve_dir: Path::new("/nowhere"),
            })
            .unwrap()
    }

    #[test]
    fn intercepts_known_image_extensions() {
        let build = build();
        for path in ["./a.png", "b.jpg", "c.jpeg", "d.gif", "e.svg", "./F.JPG", "g.JPEG"] {
            let outcome = resolve(&build, path).unwrap_or_else(|| panic!("{path}"));
            assert_eq!(outcome.namespace, IMAGE_NAMESPACE);
            assert_eq!(outcome.path, PathBuf::from(path));
        }
    }

    #[test]
    fn ignores_other_files() {
        let build = build();
        assert!(resolve(&build, "./notes.md").is_none());
        assert!(resolve(&build, "./png").is_none());
        assert!(resolve(&build, "./a.png.js").is_none());
    }

    #[test]
    fn synthesizes_default_export_of_the_literal_path() {
        let build = build();
        let loaded = build
            .load(&LoadArgs {
                path: Path::new("./shots/my \"quoted\" image.png"),
                namespace: IMAGE_NAMESPACE,
            })
            .unwrap()
            .unwrap();
        assert_eq!(loaded.loader, Loader::Js);
        assert_eq!(
            loaded.contents,
            r#"export default "./shots/my \"quoted\" image.png""#
        );
    }
}
