//! Native renderers for the components MDX documents import.

use crate::components::Screenshot;
use mdx_to_md_core::MdxError;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Evaluated props passed to a component.
pub type Props = BTreeMap<String, JsonValue>;

/// A component rendered to static HTML.
pub trait Component: Send + Sync {
    /// Render with evaluated `props` and already-rendered `children`.
    fn render(&self, props: &Props, children: &str) -> Result<String, MdxError>;
}

impl<F> Component for F
where
    F: Fn(&Props, &str) -> Result<String, MdxError> + Send + Sync,
{
    fn render(&self, props: &Props, children: &str) -> Result<String, MdxError> {
        (self)(props, children)
    }
}

/// Maps exported component names to their renderers.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the bundled components.
    ///
    /// # Example
    ///
    /// ```
    /// use mdx_to_md_render::ComponentRegistry;
    ///
    /// let registry = ComponentRegistry::with_defaults();
    /// assert!(registry.contains("Screenshot"));
    /// ```
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("Screenshot", Screenshot);
        registry
    }

    /// Register `component` under `name`, replacing any previous entry.
    pub fn register<C>(&mut self, name: impl Into<String>, component: C) -> &mut Self
    where
        C: Component + 'static,
    {
        self.components.insert(name.into(), Arc::new(component));
        self
    }

    /// Look up a component.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Component>> {
        self.components.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(props: &Props, children: &str) -> Result<String, MdxError> {
        let tone = props.get("tone").and_then(JsonValue::as_str).unwrap_or("info");
        Ok(format!("<span class=\"badge {tone}\">{children}</span>"))
    }

    #[test]
    fn defaults_include_screenshot() {
        let registry = ComponentRegistry::with_defaults();
        assert_eq!(registry.names(), ["Screenshot"]);
    }

    #[test]
    fn functions_are_components() {
        let mut registry = ComponentRegistry::new();
        registry.register("Badge", badge);

        let mut props = Props::new();
        props.insert("tone".into(), JsonValue::from("warn"));
        let html = registry
            .get("Badge")
            .unwrap()
            .render(&props, "careful")
            .unwrap();
        assert_eq!(html, "<span class=\"badge warn\">careful</span>");
    }

    #[test]
    fn register_replaces() {
        let mut registry = ComponentRegistry::with_defaults();
        registry.register("Screenshot", |_: &Props, _: &str| {
            Ok::<_, MdxError>(String::from("x"))
        });
        let html = registry
            .get("Screenshot")
            .unwrap()
            .render(&Props::new(), "")
            .unwrap();
        assert_eq!(html, "x");
    }
}
