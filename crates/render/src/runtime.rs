//! Executes a compiled document: binds its scope and renders it to HTML.

use crate::registry::{ComponentRegistry, Props};
use crate::renderer::{Context, render_document};
use mdx_to_md_core::{CompiledDocument, MdxError, ModuleValue};
use serde_json::{Map, Value as JsonValue};

/// Turns compiled documents into renderable components.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    registry: ComponentRegistry,
}

impl Runtime {
    /// A runtime rendering components through `registry`.
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry }
    }

    /// The registry components render through.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Bind `document` into a component.
    pub fn instantiate<'a>(&'a self, document: &'a CompiledDocument) -> MdxComponent<'a> {
        log::debug!(
            "Instantiating {} with {} binding(s)",
            document.entry.display(),
            document.bindings.len()
        );
        MdxComponent {
            registry: &self.registry,
            document,
        }
    }
}

/// A compiled document ready to render.
#[derive(Debug, Clone, Copy)]
pub struct MdxComponent<'a> {
    registry: &'a ComponentRegistry,
    document: &'a CompiledDocument,
}

impl MdxComponent<'_> {
    /// Render with no props.
    pub fn render_to_string(&self) -> Result<String, MdxError> {
        self.render_with_props(&Props::new())
    }

    /// Render with `props` bound as `props` in the document scope.
    pub fn render_with_props(&self, props: &Props) -> Result<String, MdxError> {
        let mut bindings = self.document.bindings.clone();
        let props: Map<String, JsonValue> = props
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        bindings.insert("props".to_string(), ModuleValue::Value(JsonValue::Object(props)));

        let root = &self.document.root;
        let mut ctx = Context::new(root, &bindings, &self.document.defines, self.registry);
        render_document(root, &mut ctx)?;
        Ok(ctx.finish())
    }
}
