//! Rendering state shared by the node renderers.

use crate::registry::ComponentRegistry;
use markdown::mdast::{Definition, FootnoteDefinition, Node};
use mdx_to_md_core::{Defines, Evaluator, ExprError, MdxError, ModuleValue};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

/// Structural position of the node being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Document root.
    Root,
    /// Inside a `<p>`.
    Paragraph,
    /// Inside a list; `spread` lists wrap item paragraphs in `<p>`.
    List {
        /// Loose list.
        spread: bool,
    },
    /// Inside a container that resets list tightness (blockquote, element).
    Container,
    /// Inside a table.
    Table,
}

/// Accumulates HTML while walking a document.
pub struct Context<'a> {
    html: String,
    stack: Vec<Scope>,
    bindings: &'a BTreeMap<String, ModuleValue>,
    defines: &'a Defines,
    registry: &'a ComponentRegistry,
    definitions: HashMap<String, &'a Definition>,
    footnote_definitions: HashMap<String, &'a FootnoteDefinition>,
    /// Referenced footnote identifiers, in first-reference order.
    footnote_order: Vec<String>,
    footnote_refs: HashMap<String, usize>,
}

impl<'a> Context<'a> {
    /// Create a context for `root`, collecting its definitions up front.
    pub fn new(
        root: &'a Node,
        bindings: &'a BTreeMap<String, ModuleValue>,
        defines: &'a Defines,
        registry: &'a ComponentRegistry,
    ) -> Self {
        let mut ctx = Self {
            html: String::with_capacity(4096),
            stack: vec![Scope::Root],
            bindings,
            defines,
            registry,
            definitions: HashMap::new(),
            footnote_definitions: HashMap::new(),
            footnote_order: Vec::new(),
            footnote_refs: HashMap::new(),
        };
        ctx.collect_definitions(root);
        ctx
    }

    fn collect_definitions(&mut self, node: &'a Node) {
        match node {
            Node::Definition(definition) => {
                self.definitions
                    .entry(definition.identifier.clone())
                    .or_insert(definition);
            }
            Node::FootnoteDefinition(definition) => {
                self.footnote_definitions
                    .entry(definition.identifier.clone())
                    .or_insert(definition);
            }
            _ => {
                if let Some(children) = node.children() {
                    for child in children {
                        self.collect_definitions(child);
                    }
                }
            }
        }
    }

    /// Names in scope for the document body.
    pub fn bindings(&self) -> &'a BTreeMap<String, ModuleValue> {
        self.bindings
    }

    /// The component registry.
    pub fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    /// Writes markup as is.
    pub fn push_raw(&mut self, s: &str) {
        self.html.push_str(s);
    }

    /// Writes text content, escaped.
    pub fn push_text(&mut self, s: &str) {
        self.html.push_str(&html_escape::encode_text(s));
    }

    /// Writes an attribute value, escaped for double quotes.
    pub fn push_attr_value(&mut self, s: &str) {
        self.html
            .push_str(&html_escape::encode_double_quoted_attribute(s));
    }

    /// Writes ` name="value"`.
    pub fn push_attr(&mut self, name: &str, value: &str) {
        self.html.push(' ');
        self.html.push_str(name);
        self.html.push_str("=\"");
        self.push_attr_value(value);
        self.html.push('"');
    }

    /// Enters a new scope by pushing it onto the stack.
    pub fn enter(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    /// Exits the current scope by popping from the stack.
    pub fn exit(&mut self) -> Option<Scope> {
        self.stack.pop()
    }

    /// Whether the nearest list or container is a tight list.
    pub fn is_in_tight_list(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find(|scope| matches!(scope, Scope::List { .. } | Scope::Container))
            .is_some_and(|scope| matches!(scope, Scope::List { spread: false }))
    }

    /// Runs `f` against an empty buffer and returns what it wrote.
    pub fn capture<F>(&mut self, f: F) -> Result<String, MdxError>
    where
        F: FnOnce(&mut Self) -> Result<(), MdxError>,
    {
        let outer = std::mem::take(&mut self.html);
        let result = f(self);
        let inner = std::mem::replace(&mut self.html, outer);
        result.map(|()| inner)
    }

    /// Evaluates an MDX expression against the document scope.
    pub fn evaluate(&self, src: &str) -> Result<JsonValue, MdxError> {
        Evaluator::new(self.bindings, self.defines)
            .evaluate_str(src)
            .map_err(|err| self.expression_error(err))
    }

    fn expression_error(&self, err: ExprError) -> MdxError {
        if let ExprError::Unbound(name) = &err
            && self.bindings.contains_key(name)
        {
            return MdxError::render(format!("`{name}` cannot be used as a value"));
        }
        MdxError::render(err.to_string())
    }

    /// The link or image definition for `identifier`.
    pub fn definition(&self, identifier: &str) -> Option<&'a Definition> {
        self.definitions.get(identifier).copied()
    }

    /// Records a reference to footnote `identifier`.
    ///
    /// Returns its ordinal and how many times it has now been referenced,
    /// or `None` when no such footnote is defined.
    pub fn reference_footnote(&mut self, identifier: &str) -> Option<(usize, usize)> {
        if !self.footnote_definitions.contains_key(identifier) {
            return None;
        }
        let ordinal = match self.footnote_order.iter().position(|id| id == identifier) {
            Some(index) => index + 1,
            None => {
                self.footnote_order.push(identifier.to_string());
                self.footnote_order.len()
            }
        };
        let count = self.footnote_refs.entry(identifier.to_string()).or_insert(0);
        *count += 1;
        Some((ordinal, *count))
    }

    /// Referenced footnotes in ordinal order, with their reference counts.
    pub fn referenced_footnotes(&self) -> Vec<(&'a FootnoteDefinition, usize)> {
        self.footnote_order
            .iter()
            .filter_map(|id| {
                let definition = self.footnote_definitions.get(id)?;
                Some((*definition, self.footnote_refs.get(id).copied().unwrap_or(1)))
            })
            .collect()
    }

    /// Consumes the context and returns the rendered markup.
    pub fn finish(self) -> String {
        self.html
    }
}
