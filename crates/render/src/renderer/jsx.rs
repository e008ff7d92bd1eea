//! JSX elements and expressions.

use super::context::{Context, Scope};
use super::render::{render_children, render_flow};
use crate::registry::Props;
use markdown::mdast::{AttributeContent, AttributeValue, Node};
use mdx_to_md_core::MdxError;
use mdx_to_md_core::ModuleValue;
use mdx_to_md_core::expr::to_js_string;
use serde_json::Value as JsonValue;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

// CSS properties whose numeric values take no unit.
const UNITLESS: &[&str] = &[
    "flex",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "line-height",
    "opacity",
    "order",
    "z-index",
];

/// Lowercase names are HTML elements; capitalized or dotted names are
/// looked up in scope.
fn is_intrinsic(name: &str) -> bool {
    !name.contains('.') && name.starts_with(|c: char| c.is_ascii_lowercase())
}

/// Renders a JSX element.
pub fn render_jsx(
    name: Option<&str>,
    attributes: &[AttributeContent],
    children: &[Node],
    flow: bool,
    ctx: &mut Context,
) -> Result<(), MdxError> {
    let Some(name) = name else {
        return render_element_children(children, flow, ctx);
    };

    if is_intrinsic(name) {
        let attrs = evaluate_attributes(attributes, ctx)?;
        return render_intrinsic(name, &attrs, children, flow, ctx);
    }

    match lookup(name, ctx) {
        Some(ModuleValue::Component(component)) => {
            let props: Props = evaluate_attributes(attributes, ctx)?.into_iter().collect();
            let inner = ctx.capture(|ctx| render_element_children(children, flow, ctx))?;
            match ctx.registry().get(&component) {
                Some(renderer) => {
                    let html = renderer.render(&props, &inner)?;
                    ctx.push_raw(&html);
                }
                None => {
                    log::warn!(
                        "No renderer registered for component `{}`; rendering its children",
                        component
                    );
                    ctx.push_raw(&inner);
                }
            }
            Ok(())
        }
        Some(ModuleValue::External(source)) => Err(MdxError::render(format!(
            "`{name}` comes from \"{source}\", which cannot be rendered without a renderer"
        ))),
        Some(_) => Err(MdxError::render(format!(
            "Element type is invalid: `{name}` is not a component"
        ))),
        None if name == "Fragment" => render_element_children(children, flow, ctx),
        None => Err(MdxError::render(format!(
            "Expected component `{name}` to be defined: you likely forgot to import, pass, or provide it."
        ))),
    }
}

fn lookup(name: &str, ctx: &Context) -> Option<ModuleValue> {
    let mut parts = name.split('.');
    let mut value = ctx.bindings().get(parts.next()?)?.clone();
    for part in parts {
        value = match value {
            ModuleValue::Namespace(mut exports) => exports.remove(part)?,
            ModuleValue::Value(JsonValue::Object(mut map)) => {
                ModuleValue::Value(map.remove(part)?)
            }
            _ => return None,
        };
    }
    Some(value)
}

fn render_element_children(
    children: &[Node],
    flow: bool,
    ctx: &mut Context,
) -> Result<(), MdxError> {
    ctx.enter(Scope::Container);
    let result = if flow {
        render_flow(children, ctx)
    } else {
        render_children(children, ctx)
    };
    ctx.exit();
    result
}

/// Attributes in source order. Spread expressions contribute their entries.
fn evaluate_attributes(
    attributes: &[AttributeContent],
    ctx: &Context,
) -> Result<Vec<(String, JsonValue)>, MdxError> {
    fn set(attrs: &mut Vec<(String, JsonValue)>, name: String, value: JsonValue) {
        match attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => attrs.push((name, value)),
        }
    }

    let mut attrs: Vec<(String, JsonValue)> = Vec::with_capacity(attributes.len());

    for attr in attributes {
        match attr {
            AttributeContent::Property(prop) => {
                let value = match &prop.value {
                    None => JsonValue::Bool(true),
                    Some(AttributeValue::Literal(s)) => JsonValue::String(s.clone()),
                    Some(AttributeValue::Expression(expr)) => ctx.evaluate(&expr.value)?,
                };
                set(&mut attrs, prop.name.clone(), value);
            }
            AttributeContent::Expression(expr) => {
                let src = expr.value.trim();
                let src = src.strip_prefix("...").unwrap_or(src);
                match ctx.evaluate(src)? {
                    JsonValue::Object(map) => {
                        for (name, value) in map {
                            set(&mut attrs, name, value);
                        }
                    }
                    JsonValue::Null => {}
                    other => {
                        return Err(MdxError::render(format!(
                            "Cannot spread `{}` into attributes",
                            to_js_string(&other)
                        )));
                    }
                }
            }
        }
    }
    Ok(attrs)
}

fn render_intrinsic(
    tag: &str,
    attrs: &[(String, JsonValue)],
    children: &[Node],
    flow: bool,
    ctx: &mut Context,
) -> Result<(), MdxError> {
    ctx.push_raw("<");
    ctx.push_raw(tag);
    for (name, value) in attrs {
        push_html_attribute(name, value, ctx);
    }

    if VOID_ELEMENTS.contains(&tag) {
        ctx.push_raw("/>");
        return Ok(());
    }

    ctx.push_raw(">");
    render_element_children(children, flow, ctx)?;
    ctx.push_raw("</");
    ctx.push_raw(tag);
    ctx.push_raw(">");
    Ok(())
}

fn push_html_attribute(name: &str, value: &JsonValue, ctx: &mut Context) {
    let name = match name {
        "key" | "ref" | "children" => return,
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    };
    match value {
        JsonValue::Null | JsonValue::Bool(false) => {}
        JsonValue::Bool(true) => ctx.push_attr(name, ""),
        JsonValue::Object(style) if name == "style" => {
            let css = style_to_css(style);
            if !css.is_empty() {
                ctx.push_attr(name, &css);
            }
        }
        other => ctx.push_attr(name, &to_js_string(other)),
    }
}

fn style_to_css(style: &serde_json::Map<String, JsonValue>) -> String {
    style
        .iter()
        .filter(|(_, value)| !matches!(value, JsonValue::Null | JsonValue::Bool(_)))
        .map(|(property, value)| {
            let property = hyphenate(property);
            let value = match value {
                JsonValue::Number(n)
                    if n.as_f64() != Some(0.0) && !UNITLESS.contains(&property.as_str()) =>
                {
                    format!("{}px", to_js_string(value))
                }
                other => to_js_string(other),
            };
            format!("{property}:{value}")
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn hyphenate(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Renders an MDX `{…}` expression as child content.
pub fn render_expression(src: &str, ctx: &mut Context) -> Result<(), MdxError> {
    let value = ctx.evaluate(src)?;
    push_child_value(&value, ctx)
}

fn push_child_value(value: &JsonValue, ctx: &mut Context) -> Result<(), MdxError> {
    match value {
        JsonValue::Null | JsonValue::Bool(_) => Ok(()),
        JsonValue::String(s) => {
            ctx.push_text(s);
            Ok(())
        }
        JsonValue::Number(_) => {
            ctx.push_text(&to_js_string(value));
            Ok(())
        }
        JsonValue::Array(items) => items.iter().try_for_each(|item| push_child_value(item, ctx)),
        JsonValue::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            Err(MdxError::render(format!(
                "Objects are not valid as a child (found: object with keys {{{}}})",
                keys.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsic_names() {
        assert!(is_intrinsic("div"));
        assert!(is_intrinsic("my-element"));
        assert!(!is_intrinsic("Screenshot"));
        assert!(!is_intrinsic("docs.Note"));
    }

    #[test]
    fn style_objects_become_css() {
        let style = serde_json::json!({
            "marginTop": 4,
            "opacity": 0.5,
            "--gap": "1rem",
            "hidden": false,
        });
        let JsonValue::Object(style) = style else {
            unreachable!()
        };
        let css = style_to_css(&style);
        let mut declarations: Vec<&str> = css.split(';').collect();
        declarations.sort_unstable();
        assert_eq!(declarations, ["--gap:1rem", "margin-top:4px", "opacity:0.5"]);
    }
}
