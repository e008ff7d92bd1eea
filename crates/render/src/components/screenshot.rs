use crate::registry::{Component, Props};
use mdx_to_md_core::MdxError;
use mdx_to_md_core::expr::{is_truthy, to_js_string};
use serde_json::Value as JsonValue;

const FRAME_CLASS: &str =
    "mt-6 -mb-4 flex justify-center overflow-hidden rounded-xl border dark:border-zinc-800";
const IMAGE_CLASS: &str = "w-auto select-none bg-white";
const RING_CLASS: &str = "ring-1 ring-gray-200";

/// A framed screenshot.
///
/// Props: `src`, `alt` and `full`. A `full` screenshot sits on a white
/// frame without a ring; otherwise the frame is grey and the image ringed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Screenshot;

fn attribute(out: &mut String, name: &str, value: Option<&JsonValue>) {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return;
    };
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(&to_js_string(value)));
    out.push('"');
}

impl Component for Screenshot {
    fn render(&self, props: &Props, _children: &str) -> Result<String, MdxError> {
        let full = props.get("full").is_some_and(is_truthy);
        let (background, image_class) = if full {
            ("bg-white", IMAGE_CLASS.to_string())
        } else {
            ("bg-zinc-100", format!("{IMAGE_CLASS} {RING_CLASS}"))
        };

        let mut html = format!("<div class=\"{FRAME_CLASS} {background}\"><img");
        attribute(&mut html, "src", props.get("src"));
        attribute(&mut html, "alt", props.get("alt"));
        html.push_str(&format!(" class=\"{image_class}\"/></div>"));
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: JsonValue) -> Props {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn framed_with_ring_by_default() {
        let html = Screenshot
            .render(&props(json!({ "src": "./home.png", "alt": "Home" })), "")
            .unwrap();
        insta::assert_snapshot!(html, @r#"<div class="mt-6 -mb-4 flex justify-center overflow-hidden rounded-xl border dark:border-zinc-800 bg-zinc-100"><img src="./home.png" alt="Home" class="w-auto select-none bg-white ring-1 ring-gray-200"/></div>"#);
    }

    #[test]
    fn full_drops_the_ring() {
        let html = Screenshot
            .render(&props(json!({ "src": "a.png", "alt": "", "full": true })), "")
            .unwrap();
        assert!(html.contains("dark:border-zinc-800 bg-white\""));
        assert!(html.contains("class=\"w-auto select-none bg-white\"/>"));
    }

    #[test]
    fn missing_attributes_are_omitted_and_values_escaped() {
        let html = Screenshot
            .render(&props(json!({ "alt": "\"quoted\" & more" })), "")
            .unwrap();
        assert!(!html.contains("src="));
        assert!(html.contains("alt=\"&quot;quoted&quot; &amp; more\""));
    }
}
