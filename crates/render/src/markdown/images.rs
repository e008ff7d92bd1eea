use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use mdx_to_md_core::MdxError;

const MARKER: &str = "MDXTOMDIMAGE";

/// HTML whose `<img>` elements were replaced by placeholder tokens.
///
/// Tokens are plain ASCII letters and digits, so HTML to Markdown
/// translation passes them through untouched and [`restore`] can splice
/// the exact `![alt](src)` text back in.
///
/// [`restore`]: ImageRewrite::restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRewrite {
    /// The rewritten HTML.
    pub html: String,
    marker: String,
    images: Vec<String>,
}

impl ImageRewrite {
    /// The Markdown images, in document order.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Replace every placeholder in `markdown` with its image.
    pub fn restore(&self, markdown: &str) -> String {
        let mut out = markdown.to_string();
        for (index, image) in self.images.iter().enumerate() {
            out = out.replace(&token(&self.marker, index), image);
        }
        out
    }
}

fn token(marker: &str, index: usize) -> String {
    format!("{marker}{index}{marker}")
}

/// Replaces every `<img>` with a placeholder for the Markdown image
/// `![alt](src)`.
///
/// Attributes are read in any order and with any quoting, and their
/// entities are decoded. Backslashes in `src` become forward slashes; an
/// `<img>` without `src` is dropped.
pub fn rewrite_images(html: &str) -> Result<ImageRewrite, MdxError> {
    let mut marker = MARKER.to_string();
    while html.contains(&marker) {
        marker.push('X');
    }

    let mut images = Vec::new();
    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img", |el| {
                match el.get_attribute("src") {
                    Some(src) => {
                        let src = html_escape::decode_html_entities(&src).replace('\\', "/");
                        let alt = el.get_attribute("alt").unwrap_or_default();
                        let alt = html_escape::decode_html_entities(&alt);
                        el.replace(&token(&marker, images.len()), ContentType::Text);
                        images.push(format!("![{alt}]({src})"));
                    }
                    None => el.remove(),
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| MdxError::render(format!("Failed to rewrite images: {err}")))?;

    Ok(ImageRewrite {
        html: rewritten,
        marker,
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(html: &str) -> String {
        let rewrite = rewrite_images(html).unwrap();
        rewrite.restore(&rewrite.html)
    }

    #[test]
    fn replaces_image_with_markdown() {
        assert_eq!(
            flatten("<p><img src=\"a/b.png\" alt=\"X\"></p>"),
            "<p>![X](a/b.png)</p>"
        );
    }

    #[test]
    fn placeholders_are_plain_words() {
        let rewrite = rewrite_images("<p><img src=\"my_shot.png\" alt=\"*\"></p>").unwrap();
        assert_eq!(rewrite.images(), ["![*](my_shot.png)"]);
        let inner = rewrite
            .html
            .trim_start_matches("<p>")
            .trim_end_matches("</p>");
        assert!(inner.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn attribute_order_and_quoting_do_not_matter() {
        assert_eq!(
            flatten("<img class='w-auto' alt='Home' src=shot.png />"),
            "![Home](shot.png)"
        );
    }

    #[test]
    fn entities_are_decoded() {
        let rewrite =
            rewrite_images("<img src=\"a.png?x=1&amp;y=2\" alt=\"Tom &amp; &quot;Jerry&quot;\">")
                .unwrap();
        assert_eq!(rewrite.images(), ["![Tom & \"Jerry\"](a.png?x=1&y=2)"]);
    }

    #[test]
    fn normalizes_backslashes() {
        assert_eq!(flatten("<img src=\"a\\b.png\" alt=\"\"/>"), "![](a/b.png)");
    }

    #[test]
    fn drops_images_without_src() {
        assert_eq!(
            flatten("<div><img alt=\"nothing\"/>text</div>"),
            "<div>text</div>"
        );
    }

    #[test]
    fn markers_avoid_existing_text() {
        let rewrite = rewrite_images("<p>MDXTOMDIMAGE0MDXTOMDIMAGE <img src=\"a.png\"></p>").unwrap();
        assert_eq!(
            rewrite.restore(&rewrite.html),
            "<p>MDXTOMDIMAGE0MDXTOMDIMAGE ![](a.png)</p>"
        );
    }

    #[test]
    fn many_images_keep_their_order() {
        let html: String = (0..12)
            .map(|i| format!("<img src=\"{i}.png\" alt=\"{i}\">"))
            .collect();
        let expected: String = (0..12).map(|i| format!("![{i}]({i}.png)")).collect();
        assert_eq!(flatten(&html), expected);
    }
}
