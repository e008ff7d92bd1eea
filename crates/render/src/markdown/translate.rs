use lol_html::{RewriteStrSettings, Selector, element, rewrite_str};
use mdx_to_md_core::MdxError;

/// HTML to Markdown translation.
///
/// Headings come out in ATX style (`# Title`) at every level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTranslator {
    /// Elements removed, content included, before translation.
    pub ignore: Vec<String>,
}

impl Default for HtmlTranslator {
    fn default() -> Self {
        Self {
            ignore: vec!["img".to_string()],
        }
    }
}

impl HtmlTranslator {
    /// A translator ignoring `tags`.
    pub fn with_ignore<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Translate `html` to Markdown.
    pub fn translate(&self, html: &str) -> Result<String, MdxError> {
        let html = self.strip_ignored(html)?;
        Ok(atx_headings(&html2md::parse_html(&html)))
    }

    fn strip_ignored(&self, html: &str) -> Result<String, MdxError> {
        if self.ignore.is_empty() {
            return Ok(html.to_string());
        }
        let mut handlers = Vec::with_capacity(self.ignore.len());
        for tag in &self.ignore {
            tag.parse::<Selector>()
                .map_err(|err| MdxError::render(format!("Invalid ignore selector `{tag}`: {err}")))?;
            handlers.push(element!(tag, |el| {
                el.remove();
                Ok(())
            }));
        }
        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: handlers,
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|err| MdxError::render(format!("Failed to prepare HTML for translation: {err}")))
    }
}

/// Rewrites setext headings (`Title` over `===`/`---`) as ATX headings,
/// leaving fenced code untouched.
fn atx_headings(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        let underline = lines.get(i + 1).and_then(|next| setext_level(next));
        match underline {
            Some(level) if !in_fence && !line.trim().is_empty() => {
                out.push(format!("{} {}", "#".repeat(level), line.trim()));
                i += 2;
            }
            _ => {
                out.push(line.to_string());
                i += 1;
            }
        }
    }
    let mut result = out.join("\n");
    if markdown.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn setext_level(line: &str) -> Option<usize> {
    let line = line.trim();
    if line.is_empty() {
        None
    } else if line.chars().all(|c| c == '=') {
        Some(1)
    } else if line.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}
