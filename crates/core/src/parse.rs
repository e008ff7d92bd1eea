//! MDX parsing on top of markdown-rs, with extension hooks.

use crate::{MdxError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};
use mdxjs::{MdxParseOptions, Options, compile};
use std::borrow::Cow;
use std::sync::Arc;

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Enable MDX constructs (JSX, ESM, expressions).
    pub mdx: bool,
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
}

impl ParseOptions {
    /// Plain Markdown (no MDX).
    pub const fn markdown() -> Self {
        Self {
            mdx: false,
            gfm: true,
            math: false,
        }
    }

    /// MDX defaults (JSX/ESM/expression enabled).
    pub const fn mdx() -> Self {
        Self {
            mdx: true,
            gfm: true,
            math: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    ///
    /// Frontmatter is always left to [`crate::frontmatter`], so the
    /// construct stays off here.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: false,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.mdx {
            constructs.autolink = false;
            constructs.code_indented = false;
            constructs.html_flow = false;
            constructs.html_text = false;
            constructs.mdx_esm = true;
            constructs.mdx_expression_flow = true;
            constructs.mdx_expression_text = true;
            constructs.mdx_jsx_flow = true;
            constructs.mdx_jsx_text = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            mdx_esm_parse: self
                .mdx
                .then(|| Box::new(accept_esm) as Box<markdown::MdxEsmParse>),
            ..markdown::ParseOptions::default()
        }
    }
}

// ESM blocks are only recognized when a parser is installed. Their syntax
// is checked by `check_mdx_syntax`.
fn accept_esm(_value: &str) -> markdown::MdxSignal {
    markdown::MdxSignal::Ok
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::mdx()
    }
}

/// Checks the ESM blocks and `{…}` expressions of `input` by compiling it
/// with mdxjs, which parses both with swc.
///
/// Reported lines are shifted by `line_offset`, the number of lines that
/// precede `input` in `file`.
pub fn check_mdx_syntax(
    input: &str,
    options: &ParseOptions,
    file: &str,
    line_offset: usize,
) -> Result<(), MdxError> {
    if !options.mdx {
        return Ok(());
    }

    let mut parse = if options.gfm {
        MdxParseOptions::gfm()
    } else {
        MdxParseOptions::default()
    };
    if options.math {
        parse.constructs.math_flow = true;
        parse.constructs.math_text = true;
        parse.math_text_single_dollar = true;
    }

    let mdx_options = Options {
        filepath: Some(file.to_string()),
        parse,
        ..Default::default()
    };

    compile(input, &mdx_options).map(drop).map_err(|err| {
        let location = message_location(&err);
        MdxError::bundle_at(
            err.reason.clone(),
            SourceLocation::with_file(
                file.to_string(),
                location.line + line_offset,
                location.column,
            ),
        )
    })
}

/// Trait for preprocessing raw source text before parsing.
pub trait TextTransform: Send + Sync {
    /// Transform the input text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str> + Send + Sync,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Trait for mutating the parsed MDAST after parsing (remark-plugin analogue).
pub trait AstTransform: Send + Sync {
    /// Mutate the parsed markdown AST in place.
    fn transform(&self, root: &mut Node);
}

impl<F> AstTransform for F
where
    F: Fn(&mut Node) + Send + Sync,
{
    fn transform(&self, root: &mut Node) {
        (self)(root)
    }
}

/// MDX compilation options accepted from callers.
#[derive(Clone, Default)]
pub struct MdxOptions {
    /// Syntax switches.
    pub parse: ParseOptions,
    /// Source transforms applied in order before parsing.
    pub text_transforms: Vec<Arc<dyn TextTransform>>,
    /// Tree transforms applied in order after parsing.
    pub ast_transforms: Vec<Arc<dyn AstTransform>>,
}

impl std::fmt::Debug for MdxOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MdxOptions")
            .field("parse", &self.parse)
            .field("text_transforms", &self.text_transforms.len())
            .field("ast_transforms", &self.ast_transforms.len())
            .finish()
    }
}

/// Configurable parsing pipeline with optional transforms.
pub struct ParserPipeline {
    options: markdown::ParseOptions,
    text_transforms: Vec<Arc<dyn TextTransform>>,
    ast_transforms: Vec<Arc<dyn AstTransform>>,
}

impl ParserPipeline {
    /// Create a new pipeline from markdown-rs parse options.
    pub fn new(options: markdown::ParseOptions) -> Self {
        Self {
            options,
            text_transforms: Vec::new(),
            ast_transforms: Vec::new(),
        }
    }

    /// Build a pipeline carrying every transform in `options`.
    pub fn from_mdx_options(options: &MdxOptions) -> Self {
        Self {
            options: options.parse.to_markdown(),
            text_transforms: options.text_transforms.clone(),
            ast_transforms: options.ast_transforms.clone(),
        }
    }

    /// Add a text preprocessor transform.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.text_transforms.push(Arc::new(transform));
    }

    /// Add an AST transform.
    pub fn add_ast_transform<T: AstTransform + 'static>(&mut self, transform: T) {
        self.ast_transforms.push(Arc::new(transform));
    }

    /// Run the text transforms over `input`.
    pub fn prepare<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(input);
        for transform in &self.text_transforms {
            let next = transform.transform(current.as_ref());
            current = Cow::Owned(next.into_owned());
        }
        current
    }

    /// Parse source into MDAST using the configured pipeline.
    pub fn parse(&self, input: &str) -> Result<Node, MdxError> {
        self.parse_prepared(&self.prepare(input))
    }

    /// Parse text already run through [`ParserPipeline::prepare`], then
    /// apply the tree transforms.
    pub fn parse_prepared(&self, input: &str) -> Result<Node, MdxError> {
        let mut root = parse_mdast_with_options(input, &self.options)?;
        for transform in &self.ast_transforms {
            transform.transform(&mut root);
        }

        Ok(root)
    }
}

/// Parse source into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, MdxError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse source into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, MdxError> {
    markdown::to_mdast(input, options)
        .map_err(|err| MdxError::bundle_at(err.reason.clone(), message_location(&err)))
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jsx_and_esm() {
        let input = "import { A } from \"./a\"\n\n# Title\n\n<A b=\"c\" />\n";
        let root = parse_mdast(input, &ParseOptions::mdx()).unwrap();
        let children = root.children().unwrap();
        assert!(matches!(children[0], Node::MdxjsEsm(_)));
        assert!(matches!(children[1], Node::Heading(_)));
        assert!(matches!(children[2], Node::MdxJsxFlowElement(_)));
    }

    #[test]
    fn reports_unclosed_jsx_with_location() {
        let err = parse_mdast("# Title\n\n<Box>\n", &ParseOptions::mdx()).unwrap_err();
        match err {
            MdxError::Bundle { location, .. } => assert!(location.is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn swc_rejects_invalid_expressions() {
        let err = check_mdx_syntax("Total {1 +}\n", &ParseOptions::mdx(), "doc.mdx", 3)
            .unwrap_err();
        match err {
            MdxError::Bundle {
                location: Some(location),
                ..
            } => {
                assert_eq!(location.file.as_deref(), Some("doc.mdx"));
                assert_eq!(location.line, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn swc_rejects_invalid_esm_bodies() {
        let input = "export function total() {\n  return 1 +;\n}\n\n# Title\n";
        assert!(check_mdx_syntax(input, &ParseOptions::mdx(), "doc.mdx", 0).is_err());
    }

    #[test]
    fn valid_documents_pass_the_syntax_check() {
        let input = "import { A } from \"./a\"\nexport const n = 1\n\n# Hi {n * 2}\n\n<A b={[1, 2]} />\n";
        check_mdx_syntax(input, &ParseOptions::mdx(), "doc.mdx", 0).unwrap();
        check_mdx_syntax("{1 +}", &ParseOptions::markdown(), "doc.md", 0).unwrap();
    }

    fn finalize(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.replace("Draft", "Final"))
    }

    #[test]
    fn pipeline_runs_transforms_in_order() {
        let mut pipeline = ParserPipeline::new(ParseOptions::mdx().to_markdown());
        pipeline.add_text_transform(finalize);
        pipeline.add_ast_transform(|root: &mut Node| {
            if let Some(children) = root.children_mut() {
                children.retain(|child| !matches!(child, Node::ThematicBreak(_)));
            }
        });

        let root = pipeline.parse("# Draft\n\n---\n\ntext").unwrap();
        let children = root.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].to_string(), "Final");
    }
}
