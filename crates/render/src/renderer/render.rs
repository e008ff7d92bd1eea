//! Rendering functions for markdown nodes.

use super::context::{Context, Scope};
use super::jsx::{render_expression, render_jsx};
use markdown::mdast::{self, AlignKind, Node};
use mdx_to_md_core::MdxError;

/// Renders a whole document, footnotes section included.
pub fn render_document(root: &Node, ctx: &mut Context) -> Result<(), MdxError> {
    render_node(root, ctx)?;
    render_footnotes(ctx)
}

/// Renders block children separated by newlines.
pub fn render_flow(children: &[Node], ctx: &mut Context) -> Result<(), MdxError> {
    let mut first = true;
    for child in children {
        if is_invisible(child) {
            continue;
        }
        if !first {
            ctx.push_raw("\n");
        }
        render_node(child, ctx)?;
        first = false;
    }
    Ok(())
}

pub(super) fn render_children(children: &[Node], ctx: &mut Context) -> Result<(), MdxError> {
    for child in children {
        render_node(child, ctx)?;
    }
    Ok(())
}

fn is_invisible(node: &Node) -> bool {
    matches!(
        node,
        Node::MdxjsEsm(_)
            | Node::Definition(_)
            | Node::FootnoteDefinition(_)
            | Node::Yaml(_)
            | Node::Toml(_)
    )
}

fn render_list(list: &mdast::List, ctx: &mut Context) -> Result<(), MdxError> {
    if list.ordered {
        match list.start {
            Some(start) if start != 1 => ctx.push_raw(&format!("<ol start=\"{start}\">")),
            _ => ctx.push_raw("<ol>"),
        }
    } else {
        ctx.push_raw("<ul>");
    }
    ctx.enter(Scope::List {
        spread: list.spread,
    });
    let result = render_flow(&list.children, ctx);
    ctx.exit();
    result?;
    ctx.push_raw(if list.ordered { "</ol>" } else { "</ul>" });
    Ok(())
}

fn render_list_item(item: &mdast::ListItem, ctx: &mut Context) -> Result<(), MdxError> {
    match item.checked {
        Some(checked) => {
            ctx.push_raw("<li class=\"task-list-item\"><input type=\"checkbox\" disabled=\"\"");
            if checked {
                ctx.push_raw(" checked=\"\"");
            }
            ctx.push_raw("/> ");
        }
        None => ctx.push_raw("<li>"),
    }
    render_flow(&item.children, ctx)?;
    ctx.push_raw("</li>");
    Ok(())
}

fn render_table(table: &mdast::Table, ctx: &mut Context) -> Result<(), MdxError> {
    ctx.enter(Scope::Table);
    let result = ctx.capture(|ctx| {
        ctx.push_raw("<table><thead>");
        if let Some(Node::TableRow(row)) = table.children.first() {
            render_table_row(row, ctx, true, &table.align)?;
        }
        ctx.push_raw("</thead>");
        if table.children.len() > 1 {
            ctx.push_raw("<tbody>");
            for row in table.children.iter().skip(1) {
                if let Node::TableRow(row) = row {
                    render_table_row(row, ctx, false, &table.align)?;
                }
            }
            ctx.push_raw("</tbody>");
        }
        ctx.push_raw("</table>");
        Ok(())
    });
    ctx.exit();
    ctx.push_raw(&result?);
    Ok(())
}

fn render_table_row(
    row: &mdast::TableRow,
    ctx: &mut Context,
    is_header: bool,
    aligns: &[AlignKind],
) -> Result<(), MdxError> {
    let tag = if is_header { "th" } else { "td" };
    ctx.push_raw("<tr>");
    for (i, cell) in row.children.iter().enumerate() {
        let Node::TableCell(cell) = cell else {
            continue;
        };
        let align = match aligns.get(i) {
            Some(AlignKind::Left) => " align=\"left\"",
            Some(AlignKind::Right) => " align=\"right\"",
            Some(AlignKind::Center) => " align=\"center\"",
            Some(AlignKind::None) | None => "",
        };
        ctx.push_raw(&format!("<{tag}{align}>"));
        render_children(&cell.children, ctx)?;
        ctx.push_raw(&format!("</{tag}>"));
    }
    ctx.push_raw("</tr>");
    Ok(())
}

/// Paragraphs in tight lists render without `<p>`.
fn render_paragraph(para: &mdast::Paragraph, ctx: &mut Context) -> Result<(), MdxError> {
    if ctx.is_in_tight_list() {
        return render_children(&para.children, ctx);
    }
    ctx.push_raw("<p>");
    ctx.enter(Scope::Paragraph);
    let result = render_children(&para.children, ctx);
    ctx.exit();
    result?;
    ctx.push_raw("</p>");
    Ok(())
}

fn render_link(
    url: &str,
    title: Option<&str>,
    children: &[Node],
    ctx: &mut Context,
) -> Result<(), MdxError> {
    ctx.push_raw("<a");
    ctx.push_attr("href", url);
    if let Some(title) = title {
        ctx.push_attr("title", title);
    }
    ctx.push_raw(">");
    render_children(children, ctx)?;
    ctx.push_raw("</a>");
    Ok(())
}

fn render_image(url: &str, alt: &str, title: Option<&str>, ctx: &mut Context) {
    ctx.push_raw("<img");
    ctx.push_attr("src", url);
    ctx.push_attr("alt", alt);
    if let Some(title) = title {
        ctx.push_attr("title", title);
    }
    ctx.push_raw("/>");
}

fn render_code(code: &mdast::Code, ctx: &mut Context) {
    ctx.push_raw("<pre><code");
    if let Some(lang) = &code.lang {
        ctx.push_attr("class", &format!("language-{lang}"));
    }
    ctx.push_raw(">");
    ctx.push_text(&code.value);
    if !code.value.is_empty() {
        ctx.push_raw("\n");
    }
    ctx.push_raw("</code></pre>");
}

fn render_wrapped(tag: &str, children: &[Node], ctx: &mut Context) -> Result<(), MdxError> {
    ctx.push_raw(&format!("<{tag}>"));
    render_children(children, ctx)?;
    ctx.push_raw(&format!("</{tag}>"));
    Ok(())
}

fn render_blockquote(quote: &mdast::Blockquote, ctx: &mut Context) -> Result<(), MdxError> {
    ctx.push_raw("<blockquote>\n");
    ctx.enter(Scope::Container);
    let result = render_flow(&quote.children, ctx);
    ctx.exit();
    result?;
    ctx.push_raw("\n</blockquote>");
    Ok(())
}

fn render_footnote_reference(
    fnref: &mdast::FootnoteReference,
    ctx: &mut Context,
) -> Result<(), MdxError> {
    let Some((ordinal, count)) = ctx.reference_footnote(&fnref.identifier) else {
        ctx.push_text(&format!("[^{}]", fnref.label.as_deref().unwrap_or(&fnref.identifier)));
        return Ok(());
    };
    let id = footnote_id(&fnref.identifier);
    let suffix = if count == 1 {
        String::new()
    } else {
        format!("-{count}")
    };
    ctx.push_raw(&format!(
        "<sup><a href=\"#user-content-fn-{id}\" id=\"user-content-fnref-{id}{suffix}\" \
         data-footnote-ref=\"\" aria-describedby=\"footnote-label\">{ordinal}</a></sup>"
    ));
    Ok(())
}

fn footnote_id(identifier: &str) -> String {
    html_escape::encode_double_quoted_attribute(&identifier.to_lowercase()).into_owned()
}

/// Emits the aggregated footnotes section for every referenced definition.
fn render_footnotes(ctx: &mut Context) -> Result<(), MdxError> {
    let footnotes = ctx.referenced_footnotes();
    if footnotes.is_empty() {
        return Ok(());
    }
    ctx.push_raw(
        "\n<section data-footnotes=\"\" class=\"footnotes\"><h2 class=\"sr-only\" \
         id=\"footnote-label\">Footnotes</h2>\n<ol>\n",
    );
    for (ordinal, (definition, refs)) in footnotes.into_iter().enumerate() {
        let id = footnote_id(&definition.identifier);
        ctx.push_raw(&format!("<li id=\"user-content-fn-{id}\">\n"));
        ctx.enter(Scope::Container);
        let result = render_flow(&definition.children, ctx);
        ctx.exit();
        result?;
        for n in 1..=refs {
            let suffix = if n == 1 { String::new() } else { format!("-{n}") };
            ctx.push_raw(&format!(
                " <a href=\"#user-content-fnref-{id}{suffix}\" data-footnote-backref=\"\" \
                 aria-label=\"Back to reference {}\" class=\"data-footnote-backref\">↩</a>",
                ordinal + 1
            ));
        }
        ctx.push_raw("\n</li>\n");
    }
    ctx.push_raw("</ol>\n</section>");
    Ok(())
}

/// Recursively renders an AST node to HTML.
pub fn render_node(node: &Node, ctx: &mut Context) -> Result<(), MdxError> {
    match node {
        Node::Root(root) => render_flow(&root.children, ctx)?,
        Node::Text(text) => ctx.push_text(&text.value),
        Node::Paragraph(para) => render_paragraph(para, ctx)?,
        Node::Heading(heading) => {
            render_wrapped(&format!("h{}", heading.depth), &heading.children, ctx)?
        }
        Node::Link(link) => render_link(&link.url, link.title.as_deref(), &link.children, ctx)?,
        Node::LinkReference(reference) => match ctx.definition(&reference.identifier) {
            Some(definition) => render_link(
                &definition.url,
                definition.title.as_deref(),
                &reference.children,
                ctx,
            )?,
            None => render_children(&reference.children, ctx)?,
        },
        Node::Image(img) => render_image(&img.url, &img.alt, img.title.as_deref(), ctx),
        Node::ImageReference(reference) => match ctx.definition(&reference.identifier) {
            Some(definition) => render_image(
                &definition.url,
                &reference.alt,
                definition.title.as_deref(),
                ctx,
            ),
            None => ctx.push_text(&reference.alt),
        },
        Node::Strong(strong) => render_wrapped("strong", &strong.children, ctx)?,
        Node::Emphasis(emphasis) => render_wrapped("em", &emphasis.children, ctx)?,
        Node::Delete(delete) => render_wrapped("del", &delete.children, ctx)?,
        Node::InlineCode(code) => {
            ctx.push_raw("<code>");
            ctx.push_text(&code.value);
            ctx.push_raw("</code>");
        }
        Node::Code(code) => render_code(code, ctx),
        Node::List(list) => render_list(list, ctx)?,
        Node::ListItem(item) => render_list_item(item, ctx)?,
        Node::Blockquote(quote) => render_blockquote(quote, ctx)?,
        Node::Table(table) => render_table(table, ctx)?,
        Node::TableRow(_) | Node::TableCell(_) => {}
        Node::ThematicBreak(_) => ctx.push_raw("<hr/>"),
        Node::Break(_) => ctx.push_raw("<br/>\n"),
        Node::Html(html) => ctx.push_raw(&html.value),
        Node::Math(math) => {
            ctx.push_raw("<pre><code class=\"language-math math-display\">");
            ctx.push_text(&math.value);
            ctx.push_raw("</code></pre>");
        }
        Node::InlineMath(math) => {
            ctx.push_raw("<code class=\"language-math math-inline\">");
            ctx.push_text(&math.value);
            ctx.push_raw("</code>");
        }
        Node::FootnoteReference(fnref) => render_footnote_reference(fnref, ctx)?,
        Node::MdxJsxFlowElement(elem) => {
            render_jsx(elem.name.as_deref(), &elem.attributes, &elem.children, true, ctx)?
        }
        Node::MdxJsxTextElement(elem) => {
            render_jsx(elem.name.as_deref(), &elem.attributes, &elem.children, false, ctx)?
        }
        Node::MdxFlowExpression(expr) => render_expression(&expr.value, ctx)?,
        Node::MdxTextExpression(expr) => render_expression(&expr.value, ctx)?,
        Node::MdxjsEsm(_)
        | Node::Definition(_)
        | Node::FootnoteDefinition(_)
        | Node::Yaml(_)
        | Node::Toml(_) => {}
    }
    Ok(())
}
