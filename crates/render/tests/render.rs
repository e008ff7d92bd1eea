use mdx_to_md_core::{BuildOptions, BundleRequest, ImagePlugin, MdxError, bundle_mdx};
use mdx_to_md_render::{ComponentRegistry, Props, Runtime};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn scratch(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("mdx-to-md-render-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

fn request(root: &Path, source: &str) -> BundleRequest {
    BundleRequest {
        source: source.to_string(),
        entry: root.join("README.mdx"),
        build: BuildOptions {
            cwd: root.to_path_buf(),
            outdir: root.to_path_buf(),
            public_path: ".".to_string(),
            plugins: vec![Arc::new(ImagePlugin)],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn render_in(root: &Path, registry: ComponentRegistry, source: &str) -> Result<String, MdxError> {
    let doc = bundle_mdx(request(root, source))?;
    Runtime::new(registry).instantiate(&doc).render_to_string()
}

fn render(source: &str) -> Result<String, MdxError> {
    let doc = bundle_mdx(BundleRequest {
        source: source.to_string(),
        entry: "README.mdx".into(),
        ..Default::default()
    })?;
    Runtime::new(ComponentRegistry::with_defaults())
        .instantiate(&doc)
        .render_to_string()
}

#[test]
fn renders_headings_and_paragraphs() {
    let html = render("# Title\n\nSome *text* and `code`.\n").unwrap();
    assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>text</em> and <code>code</code>.</p>");
}

#[test]
fn tight_lists_skip_paragraph_wrappers() {
    let html = render("- one\n- two\n").unwrap();
    assert_eq!(html, "<ul><li>one</li>\n<li>two</li></ul>");
}

#[test]
fn frontmatter_is_in_scope() {
    let html = render("---\ntitle: Hello\n---\n# {frontmatter.title}\n").unwrap();
    assert_eq!(html, "<h1>Hello</h1>");
}

#[test]
fn document_exports_are_in_scope() {
    let html = render("export const version = \"1.2.0\"\n\nVersion {version}\n").unwrap();
    assert_eq!(html, "<p>Version 1.2.0</p>");
}

#[test]
fn intrinsic_elements_follow_jsx_attribute_rules() {
    let html =
        render("Text <span className=\"tag\" hidden={false} data-x>in</span> end\n").unwrap();
    insta::assert_snapshot!(html, @r#"<p>Text <span class="tag" data-x="">in</span> end</p>"#);
}

#[test]
fn undefined_components_fail() {
    let err = render("<Missing />\n").unwrap_err();
    assert!(matches!(err, MdxError::Render { .. }));
    assert!(
        err.to_string()
            .contains("Expected component `Missing` to be defined")
    );
}

#[test]
fn objects_are_not_valid_children() {
    let err = render("{{ a: 1 }}\n").unwrap_err();
    assert!(err.to_string().contains("Objects are not valid as a child"));
}

#[test]
fn props_are_bound() {
    let doc = bundle_mdx(BundleRequest {
        source: "Hello {props.name}\n".to_string(),
        entry: "README.mdx".into(),
        ..Default::default()
    })
    .unwrap();
    let runtime = Runtime::new(ComponentRegistry::new());
    let mut props = Props::new();
    props.insert("name".into(), json!("Ada"));
    let html = runtime.instantiate(&doc).render_with_props(&props).unwrap();
    assert_eq!(html, "<p>Hello Ada</p>");
}

#[test]
fn footnotes_are_collected_at_the_end() {
    let html = render("Hi[^1].\n\n[^1]: Note.\n").unwrap();
    assert!(html.starts_with("<p>Hi<sup><a href=\"#user-content-fn-1\""));
    assert!(html.contains("data-footnote-ref"));
    let section = html.find("<section data-footnotes").unwrap();
    assert!(html[section..].contains("Note."));
}

#[test]
fn imported_screenshot_renders_framed_image() {
    let root = scratch("screenshot");
    fs::write(
        root.join("screenshot.jsx"),
        "export function Screenshot({ src, alt }) {\n  return <img src={src} alt={alt} />;\n}\n",
    )
    .unwrap();
    let html = render_in(
        &root,
        ComponentRegistry::with_defaults(),
        "import { Screenshot } from \"./screenshot.jsx\"\nimport home from \"./home.png\"\n\n<Screenshot src={home} alt=\"Home\" />\n",
    )
    .unwrap();
    assert!(html.contains("<img src=\"./home.png\" alt=\"Home\" class=\"w-auto select-none bg-white ring-1 ring-gray-200\"/>"));
}

#[test]
fn unregistered_components_render_children() {
    let root = scratch("unregistered");
    fs::write(
        root.join("card.jsx"),
        "export function Card({ children }) {\n  return <div className=\"card\">{children}</div>;\n}\n",
    )
    .unwrap();
    let html = render_in(
        &root,
        ComponentRegistry::new(),
        "import { Card } from \"./card.jsx\"\n\n<Card>\n  inside\n</Card>\n",
    )
    .unwrap();
    assert!(html.contains("inside"));
    assert!(!html.contains("card"));
}

#[test]
fn components_are_not_values() {
    let root = scratch("component-value");
    fs::write(root.join("card.jsx"), "export const Card = () => null\n").unwrap();
    let err = render_in(
        &root,
        ComponentRegistry::new(),
        "import { Card } from \"./card.jsx\"\n\n{Card}\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("`Card` cannot be used as a value"));
}
