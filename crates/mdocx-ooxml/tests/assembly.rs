//! End-to-end behaviour of template loading, reset, location and conversion

use std::borrow::Cow;
use std::io::{Cursor, Write};

use mdocx_ast::Document;
use mdocx_ooxml::{
    find_paragraph_containing_text, BodyElement, Converter, DocumentPackage, DocumentStyles,
    OoxmlArchive, OoxmlError, PackageBuffer, Renderer, TemplateLoader, STANDARD_PLACEHOLDER,
    STANDARD_TEMPLATE,
};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Renderer that always fails after touching the body
struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn render(
        &self,
        package: &mut DocumentPackage<'_>,
        _styles: &DocumentStyles,
        _document: &Document,
    ) -> mdocx_ooxml::Result<()> {
        package.body_mut().clear();
        Err(OoxmlError::Rendering("renderer gave up".into()))
    }
}

/// Template whose package has no numbering part
fn template_without_numbering() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="xml" ContentType="application/xml"/>
</Types>"#,
    )
    .unwrap();

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Plain template</w:t></w:r></w:p>
  </w:body>
</w:document>"#,
    )
    .unwrap();

    zip.finish().unwrap();
    buffer.into_inner()
}

fn document_xml(bytes: &[u8]) -> String {
    let archive = OoxmlArchive::from_reader(Cursor::new(bytes)).unwrap();
    archive.get_string("word/document.xml").unwrap()
}

#[test]
fn test_repeated_conversions_are_independent() {
    let converter = Converter::new();
    let first = converter.convert("# Alpha\n\nfirst run").unwrap();
    let second = converter.convert("# Beta\n\nsecond run").unwrap();
    let again = converter.convert("# Alpha\n\nfirst run").unwrap();

    assert_eq!(first.get_ref(), again.get_ref());
    assert!(!document_xml(second.get_ref()).contains("first run"));
    assert!(!document_xml(again.get_ref()).contains("second run"));

    // The canonical bytes are never touched
    let mut fresh = TemplateLoader::new().standard().unwrap();
    let package = fresh.open().unwrap();
    assert!(find_paragraph_containing_text(&package, STANDARD_PLACEHOLDER).is_some());
}

#[test]
fn test_reset_is_idempotent() {
    let mut once = TemplateLoader::new().standard().unwrap();
    let mut package = once.open().unwrap();
    package.clean();
    package.close().unwrap();

    let mut twice = TemplateLoader::new().standard().unwrap();
    let mut package = twice.open().unwrap();
    package.clean();
    package.clean();
    package.close().unwrap();

    assert_eq!(once.as_bytes(), twice.as_bytes());
}

#[test]
fn test_reset_keeps_definitions_and_drops_instances() {
    let mut buffer = TemplateLoader::new().standard().unwrap();
    let mut package = buffer.open().unwrap();
    let definitions = package.numbering().unwrap().definition_count();
    assert!(package.numbering().unwrap().instance_count() > 0);

    package.clean();
    let numbering = package.numbering().unwrap();
    assert_eq!(numbering.instance_count(), 0);
    assert_eq!(numbering.definition_count(), definitions);
    assert!(package.body().is_empty());
}

#[test]
fn test_locator() {
    let mut buffer = TemplateLoader::new().standard().unwrap();
    let package = buffer.open().unwrap();

    let found = find_paragraph_containing_text(&package, STANDARD_PLACEHOLDER).unwrap();
    assert_eq!(found.text(), STANDARD_PLACEHOLDER);
    assert!(find_paragraph_containing_text(&package, "{{missing}}").is_none());
    assert!(find_paragraph_containing_text(&package, "markdown document").is_none());
}

#[test]
fn test_locator_misses_split_runs() {
    let template = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{{con</w:t></w:r><w:r><w:t>tent}}</w:t></w:r></w:p></w:body></w:document>"#;
    let mut archive = OoxmlArchive::default();
    archive.set("word/document.xml", template.to_vec());
    let mut bytes = Cursor::new(Vec::new());
    archive.write_to(&mut bytes).unwrap();

    let mut buffer = PackageBuffer::from_bytes(bytes.into_inner());
    let package = buffer.open().unwrap();
    assert!(find_paragraph_containing_text(&package, STANDARD_PLACEHOLDER).is_none());
    assert!(find_paragraph_containing_text(&package, "{{con").is_some());
}

#[test]
fn test_output_reopens_with_content() {
    let stream = Converter::new()
        .convert("# Heading\n\n- item\n\n| a | b |\n|---|---|\n| 1 | 2 |\n")
        .unwrap();
    assert_eq!(stream.position(), 0);

    let mut buffer = PackageBuffer::from_bytes(stream.into_inner());
    let package = buffer.open().unwrap();
    assert!(!package.body().is_empty());
    assert!(package
        .body()
        .elements()
        .iter()
        .any(|e| matches!(e, BodyElement::Table(_))));
    assert!(package.style_sheet().unwrap().unwrap().contains("Heading1"));
}

#[test]
fn test_renderer_failure_releases_package() {
    let mut buffer = TemplateLoader::new().standard().unwrap();
    let original = buffer.as_bytes().to_vec();
    {
        let mut package = buffer.open().unwrap();
        let document = mdocx_core::parse("text").unwrap();
        let result = FailingRenderer.render(&mut package, &DocumentStyles::default(), &document);
        assert!(matches!(result, Err(OoxmlError::Rendering(_))));
    }
    assert_eq!(buffer.as_bytes(), original.as_slice());
    assert!(buffer.open().is_ok());

    let err = Converter::new()
        .with_renderer(FailingRenderer)
        .convert("text")
        .unwrap_err();
    assert!(matches!(err, OoxmlError::Rendering(_)));
}

#[test]
fn test_scenario_heading_and_emphasis() {
    let stream = Converter::new().convert("# Title\n\nHello *world*.").unwrap();
    let mut buffer = PackageBuffer::from_bytes(stream.into_inner());
    let package = buffer.open().unwrap();

    let paragraphs = package.body().paragraphs();
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(paragraphs[0].style_id(), Some("Heading1"));
    assert_eq!(paragraphs[0].text(), "Title");

    let runs: Vec<_> = paragraphs[1].runs().collect();
    assert_eq!(runs[0].text(), "Hello ");
    assert!(!runs[0].properties.italic);
    assert_eq!(runs[1].text(), "world");
    assert!(runs[1].properties.italic);
    assert_eq!(paragraphs[1].text(), "Hello world.");
}

#[test]
fn test_scenario_missing_resource() {
    let loader = TemplateLoader::new();
    let err = loader.load("mdocx.resources.absent.docx").unwrap_err();
    assert!(matches!(err, OoxmlError::ResourceNotFound(ref name) if name.contains("absent")));

    let err = Converter::new()
        .with_template("mdocx.resources.absent.docx")
        .convert("text")
        .unwrap_err();
    assert!(matches!(err, OoxmlError::ResourceNotFound(_)));
}

#[test]
fn test_scenario_template_without_numbering() {
    let loader = TemplateLoader::new().with_fallback(|name: &str| -> Option<Cow<'static, [u8]>> {
        (name == "plain.docx").then(|| Cow::Owned(template_without_numbering()))
    });

    let (mut buffer, ()) = loader
        .open("plain.docx", true, |package| {
            assert!(package.numbering().is_none());
            assert!(package.body().is_empty());
            Ok(())
        })
        .unwrap();
    assert!(buffer.open().unwrap().body().is_empty());

    let stream = Converter::new()
        .with_loader(loader)
        .with_template("plain.docx")
        .convert("- still a list")
        .unwrap();
    let xml = document_xml(stream.get_ref());
    assert!(xml.contains("still a list"));
    assert!(!xml.contains("<w:numPr>"));
}

#[test]
fn test_standard_template_has_placeholder_after_title() {
    let mut buffer = TemplateLoader::new().load(STANDARD_TEMPLATE).unwrap();
    let package = buffer.open().unwrap();
    assert_eq!(
        package.body().position_of_paragraph_containing(STANDARD_PLACEHOLDER),
        Some(1)
    );
    assert!(package.body().section_properties().is_some());
}
