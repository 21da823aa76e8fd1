//! In-memory `.pptx` builder for tests.
//!
//! Produces the minimum set of parts the parser reads: the presentation
//! relationships, `presentation.xml` with its slide id list, and one XML part
//! per slide. Shape helpers return `p:spTree` children as XML strings.

use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const MASTER_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

/// A text box whose text frame holds the given paragraphs.
pub fn text_shape(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            if p.is_empty() {
                "<a:p/>".to_string()
            } else {
                format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", escape(p))
            }
        })
        .collect();
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"TextBox\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
         <p:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"100\" cy=\"100\"/></a:xfrm></p:spPr>\
         <p:txBody><a:bodyPr/><a:lstStyle/>{body}</p:txBody></p:sp>"
    )
}

/// An autoshape with no text frame at all.
pub fn bare_shape() -> String {
    "<p:sp><p:nvSpPr><p:cNvPr id=\"3\" name=\"Rectangle\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"
        .to_string()
}

/// A picture, which carries no text.
pub fn picture() -> String {
    "<p:pic><p:nvPicPr><p:cNvPr id=\"4\" name=\"Picture\"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>\
     <p:blipFill><a:blip r:embed=\"rId9\"/></p:blipFill><p:spPr/></p:pic>"
        .to_string()
}

/// A table inside a graphic frame. Its cell text is not shape text.
pub fn table(cell: &str) -> String {
    format!(
        "<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id=\"5\" name=\"Table\"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>\
         <a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/table\"><a:tbl><a:tr h=\"1\"><a:tc>\
         <a:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>",
        escape(cell)
    )
}

/// A group wrapping other shapes.
pub fn group(children: &[String]) -> String {
    format!(
        "<p:grpSp><p:nvGrpSpPr><p:cNvPr id=\"6\" name=\"Group\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>",
        children.concat()
    )
}

/// A shape written twice inside `mc:AlternateContent`, once for readers
/// that understand the newer markup and once as the fallback.
pub fn alternate_content(choice: &str, fallback: &str) -> String {
    format!(
        "<mc:AlternateContent><mc:Choice Requires=\"a14\">{choice}</mc:Choice>\
         <mc:Fallback>{fallback}</mc:Fallback></mc:AlternateContent>"
    )
}

/// Builds a `.pptx` archive in memory.
#[derive(Debug)]
pub struct DeckFixture {
    slides: Vec<Vec<String>>,
    order: Option<Vec<usize>>,
    with_presentation_xml: bool,
}

impl DeckFixture {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            order: None,
            with_presentation_xml: true,
        }
    }

    /// Append a slide part with the given `p:spTree` children.
    pub fn slide(mut self, shapes: Vec<String>) -> Self {
        self.slides.push(shapes);
        self
    }

    /// Present the slide parts in this order (1-based part numbers).
    pub fn presentation_order(mut self, order: &[usize]) -> Self {
        self.order = Some(order.to_vec());
        self
    }

    /// Leave out `ppt/presentation.xml`.
    pub fn without_presentation_xml(mut self) -> Self {
        self.with_presentation_xml = false;
        self
    }

    /// Write the archive.
    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);

        let mut put = |name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        put("[Content_Types].xml", &self.content_types());
        put("ppt/_rels/presentation.xml.rels", &self.relationships());
        if self.with_presentation_xml {
            put("ppt/presentation.xml", &self.presentation());
        }
        for (idx, shapes) in self.slides.iter().enumerate() {
            put(&format!("ppt/slides/slide{}.xml", idx + 1), &slide_xml(shapes));
        }

        zip.finish().unwrap().into_inner()
    }

    fn content_types(&self) -> String {
        let overrides: String = (1..=self.slides.len())
            .map(|n| {
                format!(
                    "<Override PartName=\"/ppt/slides/slide{n}.xml\" \
                     ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
                )
            })
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">{overrides}</Types>"
        )
    }

    // Relationship ids are rId2.. for slides; rId1 is the slide master.
    fn relationships(&self) -> String {
        let mut rels = format!(
            "<Relationship Id=\"rId1\" Type=\"{MASTER_REL_TYPE}\" Target=\"slideMasters/slideMaster1.xml\"/>"
        );
        for n in 1..=self.slides.len() {
            rels.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"{SLIDE_REL_TYPE}\" Target=\"slides/slide{n}.xml\"/>",
                n + 1
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{rels}</Relationships>"
        )
    }

    fn presentation(&self) -> String {
        let order: Vec<usize> = self
            .order
            .clone()
            .unwrap_or_else(|| (1..=self.slides.len()).collect());
        let ids: String = order
            .iter()
            .enumerate()
            .map(|(i, n)| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 256 + i, n + 1))
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <p:presentation xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx=\"9144000\" cy=\"6858000\"/></p:presentation>"
        )
    }
}

/// A complete slide part wrapping the given `p:spTree` children.
pub fn slide_xml(shapes: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" \
         xmlns:mc=\"http://schemas.openxmlformats.org/markup-compatibility/2006\" \
         xmlns:a14=\"http://schemas.microsoft.com/office/drawing/2010/main\">\
         <p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>",
        shapes.concat()
    )
}
