//! PPTX file parser implementation.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidequiz_core::{Deck, Error, Result, Slide};
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// ZIP local file header (`PK\x03\x04`); every .pptx starts with it.
const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

/// OLE/CFB header used by legacy binary .ppt files.
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse an uploaded file held in memory.
    ///
    /// Rejects anything that is not a ZIP container before trying to open it.
    pub fn parse_bytes(&self, data: &[u8], filename: &str) -> Result<Deck> {
        if data.starts_with(CFB_MAGIC) {
            return Err(Error::UnsupportedFormat(format!(
                "{} is a legacy .ppt file; save it as .pptx",
                filename
            )));
        }
        if !data.starts_with(ZIP_MAGIC) {
            return Err(Error::UnsupportedFormat(format!(
                "{} is not a .pptx file",
                filename
            )));
        }

        self.parse(Cursor::new(data), filename)
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Deck> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut deck = Deck::new(filename);

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("{}: {} slides", filename, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path, idx + 1)?;
            deck.add_slide(slide);
        }

        Ok(deck)
    }

    /// Get the ordered list of slide part paths.
    ///
    /// The order is the slide id list in `presentation.xml`. If that part is
    /// missing or lists nothing, slide relationships are sorted by number.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let relationships = parse_relationships(&rels_content)?;

        let slide_ids = match self.read_file_from_archive(archive, PRESENTATION_PATH) {
            Ok(content) => parse_slide_id_list(&content)?,
            Err(e) => {
                log::warn!("Falling back to relationship order: {}", e);
                Vec::new()
            }
        };

        if !slide_ids.is_empty() {
            let mut paths = Vec::with_capacity(slide_ids.len());
            for id in &slide_ids {
                match relationships.iter().find(|r| &r.id == id && r.is_slide()) {
                    Some(rel) => paths.push(rel.part_path()),
                    None => log::warn!("Slide id {} has no slide relationship, skipping", id),
                }
            }
            return Ok(paths);
        }

        let mut slides: Vec<(String, Option<usize>)> = relationships
            .iter()
            .filter(|r| r.is_slide())
            .map(|r| {
                let order_num = extract_slide_number(&r.target).or_else(|| extract_slide_number(&r.id));
                (r.part_path(), order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<Slide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let shapes = extract_shape_texts(&content)
            .map_err(|e| Error::XmlError(format!("{} in {}", e, slide_path)))?;

        log::debug!("Slide {}: {} text shapes", slide_number, shapes.len());

        Ok(Slide::with_shapes(slide_number, shapes))
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::MissingPart(format!("'{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of `presentation.xml.rels`.
#[derive(Debug, Default)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

impl Relationship {
    fn is_slide(&self) -> bool {
        self.rel_type.ends_with("/slide")
    }

    /// Archive path of the target. Relative targets are relative to `ppt/`.
    fn part_path(&self) -> String {
        match self.target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("ppt/{}", self.target),
        }
    }
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                let mut rel = Relationship::default();
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        _ => {}
                    }
                }
                relationships.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Relationship ids of `p:sldId` entries, in presentation order.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldId" => {
                if let Some(id) = relationship_id(e) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// The `r:id` attribute, whatever prefix the relationships namespace uses.
fn relationship_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| {
            let key = attr.key.as_ref();
            key != b"id" && local_name(key) == b"id"
        })
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Text of every top-level text-bearing shape in a slide, in shape order.
///
/// `p:sp` elements directly under the shape tree carry a text frame; an
/// empty or absent frame yields an empty string. Pictures, graphic frames,
/// connectors and groups (including the shapes inside them) are skipped.
/// A shape under `mc:AlternateContent` is read from its `mc:Choice` only;
/// the `mc:Fallback` copy is ignored.
/// Paragraphs are joined with `\n`, as are explicit line breaks.
fn extract_shape_texts(xml_content: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut group_depth = 0usize;
    let mut fallback_depth = 0usize;
    // Paragraphs of the shape being read.
    let mut current_shape: Option<Vec<String>> = None;
    let mut in_text_body = false;
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"grpSp" => group_depth += 1,
                    b"Fallback" => fallback_depth += 1,
                    b"sp" if group_depth == 0 && fallback_depth == 0 => {
                        current_shape = Some(Vec::new())
                    }
                    b"txBody" => in_text_body = true,
                    b"p" if in_text_body => {
                        if let Some(ref mut paragraphs) = current_shape {
                            paragraphs.push(String::new());
                        }
                    }
                    b"t" if in_text_body => in_run_text = true,
                    b"br" => push_line_break(&mut current_shape),
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" if group_depth == 0 && fallback_depth == 0 => shapes.push(String::new()),
                    b"p" if in_text_body => {
                        if let Some(ref mut paragraphs) = current_shape {
                            paragraphs.push(String::new());
                        }
                    }
                    b"br" => push_line_break(&mut current_shape),
                    _ => {}
                }
            }
            Event::Text(ref e) if in_run_text => {
                if let Some(paragraph) = current_shape.as_mut().and_then(|p| p.last_mut()) {
                    let text = e.unescape().unwrap_or_default();
                    paragraph.push_str(&text);
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"grpSp" => group_depth = group_depth.saturating_sub(1),
                    b"Fallback" => fallback_depth = fallback_depth.saturating_sub(1),
                    b"sp" if group_depth == 0 && fallback_depth == 0 => {
                        if let Some(paragraphs) = current_shape.take() {
                            shapes.push(paragraphs.join("\n"));
                        }
                        in_text_body = false;
                        in_run_text = false;
                    }
                    b"txBody" => in_text_body = false,
                    b"t" => in_run_text = false,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

fn push_line_break(current_shape: &mut Option<Vec<String>>) {
    if let Some(paragraph) = current_shape.as_mut().and_then(|p| p.last_mut()) {
        paragraph.push('\n');
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
