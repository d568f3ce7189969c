//! Pptx package I/O.
//!
//! The package keeps every zip part in memory as raw bytes and only
//! parses what it needs: `ppt/presentation.xml` for the slide list and
//! slide dimensions, relationship parts for slide and media
//! resolution, `[Content_Types].xml` when registering new media.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::units::emu_to_mm;
use super::PptError;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// A loaded presentation: part name → raw bytes, plus the resolved
/// slide part names in presentation order.
pub struct PptPackage {
    parts: BTreeMap<String, Vec<u8>>,
    slide_parts: Vec<String>,
    file_name: String,
    file_size: u64,
}

#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

impl PptPackage {
    /// Load a presentation from disk.
    pub fn open(path: &Path) -> Result<Self, PptError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(&bytes, &file_name)
    }

    /// Load a presentation from in-memory bytes.
    pub fn from_bytes(bytes: &[u8], file_name: &str) -> Result<Self, PptError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut buf)?;
            parts.insert(entry.name().to_string(), buf);
        }

        let slide_parts = resolve_slide_parts(&parts)?;
        log::debug!(
            "[PPT] Loaded {} ({} parts, {} slides)",
            file_name,
            parts.len(),
            slide_parts.len()
        );

        Ok(Self {
            parts,
            slide_parts,
            file_name: file_name.to_string(),
            file_size: bytes.len() as u64,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn slide_count(&self) -> usize {
        self.slide_parts.len()
    }

    fn slide_part_name(&self, index: usize) -> Result<&str, PptError> {
        self.slide_parts
            .get(index)
            .map(|s| s.as_str())
            .ok_or(PptError::SlideOutOfRange(index))
    }

    /// Raw XML of the slide at `index`.
    pub fn slide_xml(&self, index: usize) -> Result<&[u8], PptError> {
        let name = self.slide_part_name(index)?.to_string();
        self.parts
            .get(&name)
            .map(|b| b.as_slice())
            .ok_or(PptError::MissingPart(name))
    }

    /// Replace the slide XML at `index`.
    pub fn set_slide_xml(&mut self, index: usize, xml: Vec<u8>) -> Result<(), PptError> {
        let name = self.slide_part_name(index)?.to_string();
        self.parts.insert(name, xml);
        Ok(())
    }

    /// Slide dimensions in millimetres, from `p:sldSz`.
    pub fn slide_size_mm(&self) -> Result<(f64, f64), PptError> {
        let xml = self
            .parts
            .get(PRESENTATION_PART)
            .ok_or_else(|| PptError::MissingPart(PRESENTATION_PART.into()))?;
        let mut reader = Reader::from_reader(&xml[..]);
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldSz" => {
                    let cx = attr_i64(&e, b"cx")?;
                    let cy = attr_i64(&e, b"cy")?;
                    return Ok((emu_to_mm(cx), emu_to_mm(cy)));
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Err(PptError::Malformed("presentation.xml has no sldSz".into()))
    }

    /// Add image bytes as a new media part and relate it to the slide.
    /// Returns the relationship id to reference from a `p:pic`.
    pub fn add_image(
        &mut self,
        slide_index: usize,
        bytes: &[u8],
        extension: &str,
    ) -> Result<String, PptError> {
        // Pick an unused media part name.
        let mut n = self
            .parts
            .keys()
            .filter(|k| k.starts_with("ppt/media/"))
            .count()
            + 1;
        let media_name = loop {
            let candidate = format!("ppt/media/image{}.{}", n, extension);
            if !self.parts.contains_key(&candidate) {
                break candidate;
            }
            n += 1;
        };

        self.ensure_content_type_default(extension)?;

        let rels_name = rels_part_for(self.slide_part_name(slide_index)?);
        let target = media_name.trim_start_matches("ppt/").replace("media/", "../media/");
        let rid = self.append_relationship(&rels_name, IMAGE_REL_TYPE, &target)?;

        self.parts.insert(media_name, bytes.to_vec());
        Ok(rid)
    }

    /// Keep only the slide at `index` in the presentation's slide list.
    ///
    /// Rewrites `p:sldIdLst` only; orphaned slide parts stay in the
    /// container and are ignored by consumers.
    pub fn retain_slide(&mut self, index: usize) -> Result<(), PptError> {
        if index >= self.slide_parts.len() {
            return Err(PptError::SlideOutOfRange(index));
        }
        let xml = self
            .parts
            .get(PRESENTATION_PART)
            .ok_or_else(|| PptError::MissingPart(PRESENTATION_PART.into()))?;

        let mut reader = Reader::from_reader(&xml[..]);
        let mut writer = Writer::new(Vec::with_capacity(xml.len()));
        let mut in_list = false;
        let mut slide_i = 0usize;
        let mut skip_depth = 0usize;
        loop {
            let event = reader.read_event()?;
            match event {
                Event::Eof => break,
                _ if skip_depth > 0 => match event {
                    Event::Start(_) => skip_depth += 1,
                    Event::End(_) => skip_depth -= 1,
                    _ => {}
                },
                Event::Start(ref e) if e.local_name().as_ref() == b"sldIdLst" => {
                    in_list = true;
                    writer.write_event(event)?;
                }
                Event::End(ref e) if e.local_name().as_ref() == b"sldIdLst" => {
                    in_list = false;
                    writer.write_event(event)?;
                }
                Event::Empty(ref e) if in_list && e.local_name().as_ref() == b"sldId" => {
                    if slide_i == index {
                        writer.write_event(event)?;
                    }
                    slide_i += 1;
                }
                Event::Start(ref e) if in_list && e.local_name().as_ref() == b"sldId" => {
                    // Rare expanded form: keep or skip the whole element.
                    if slide_i == index {
                        writer.write_event(event)?;
                    } else {
                        skip_depth = 1;
                    }
                    slide_i += 1;
                }
                _ => writer.write_event(event)?,
            }
        }
        let rewritten = writer.into_inner();
        self.parts.insert(PRESENTATION_PART.to_string(), rewritten);
        let kept = self.slide_parts[index].clone();
        self.slide_parts = vec![kept];
        Ok(())
    }

    /// Serialize the package back to zip bytes (deflate).
    pub fn save_bytes(&self) -> Result<Vec<u8>, PptError> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, bytes) in &self.parts {
            zip.start_file(name.clone(), options)?;
            zip.write_all(bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    /// Make sure `[Content_Types].xml` declares a Default for `extension`.
    fn ensure_content_type_default(&mut self, extension: &str) -> Result<(), PptError> {
        let xml = self
            .parts
            .get(CONTENT_TYPES_PART)
            .ok_or_else(|| PptError::MissingPart(CONTENT_TYPES_PART.into()))?
            .clone();

        let mut reader = Reader::from_reader(&xml[..]);
        loop {
            match reader.read_event()? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Default" => {
                    if let Some(ext) = attr_string(&e, b"Extension")? {
                        if ext.eq_ignore_ascii_case(extension) {
                            return Ok(());
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let content_type = match extension {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            other => {
                return Err(PptError::Malformed(format!(
                    "unsupported image extension: {}",
                    other
                )))
            }
        };

        let mut reader = Reader::from_reader(&xml[..]);
        let mut writer = Writer::new(Vec::with_capacity(xml.len() + 96));
        loop {
            let event = reader.read_event()?;
            match event {
                Event::End(ref e) if e.local_name().as_ref() == b"Types" => {
                    let mut default = BytesStart::new("Default");
                    default.push_attribute(("Extension", extension));
                    default.push_attribute(("ContentType", content_type));
                    writer.write_event(Event::Empty(default))?;
                    writer.write_event(event)?;
                }
                Event::Eof => break,
                _ => writer.write_event(event)?,
            }
        }
        self.parts
            .insert(CONTENT_TYPES_PART.to_string(), writer.into_inner());
        Ok(())
    }

    /// Append a relationship to a rels part, creating the part if the
    /// slide had none. Returns the new relationship id.
    fn append_relationship(
        &mut self,
        rels_name: &str,
        rel_type: &str,
        target: &str,
    ) -> Result<String, PptError> {
        let xml = match self.parts.get(rels_name) {
            Some(bytes) => bytes.clone(),
            None => br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#
                .to_vec(),
        };

        let next = parse_relationships(&xml)?
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0)
            + 1;
        let rid = format!("rId{}", next);

        let mut reader = Reader::from_reader(&xml[..]);
        let mut writer = Writer::new(Vec::with_capacity(xml.len() + 160));
        loop {
            let event = reader.read_event()?;
            match event {
                Event::End(ref e) if e.local_name().as_ref() == b"Relationships" => {
                    let mut rel = BytesStart::new("Relationship");
                    rel.push_attribute(("Id", rid.as_str()));
                    rel.push_attribute(("Type", rel_type));
                    rel.push_attribute(("Target", target));
                    writer.write_event(Event::Empty(rel))?;
                    writer.write_event(event)?;
                }
                // A part created from the skeleton above has an Empty
                // Relationships element; expand it.
                Event::Empty(ref e) if e.local_name().as_ref() == b"Relationships" => {
                    writer.write_event(Event::Start(e.to_owned()))?;
                    let mut rel = BytesStart::new("Relationship");
                    rel.push_attribute(("Id", rid.as_str()));
                    rel.push_attribute(("Type", rel_type));
                    rel.push_attribute(("Target", target));
                    writer.write_event(Event::Empty(rel))?;
                    writer.write_event(Event::End(e.to_end().into_owned()))?;
                }
                Event::Eof => break,
                _ => writer.write_event(event)?,
            }
        }
        self.parts.insert(rels_name.to_string(), writer.into_inner());
        Ok(rid)
    }
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`
fn rels_part_for(part_name: &str) -> String {
    match part_name.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &part_name[..pos], &part_name[pos + 1..]),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolve the slide part names in presentation order: the `p:sldIdLst`
/// gives the r:id sequence, the presentation rels map ids to targets.
fn resolve_slide_parts(parts: &BTreeMap<String, Vec<u8>>) -> Result<Vec<String>, PptError> {
    let presentation = parts
        .get(PRESENTATION_PART)
        .ok_or_else(|| PptError::MissingPart(PRESENTATION_PART.into()))?;
    let rels_xml = parts
        .get(PRESENTATION_RELS)
        .ok_or_else(|| PptError::MissingPart(PRESENTATION_RELS.into()))?;
    let rels = parse_relationships(rels_xml)?;

    let mut slide_ids = Vec::new();
    let mut reader = Reader::from_reader(&presentation[..]);
    let mut in_list = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"sldIdLst" => in_list = true,
            Event::End(e) if e.local_name().as_ref() == b"sldIdLst" => in_list = false,
            Event::Empty(e) | Event::Start(e)
                if in_list && e.local_name().as_ref() == b"sldId" =>
            {
                if let Some(rid) = attr_string_qualified(&e, b"r:id")? {
                    slide_ids.push(rid);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut slide_parts = Vec::with_capacity(slide_ids.len());
    for rid in slide_ids {
        let rel = rels
            .iter()
            .find(|r| r.id == rid && r.rel_type == SLIDE_REL_TYPE)
            .ok_or_else(|| PptError::Malformed(format!("no slide relationship for {}", rid)))?;
        // Targets are relative to ppt/.
        slide_parts.push(format!("ppt/{}", rel.target.trim_start_matches("./")));
    }
    Ok(slide_parts)
}

fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, PptError> {
    let mut out = Vec::new();
    let mut reader = Reader::from_reader(xml);
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr_string(&e, b"Id")?.unwrap_or_default();
                let rel_type = attr_string(&e, b"Type")?.unwrap_or_default();
                let target = attr_string(&e, b"Target")?.unwrap_or_default();
                out.push(Relationship { id, rel_type, target });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn attr_string(e: &BytesStart, key: &[u8]) -> Result<Option<String>, PptError> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

/// Attribute lookup by fully-qualified name (e.g. `r:id`).
fn attr_string_qualified(e: &BytesStart, key: &[u8]) -> Result<Option<String>, PptError> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

fn attr_i64(e: &BytesStart, key: &[u8]) -> Result<i64, PptError> {
    attr_string(e, key)?
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            PptError::Malformed(format!(
                "missing numeric attribute {}",
                String::from_utf8_lossy(key)
            ))
        })
}

// Fragment injection helper shared by the action executor: writes the
// raw fragment without re-escaping.
pub(crate) fn raw_fragment(fragment: &str) -> Event<'_> {
    Event::Text(BytesText::from_escaped(fragment))
}
