//! Slide context extraction.
//!
//! Builds the per-request snapshot that grounds the model's response:
//! one record per shape (name, type, geometry, text), the resolved
//! selected shape, and the covered rectangular areas of the slide.
//! All geometry is reported in millimetres.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

use super::package::PptPackage;
use super::units::emu_to_mm;
use super::PptError;

/// spTree children that count as shapes, in the tag order OOXML uses.
/// Both the extractor and the action executor enumerate these, so
/// shape indices agree between context and execution.
pub(crate) fn shape_tag(local_name: &[u8]) -> Option<&'static str> {
    match local_name {
        b"sp" => Some("shape"),
        b"pic" => Some("picture"),
        b"graphicFrame" => Some("graphic_frame"),
        b"grpSp" => Some("group"),
        b"cxnSp" => Some("connector"),
        _ => None,
    }
}

/// One shape on the slide, as described to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeInfo {
    pub name: Option<String>,
    pub shape_type: &'static str,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ShapeInfo {
    fn has_full_geometry(&self) -> bool {
        self.left.is_some() && self.top.is_some() && self.width.is_some() && self.height.is_some()
    }
}

/// The shape named in the request, resolved to both index spaces.
///
/// `actual` indexes the full shape list (what update/delete actions
/// use); `relative` indexes the subset of shapes that carried full
/// geometry when this one was reached. The two are not interchangeable.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedShape {
    pub actual: usize,
    pub relative: usize,
    pub info: ShapeInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentationInfo {
    pub file_name: String,
    pub file_size: u64,
    pub slide_count: usize,
    pub slide_width: f64,
    pub slide_height: f64,
}

/// Snapshot of one slide, built fresh per request and discarded after.
#[derive(Debug, Clone, Serialize)]
pub struct SlideContext {
    pub presentation_info: PresentationInfo,
    pub shapes: Vec<ShapeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_shape: Option<SelectedShape>,
    /// Occupied rectangles as (top, left, width, height) in millimetres.
    pub covered_areas: Vec<(f64, f64, f64, f64)>,
}

/// Walk the slide's shape tree and produce its context snapshot.
pub fn extract_slide_context(
    package: &PptPackage,
    slide_index: usize,
    shape_name: Option<&str>,
) -> Result<SlideContext, PptError> {
    let start = std::time::Instant::now();
    let xml = package.slide_xml(slide_index)?;
    let (slide_width, slide_height) = package.slide_size_mm()?;

    let raw_shapes = scan_shapes(xml)?;

    let mut shapes = Vec::with_capacity(raw_shapes.len());
    let mut selected_shape = None;
    let mut covered_areas = Vec::new();
    let mut relative = 0usize;

    for (actual, info) in raw_shapes.into_iter().enumerate() {
        if let (Some(name), Some(wanted)) = (info.name.as_deref(), shape_name) {
            if name == wanted && selected_shape.is_none() {
                selected_shape = Some(SelectedShape {
                    actual,
                    relative,
                    info: info.clone(),
                });
            }
        }
        if info.has_full_geometry() {
            covered_areas.push((
                info.top.unwrap_or(0.0),
                info.left.unwrap_or(0.0),
                info.width.unwrap_or(0.0),
                info.height.unwrap_or(0.0),
            ));
            relative += 1;
        }
        shapes.push(info);
    }

    log::info!(
        "[CONTEXT] Slide {}: {} shapes, {} covered areas, selection={} ({}ms)",
        slide_index,
        shapes.len(),
        covered_areas.len(),
        selected_shape
            .as_ref()
            .map(|s| s.actual.to_string())
            .unwrap_or_else(|| "none".into()),
        start.elapsed().as_millis()
    );

    Ok(SlideContext {
        presentation_info: PresentationInfo {
            file_name: package.file_name().to_string(),
            file_size: package.file_size(),
            slide_count: package.slide_count(),
            slide_width,
            slide_height,
        },
        shapes,
        selected_shape,
        covered_areas,
    })
}

/// Enumerate the direct shape children of `p:spTree` in document order.
fn scan_shapes(xml: &[u8]) -> Result<Vec<ShapeInfo>, PptError> {
    let mut reader = Reader::from_reader(xml);
    let mut shapes = Vec::new();

    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;

    // State while inside one top-level shape element.
    let mut current: Option<ShapeInfo> = None;
    let mut shape_depth = 0usize;
    let mut has_text_body = false;
    let mut in_text_run = false;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut geometry_seen = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if let Some(info) = current.as_mut() {
                    match local.as_slice() {
                        // Only the shape's own text body counts; a
                        // nested child's (inside a group) does not.
                        b"txBody" if depth == shape_depth + 1 => has_text_body = true,
                        b"p" if has_text_body => paragraphs.push(String::new()),
                        b"t" if has_text_body => in_text_run = true,
                        _ => {}
                    }
                    note_shape_element(&e, info, &mut geometry_seen);
                } else if local == b"spTree" && tree_depth.is_none() {
                    tree_depth = Some(depth);
                } else if tree_depth == Some(depth.wrapping_sub(1)) {
                    if let Some(tag) = shape_tag(&local) {
                        current = Some(ShapeInfo {
                            name: None,
                            shape_type: tag,
                            left: None,
                            top: None,
                            width: None,
                            height: None,
                            text: None,
                        });
                        shape_depth = depth;
                        has_text_body = false;
                        geometry_seen = false;
                        paragraphs.clear();
                    }
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let local = e.local_name().as_ref().to_vec();
                if let Some(info) = current.as_mut() {
                    note_shape_element(&e, info, &mut geometry_seen);
                } else if tree_depth == Some(depth.wrapping_sub(1)) && shape_tag(&local).is_some()
                {
                    // Degenerate self-closing shape: record it with no detail.
                    shapes.push(ShapeInfo {
                        name: None,
                        shape_type: shape_tag(&local).unwrap(),
                        left: None,
                        top: None,
                        width: None,
                        height: None,
                        text: None,
                    });
                }
            }
            Event::Text(t) => {
                if in_text_run {
                    if let Some(p) = paragraphs.last_mut() {
                        p.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(e) => {
                depth -= 1;
                if e.local_name().as_ref() == b"t" {
                    in_text_run = false;
                }
                if depth == shape_depth {
                    if let Some(mut info) = current.take() {
                        if has_text_body {
                            info.text = Some(paragraphs.join("\n"));
                        }
                        shapes.push(info);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(shapes)
}


/// Record name and geometry attributes from elements inside a shape.
/// Only the first `a:off`/`a:ext` pair counts — that is the shape's own
/// transform; later ones belong to nested elements.
fn note_shape_element(
    e: &quick_xml::events::BytesStart,
    info: &mut ShapeInfo,
    geometry_seen: &mut bool,
) {
    match e.local_name().as_ref() {
        b"cNvPr" if info.name.is_none() => {
            for attr in e.attributes().flatten() {
                if attr.key.local_name().as_ref() == b"name" {
                    info.name = Some(String::from_utf8_lossy(&attr.value).into_owned());
                }
            }
        }
        b"off" if !*geometry_seen => {
            for attr in e.attributes().flatten() {
                let value = String::from_utf8_lossy(&attr.value).parse::<i64>().ok();
                match attr.key.local_name().as_ref() {
                    b"x" => info.left = value.map(emu_to_mm),
                    b"y" => info.top = value.map(emu_to_mm),
                    _ => {}
                }
            }
        }
        b"ext" if !*geometry_seen => {
            for attr in e.attributes().flatten() {
                let value = String::from_utf8_lossy(&attr.value).parse::<i64>().ok();
                match attr.key.local_name().as_ref() {
                    b"cx" => info.width = value.map(emu_to_mm),
                    b"cy" => info.height = value.map(emu_to_mm),
                    _ => {}
                }
            }
            *geometry_seen = true;
        }
        _ => {}
    }
}
