//! Applies model-proposed edits to the slide XML.
//!
//! Each `ShapeAction` is one rewrite of the slide part: creates append
//! a fragment to `p:spTree`, updates patch the targeted shape in
//! place, deletes drop its element run. Actions are attempted
//! independently — a failing action is logged and reported, and the
//! remaining actions still run. Nothing rolls back.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use super::context::shape_tag;
use super::package::{raw_fragment, PptPackage};
use super::units::{mm_to_emu, pt_to_sz};
use super::PptError;
use crate::icons;
use crate::llm::schema::{ActionKind, ActionsList, FontAttributes, Paragraph, ShapeAction};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{0} requires left, top, width and height")]
    MissingGeometry(&'static str),

    #[error("{0} requires a selected shape")]
    NoSelectedShape(&'static str),

    #[error("create_image requires an attached image file")]
    MissingAttachment,

    #[error("create_icon requires an icon name")]
    MissingIcon,

    #[error("{0} requires at least one paragraph")]
    MissingParagraphs(&'static str),

    #[error("invalid font color {0:?}")]
    InvalidColor(String),

    #[error("shape index {0} does not exist on the slide")]
    ShapeIndex(usize),

    #[error("shape at index {0} has no text body")]
    NotATextShape(usize),

    #[error(transparent)]
    Ppt(#[from] PptError),
}

/// Outcome of one action list: how many landed, and why the rest didn't.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub applied: usize,
    pub skipped: Vec<String>,
}

struct RectEmu {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

/// Executes the structured action list against one slide of the
/// package. The selected-shape index is the *actual* index into the
/// full shape list, as resolved by context extraction.
pub struct ActionHandler<'a> {
    package: &'a mut PptPackage,
    slide_index: usize,
    selected_shape_index: Option<usize>,
    attached_image: Option<Vec<u8>>,
}

impl<'a> ActionHandler<'a> {
    pub fn new(
        package: &'a mut PptPackage,
        slide_index: usize,
        selected_shape_index: Option<usize>,
        attached_image: Option<Vec<u8>>,
    ) -> Self {
        Self {
            package,
            slide_index,
            selected_shape_index,
            attached_image,
        }
    }

    /// Run every action, independently. Failures are logged loudly and
    /// collected; they never abort the remaining actions.
    pub fn execute_actions(&mut self, list: &ActionsList) -> ExecutionReport {
        let start = std::time::Instant::now();
        let mut report = ExecutionReport::default();
        for (i, action) in list.actions.iter().enumerate() {
            match self.execute_action(action) {
                Ok(()) => {
                    report.applied += 1;
                    log::info!("[ACTIONS] #{} {:?}: applied", i, action.action_type);
                }
                Err(e) => {
                    log::error!("[ACTIONS] #{} {:?}: {}", i, action.action_type, e);
                    report
                        .skipped
                        .push(format!("action {} ({:?}): {}", i, action.action_type, e));
                }
            }
        }
        log::info!(
            "[ACTIONS] {} applied, {} skipped in {}ms",
            report.applied,
            report.skipped.len(),
            start.elapsed().as_millis()
        );
        report
    }

    fn execute_action(&mut self, action: &ShapeAction) -> Result<(), ActionError> {
        match action.action_type {
            ActionKind::CreateTextbox => self.create_textbox(action),
            ActionKind::UpdateTextbox => self.update_textbox(action),
            ActionKind::CreateImage => self.create_image(action),
            ActionKind::UpdateImage => self.update_geometry(action, "update_image"),
            ActionKind::CreateIcon => self.create_icon(action),
            ActionKind::UpdateIcon => self.update_geometry(action, "update_icon"),
            ActionKind::DeleteShape => self.delete_shape(),
        }
    }

    fn create_textbox(&mut self, action: &ShapeAction) -> Result<(), ActionError> {
        let rect = require_rect(action, "create_textbox")?;
        let xml = self.package.slide_xml(self.slide_index)?.to_vec();
        let id = max_shape_id(&xml)? + 1;
        let name = action
            .shape_name
            .clone()
            .unwrap_or_else(|| format!("TextBox {}", id));
        let body = match &action.paragraphs {
            Some(paragraphs) if !paragraphs.is_empty() => paragraphs_xml(paragraphs)?,
            _ => "<a:p/>".to_string(),
        };
        let wrap = if action.word_wrap.unwrap_or(true) {
            "square"
        } else {
            "none"
        };
        let fragment = format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="{wrap}"/><a:lstStyle/>{body}</p:txBody></p:sp>"#,
            id = id,
            name = escape(&name),
            x = rect.x,
            y = rect.y,
            cx = rect.cx,
            cy = rect.cy,
            wrap = wrap,
            body = body,
        );
        let rewritten = append_shape(&xml, &fragment)?;
        self.package.set_slide_xml(self.slide_index, rewritten)?;
        Ok(())
    }

    fn update_textbox(&mut self, action: &ShapeAction) -> Result<(), ActionError> {
        let index = self.selected("update_textbox")?;
        let paragraphs = action
            .paragraphs
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ActionError::MissingParagraphs("update_textbox"))?;
        let fragment = paragraphs_xml(paragraphs)?;
        let xml = self.package.slide_xml(self.slide_index)?.to_vec();
        let rewritten = replace_paragraphs(&xml, index, &fragment)?;
        self.package.set_slide_xml(self.slide_index, rewritten)?;
        Ok(())
    }

    fn create_image(&mut self, action: &ShapeAction) -> Result<(), ActionError> {
        let rect = require_rect(action, "create_image")?;
        let bytes = self
            .attached_image
            .clone()
            .ok_or(ActionError::MissingAttachment)?;
        let extension = image_extension(&bytes);
        self.insert_picture(&bytes, extension, rect, action.shape_name.as_deref(), "Picture")
    }

    fn create_icon(&mut self, action: &ShapeAction) -> Result<(), ActionError> {
        let rect = require_rect(action, "create_icon")?;
        let icon = action.icon_name.ok_or(ActionError::MissingIcon)?;
        let bytes = icons::icon_bytes(icon).to_vec();
        self.insert_picture(&bytes, "png", rect, action.shape_name.as_deref(), "Icon")
    }

    fn insert_picture(
        &mut self,
        bytes: &[u8],
        extension: &str,
        rect: RectEmu,
        shape_name: Option<&str>,
        default_prefix: &str,
    ) -> Result<(), ActionError> {
        let rid = self.package.add_image(self.slide_index, bytes, extension)?;
        let xml = self.package.slide_xml(self.slide_index)?.to_vec();
        let id = max_shape_id(&xml)? + 1;
        let name = shape_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", default_prefix, id));
        let fragment = format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="{name}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
            id = id,
            name = escape(&name),
            rid = rid,
            x = rect.x,
            y = rect.y,
            cx = rect.cx,
            cy = rect.cy,
        );
        let rewritten = append_shape(&xml, &fragment)?;
        self.package.set_slide_xml(self.slide_index, rewritten)?;
        Ok(())
    }

    /// Shared by update_image and update_icon: patch only the geometry
    /// fields the action carries. `None` leaves a field untouched;
    /// `Some(0.0)` is a real move to the origin.
    fn update_geometry(&mut self, action: &ShapeAction, kind: &'static str) -> Result<(), ActionError> {
        let index = self.selected(kind)?;
        if action.left.is_none()
            && action.top.is_none()
            && action.width.is_none()
            && action.height.is_none()
        {
            log::debug!("[ACTIONS] update with no geometry fields — nothing to do");
            return Ok(());
        }
        let xml = self.package.slide_xml(self.slide_index)?.to_vec();
        let rewritten = patch_geometry(
            &xml,
            index,
            action.left,
            action.top,
            action.width,
            action.height,
        )?;
        self.package.set_slide_xml(self.slide_index, rewritten)?;
        Ok(())
    }

    fn delete_shape(&mut self) -> Result<(), ActionError> {
        let index = self.selected("delete_shape")?;
        let xml = self.package.slide_xml(self.slide_index)?.to_vec();
        let rewritten = remove_shape(&xml, index)?;
        self.package.set_slide_xml(self.slide_index, rewritten)?;
        Ok(())
    }

    fn selected(&self, kind: &'static str) -> Result<usize, ActionError> {
        self.selected_shape_index
            .ok_or(ActionError::NoSelectedShape(kind))
    }
}

fn require_rect(action: &ShapeAction, kind: &'static str) -> Result<RectEmu, ActionError> {
    match (action.left, action.top, action.width, action.height) {
        (Some(left), Some(top), Some(width), Some(height)) => Ok(RectEmu {
            x: mm_to_emu(left),
            y: mm_to_emu(top),
            cx: mm_to_emu(width),
            cy: mm_to_emu(height),
        }),
        _ => Err(ActionError::MissingGeometry(kind)),
    }
}

/// Sniff the attachment format; pptx cares about the declared
/// content-type default, not the extension itself.
fn image_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "gif"
    } else {
        "png"
    }
}

/// `#RRGGBB` or `RRGGBB` → normalized uppercase `RRGGBB`.
fn normalize_hex_color(color: &str) -> Result<String, ActionError> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(hex.to_ascii_uppercase())
    } else {
        Err(ActionError::InvalidColor(color.to_string()))
    }
}

fn paragraphs_xml(paragraphs: &[Paragraph]) -> Result<String, ActionError> {
    let mut out = String::new();
    for p in paragraphs {
        out.push_str(&paragraph_xml(p)?);
    }
    Ok(out)
}

fn paragraph_xml(p: &Paragraph) -> Result<String, ActionError> {
    let mut xml = String::from("<a:p>");

    let needs_ppr = p.bullet.is_some() || p.level.is_some();
    if needs_ppr {
        xml.push_str("<a:pPr");
        if let Some(level) = p.level {
            xml.push_str(&format!(" lvl=\"{}\"", level));
        }
        match p.bullet {
            Some(true) => xml.push_str("><a:buChar char=\"\u{2022}\"/></a:pPr>"),
            Some(false) => xml.push_str("><a:buNone/></a:pPr>"),
            None => xml.push_str("/>"),
        }
    }

    xml.push_str("<a:r>");
    xml.push_str(&run_properties(&p.font)?);
    xml.push_str(&format!("<a:t>{}</a:t>", escape(&p.text)));
    xml.push_str("</a:r></a:p>");
    Ok(xml)
}

fn run_properties(font: &FontAttributes) -> Result<String, ActionError> {
    let mut attrs = String::new();
    if let Some(size) = font.size {
        attrs.push_str(&format!(" sz=\"{}\"", pt_to_sz(size)));
    }
    if let Some(bold) = font.bold {
        attrs.push_str(&format!(" b=\"{}\"", bold as u8));
    }
    if let Some(italic) = font.italic {
        attrs.push_str(&format!(" i=\"{}\"", italic as u8));
    }
    if let Some(underline) = font.underline {
        attrs.push_str(&format!(" u=\"{}\"", if underline { "sng" } else { "none" }));
    }

    let mut children = String::new();
    if let Some(color) = &font.color {
        children.push_str(&format!(
            "<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>",
            normalize_hex_color(color)?
        ));
    }
    if let Some(name) = &font.name {
        children.push_str(&format!("<a:latin typeface=\"{}\"/>", escape(name)));
    }

    Ok(if children.is_empty() {
        format!("<a:rPr lang=\"en-US\"{}/>", attrs)
    } else {
        format!("<a:rPr lang=\"en-US\"{}>{}</a:rPr>", attrs, children)
    })
}

// ── spTree walking ───────────────────────────────────────────────────

/// Tracks spTree nesting during an event walk. `on_start`/`on_empty`
/// return the shape index when the event opens a top-level shape child,
/// using the same enumeration as context extraction.
struct ShapeWalk {
    depth: usize,
    tree_depth: Option<usize>,
    next_index: usize,
}

impl ShapeWalk {
    fn new() -> Self {
        Self {
            depth: 0,
            tree_depth: None,
            next_index: 0,
        }
    }

    fn on_start(&mut self, local: &[u8]) -> Option<usize> {
        let hit = self.classify(local);
        self.depth += 1;
        hit
    }

    fn on_empty(&mut self, local: &[u8]) -> Option<usize> {
        self.classify(local)
    }

    /// Returns the depth of the element being closed.
    fn on_end(&mut self) -> usize {
        self.depth -= 1;
        self.depth
    }

    fn classify(&mut self, local: &[u8]) -> Option<usize> {
        match self.tree_depth {
            None => {
                if local == b"spTree" {
                    self.tree_depth = Some(self.depth);
                }
                None
            }
            Some(tree) if self.depth == tree + 1 && shape_tag(local).is_some() => {
                let index = self.next_index;
                self.next_index += 1;
                Some(index)
            }
            Some(_) => None,
        }
    }
}

/// Insert a shape fragment just before `</p:spTree>`.
fn append_shape(xml: &[u8], fragment: &str) -> Result<Vec<u8>, PptError> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + fragment.len()));
    loop {
        let event = reader.read_event()?;
        match event {
            Event::End(ref e) if e.local_name().as_ref() == b"spTree" => {
                writer.write_event(raw_fragment(fragment))?;
                writer.write_event(event)?;
            }
            Event::Eof => break,
            _ => writer.write_event(event)?,
        }
    }
    Ok(writer.into_inner())
}

/// Drop the whole element run of the shape at `index`.
fn remove_shape(xml: &[u8], index: usize) -> Result<Vec<u8>, ActionError> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut walk = ShapeWalk::new();
    let mut skip_until: Option<usize> = None;
    let mut found = false;
    loop {
        let event = reader.read_event().map_err(PptError::from)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                let hit = walk.on_start(e.local_name().as_ref());
                if skip_until.is_some() {
                    continue;
                }
                if hit == Some(index) {
                    skip_until = Some(walk.depth - 1);
                    found = true;
                    continue;
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            Event::Empty(ref e) => {
                let hit = walk.on_empty(e.local_name().as_ref());
                if skip_until.is_some() {
                    continue;
                }
                if hit == Some(index) {
                    found = true;
                    continue;
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            Event::End(_) => {
                let elem_depth = walk.on_end();
                if let Some(depth) = skip_until {
                    if elem_depth == depth {
                        skip_until = None;
                    }
                    continue;
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            _ => {
                if skip_until.is_none() {
                    writer.write_event(event).map_err(PptError::from)?;
                }
            }
        }
    }
    if !found {
        return Err(ActionError::ShapeIndex(index));
    }
    Ok(writer.into_inner())
}

/// Patch the first `a:off`/`a:ext` inside the shape at `index`. A
/// shape without its own transform (inherited placeholder geometry)
/// gets one inserted, with unsupplied fields at 0.
fn patch_geometry(
    xml: &[u8],
    index: usize,
    left: Option<f64>,
    top: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
) -> Result<Vec<u8>, ActionError> {
    let needs_xfrm = match shape_has_transform(xml, index)? {
        None => return Err(ActionError::ShapeIndex(index)),
        Some(has) => !has,
    };
    let new_xfrm = format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        left.map(mm_to_emu).unwrap_or(0),
        top.map(mm_to_emu).unwrap_or(0),
        width.map(mm_to_emu).unwrap_or(0),
        height.map(mm_to_emu).unwrap_or(0),
    );

    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut walk = ShapeWalk::new();
    let mut in_target: Option<usize> = None;
    let mut off_done = false;
    let mut ext_done = false;
    let mut xfrm_inserted = false;
    let mut found = false;

    loop {
        let event = reader.read_event().map_err(PptError::from)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                let local = e.local_name().as_ref().to_vec();
                let hit = walk.on_start(&local);
                if hit == Some(index) {
                    in_target = Some(walk.depth - 1);
                    found = true;
                }
                // xfrm must be the first child of spPr.
                if needs_xfrm && !xfrm_inserted && in_target.is_some() && local == b"spPr" {
                    writer.write_event(event).map_err(PptError::from)?;
                    writer
                        .write_event(raw_fragment(&new_xfrm))
                        .map_err(PptError::from)?;
                    xfrm_inserted = true;
                    continue;
                }
                if in_target.is_some() && !off_done && local == b"off" {
                    writer
                        .write_event(Event::Start(patch_point(e, left, top, (b"x", b"y"))))
                        .map_err(PptError::from)?;
                    off_done = true;
                    continue;
                }
                if in_target.is_some() && !ext_done && local == b"ext" {
                    writer
                        .write_event(Event::Start(patch_point(e, width, height, (b"cx", b"cy"))))
                        .map_err(PptError::from)?;
                    ext_done = true;
                    continue;
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            Event::Empty(ref e) => {
                let local = e.local_name().as_ref().to_vec();
                let hit = walk.on_empty(&local);
                if hit == Some(index) {
                    // Self-closing shape cannot carry geometry.
                    found = true;
                }
                if in_target.is_some() && !off_done && local == b"off" {
                    writer
                        .write_event(Event::Empty(patch_point(e, left, top, (b"x", b"y"))))
                        .map_err(PptError::from)?;
                    off_done = true;
                    continue;
                }
                if in_target.is_some() && !ext_done && local == b"ext" {
                    writer
                        .write_event(Event::Empty(patch_point(e, width, height, (b"cx", b"cy"))))
                        .map_err(PptError::from)?;
                    ext_done = true;
                    continue;
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            Event::End(_) => {
                let elem_depth = walk.on_end();
                if in_target == Some(elem_depth) {
                    in_target = None;
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            _ => writer.write_event(event).map_err(PptError::from)?,
        }
    }
    if !found {
        return Err(ActionError::ShapeIndex(index));
    }
    Ok(writer.into_inner())
}

/// Whether the shape at `index` carries its own `a:xfrm`. `None` when
/// no shape exists at that index.
fn shape_has_transform(xml: &[u8], index: usize) -> Result<Option<bool>, PptError> {
    let mut reader = Reader::from_reader(xml);
    let mut walk = ShapeWalk::new();
    let mut in_target: Option<usize> = None;
    let mut found = false;
    let mut has_xfrm = false;
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                let hit = walk.on_start(&local);
                if hit == Some(index) {
                    in_target = Some(walk.depth - 1);
                    found = true;
                } else if in_target.is_some() && local == b"xfrm" {
                    has_xfrm = true;
                }
            }
            Event::Empty(e) => {
                if walk.on_empty(e.local_name().as_ref()) == Some(index) {
                    found = true;
                }
            }
            Event::End(_) => {
                let elem_depth = walk.on_end();
                if in_target == Some(elem_depth) {
                    in_target = None;
                }
            }
            _ => {}
        }
    }
    Ok(if found { Some(has_xfrm) } else { None })
}

/// Rebuild an `a:off`/`a:ext` element, overriding only the supplied
/// millimetre values and keeping the rest of the attributes.
fn patch_point(
    e: &quick_xml::events::BytesStart,
    first_mm: Option<f64>,
    second_mm: Option<f64>,
    keys: (&[u8], &[u8]),
) -> quick_xml::events::BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut first = 0i64;
    let mut second = 0i64;
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value)
            .parse::<i64>()
            .unwrap_or(0);
        if attr.key.local_name().as_ref() == keys.0 {
            first = value;
        } else if attr.key.local_name().as_ref() == keys.1 {
            second = value;
        }
    }
    if let Some(mm) = first_mm {
        first = mm_to_emu(mm);
    }
    if let Some(mm) = second_mm {
        second = mm_to_emu(mm);
    }
    let mut out = quick_xml::events::BytesStart::new(name);
    out.push_attribute((
        String::from_utf8_lossy(keys.0).into_owned().as_str(),
        first.to_string().as_str(),
    ));
    out.push_attribute((
        String::from_utf8_lossy(keys.1).into_owned().as_str(),
        second.to_string().as_str(),
    ));
    out
}

/// Replace every `a:p` in the target shape's own text body.
fn replace_paragraphs(xml: &[u8], index: usize, fragment: &str) -> Result<Vec<u8>, ActionError> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + fragment.len()));
    let mut walk = ShapeWalk::new();
    let mut in_target: Option<usize> = None;
    let mut in_body: Option<usize> = None;
    let mut skip_para: Option<usize> = None;
    let mut found_shape = false;
    let mut found_body = false;

    loop {
        let event = reader.read_event().map_err(PptError::from)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                let local = e.local_name().as_ref().to_vec();
                let hit = walk.on_start(&local);
                let elem_depth = walk.depth - 1;
                if hit == Some(index) {
                    in_target = Some(elem_depth);
                    found_shape = true;
                }
                if skip_para.is_some() {
                    continue;
                }
                if in_target.is_some() && in_body.is_none() && local == b"txBody" {
                    in_body = Some(elem_depth);
                    found_body = true;
                } else if let Some(body_depth) = in_body {
                    if local == b"p" && elem_depth == body_depth + 1 {
                        skip_para = Some(elem_depth);
                        continue;
                    }
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            Event::Empty(ref e) => {
                let local = e.local_name().as_ref().to_vec();
                walk.on_empty(&local);
                if skip_para.is_some() {
                    continue;
                }
                if let Some(body_depth) = in_body {
                    if local == b"p" && walk.depth == body_depth + 1 {
                        continue;
                    }
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            Event::End(ref e) => {
                let local = e.local_name().as_ref().to_vec();
                let elem_depth = walk.on_end();
                if let Some(depth) = skip_para {
                    if elem_depth == depth {
                        skip_para = None;
                    }
                    continue;
                }
                if in_body == Some(elem_depth) && local == b"txBody" {
                    writer
                        .write_event(raw_fragment(fragment))
                        .map_err(PptError::from)?;
                    writer.write_event(event).map_err(PptError::from)?;
                    in_body = None;
                    continue;
                }
                if in_target == Some(elem_depth) {
                    in_target = None;
                }
                writer.write_event(event).map_err(PptError::from)?;
            }
            _ => {
                if skip_para.is_none() {
                    writer.write_event(event).map_err(PptError::from)?;
                }
            }
        }
    }
    if !found_shape {
        return Err(ActionError::ShapeIndex(index));
    }
    if !found_body {
        return Err(ActionError::NotATextShape(index));
    }
    Ok(writer.into_inner())
}

/// Highest `cNvPr` id on the slide; new shapes take the next one.
fn max_shape_id(xml: &[u8]) -> Result<u32, PptError> {
    let mut reader = Reader::from_reader(xml);
    let mut max = 1u32;
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cNvPr" => {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"id" {
                        if let Ok(id) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                            max = max.max(id);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(max)
}
