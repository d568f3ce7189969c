//! Minimal in-memory pptx fixtures for integration tests.
#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Stock 16:9 slide dimensions.
const SLIDE_WIDTH_EMU: i64 = 12_192_000;
const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

pub struct TestShape {
    pub name: &'static str,
    /// (left, top, width, height) in millimetres; `None` for a shape
    /// with no transform of its own.
    pub geometry: Option<(f64, f64, f64, f64)>,
    pub text: Option<&'static str>,
}

pub fn shape(
    name: &'static str,
    geometry: Option<(f64, f64, f64, f64)>,
    text: Option<&'static str>,
) -> TestShape {
    TestShape {
        name,
        geometry,
        text,
    }
}

fn mm_to_emu(mm: f64) -> i64 {
    (mm * 36_000.0).round() as i64
}

fn shape_xml(id: usize, shape: &TestShape) -> String {
    let xfrm = match shape.geometry {
        Some((left, top, width, height)) => format!(
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            mm_to_emu(left),
            mm_to_emu(top),
            mm_to_emu(width),
            mm_to_emu(height)
        ),
        None => String::new(),
    };
    let tx_body = match shape.text {
        Some(text) => format!(
            r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p></p:txBody>"#,
            text
        ),
        None => r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody>"#.to_string(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>{tx_body}</p:sp>"#,
        id = id,
        name = shape.name,
        xfrm = xfrm,
        tx_body = tx_body,
    )
}

fn slide_xml(shapes: &[TestShape]) -> String {
    let body: String = shapes
        .iter()
        .enumerate()
        .map(|(i, s)| shape_xml(i + 2, s))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{body}</p:spTree></p:cSld></p:sld>"#,
        body = body
    )
}

/// Build a deck with one entry in `slides` per slide.
pub fn build_pptx(slides: &[Vec<TestShape>]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>{}</Types>"#,
        (1..=slides.len())
            .map(|i| format!(
                r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            ))
            .collect::<String>()
    );

    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#;

    let sld_id_lst: String = (0..slides.len())
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 1))
        .collect();
    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst>{sld_id_lst}</p:sldIdLst><p:sldSz cx="{cx}" cy="{cy}"/></p:presentation>"#,
        sld_id_lst = sld_id_lst,
        cx = SLIDE_WIDTH_EMU,
        cy = SLIDE_HEIGHT_EMU,
    );

    let presentation_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        (1..=slides.len())
            .map(|i| format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{i}.xml"/>"#
            ))
            .collect::<String>()
    );

    let mut write = |name: &str, data: &str| {
        zip.start_file(name, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    };
    write("[Content_Types].xml", &content_types);
    write("_rels/.rels", root_rels);
    write("ppt/presentation.xml", &presentation);
    write("ppt/_rels/presentation.xml.rels", &presentation_rels);
    for (i, shapes) in slides.iter().enumerate() {
        write(&format!("ppt/slides/slide{}.xml", i + 1), &slide_xml(shapes));
    }
    zip.finish().unwrap().into_inner()
}

/// One-slide deck, the common case.
pub fn build_single_slide(shapes: Vec<TestShape>) -> Vec<u8> {
    build_pptx(&[shapes])
}
