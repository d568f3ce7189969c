mod common;

use std::io::Cursor;

use common::{build_pptx, build_single_slide, shape};
use slidepilot::llm::schema::{
    ActionKind, ActionsList, FontAttributes, IconKind, Paragraph, ShapeAction,
};
use slidepilot::ppt::{extract_slide_context, ActionHandler, PptPackage};

fn action(kind: ActionKind) -> ShapeAction {
    ShapeAction {
        action_type: kind,
        left: None,
        top: None,
        width: None,
        height: None,
        icon_name: None,
        word_wrap: None,
        paragraphs: None,
        shape_name: None,
    }
}

fn paragraph(text: &str) -> Paragraph {
    Paragraph {
        text: text.into(),
        font: FontAttributes::default(),
        bullet: None,
        level: None,
    }
}

fn single(action: ShapeAction) -> ActionsList {
    ActionsList {
        actions: vec![action],
    }
}

fn zip_part_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[test]
fn create_textbox_adds_a_shape_with_text() {
    let bytes = build_single_slide(vec![shape(
        "Title 1",
        Some((10.0, 5.0, 200.0, 30.0)),
        Some("Quarterly Review"),
    )]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut create = action(ActionKind::CreateTextbox);
    create.left = Some(20.0);
    create.top = Some(120.0);
    create.width = Some(180.0);
    create.height = Some(25.0);
    create.paragraphs = Some(vec![paragraph("Q3 Results")]);

    let report =
        ActionHandler::new(&mut package, 0, None, None).execute_actions(&single(create));
    assert_eq!(report.applied, 1);
    assert!(report.skipped.is_empty());

    let context = extract_slide_context(&package, 0, None).unwrap();
    assert_eq!(context.shapes.len(), 2);
    let added = &context.shapes[1];
    assert_eq!(added.text.as_deref(), Some("Q3 Results"));
    assert!((added.left.unwrap() - 20.0).abs() < 0.01);
    assert!((added.height.unwrap() - 25.0).abs() < 0.01);
}

#[test]
fn create_textbox_without_geometry_is_skipped() {
    let bytes = build_single_slide(vec![shape("Title 1", Some((10.0, 5.0, 200.0, 30.0)), None)]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut create = action(ActionKind::CreateTextbox);
    create.left = Some(20.0); // rest missing

    let report =
        ActionHandler::new(&mut package, 0, None, None).execute_actions(&single(create));
    assert_eq!(report.applied, 0);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].contains("left, top, width and height"));

    let context = extract_slide_context(&package, 0, None).unwrap();
    assert_eq!(context.shapes.len(), 1);
}

#[test]
fn update_textbox_replaces_text_and_keeps_shape_count() {
    let bytes = build_single_slide(vec![
        shape("Title 1", Some((10.0, 5.0, 200.0, 30.0)), Some("Old title")),
        shape("Body 2", Some((10.0, 45.0, 200.0, 100.0)), Some("Body text")),
    ]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut update = action(ActionKind::UpdateTextbox);
    update.paragraphs = Some(vec![paragraph("New title"), paragraph("Subtitle")]);

    let report =
        ActionHandler::new(&mut package, 0, Some(0), None).execute_actions(&single(update));
    assert_eq!(report.applied, 1);

    let context = extract_slide_context(&package, 0, None).unwrap();
    assert_eq!(context.shapes.len(), 2);
    assert_eq!(context.shapes[0].text.as_deref(), Some("New title\nSubtitle"));
    assert_eq!(context.shapes[1].text.as_deref(), Some("Body text"));
}

#[test]
fn update_textbox_without_selection_is_skipped() {
    let bytes = build_single_slide(vec![shape(
        "Title 1",
        Some((10.0, 5.0, 200.0, 30.0)),
        Some("Old title"),
    )]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut update = action(ActionKind::UpdateTextbox);
    update.paragraphs = Some(vec![paragraph("New title")]);

    let report =
        ActionHandler::new(&mut package, 0, None, None).execute_actions(&single(update));
    assert_eq!(report.applied, 0);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].contains("selected shape"));
}

#[test]
fn delete_shape_removes_the_selected_shape() {
    let bytes = build_single_slide(vec![
        shape("Title 1", Some((10.0, 5.0, 200.0, 30.0)), Some("Title")),
        shape("Body 2", Some((10.0, 45.0, 200.0, 100.0)), Some("Body")),
    ]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let report = ActionHandler::new(&mut package, 0, Some(0), None)
        .execute_actions(&single(action(ActionKind::DeleteShape)));
    assert_eq!(report.applied, 1);

    let context = extract_slide_context(&package, 0, None).unwrap();
    assert_eq!(context.shapes.len(), 1);
    assert_eq!(context.shapes[0].name.as_deref(), Some("Body 2"));
}

#[test]
fn create_icon_embeds_a_media_part() {
    let bytes = build_single_slide(vec![shape("Title 1", Some((10.0, 5.0, 200.0, 30.0)), None)]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut create = action(ActionKind::CreateIcon);
    create.left = Some(250.0);
    create.top = Some(10.0);
    create.width = Some(20.0);
    create.height = Some(20.0);
    create.icon_name = Some(IconKind::Gear);

    let report =
        ActionHandler::new(&mut package, 0, None, None).execute_actions(&single(create));
    assert_eq!(report.applied, 1);

    let context = extract_slide_context(&package, 0, None).unwrap();
    assert_eq!(context.shapes.len(), 2);
    assert_eq!(context.shapes[1].shape_type, "picture");

    let saved = package.save_bytes().unwrap();
    let names = zip_part_names(&saved);
    assert!(names.iter().any(|n| n.starts_with("ppt/media/image")));
    assert!(names.contains(&"ppt/slides/_rels/slide1.xml.rels".to_string()));
}

#[test]
fn create_icon_without_name_is_skipped() {
    let bytes = build_single_slide(vec![shape("Title 1", Some((10.0, 5.0, 200.0, 30.0)), None)]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut create = action(ActionKind::CreateIcon);
    create.left = Some(250.0);
    create.top = Some(10.0);
    create.width = Some(20.0);
    create.height = Some(20.0);

    let report =
        ActionHandler::new(&mut package, 0, None, None).execute_actions(&single(create));
    assert_eq!(report.applied, 0);
    assert!(report.skipped[0].contains("icon name"));
}

#[test]
fn create_image_without_attachment_is_skipped() {
    let bytes = build_single_slide(vec![shape("Title 1", Some((10.0, 5.0, 200.0, 30.0)), None)]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut create = action(ActionKind::CreateImage);
    create.left = Some(30.0);
    create.top = Some(30.0);
    create.width = Some(100.0);
    create.height = Some(80.0);

    let report =
        ActionHandler::new(&mut package, 0, None, None).execute_actions(&single(create));
    assert_eq!(report.applied, 0);
    assert!(report.skipped[0].contains("attached image"));
}

#[test]
fn create_image_with_attachment_lands() {
    let bytes = build_single_slide(vec![shape("Title 1", Some((10.0, 5.0, 200.0, 30.0)), None)]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let mut create = action(ActionKind::CreateImage);
    create.left = Some(30.0);
    create.top = Some(30.0);
    create.width = Some(100.0);
    create.height = Some(80.0);

    let report = ActionHandler::new(&mut package, 0, None, Some(png))
        .execute_actions(&single(create));
    assert_eq!(report.applied, 1);

    let context = extract_slide_context(&package, 0, None).unwrap();
    assert_eq!(context.shapes[1].shape_type, "picture");
    assert!((context.shapes[1].width.unwrap() - 100.0).abs() < 0.01);
}

#[test]
fn update_image_patches_only_supplied_fields() {
    let bytes = build_single_slide(vec![shape(
        "Logo",
        Some((10.0, 5.0, 50.0, 40.0)),
        None,
    )]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut update = action(ActionKind::UpdateImage);
    update.left = Some(80.0);
    update.height = Some(60.0);
    // top and width stay untouched

    let report = ActionHandler::new(&mut package, 0, Some(0), None)
        .execute_actions(&single(update.clone()));
    assert_eq!(report.applied, 1);

    let context = extract_slide_context(&package, 0, None).unwrap();
    let info = &context.shapes[0];
    assert!((info.left.unwrap() - 80.0).abs() < 0.01);
    assert!((info.top.unwrap() - 5.0).abs() < 0.01);
    assert!((info.width.unwrap() - 50.0).abs() < 0.01);
    assert!((info.height.unwrap() - 60.0).abs() < 0.01);

    // Re-applying the same patch converges.
    ActionHandler::new(&mut package, 0, Some(0), None).execute_actions(&single(update));
    let context = extract_slide_context(&package, 0, None).unwrap();
    assert!((context.shapes[0].left.unwrap() - 80.0).abs() < 0.01);
}

/// A shape with inherited placeholder geometry has no `a:xfrm` of its
/// own; a geometry update must insert one and actually move it.
#[test]
fn update_image_inserts_transform_when_shape_has_none() {
    let bytes = build_single_slide(vec![shape("Placeholder 1", None, Some("inherited"))]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut update = action(ActionKind::UpdateImage);
    update.left = Some(80.0);
    update.top = Some(40.0);

    let report =
        ActionHandler::new(&mut package, 0, Some(0), None).execute_actions(&single(update));
    assert_eq!(report.applied, 1);

    let context = extract_slide_context(&package, 0, None).unwrap();
    let info = &context.shapes[0];
    assert!((info.left.unwrap() - 80.0).abs() < 0.01);
    assert!((info.top.unwrap() - 40.0).abs() < 0.01);
    // unsupplied fields of the inserted transform default to 0
    assert!(info.width.unwrap().abs() < 0.01);
    assert!(info.height.unwrap().abs() < 0.01);
}

#[test]
fn update_image_honours_zero_coordinates() {
    let bytes = build_single_slide(vec![shape(
        "Logo",
        Some((10.0, 5.0, 50.0, 40.0)),
        None,
    )]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut update = action(ActionKind::UpdateIcon);
    update.left = Some(0.0);
    update.top = Some(0.0);

    ActionHandler::new(&mut package, 0, Some(0), None).execute_actions(&single(update));
    let context = extract_slide_context(&package, 0, None).unwrap();
    assert!(context.shapes[0].left.unwrap().abs() < 0.01);
    assert!(context.shapes[0].top.unwrap().abs() < 0.01);
}

#[test]
fn save_and_reload_round_trip() {
    let bytes = build_single_slide(vec![shape(
        "Title 1",
        Some((10.0, 5.0, 200.0, 30.0)),
        Some("Quarterly Review"),
    )]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();

    let mut create = action(ActionKind::CreateTextbox);
    create.left = Some(20.0);
    create.top = Some(120.0);
    create.width = Some(180.0);
    create.height = Some(25.0);
    create.paragraphs = Some(vec![paragraph("Q3 Results")]);
    ActionHandler::new(&mut package, 0, None, None).execute_actions(&single(create));

    let saved = package.save_bytes().unwrap();
    let reloaded = PptPackage::from_bytes(&saved, "deck.pptx").unwrap();
    let context = extract_slide_context(&reloaded, 0, None).unwrap();
    assert_eq!(context.shapes.len(), 2);
    assert_eq!(context.shapes[1].text.as_deref(), Some("Q3 Results"));
}

#[test]
fn retain_slide_keeps_only_the_processed_slide() {
    let bytes = build_pptx(&[
        vec![shape("Title 1", Some((10.0, 5.0, 200.0, 30.0)), Some("One"))],
        vec![shape("Title 2", Some((10.0, 5.0, 200.0, 30.0)), Some("Two"))],
    ]);
    let mut package = PptPackage::from_bytes(&bytes, "deck.pptx").unwrap();
    assert_eq!(package.slide_count(), 2);

    package.retain_slide(1).unwrap();
    assert_eq!(package.slide_count(), 1);

    let saved = package.save_bytes().unwrap();
    let reloaded = PptPackage::from_bytes(&saved, "deck.pptx").unwrap();
    assert_eq!(reloaded.slide_count(), 1);
    let context = extract_slide_context(&reloaded, 0, None).unwrap();
    assert_eq!(context.shapes[0].text.as_deref(), Some("Two"));
}
