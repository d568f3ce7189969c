//! Structured-output schema for model-proposed slide actions.
//!
//! The model is constrained by a strict JSON schema: every property is
//! required and nullable, objects carry `additionalProperties: false`,
//! and the action vocabulary is a closed enum. Anything outside the
//! schema fails deserialization instead of reaching the executor.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Closed set of slide edits the model may propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateTextbox,
    UpdateTextbox,
    CreateImage,
    UpdateImage,
    CreateIcon,
    UpdateIcon,
    DeleteShape,
}

/// Bundled icon assets, named on the wire exactly as the prompt
/// advertises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconKind {
    #[serde(rename = "bar_chart.png")]
    BarChart,
    #[serde(rename = "environment.png")]
    Environment,
    #[serde(rename = "gear.png")]
    Gear,
    #[serde(rename = "globe.png")]
    Globe,
    #[serde(rename = "robot.png")]
    Robot,
    #[serde(rename = "target.png")]
    Target,
}

/// Character formatting for one run. `size` is in points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontAttributes {
    pub name: Option<String>,
    pub size: Option<u32>,
    pub color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    #[serde(default)]
    pub font: FontAttributes,
    pub bullet: Option<bool>,
    pub level: Option<u32>,
}

/// One proposed edit. Geometry is in millimetres; `None` means the
/// field is absent, which for updates means "leave it unchanged".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeAction {
    pub action_type: ActionKind,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub icon_name: Option<IconKind>,
    pub word_wrap: Option<bool>,
    pub paragraphs: Option<Vec<Paragraph>>,
    pub shape_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionsList {
    pub actions: Vec<ShapeAction>,
}

/// The `response_format` payload sent with every chat completion.
/// Strict mode requires every property listed under `required`, so
/// optional fields are expressed as nullable types instead.
pub fn response_format() -> Value {
    let font_schema = json!({
        "type": "object",
        "properties": {
            "name": { "type": ["string", "null"] },
            "size": { "type": ["integer", "null"] },
            "color": { "type": ["string", "null"] },
            "bold": { "type": ["boolean", "null"] },
            "italic": { "type": ["boolean", "null"] },
            "underline": { "type": ["boolean", "null"] },
        },
        "required": ["name", "size", "color", "bold", "italic", "underline"],
        "additionalProperties": false,
    });

    let paragraph_schema = json!({
        "type": "object",
        "properties": {
            "text": { "type": "string" },
            "font": font_schema,
            "bullet": { "type": ["boolean", "null"] },
            "level": { "type": ["integer", "null"] },
        },
        "required": ["text", "font", "bullet", "level"],
        "additionalProperties": false,
    });

    let action_schema = json!({
        "type": "object",
        "properties": {
            "action_type": {
                "type": "string",
                "enum": [
                    "create_textbox",
                    "update_textbox",
                    "create_image",
                    "update_image",
                    "create_icon",
                    "update_icon",
                    "delete_shape",
                ],
            },
            "left": { "type": ["number", "null"] },
            "top": { "type": ["number", "null"] },
            "width": { "type": ["number", "null"] },
            "height": { "type": ["number", "null"] },
            "icon_name": {
                "type": ["string", "null"],
                "enum": [
                    "bar_chart.png",
                    "environment.png",
                    "gear.png",
                    "globe.png",
                    "robot.png",
                    "target.png",
                    null,
                ],
            },
            "word_wrap": { "type": ["boolean", "null"] },
            "paragraphs": {
                "type": ["array", "null"],
                "items": paragraph_schema,
            },
            "shape_name": { "type": ["string", "null"] },
        },
        "required": [
            "action_type",
            "left",
            "top",
            "width",
            "height",
            "icon_name",
            "word_wrap",
            "paragraphs",
            "shape_name",
        ],
        "additionalProperties": false,
    });

    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "actions_list",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "actions": { "type": "array", "items": action_schema },
                },
                "required": ["actions"],
                "additionalProperties": false,
            },
        },
    })
}
