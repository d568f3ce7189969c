//! Prompt building: placeholder population and template rendering.
//!
//! Values come from three sources — the raw request, the static
//! catalog, and the extracted slide context. Only placeholders the
//! catalog entry lists are populated; a `{token}` the template carries
//! without a value fails the render rather than producing a malformed
//! prompt.

use std::collections::HashMap;

use serde_json::json;

use super::prompts::{catalog, possible_actions_json, PromptKey};
use crate::icons;
use crate::ppt::SlideContext;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("no value available for prompt placeholder {{{0}}}")]
    Unfilled(String),
    #[error("failed to serialize {0} for the prompt: {1}")]
    Serialize(&'static str, serde_json::Error),
}

/// Request-side inputs to prompt building.
pub struct PromptInputs<'a> {
    pub instruction: &'a str,
    pub selected_shape_name: Option<&'a str>,
}

#[derive(Debug)]
pub struct RenderedPrompts {
    pub system: String,
    pub user: String,
}

/// Populate the placeholders the catalog entry requires and render the
/// system/user pair.
pub fn build_prompts(
    key: PromptKey,
    inputs: &PromptInputs<'_>,
    context: &SlideContext,
) -> Result<RenderedPrompts, PromptError> {
    let entry = catalog(key);
    let mut values: HashMap<&str, String> = HashMap::new();

    for &name in entry.placeholders {
        match name {
            "user_instruction" => {
                values.insert(name, inputs.instruction.to_string());
            }
            "selected_shape_name" => {
                if let Some(shape_name) = inputs.selected_shape_name {
                    values.insert(name, shape_name.to_string());
                }
            }
            "icon_names" => {
                values.insert(name, icons::catalog_json().to_string());
            }
            "possible_actions" => {
                values.insert(name, possible_actions_json().to_string());
            }
            "context_data" => {
                let data = serde_json::to_string(context)
                    .map_err(|e| PromptError::Serialize("context_data", e))?;
                values.insert(name, data);
            }
            "covered_areas" => {
                let data = serde_json::to_string(&context.covered_areas)
                    .map_err(|e| PromptError::Serialize("covered_areas", e))?;
                values.insert(name, data);
            }
            "slide_width" => {
                values.insert(name, context.presentation_info.slide_width.to_string());
            }
            "slide_height" => {
                values.insert(name, context.presentation_info.slide_height.to_string());
            }
            "shape_data" => {
                if let Some(selected) = &context.selected_shape {
                    let data = json!({
                        "shape_name": selected.info.name,
                        "shape_type": selected.info.shape_type,
                        "shape_left": selected.info.left,
                        "shape_top": selected.info.top,
                        "shape_width": selected.info.width,
                        "shape_height": selected.info.height,
                    });
                    values.insert(name, data.to_string());
                }
            }
            // An unknown name in the catalog is caught by render():
            // the template token it corresponds to stays unfilled.
            _ => {}
        }
    }

    Ok(RenderedPrompts {
        system: render(entry.system, &values)?,
        user: render(entry.user, &values)?,
    })
}

/// Substitute `{token}` occurrences; fail on any token without a value.
/// Tokens are checked against the template before substitution so JSON
/// braces in substituted values are never misread as placeholders.
fn render(template: &str, values: &HashMap<&str, String>) -> Result<String, PromptError> {
    let mut out = template.to_string();
    for token in template_tokens(template) {
        let value = values
            .get(token.as_str())
            .ok_or_else(|| PromptError::Unfilled(token.clone()))?;
        out = out.replace(&format!("{{{}}}", token), value);
    }
    Ok(out)
}

/// All `{snake_case}` tokens in a template, in order of appearance.
pub(crate) fn template_tokens(template: &str) -> Vec<String> {
    let bytes = template.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_lowercase() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start && end < bytes.len() && bytes[end] == b'}' {
                tokens.push(template[start..end].to_string());
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppt::context::{PresentationInfo, SelectedShape, ShapeInfo};

    fn test_context(selected: bool) -> SlideContext {
        let info = ShapeInfo {
            name: Some("Title 1".into()),
            shape_type: "shape",
            left: Some(10.0),
            top: Some(5.0),
            width: Some(200.0),
            height: Some(30.0),
            text: Some("Old title".into()),
        };
        SlideContext {
            presentation_info: PresentationInfo {
                file_name: "current_ppt.pptx".into(),
                file_size: 1024,
                slide_count: 1,
                slide_width: 338.66,
                slide_height: 190.5,
            },
            shapes: vec![info.clone()],
            selected_shape: selected.then_some(SelectedShape {
                actual: 0,
                relative: 0,
                info,
            }),
            covered_areas: vec![(5.0, 10.0, 200.0, 30.0)],
        }
    }

    #[test]
    fn test_template_tokens() {
        assert_eq!(
            template_tokens("a {one} b {two_three} {not-a-token} {UPPER}"),
            vec!["one".to_string(), "two_three".to_string()]
        );
    }

    #[test]
    fn test_build_actions_prompts() {
        let inputs = PromptInputs {
            instruction: "add a title saying Q3 Results",
            selected_shape_name: None,
        };
        let rendered = build_prompts(PromptKey::Actions, &inputs, &test_context(false)).unwrap();
        assert!(rendered.user.contains("add a title saying Q3 Results"));
        assert!(rendered.user.contains("338.66"));
        assert!(rendered.user.contains("\"create_textbox\""));
        assert!(rendered.user.contains("bar_chart.png"));
        assert!(!rendered.user.contains('{') || !rendered.user.contains("{user_instruction}"));
        assert!(rendered.system.contains("FOUR data points"));
    }

    #[test]
    fn test_build_update_prompts_include_shape_data() {
        let inputs = PromptInputs {
            instruction: "make the title bold",
            selected_shape_name: Some("Title 1"),
        };
        let rendered =
            build_prompts(PromptKey::ActionsUpdate, &inputs, &test_context(true)).unwrap();
        assert!(rendered.user.contains("SHAPE_DATA"));
        assert!(rendered.user.contains("\"shape_name\":\"Title 1\""));
        assert!(rendered.system.contains("FIVE data points"));
    }

    /// The update template needs shape_data; without a selection the
    /// render must fail naming the placeholder instead of emitting a
    /// malformed prompt.
    #[test]
    fn test_missing_placeholder_fails_fast() {
        let inputs = PromptInputs {
            instruction: "make the title bold",
            selected_shape_name: Some("Title 1"),
        };
        let err = build_prompts(PromptKey::ActionsUpdate, &inputs, &test_context(false))
            .expect_err("render should fail");
        match err {
            PromptError::Unfilled(name) => assert_eq!(name, "shape_data"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
