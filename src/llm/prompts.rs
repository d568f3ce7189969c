//! Prompt catalog — system/user templates per prompt key.
//!
//! These templates are the contract with the model: measurements in
//! millimetres, data points under fixed JSON headings, output
//! constrained by the actions schema. The placeholder lists name every
//! `{token}` the user template contains; the builder enforces the
//! correspondence at render time.

/// Which template pair a request uses: `Actions` when no shape is
/// selected, `ActionsUpdate` when one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKey {
    Actions,
    ActionsUpdate,
}

pub struct PromptEntry {
    pub system: &'static str,
    pub user: &'static str,
    pub placeholders: &'static [&'static str],
}

const ACTIONS_SYSTEM_PROMPT: &str = "\
You are an Expert PowerPoint Presentation Designer which enhances the design, content, \
formatting and alignment with perfection in a sophisticated and professional manner and \
returns the output in the specified output format.
Below you will be provided with FOUR data points in JSON format:
\t1) Slide context data under heading CONTEXT_DATA.
\t2) List of covered areas in tuple format [top_position, left_position, width, height] under heading COVERED_AREAS.
\t3) List of icon names under heading ICON_NAMES.
\t4) Dictionary of possible actions that can be performed to make changes in PowerPoint under heading POSSIBLE_ACTIONS.
All measurements are in millimeters. You need to use the provided data information to \
translate user instructions (provided under heading USER_INSTRUCTION) into the specified output format.
";

const ACTIONS_UPDATE_SYSTEM_PROMPT: &str = "\
You are an Expert PowerPoint Presentation Designer which enhances the design, content, \
formatting and alignment with perfection in a sophisticated and professional manner and \
returns the output in the specified output format.
Below you will be provided with FIVE data points in JSON format:
\t1) Slide context data under heading CONTEXT_DATA.
\t2) Selected shape data under heading SHAPE_DATA.
\t3) List of covered areas in tuple format [top_position, left_position, width, height] under heading COVERED_AREAS.
\t4) List of icon names under heading ICON_NAMES.
\t5) Dictionary of possible actions that can be performed to make changes in PowerPoint under heading POSSIBLE_ACTIONS.
All measurements are in millimeters. You need to use the provided data information to \
translate user instructions (provided under heading USER_INSTRUCTION) into the specified output format.
";

const ACTIONS_USER_PROMPT: &str = "\
Provide the list of actions that need to be performed to translate the user instruction \
into PowerPoint actions in the specified output format.
Make sure to keep all shapes within the slide boundary i.e. shape left + shape width < \
slide width: {slide_width} AND shape top + shape height < slide height: {slide_height}.

USER_INSTRUCTION
{user_instruction}

CONTEXT_DATA
{context_data}

COVERED_AREAS
{covered_areas}

ICON_NAMES
{icon_names}

POSSIBLE_ACTIONS
{possible_actions}";

const ACTIONS_UPDATE_USER_PROMPT: &str = "\
Provide the list of actions that need to be performed to translate the user instruction \
into PowerPoint actions in the specified output format.
Make sure to keep all shapes within the slide boundary i.e. shape left + shape width < \
slide width: {slide_width} AND shape top + shape height < slide height: {slide_height}.

USER_INSTRUCTION
{user_instruction}

CONTEXT_DATA
{context_data}

SHAPE_DATA
{shape_data}

COVERED_AREAS
{covered_areas}

ICON_NAMES
{icon_names}

POSSIBLE_ACTIONS
{possible_actions}";

pub fn catalog(key: PromptKey) -> PromptEntry {
    match key {
        PromptKey::Actions => PromptEntry {
            system: ACTIONS_SYSTEM_PROMPT,
            user: ACTIONS_USER_PROMPT,
            placeholders: &[
                "user_instruction",
                "context_data",
                "covered_areas",
                "slide_width",
                "slide_height",
                "icon_names",
                "possible_actions",
            ],
        },
        PromptKey::ActionsUpdate => PromptEntry {
            system: ACTIONS_UPDATE_SYSTEM_PROMPT,
            user: ACTIONS_UPDATE_USER_PROMPT,
            placeholders: &[
                "user_instruction",
                "context_data",
                "shape_data",
                "covered_areas",
                "slide_width",
                "slide_height",
                "icon_names",
                "possible_actions",
            ],
        },
    }
}

/// The action vocabulary rendered under POSSIBLE_ACTIONS.
pub fn possible_actions_json() -> serde_json::Value {
    serde_json::json!([
        { "name": "create_textbox", "description": "Create Textbox" },
        { "name": "create_image", "description": "Create Image" },
        { "name": "create_icon", "description": "Create Icon" },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every listed placeholder appears in the user template and every
    /// `{token}` in the templates is listed — the builder relies on this.
    #[test]
    fn test_catalog_placeholders_match_templates() {
        for key in [PromptKey::Actions, PromptKey::ActionsUpdate] {
            let entry = catalog(key);
            for name in entry.placeholders {
                assert!(
                    entry.user.contains(&format!("{{{}}}", name)),
                    "{:?}: template lacks {{{}}}",
                    key,
                    name
                );
            }
            for token in crate::llm::builder::template_tokens(entry.user) {
                assert!(
                    entry.placeholders.contains(&token.as_str()),
                    "{:?}: token {{{}}} not listed",
                    key,
                    token
                );
            }
            assert!(crate::llm::builder::template_tokens(entry.system).is_empty());
        }
    }
}
