//! HTTP surface: `/`, `/upload`, and `/process`.
//!
//! `/process` is the whole pipeline in one handler: load the working
//! deck, snapshot the slide, render the prompts, call the model, apply
//! the proposed actions, then save the single-slide result and hand it
//! back base64-encoded alongside the echoed request.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::config::Settings;
use crate::error::ApiError;
use crate::llm::{build_prompts, ChatService, PromptInputs, PromptKey};
use crate::ppt::{extract_slide_context, ActionHandler, PptError, PptPackage};

pub struct AppState {
    pub settings: Settings,
    pub chat: ChatService,
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Hello World" }))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

/// Multipart upload of the working deck, gated by a SHA-256 checksum.
pub async fn upload_presentation(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut content: Option<Vec<u8>> = None;
    let mut checksum: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("presentation") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("unreadable file field: {e}")))?;
                content = Some(bytes.to_vec());
            }
            Some("checksum") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("unreadable checksum field: {e}")))?;
                checksum = Some(text);
            }
            _ => {}
        }
    }

    let content =
        content.ok_or_else(|| ApiError::BadRequest("missing field \"presentation\"".into()))?;
    let checksum =
        checksum.ok_or_else(|| ApiError::BadRequest("missing field \"checksum\"".into()))?;

    store_presentation(&content, &checksum, &state.settings.current_ppt)?;

    Ok(Json(UploadResponse {
        message: "Presentation saved successfully".into(),
        filename: state.settings.current_ppt.display().to_string(),
    }))
}

/// Verify the checksum, then persist. Nothing is written on a mismatch.
pub fn store_presentation(content: &[u8], checksum: &str, path: &Path) -> Result<(), ApiError> {
    let computed = format!("{:x}", Sha256::digest(content));
    if !computed.eq_ignore_ascii_case(checksum.trim()) {
        return Err(ApiError::ChecksumMismatch);
    }
    std::fs::write(path, content).map_err(ApiError::Save)?;
    log::info!(
        "[UPLOAD] Stored {} ({} bytes)",
        path.display(),
        content.len()
    );
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SlideRef {
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ShapeRef {
    name: String,
}

/// The fields `/process` actually uses; the raw payload is still echoed
/// back untouched as `input_data`.
#[derive(Debug, Deserialize)]
struct ProcessRequest {
    #[serde(rename = "slidesInfo")]
    slides_info: Vec<SlideRef>,
    #[serde(rename = "shapesInfo", default)]
    shapes_info: Vec<ShapeRef>,
    #[serde(default)]
    attached_file: Option<String>,
    prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub file_path: String,
    pub base64_encoded_ppt: String,
    pub applied_actions: usize,
    pub skipped_actions: Vec<String>,
    pub input_data: serde_json::Value,
}

pub async fn process_user_prompt(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let start = std::time::Instant::now();
    let request: ProcessRequest = serde_json::from_value(payload.clone())
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;
    let slide_index = request
        .slides_info
        .first()
        .ok_or_else(|| ApiError::BadRequest("slidesInfo must name at least one slide".into()))?
        .index;

    let mut package = open_working_copy(&state.settings)?;
    let count = package.slide_count();
    if slide_index >= count {
        return Err(ApiError::SlideOutOfRange {
            index: slide_index,
            count,
        });
    }

    let shape_name = request.shapes_info.first().map(|s| s.name.as_str());
    let context = extract_slide_context(&package, slide_index, shape_name)?;
    if let Some(name) = shape_name {
        if context.selected_shape.is_none() {
            return Err(ApiError::ShapeNotFound(name.to_string()));
        }
    }

    let key = if shape_name.is_some() {
        PromptKey::ActionsUpdate
    } else {
        PromptKey::Actions
    };
    let inputs = PromptInputs {
        instruction: &request.prompt,
        selected_shape_name: shape_name,
    };
    let prompts = build_prompts(key, &inputs, &context)?;

    let actions = state
        .chat
        .propose_actions(&prompts.system, &prompts.user)
        .await?;

    let attached_image = match &request.attached_file {
        Some(encoded) => Some(decode_attachment(encoded)?),
        None => None,
    };
    let selected_index = context.selected_shape.as_ref().map(|s| s.actual);

    let report = ActionHandler::new(&mut package, slide_index, selected_index, attached_image)
        .execute_actions(&actions);

    // The response carries only the processed slide.
    package.retain_slide(slide_index)?;
    let bytes = package.save_bytes()?;

    std::fs::create_dir_all(&state.settings.output_dir).map_err(ApiError::Save)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let file_path = state
        .settings
        .output_dir
        .join(format!("current_ppt_{timestamp}.pptx"));
    std::fs::write(&file_path, &bytes).map_err(ApiError::Save)?;

    log::info!(
        "[PROCESS] Slide {}: {} applied / {} skipped, saved {} ({}ms)",
        slide_index,
        report.applied,
        report.skipped.len(),
        file_path.display(),
        start.elapsed().as_millis()
    );

    Ok(Json(ProcessResponse {
        file_path: file_path.display().to_string(),
        base64_encoded_ppt: BASE64.encode(&bytes),
        applied_actions: report.applied,
        skipped_actions: report.skipped,
        input_data: payload,
    }))
}

fn open_working_copy(settings: &Settings) -> Result<PptPackage, ApiError> {
    PptPackage::open(&settings.current_ppt).map_err(|e| match e {
        PptError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
            ApiError::NoPresentation(settings.current_ppt.display().to_string())
        }
        other => ApiError::Ppt(other),
    })
}

/// Frontends send either bare base64 or a `data:` URL; accept both.
fn decode_attachment(encoded: &str) -> Result<Vec<u8>, ApiError> {
    let raw = encoded
        .rsplit_once(',')
        .filter(|(head, _)| head.starts_with("data:"))
        .map(|(_, tail)| tail)
        .unwrap_or(encoded);
    BASE64
        .decode(raw.trim())
        .map_err(|e| ApiError::BadRequest(format!("attached_file is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_attachment_accepts_both_encodings() {
        let bytes = b"fake image bytes";
        let bare = BASE64.encode(bytes);
        assert_eq!(decode_attachment(&bare).unwrap(), bytes);
        let data_url = format!("data:image/png;base64,{bare}");
        assert_eq!(decode_attachment(&data_url).unwrap(), bytes);
        assert!(decode_attachment("not-base64!!!").is_err());
    }

    #[test]
    fn test_process_request_field_names() {
        let raw = json!({
            "slidesInfo": [{ "index": 2 }],
            "shapesInfo": [{ "name": "Title 1" }],
            "prompt": "make the title bold",
            "attached_file": null
        });
        let request: ProcessRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(request.slides_info[0].index, 2);
        assert_eq!(request.shapes_info[0].name, "Title 1");
        assert!(request.attached_file.is_none());
    }
}
