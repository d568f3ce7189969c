//! Natural-language slide editing service.
//!
//! Instructions about one slide of a `.pptx` deck become concrete edits
//! through a plan-then-apply pipeline:
//! - `ppt`    — pptx container, slide context extraction, action execution
//! - `llm`    — prompt catalog/builder, actions schema, chat client
//! - `routes` — the `/upload` and `/process` handlers
//! - `config` — environment-backed settings
//! - `error`  — request error taxonomy and HTTP mapping
//! - `icons`  — bundled icon assets the model can place

pub mod config;
pub mod error;
pub mod icons;
pub mod llm;
pub mod ppt;
pub mod routes;
