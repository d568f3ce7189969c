//! Pptx document domain.
//!
//! A `.pptx` file is a zip container of XML parts. This module owns
//! everything that touches that container:
//! - `package`  — load/save, slide part resolution, media insertion
//! - `context`  — per-slide shape snapshot for prompt grounding
//! - `actions`  — applying model-proposed edits to the slide XML
//! - `units`    — EMU/millimetre/point conversions

pub mod actions;
pub mod context;
pub mod package;
pub mod units;

pub use actions::{ActionHandler, ExecutionReport};
pub use context::{extract_slide_context, SelectedShape, ShapeInfo, SlideContext};
pub use package::PptPackage;

/// Errors from pptx container and XML handling.
#[derive(Debug, thiserror::Error)]
pub enum PptError {
    #[error("failed to read presentation archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to parse document xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("presentation part missing: {0}")]
    MissingPart(String),

    #[error("presentation has no slide at index {0}")]
    SlideOutOfRange(usize),

    #[error("malformed presentation: {0}")]
    Malformed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
