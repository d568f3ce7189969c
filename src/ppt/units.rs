//! Physical unit conversions for DrawingML geometry.
//!
//! Pptx stores positions and extents in EMU (English Metric Units,
//! 914,400 per inch / 36,000 per millimetre). The model and the HTTP
//! surface speak millimetres; font sizes are points, stored in the
//! `sz` run attribute as hundredths of a point.

pub const EMU_PER_MM: f64 = 36_000.0;

/// Millimetres → EMU, rounded to the nearest unit.
pub fn mm_to_emu(mm: f64) -> i64 {
    (mm * EMU_PER_MM).round() as i64
}

/// EMU → millimetres.
pub fn emu_to_mm(emu: i64) -> f64 {
    emu as f64 / EMU_PER_MM
}

/// Font size in points → the DrawingML `sz` attribute value.
pub fn pt_to_sz(pt: u32) -> u32 {
    pt * 100
}
