//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what a directive needs) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ResizePlan`]: What a directive resolves to for a given source size.
//! - [`FitParams`]: Shrink to exact dimensions already computed to preserve aspect ratio.
//! - [`FillParams`]: Cover-resize then center-crop to exact dimensions.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Outcome of planning a directive against a source of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    /// Source already fits; emit the original bytes untouched.
    PassThrough,
    /// Crop-to-fill at exactly these dimensions.
    Fill(FillParams),
    /// Shrink to these dimensions without cropping.
    Fit(FitParams),
}

/// Parameters for a fit (no crop) resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitParams {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

/// Parameters for a crop-to-fill resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillParams {
    /// Final crop dimensions.
    pub crop_width: u32,
    pub crop_height: u32,
    pub quality: Quality,
}
