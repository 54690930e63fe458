//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! directive, compute a [`ResizePlan`], and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{
    calculate_fit_dimensions, derive_missing_dimension, needs_resize,
};
use super::params::{FillParams, FitParams, Quality, ResizePlan};
use crate::sizes::SizeDirective;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, source: &[u8]) -> Result<(u32, u32)> {
    Ok(backend.identify(source)?.into())
}

/// Plan a directive against a source of known size without executing it.
///
/// 1. Source already inside the target box → [`ResizePlan::PassThrough`]
/// 2. Crop directive → [`ResizePlan::Fill`] at exactly the target size
/// 3. Otherwise → [`ResizePlan::Fit`], deriving an unconstrained dimension
///    from the source aspect ratio first
pub fn plan_resize(source: (u32, u32), directive: &SizeDirective, quality: Quality) -> ResizePlan {
    let target = (directive.width(), directive.height());

    if !needs_resize(source, target) {
        return ResizePlan::PassThrough;
    }

    if directive.crop() {
        return ResizePlan::Fill(FillParams {
            crop_width: target.0,
            crop_height: target.1,
            quality,
        });
    }

    let bounds = derive_missing_dimension(source, target);
    let (width, height) = calculate_fit_dimensions(source, bounds);
    ResizePlan::Fit(FitParams {
        width,
        height,
        quality,
    })
}

/// Produce the variant bytes for one directive.
///
/// Pure: no storage access. A source that already fits is returned
/// byte-for-byte.
pub fn resize(
    backend: &impl ImageBackend,
    source: &[u8],
    directive: &SizeDirective,
    quality: Quality,
) -> Result<Vec<u8>> {
    let dims = get_dimensions(backend, source)?;
    let plan = plan_resize(dims, directive, quality);
    debug!(directive = directive.name(), source = ?dims, ?plan, "planned resize");

    match plan {
        ResizePlan::PassThrough => Ok(source.to_vec()),
        ResizePlan::Fill(params) => backend.fill(source, &params),
        ResizePlan::Fit(params) => backend.fit(source, &params),
    }
}
