//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: identify, fit, and fill. All of them work on encoded bytes in
//! memory; persisting the result is the caller's job.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{FillParams, FitParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for (u32, u32) {
    fn from(d: Dimensions) -> Self {
        (d.width, d.height)
    }
}

/// Trait for image processing backends.
///
/// Outputs are encoded in the same format as the source.
pub trait ImageBackend: Sync {
    /// Read image dimensions without a full decode where possible.
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError>;

    /// Resize to exactly `params.width` x `params.height` (no crop).
    fn fit(&self, source: &[u8], params: &FitParams) -> Result<Vec<u8>, BackendError>;

    /// Resize to cover the crop box, then center-crop to it.
    fn fill(&self, source: &[u8], params: &FillParams) -> Result<Vec<u8>, BackendError>;
}
