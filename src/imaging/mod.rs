//! Resize engine: pure Rust, operating on encoded bytes in memory.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Fit** | `resize_exact` (Lanczos3) to precomputed aspect-preserving size |
//! | **Crop-to-fill** | cover-resize (Lanczos3) + centered crop |
//! | **Encode** | source format; optimized encoder first, default encoder as fallback |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`plan_resize`] and [`resize`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    calculate_fill_dimensions, calculate_fit_dimensions, derive_missing_dimension, needs_resize,
};
pub use operations::{get_dimensions, plan_resize, resize};
pub use params::{FillParams, FitParams, Quality, ResizePlan};
pub use rust_backend::RustBackend;
