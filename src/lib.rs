//! # Image Variants
//!
//! Derived image variants (thumbnails, crops, fixed-width renditions) for an
//! uploaded source image, kept in step with the source's lifecycle.
//!
//! # Flow
//!
//! ```text
//! config.toml sizes  →  sizes::parse  →  DirectiveSet      (once, at setup)
//!
//! save    source key  →  naming  →  imaging::resize  →  Storage::write   (per directive)
//! load    source key  →  naming  →  VariantHandle                        (no I/O)
//! delete  source key  →  naming  →  Storage::delete                      (missing is fine)
//! ```
//!
//! Only the source key is persisted by the host. Variant keys are always
//! recomputed from the source key and the directive names, so they never
//! drift out of sync with the configuration that produced them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sizes`] | Size tuple parsing into validated [`sizes::SizeDirective`]s |
//! | [`naming`] | Deterministic variant keys and upload file names |
//! | [`imaging`] | Pure-Rust resize engine: dimension math, crop-to-fill, fit |
//! | [`storage`] | Key-addressed storage trait and a filesystem implementation |
//! | [`lifecycle`] | Save/load/delete handling for a field's variants |
//! | [`forms`] | Validation of submitted values, including the delete marker |
//! | [`config`] | `config.toml` loading, validation, and merging over defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Events
//!
//! The host calls [`lifecycle::VariantField::on_save`], `on_load` and
//! `on_delete` itself (or through the [`lifecycle::InstanceObserver`] trait).
//! Nothing hooks into global signals.
//!
//! ## Strict Size Tuples
//!
//! Size tuples are classified by shape and rejected when ambiguous, at
//! configuration load rather than at first upload. A tuple like `[0, 0]` or
//! two sizes sharing a name is an error, not a silent overwrite.
//!
//! ## Failure Isolation
//!
//! A variant that fails to decode, encode or write is reported in the
//! [`lifecycle::SaveReport`] while the remaining variants still run.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling) with
//! no system libraries. Outputs keep the source's format.

pub mod config;
pub mod forms;
pub mod imaging;
pub mod lifecycle;
pub mod naming;
pub mod output;
pub mod sizes;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;
