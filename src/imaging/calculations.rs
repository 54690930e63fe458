//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! A target dimension of `0` means "unconstrained".

/// Whether a source needs resizing to honor the target box.
///
/// Sources that already fit (on both axes, treating a zero target as
/// unbounded) are left untouched; variants only ever shrink.
///
/// # Examples
/// ```
/// # use image_variants::imaging::needs_resize;
/// assert!(!needs_resize((600, 400), (640, 480)));
/// assert!(needs_resize((800, 400), (640, 480)));
/// assert!(!needs_resize((600, 4000), (640, 0)));
/// ```
pub fn needs_resize(source: (u32, u32), target: (u32, u32)) -> bool {
    let exceeds = |src: u32, tgt: u32| tgt != 0 && src > tgt;
    exceeds(source.0, target.0) || exceeds(source.1, target.1)
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height), both non-zero
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(tgt_h))
    }
}

/// Fill in an unconstrained (zero) target dimension from the source aspect ratio.
///
/// `missing = round(known_source_dim / (other_source_dim / other_target))`.
/// Targets with both dimensions set are returned unchanged.
///
/// # Examples
/// ```
/// # use image_variants::imaging::derive_missing_dimension;
/// // 800x600 at 640 wide → 640x480
/// assert_eq!(derive_missing_dimension((800, 600), (640, 0)), (640, 480));
/// // 800x600 at 300 high → 400x300
/// assert_eq!(derive_missing_dimension((800, 600), (0, 300)), (400, 300));
/// ```
pub fn derive_missing_dimension(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0 as f64, source.1 as f64);
    match target {
        (0, tgt_h) if tgt_h != 0 => {
            let w = (src_w / (src_h / tgt_h as f64)).round() as u32;
            (w.max(1), tgt_h)
        }
        (tgt_w, 0) if tgt_w != 0 => {
            let h = (src_h / (src_w / tgt_w as f64)).round() as u32;
            (tgt_w, h.max(1))
        }
        other => other,
    }
}

/// Calculate the largest size that fits inside `bounds` preserving aspect ratio.
///
/// Never enlarges: a source already inside the bounds keeps its size. Neither
/// output dimension exceeds its bound, and neither drops below 1.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (width, height), both non-zero
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = f64::min(max_w as f64 / src_w as f64, max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}
