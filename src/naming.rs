//! Storage key conventions for source images and their variants.
//!
//! Keys are `/`-separated relative paths inside the storage namespace. A
//! variant lives next to its source and carries the directive name as a
//! suffix on the file stem:
//!
//! ```text
//! images/001-dawn.jpg            source
//! images/001-dawn_default.jpg    variant "default"
//! images/001-dawn_640.jpg        variant "640"
//! images/001-dawn_640x480.jpg    variant "640x480"
//! ```
//!
//! The extension is carried over exactly as it appears on the source key,
//! both when variants are written and when they are deleted, so the two paths
//! always agree.

/// A storage key broken into its directory, stem, and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParts<'a> {
    /// Directory prefix without a trailing slash. Empty for top-level keys.
    pub dir: &'a str,
    /// File name without extension.
    pub stem: &'a str,
    /// Extension including the leading dot, or empty.
    pub extension: &'a str,
}

/// Split a key into directory, stem and extension.
///
/// Handles these patterns:
/// - `"images/dawn.jpg"` → dir="images", stem="dawn", extension=".jpg"
/// - `"dawn.tar.gz"` → dir="", stem="dawn.tar", extension=".gz"
/// - `"images/.hidden"` → dir="images", stem=".hidden", extension=""
/// - `"images/README"` → dir="images", stem="README", extension=""
pub fn split_key(key: &str) -> KeyParts<'_> {
    let (dir, file) = match key.rfind('/') {
        Some(pos) => (&key[..pos], &key[pos + 1..]),
        None => ("", key),
    };

    // Leading dots belong to the stem (dotfiles have no extension)
    let leading = file.len() - file.trim_start_matches('.').len();
    let (stem, extension) = match file[leading..].rfind('.') {
        Some(pos) => file.split_at(leading + pos),
        None => (file, ""),
    };

    KeyParts {
        dir,
        stem,
        extension,
    }
}

/// Compute the key of a variant.
///
/// `"{dir}/{stem}_{directive_name}{extension}"`, where `dir` and `stem` come
/// from `source_key`. Deterministic: the same inputs always produce the same
/// key, so regenerating a variant overwrites it.
pub fn variant_key(source_key: &str, directive_name: &str, extension: &str) -> String {
    let parts = split_key(source_key);
    let file = format!("{}_{}{}", parts.stem, directive_name, extension);
    if parts.dir.is_empty() {
        file
    } else {
        format!("{}/{}", parts.dir, file)
    }
}

/// Variant key using the source key's own extension.
pub fn source_variant_key(source_key: &str, directive_name: &str) -> String {
    variant_key(source_key, directive_name, split_key(source_key).extension)
}

/// The source key whose `directive_name` variant would be `key`.
///
/// `variant_source_key("images/dawn_640.jpg", "640")` → `Some("images/dawn.jpg")`.
/// `None` when the stem does not carry that suffix.
pub fn variant_source_key(key: &str, directive_name: &str) -> Option<String> {
    let parts = split_key(key);
    let stem = parts
        .stem
        .strip_suffix(directive_name)?
        .strip_suffix('_')
        .filter(|stem| !stem.is_empty())?;
    let file = format!("{}{}", stem, parts.extension);
    if parts.dir.is_empty() {
        Some(file)
    } else {
        Some(format!("{}/{}", parts.dir, file))
    }
}

/// Alternative key for an upload whose first choice is taken.
///
/// `suffixed_key("images/dawn.jpg", 2)` → `"images/dawn_2.jpg"`.
pub fn suffixed_key(key: &str, n: u32) -> String {
    let parts = split_key(key);
    let file = format!("{}_{}{}", parts.stem, n, parts.extension);
    if parts.dir.is_empty() {
        file
    } else {
        format!("{}/{}", parts.dir, file)
    }
}

/// Place an uploaded file name under `upload_to`.
///
/// Only the final path component of `filename` is kept. Whitespace becomes
/// `_` and anything outside `[A-Za-z0-9._-]` is dropped, so the resulting key
/// never escapes `upload_to`. Returns `None` when nothing usable is left.
pub fn generate_filename(upload_to: &str, filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            _ => None,
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        return None;
    }

    let dir = upload_to.trim_matches('/');
    if dir.is_empty() {
        Some(cleaned)
    } else {
        Some(format!("{dir}/{cleaned}"))
    }
}
