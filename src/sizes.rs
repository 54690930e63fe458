//! Size specification parsing.
//!
//! A field is configured with one or more size tuples. Each tuple becomes a
//! [`SizeDirective`]: a name (used as the variant filename suffix), a target
//! box, and a crop policy.
//!
//! ## Tuple shapes
//!
//! ```text
//! ["default", 640, 480, true]   named, crop to fill 640x480      → image_default.jpg
//! ["default", 640, 480]         named, crop defaults to true
//! [640, 480, false]             unnamed, fit within 640x480      → image_640x480.jpg
//! [640, 0]                      unnamed, 640px wide (no crop)    → image_640.jpg
//! [0, 480]                      unnamed, 480px high (no crop)    → image_480.jpg
//! ```
//!
//! A zero dimension means "unconstrained, derive from the other one", so crop
//! is always forced off when either dimension is zero.
//!
//! ## Input forms
//!
//! Configuration files deserialize into [`RawSize`], a loosely-typed value that
//! mirrors the tuple syntax. [`parse`] classifies each tuple strictly and
//! rejects anything ambiguous with a [`SizeSpecError`]. Callers building
//! directives in code can skip the loose form entirely and hand
//! [`SizeSpec`] values to [`DirectiveSet::from_specs`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeSpecError {
    #[error("size #{index}: empty size tuple")]
    EmptyTuple { index: usize },
    #[error("size #{index}: expected [name, width, height, crop?] or [width, height, crop?], got {found}")]
    UnrecognizedShape { index: usize, found: String },
    #[error("size #{index}: {shape} size takes {expected} values, got {found}")]
    Arity {
        index: usize,
        shape: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("size #{index}: {field} must be an integer between 0 and {max}, got {found}")]
    Dimension {
        index: usize,
        field: &'static str,
        max: u32,
        found: String,
    },
    #[error("size #{index}: crop flag must be a boolean, got {found}")]
    CropFlag { index: usize, found: String },
    #[error("size '{name}': width and height cannot both be zero")]
    ZeroDimensions { name: String },
    #[error("size name must not be empty")]
    EmptyName,
    #[error("size name {0:?} must not contain path separators or control characters")]
    InvalidName(String),
    #[error("duplicate size name '{0}'")]
    DuplicateName(String),
}

/// Loosely-typed size configuration, as found in `config.toml`.
///
/// Either a single tuple (`[640, 0]`) or a list of tuples
/// (`[["thumb", 100, 100], [640, 0]]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSize {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<RawSize>),
}

impl RawSize {
    fn describe(&self) -> String {
        match self {
            RawSize::Bool(b) => format!("boolean {b}"),
            RawSize::Int(i) => format!("integer {i}"),
            RawSize::Text(s) => format!("text {s:?}"),
            RawSize::List(items) => format!("list of {}", items.len()),
        }
    }
}

/// Largest accepted target dimension.
pub const MAX_DIMENSION: u32 = 65_535;

/// Explicitly tagged size specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeSpec {
    Named {
        name: String,
        width: u32,
        height: u32,
        crop: Option<bool>,
    },
    Unnamed {
        width: u32,
        height: u32,
        crop: Option<bool>,
    },
}

/// A canonical resize rule.
///
/// Invariants: `name` is non-empty and free of `/`, `\` and control
/// characters, width and height are not both zero, and `crop` is false
/// whenever either dimension is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeDirective {
    name: String,
    width: u32,
    height: u32,
    crop: bool,
}

impl SizeDirective {
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        crop: bool,
    ) -> Result<Self, SizeSpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SizeSpecError::EmptyName);
        }
        if name.chars().any(|c| matches!(c, '/' | '\\') || c.is_control()) {
            return Err(SizeSpecError::InvalidName(name));
        }
        if width == 0 && height == 0 {
            return Err(SizeSpecError::ZeroDimensions { name });
        }
        let crop = crop && width != 0 && height != 0;
        Ok(Self {
            name,
            width,
            height,
            crop,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target width; 0 means derive from height.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target height; 0 means derive from width.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn crop(&self) -> bool {
        self.crop
    }
}

impl fmt::Display for SizeDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = if self.width == 0 {
            "auto".to_string()
        } else {
            self.width.to_string()
        };
        let h = if self.height == 0 {
            "auto".to_string()
        } else {
            self.height.to_string()
        };
        let mode = if self.crop { "crop" } else { "fit" };
        write!(f, "{}: {}x{} ({})", self.name, w, h, mode)
    }
}

impl SizeSpec {
    /// Normalize into a directive, synthesizing a name for unnamed sizes.
    pub fn into_directive(self) -> Result<SizeDirective, SizeSpecError> {
        match self {
            SizeSpec::Named {
                name,
                width,
                height,
                crop,
            } => SizeDirective::new(name, width, height, crop.unwrap_or(true)),
            SizeSpec::Unnamed {
                width,
                height,
                crop,
            } => {
                let name = match (width, height) {
                    (0, 0) => {
                        return Err(SizeSpecError::ZeroDimensions {
                            name: "0x0".to_string(),
                        });
                    }
                    (0, h) => h.to_string(),
                    (w, 0) => w.to_string(),
                    (w, h) => format!("{w}x{h}"),
                };
                SizeDirective::new(name, width, height, crop.unwrap_or(true))
            }
        }
    }
}

/// Ordered, read-only set of directives with unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectiveSet {
    directives: Vec<SizeDirective>,
}

impl DirectiveSet {
    /// Build a set from tagged specs, preserving order.
    ///
    /// Returns `Ok(None)` when `specs` is empty.
    pub fn from_specs(
        specs: impl IntoIterator<Item = SizeSpec>,
    ) -> Result<Option<Self>, SizeSpecError> {
        let mut directives: Vec<SizeDirective> = Vec::new();
        for spec in specs {
            let directive = spec.into_directive()?;
            if directives.iter().any(|d| d.name == directive.name) {
                return Err(SizeSpecError::DuplicateName(directive.name));
            }
            directives.push(directive);
        }
        if directives.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self { directives }))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SizeDirective> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Always false for a constructed set; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SizeDirective> {
        self.directives.iter().find(|d| d.name == name)
    }
}

impl<'a> IntoIterator for &'a DirectiveSet {
    type Item = &'a SizeDirective;
    type IntoIter = std::slice::Iter<'a, SizeDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.iter()
    }
}

/// Parse raw size configuration into a directive set.
///
/// - `None`, an empty list, or a list that yields no directives → `Ok(None)`
/// - a list whose first element is not a list → treated as a single tuple
/// - otherwise each element is one tuple, classified by [`classify`]
pub fn parse(raw: Option<&RawSize>) -> Result<Option<DirectiveSet>, SizeSpecError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let tuples: Vec<&RawSize> = match raw {
        RawSize::List(items) if items.is_empty() => return Ok(None),
        RawSize::List(items) if matches!(items[0], RawSize::List(_)) => items.iter().collect(),
        single => vec![single],
    };

    let specs = tuples
        .into_iter()
        .enumerate()
        .map(|(i, tuple)| classify(i + 1, tuple))
        .collect::<Result<Vec<_>, _>>()?;

    DirectiveSet::from_specs(specs)
}

/// Classify one loosely-typed tuple as a named or unnamed size.
///
/// `index` is 1-based and only used for error messages.
pub fn classify(index: usize, tuple: &RawSize) -> Result<SizeSpec, SizeSpecError> {
    let items = match tuple {
        RawSize::List(items) => items.as_slice(),
        other => {
            return Err(SizeSpecError::UnrecognizedShape {
                index,
                found: other.describe(),
            });
        }
    };

    match items {
        [] => Err(SizeSpecError::EmptyTuple { index }),
        [RawSize::Text(name), rest @ ..] => {
            if !(2..=3).contains(&rest.len()) {
                return Err(SizeSpecError::Arity {
                    index,
                    shape: "named",
                    expected: "3 or 4",
                    found: items.len(),
                });
            }
            Ok(SizeSpec::Named {
                name: name.clone(),
                width: dimension(index, "width", &rest[0])?,
                height: dimension(index, "height", &rest[1])?,
                crop: rest.get(2).map(|c| crop_flag(index, c)).transpose()?,
            })
        }
        [RawSize::Int(_), RawSize::Int(_), rest @ ..] => {
            if rest.len() > 1 {
                return Err(SizeSpecError::Arity {
                    index,
                    shape: "unnamed",
                    expected: "2 or 3",
                    found: items.len(),
                });
            }
            Ok(SizeSpec::Unnamed {
                width: dimension(index, "width", &items[0])?,
                height: dimension(index, "height", &items[1])?,
                crop: rest.first().map(|c| crop_flag(index, c)).transpose()?,
            })
        }
        _ => Err(SizeSpecError::UnrecognizedShape {
            index,
            found: format!(
                "[{}]",
                items
                    .iter()
                    .map(RawSize::describe)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }),
    }
}

fn dimension(index: usize, field: &'static str, value: &RawSize) -> Result<u32, SizeSpecError> {
    match value {
        RawSize::Int(i) if (0..=i64::from(MAX_DIMENSION)).contains(i) => Ok(*i as u32),
        other => Err(SizeSpecError::Dimension {
            index,
            field,
            max: MAX_DIMENSION,
            found: other.describe(),
        }),
    }
}

fn crop_flag(index: usize, value: &RawSize) -> Result<bool, SizeSpecError> {
    match value {
        RawSize::Bool(b) => Ok(*b),
        other => Err(SizeSpecError::CropFlag {
            index,
            found: other.describe(),
        }),
    }
}
