//! Form-layer validation for an image field.
//!
//! A submitted value is either nothing, a fresh upload, or the deletion
//! sentinel [`DELETE_MARKER`]. The sentinel is forwarded untouched as
//! [`Cleaned::Delete`] instead of being validated as image data; the
//! lifecycle layer turns it into a delete.

use crate::imaging::{BackendError, ImageBackend};
use thiserror::Error;

/// Literal value a form submits to request deletion of the stored image.
pub const DELETE_MARKER: &str = "__deleted__";

#[derive(Error, Debug)]
pub enum FormError {
    #[error("uploaded file has no name")]
    MissingFilename,
    #[error("uploaded file '{0}' is empty")]
    EmptyUpload(String),
    #[error("uploaded file '{filename}' is not a valid image: {source}")]
    InvalidImage {
        filename: String,
        #[source]
        source: BackendError,
    },
    #[error("expected an upload or '__deleted__', got {0:?}")]
    UnexpectedText(String),
}

/// Raw value submitted for the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing submitted; keep whatever is stored.
    Empty,
    /// A plain text value, e.g. the deletion sentinel.
    Text(String),
    Upload { filename: String, bytes: Vec<u8> },
}

/// Validated value, ready for [`VariantField::save_form_data`](crate::lifecycle::VariantField::save_form_data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleaned {
    Unchanged,
    Delete,
    Upload { filename: String, bytes: Vec<u8> },
}

/// Validate a submission.
///
/// Uploads must carry a file name and decodable image data; the deletion
/// sentinel passes through as [`Cleaned::Delete`]; any other text is rejected.
pub fn clean(backend: &impl ImageBackend, submission: Submission) -> Result<Cleaned, FormError> {
    match submission {
        Submission::Empty => Ok(Cleaned::Unchanged),
        Submission::Text(text) if text == DELETE_MARKER => Ok(Cleaned::Delete),
        Submission::Text(text) => Err(FormError::UnexpectedText(text)),
        Submission::Upload { filename, bytes } => {
            if filename.trim().is_empty() {
                return Err(FormError::MissingFilename);
            }
            if bytes.is_empty() {
                return Err(FormError::EmptyUpload(filename));
            }
            if let Err(source) = backend.identify(&bytes) {
                return Err(FormError::InvalidImage { filename, source });
            }
            Ok(Cleaned::Upload { filename, bytes })
        }
    }
}
