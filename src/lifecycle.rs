//! Variant lifecycle: keeping derived images in step with their source.
//!
//! A [`VariantField`] owns the directive set for one image field and reacts
//! to three events the host's persistence layer reports:
//!
//! | Event | Method | Effect |
//! |---|---|---|
//! | record saved | [`VariantField::on_save`] | (re)generate every variant from the source |
//! | record loaded | [`VariantField::on_load`] | attach a [`VariantHandle`] per directive |
//! | form submitted `__deleted__` | [`VariantField::on_delete`] | remove source and every variant |
//!
//! Hosts that dispatch events to several fields can hold them as
//! [`InstanceObserver`] trait objects. Nothing registers itself globally; the
//! host calls in explicitly.
//!
//! ## Failure policy
//!
//! Variants are independent. On save, a directive whose resize or write
//! fails is recorded in [`SaveReport::failures`] and the remaining
//! directives still run. Failing to read the source at all aborts the save
//! with [`LifecycleError::Storage`]. On delete, missing files are ignored so
//! deleting twice is harmless.
//!
//! Concurrent saves of the same source key are not coordinated here; the
//! last writer's variants win.

use crate::forms::Cleaned;
use crate::imaging::{self, BackendError, ImageBackend, Quality, RustBackend};
use crate::naming::{generate_filename, source_variant_key, suffixed_key, variant_source_key};
use crate::sizes::{DirectiveSet, SizeDirective};
use crate::storage::{Storage, StorageError};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("upload name '{0}' has no usable characters")]
    InvalidFilename(String),
    #[error("no free storage key for upload '{0}'")]
    NoAvailableKey(String),
}

/// Highest `_N` suffix tried before an upload is refused.
const MAX_UPLOAD_SUFFIX: u32 = 9999;

/// Why a single variant could not be produced.
#[derive(Error, Debug)]
pub enum VariantError {
    #[error(transparent)]
    Resize(#[from] BackendError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Lightweight accessor for one stored variant.
///
/// Holds only the key; every query goes to storage, nothing is cached.
#[derive(Clone)]
pub struct VariantHandle {
    name: String,
    key: String,
    storage: Arc<dyn Storage>,
}

impl VariantHandle {
    /// Directive name this variant was produced by.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> Result<PathBuf, StorageError> {
        self.storage.path(&self.key)
    }

    pub fn url(&self) -> String {
        self.storage.url(&self.key)
    }

    pub fn size(&self) -> Result<u64, StorageError> {
        self.storage.size(&self.key)
    }

    pub fn exists(&self) -> bool {
        self.storage.exists(&self.key)
    }
}

impl fmt::Debug for VariantHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantHandle")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// In-memory value of an image field on a loaded record.
///
/// Only `key` is persisted by the host; variant handles are rebuilt by
/// [`VariantField::on_load`].
#[derive(Debug, Clone, Default)]
pub struct FieldFile {
    key: Option<String>,
    variants: Vec<VariantHandle>,
}

impl FieldFile {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            variants: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.key.is_some()
    }

    /// Look up a variant handle by directive name.
    pub fn variant(&self, name: &str) -> Option<&VariantHandle> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Variant handles in directive order.
    pub fn variants(&self) -> &[VariantHandle] {
        &self.variants
    }
}

/// A variant that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenVariant {
    pub name: String,
    pub key: String,
    pub bytes: usize,
}

/// A variant that could not be produced.
#[derive(Debug)]
pub struct VariantFailure {
    pub name: String,
    pub key: String,
    pub error: VariantError,
}

/// Outcome of [`VariantField::on_save`].
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Source the variants were generated from; `None` if the field was empty.
    pub source_key: Option<String>,
    pub written: Vec<WrittenVariant>,
    pub failures: Vec<VariantFailure>,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of [`VariantField::on_delete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub source_key: Option<String>,
    /// Keys that existed and were removed (source first).
    pub removed: Vec<String>,
    /// Keys that were already absent.
    pub missing: Vec<String>,
}

/// Result of applying a cleaned form value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Unchanged,
    /// The upload was stored under this key.
    Stored(String),
    Deleted(DeleteReport),
}

/// Observer interface for the host's persistence events.
pub trait InstanceObserver {
    fn on_instance_saved(&self, file: &FieldFile) -> Result<SaveReport, LifecycleError>;
    fn on_instance_loaded(&self, file: &mut FieldFile);
}

/// An image field with derived variants.
pub struct VariantField<B: ImageBackend = RustBackend> {
    name: String,
    upload_to: String,
    directives: Option<DirectiveSet>,
    storage: Arc<dyn Storage>,
    backend: B,
    quality: Quality,
}

impl<B: ImageBackend> VariantField<B> {
    pub fn new(
        name: impl Into<String>,
        directives: Option<DirectiveSet>,
        storage: Arc<dyn Storage>,
        backend: B,
    ) -> Self {
        Self {
            name: name.into(),
            upload_to: String::new(),
            directives,
            storage,
            backend,
            quality: Quality::default(),
        }
    }

    /// Directory (key prefix) uploads are stored under.
    pub fn with_upload_to(mut self, upload_to: impl Into<String>) -> Self {
        self.upload_to = upload_to.into();
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directives(&self) -> Option<&DirectiveSet> {
        self.directives.as_ref()
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Each directive paired with its variant key for `source_key`.
    pub fn variant_keys<'a>(
        &'a self,
        source_key: &'a str,
    ) -> impl Iterator<Item = (&'a SizeDirective, String)> + 'a {
        self.directives
            .iter()
            .flat_map(|set| set.iter())
            .map(move |d| (d, source_variant_key(source_key, d.name())))
    }

    /// Regenerate every variant of the field's current source.
    pub fn on_save(&self, file: &FieldFile) -> Result<SaveReport, LifecycleError> {
        let Some(source_key) = file.key() else {
            return Ok(SaveReport::default());
        };
        let mut report = SaveReport {
            source_key: Some(source_key.to_string()),
            ..SaveReport::default()
        };
        if self.directives.is_none() {
            return Ok(report);
        }

        let source = self.storage.open(source_key)?;

        for (directive, key) in self.variant_keys(source_key) {
            match self.generate(&source, directive, &key) {
                Ok(bytes) => {
                    debug!(field = %self.name, variant = %key, bytes, "wrote variant");
                    report.written.push(WrittenVariant {
                        name: directive.name().to_string(),
                        key,
                        bytes,
                    });
                }
                Err(error) => {
                    warn!(field = %self.name, variant = %key, %error, "variant failed");
                    report.failures.push(VariantFailure {
                        name: directive.name().to_string(),
                        key,
                        error,
                    });
                }
            }
        }

        info!(
            field = %self.name,
            source = %source_key,
            written = report.written.len(),
            failed = report.failures.len(),
            "generated variants"
        );
        Ok(report)
    }

    fn generate(
        &self,
        source: &[u8],
        directive: &SizeDirective,
        key: &str,
    ) -> Result<usize, VariantError> {
        let output = imaging::resize(&self.backend, source, directive, self.quality)?;
        self.storage.write(key, &output)?;
        Ok(output.len())
    }

    /// Attach a handle for every directive to a freshly loaded field value.
    ///
    /// No storage access happens here.
    pub fn on_load(&self, file: &mut FieldFile) {
        file.variants = match file.key.as_deref() {
            Some(source_key) => self
                .variant_keys(source_key)
                .map(|(directive, key)| VariantHandle {
                    name: directive.name().to_string(),
                    key,
                    storage: Arc::clone(&self.storage),
                })
                .collect(),
            None => Vec::new(),
        };
    }

    /// Remove the source and all of its variants, then clear the field.
    ///
    /// Missing files are not errors. Any other storage failure propagates
    /// and leaves `file` as it was, so the delete can be retried.
    pub fn on_delete(&self, file: &mut FieldFile) -> Result<DeleteReport, LifecycleError> {
        let Some(source_key) = file.key.clone() else {
            return Ok(DeleteReport::default());
        };

        let mut report = DeleteReport {
            source_key: Some(source_key.clone()),
            ..DeleteReport::default()
        };

        let keys = std::iter::once(source_key.clone())
            .chain(self.variant_keys(&source_key).map(|(_, key)| key));
        for key in keys {
            match self.storage.delete(&key) {
                Ok(()) => report.removed.push(key),
                Err(StorageError::NotFound(_)) => report.missing.push(key),
                Err(e) => return Err(e.into()),
            }
        }
        file.key = None;
        file.variants.clear();

        info!(
            field = %self.name,
            source = %source_key,
            removed = report.removed.len(),
            "deleted image and variants"
        );
        Ok(report)
    }

    /// First of `key`, `key_1`, `key_2`, ... that no other record can claim.
    fn available_key(&self, key: &str) -> Result<String, LifecycleError> {
        for n in 0..=MAX_UPLOAD_SUFFIX {
            let candidate = match n {
                0 => key.to_string(),
                n => suffixed_key(key, n),
            };
            if !self.is_taken(&candidate) {
                if n > 0 {
                    debug!(field = %self.name, requested = %key, %candidate, "upload key taken");
                }
                return Ok(candidate);
            }
        }
        Err(LifecycleError::NoAvailableKey(key.to_string()))
    }

    /// A key is taken if it is stored, if one of its variant keys is stored,
    /// or if it is the variant key of a stored source.
    fn is_taken(&self, candidate: &str) -> bool {
        if self.storage.exists(candidate) {
            return true;
        }
        if self
            .variant_keys(candidate)
            .any(|(_, key)| self.storage.exists(&key))
        {
            return true;
        }
        self.directives
            .iter()
            .flat_map(|set| set.iter())
            .filter_map(|d| variant_source_key(candidate, d.name()))
            .any(|source| self.storage.exists(&source))
    }

    /// Apply a cleaned form value to the field.
    ///
    /// Uploads are written under `upload_to` and become the field's key;
    /// variants are generated later by [`on_save`](Self::on_save), when the
    /// host saves the record. An upload never reuses a key belonging to
    /// another record's source or variants; the stem gets a `_N` suffix
    /// instead.
    pub fn save_form_data(
        &self,
        file: &mut FieldFile,
        cleaned: Cleaned,
    ) -> Result<FormOutcome, LifecycleError> {
        match cleaned {
            Cleaned::Unchanged => Ok(FormOutcome::Unchanged),
            Cleaned::Delete => self.on_delete(file).map(FormOutcome::Deleted),
            Cleaned::Upload { filename, bytes } => {
                let requested = generate_filename(&self.upload_to, &filename)
                    .ok_or(LifecycleError::InvalidFilename(filename))?;
                let key = self.available_key(&requested)?;
                self.storage.write(&key, &bytes)?;
                debug!(field = %self.name, %key, bytes = bytes.len(), "stored upload");
                file.key = Some(key.clone());
                file.variants.clear();
                Ok(FormOutcome::Stored(key))
            }
        }
    }
}

impl<B: ImageBackend> InstanceObserver for VariantField<B> {
    fn on_instance_saved(&self, file: &FieldFile) -> Result<SaveReport, LifecycleError> {
        self.on_save(file)
    }

    fn on_instance_loaded(&self, file: &mut FieldFile) {
        self.on_load(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{self, DELETE_MARKER, Submission};
    use crate::imaging::backend::tests::MockBackend;
    use crate::sizes::{RawSize, parse};
    use crate::storage::FileSystemStorage;
    use crate::test_helpers::{decode, jpeg_bytes, raw_sizes};
    use std::io;
    use tempfile::TempDir;

    fn standard_sizes() -> DirectiveSet {
        let raw: RawSize = raw_sizes(r#"[["default", 64, 48, true], [80, 0], [0, 30], [40, 40, false]]"#);
        parse(Some(&raw)).unwrap().unwrap()
    }

    fn setup<B: ImageBackend>(backend: B) -> (TempDir, Arc<FileSystemStorage>, VariantField<B>) {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(FileSystemStorage::new(tmp.path(), "/media/"));
        let field = VariantField::new("image", Some(standard_sizes()), storage.clone(), backend)
            .with_upload_to("images");
        (tmp, storage, field)
    }

    // =========================================================================
    // on_save
    // =========================================================================

    #[test]
    fn save_writes_every_variant() {
        let (_tmp, storage, field) = setup(RustBackend::new());
        storage.write("images/dawn.jpg", &jpeg_bytes(200, 100)).unwrap();

        let report = field.on_save(&FieldFile::new("images/dawn.jpg")).unwrap();
        assert!(report.is_complete());
        let keys: Vec<&str> = report.written.iter().map(|w| w.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "images/dawn_default.jpg",
                "images/dawn_80.jpg",
                "images/dawn_30.jpg",
                "images/dawn_40x40.jpg",
            ]
        );

        let dims = |key: &str| {
            let (img, _) = decode(&storage.open(key).unwrap());
            (img.width(), img.height())
        };
        assert_eq!(dims("images/dawn_default.jpg"), (64, 48));
        assert_eq!(dims("images/dawn_80.jpg"), (80, 40));
        assert_eq!(dims("images/dawn_30.jpg"), (60, 30));
        assert_eq!(dims("images/dawn_40x40.jpg"), (40, 20));
    }

    #[test]
    fn save_is_idempotent() {
        let (tmp, storage, field) = setup(RustBackend::new());
        storage.write("images/dawn.jpg", &jpeg_bytes(200, 100)).unwrap();
        let file = FieldFile::new("images/dawn.jpg");

        field.on_save(&file).unwrap();
        field.on_save(&file).unwrap();

        let count = std::fs::read_dir(tmp.path().join("images")).unwrap().count();
        assert_eq!(count, 5);
    }

    #[test]
    fn save_isolates_failing_directives() {
        let (_tmp, storage, field) = setup(MockBackend::with_dimensions(200, 100).failing_fill());
        storage.write("images/dawn.jpg", b"source").unwrap();

        let report = field.on_save(&FieldFile::new("images/dawn.jpg")).unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "default");
        assert!(matches!(
            report.failures[0].error,
            VariantError::Resize(BackendError::Decode(_))
        ));
        assert!(!storage.exists("images/dawn_default.jpg"));
        for key in ["images/dawn_80.jpg", "images/dawn_30.jpg", "images/dawn_40x40.jpg"] {
            assert!(storage.exists(key), "{key} should exist");
        }
    }

    #[test]
    fn save_with_corrupt_source_reports_every_directive() {
        let (_tmp, storage, field) = setup(RustBackend::new());
        storage.write("images/broken.jpg", b"not an image").unwrap();

        let report = field.on_save(&FieldFile::new("images/broken.jpg")).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.failures.len(), 4);
    }

    #[test]
    fn save_with_missing_source_is_a_storage_error() {
        let (_tmp, _storage, field) = setup(RustBackend::new());
        let result = field.on_save(&FieldFile::new("images/ghost.jpg"));
        assert!(matches!(
            result,
            Err(LifecycleError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn save_with_empty_field_does_nothing() {
        let (_tmp, _storage, field) = setup(MockBackend::new());
        let report = field.on_save(&FieldFile::empty()).unwrap();
        assert!(report.source_key.is_none());
        assert!(field.backend().get_operations().is_empty());
    }

    #[test]
    fn save_without_directives_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(FileSystemStorage::new(tmp.path(), "/media/"));
        storage.write("a.jpg", b"x").unwrap();
        let field = VariantField::new("image", None, storage, MockBackend::new());

        let report = field.on_save(&FieldFile::new("a.jpg")).unwrap();
        assert!(report.written.is_empty());
        assert!(report.is_complete());
    }

    // =========================================================================
    // on_load
    // =========================================================================

    #[test]
    fn load_attaches_handles_by_name() {
        let (tmp, storage, field) = setup(RustBackend::new());
        storage.write("images/dawn.jpg", &jpeg_bytes(200, 100)).unwrap();
        let mut file = FieldFile::new("images/dawn.jpg");
        field.on_save(&file).unwrap();

        field.on_load(&mut file);

        let names: Vec<&str> = file.variants().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["default", "80", "30", "40x40"]);

        let default = file.variant("default").unwrap();
        assert_eq!(default.key(), "images/dawn_default.jpg");
        assert_eq!(default.url(), "/media/images/dawn_default.jpg");
        assert_eq!(
            default.path().unwrap(),
            tmp.path().join("images/dawn_default.jpg")
        );
        assert!(default.size().unwrap() > 0);
    }

    #[test]
    fn load_does_not_touch_storage() {
        let (_tmp, _storage, field) = setup(MockBackend::new());
        let mut file = FieldFile::new("images/never-written.jpg");

        field.on_load(&mut file);

        assert_eq!(file.variants().len(), 4);
        assert!(!file.variant("80").unwrap().exists());
        assert!(field.backend().get_operations().is_empty());
    }

    #[test]
    fn load_of_empty_field_has_no_handles() {
        let (_tmp, _storage, field) = setup(MockBackend::new());
        let mut file = FieldFile::empty();
        field.on_load(&mut file);
        assert!(file.variants().is_empty());
    }

    // =========================================================================
    // on_delete
    // =========================================================================

    #[test]
    fn delete_removes_source_and_variants() {
        let (_tmp, storage, field) = setup(RustBackend::new());
        storage.write("images/dawn.jpg", &jpeg_bytes(200, 100)).unwrap();
        let mut file = FieldFile::new("images/dawn.jpg");
        field.on_save(&file).unwrap();
        field.on_load(&mut file);

        let report = field.on_delete(&mut file).unwrap();

        assert_eq!(report.removed.len(), 5);
        assert!(report.missing.is_empty());
        assert!(!file.is_set());
        assert!(file.variants().is_empty());
        assert!(!storage.exists("images/dawn.jpg"));
        for (_, key) in field.variant_keys("images/dawn.jpg") {
            assert!(!storage.exists(&key));
        }
    }

    #[test]
    fn delete_tolerates_missing_variants() {
        let (_tmp, storage, field) = setup(MockBackend::new());
        storage.write("images/dawn.jpg", b"x").unwrap();
        storage.write("images/dawn_80.jpg", b"x").unwrap();
        let mut file = FieldFile::new("images/dawn.jpg");

        let report = field.on_delete(&mut file).unwrap();

        assert_eq!(report.removed, vec!["images/dawn.jpg", "images/dawn_80.jpg"]);
        assert_eq!(report.missing.len(), 3);
        assert!(!storage.exists("images/dawn_80.jpg"));
    }

    #[test]
    fn delete_twice_is_harmless() {
        let (_tmp, _storage, field) = setup(MockBackend::new());
        let mut file = FieldFile::new("images/gone.jpg");
        let first = field.on_delete(&mut file).unwrap();
        assert_eq!(first.missing.len(), 5);

        let second = field.on_delete(&mut file).unwrap();
        assert_eq!(second, DeleteReport::default());
    }

    /// Filesystem storage whose deletes are refused.
    struct UndeletableStorage(FileSystemStorage);

    impl Storage for UndeletableStorage {
        fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
            self.0.path(key)
        }

        fn url(&self, key: &str) -> String {
            self.0.url(key)
        }

        fn size(&self, key: &str) -> Result<u64, StorageError> {
            self.0.size(key)
        }

        fn exists(&self, key: &str) -> bool {
            self.0.exists(key)
        }

        fn open(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            self.0.open(key)
        }

        fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
            self.0.write(key, bytes)
        }

        fn delete(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
        }
    }

    #[test]
    fn delete_failure_leaves_field_set_for_retry() {
        let tmp = TempDir::new().unwrap();
        let inner = FileSystemStorage::new(tmp.path(), "/media/");
        let storage = Arc::new(UndeletableStorage(inner));
        storage.write("images/dawn.jpg", b"x").unwrap();
        let field = VariantField::new(
            "image",
            Some(standard_sizes()),
            storage.clone(),
            MockBackend::new(),
        );
        let mut file = FieldFile::new("images/dawn.jpg");
        field.on_load(&mut file);

        let result = field.on_delete(&mut file);

        assert!(matches!(
            result,
            Err(LifecycleError::Storage(StorageError::Io { .. }))
        ));
        assert_eq!(file.key(), Some("images/dawn.jpg"));
        assert_eq!(file.variants().len(), 4);
        assert!(storage.exists("images/dawn.jpg"));
    }

    #[test]
    fn delete_uses_the_stored_extension() {
        let (_tmp, storage, field) = setup(MockBackend::new());
        storage.write("images/dawn.JPG", b"x").unwrap();
        storage.write("images/dawn_80.JPG", b"x").unwrap();
        let mut file = FieldFile::new("images/dawn.JPG");

        field.on_delete(&mut file).unwrap();

        assert!(!storage.exists("images/dawn_80.JPG"));
    }

    // =========================================================================
    // save_form_data
    // =========================================================================

    #[test]
    fn form_upload_stores_then_save_generates() {
        let (_tmp, storage, field) = setup(RustBackend::new());
        let cleaned = forms::clean(
            field.backend(),
            Submission::Upload {
                filename: "My Dawn.jpg".into(),
                bytes: jpeg_bytes(200, 100),
            },
        )
        .unwrap();
        let mut file = FieldFile::empty();

        let outcome = field.save_form_data(&mut file, cleaned).unwrap();
        assert_eq!(outcome, FormOutcome::Stored("images/My_Dawn.jpg".into()));
        assert_eq!(file.key(), Some("images/My_Dawn.jpg"));

        let observer: &dyn InstanceObserver = &field;
        let report = observer.on_instance_saved(&file).unwrap();
        assert!(report.is_complete());
        assert!(storage.exists("images/My_Dawn_default.jpg"));

        observer.on_instance_loaded(&mut file);
        assert!(file.variant("40x40").unwrap().exists());
    }

    #[test]
    fn form_delete_marker_deletes() {
        let (_tmp, storage, field) = setup(MockBackend::new());
        storage.write("images/dawn.jpg", b"x").unwrap();
        let mut file = FieldFile::new("images/dawn.jpg");

        let cleaned = forms::clean(&RustBackend::new(), Submission::Text(DELETE_MARKER.into()))
            .unwrap();
        let outcome = field.save_form_data(&mut file, cleaned).unwrap();

        assert!(matches!(outcome, FormOutcome::Deleted(r) if r.removed == vec!["images/dawn.jpg"]));
        assert!(!storage.exists("images/dawn.jpg"));
        assert!(!file.is_set());
    }

    #[test]
    fn form_unchanged_keeps_value() {
        let (_tmp, _storage, field) = setup(MockBackend::new());
        let mut file = FieldFile::new("images/dawn.jpg");
        let outcome = field.save_form_data(&mut file, Cleaned::Unchanged).unwrap();
        assert_eq!(outcome, FormOutcome::Unchanged);
        assert_eq!(file.key(), Some("images/dawn.jpg"));
    }

    fn upload(field: &VariantField<RustBackend>, filename: &str, width: u32) -> FieldFile {
        let cleaned = forms::clean(
            field.backend(),
            Submission::Upload {
                filename: filename.into(),
                bytes: jpeg_bytes(width, 100),
            },
        )
        .unwrap();
        let mut file = FieldFile::empty();
        field.save_form_data(&mut file, cleaned).unwrap();
        file
    }

    #[test]
    fn form_upload_of_taken_name_gets_a_suffix() {
        let (_tmp, storage, field) = setup(RustBackend::new());
        let first = upload(&field, "dawn.jpg", 300);
        let second = upload(&field, "dawn.jpg", 120);
        let third = upload(&field, "dawn.jpg", 90);

        assert_eq!(first.key(), Some("images/dawn.jpg"));
        assert_eq!(second.key(), Some("images/dawn_1.jpg"));
        assert_eq!(third.key(), Some("images/dawn_2.jpg"));
        let (img, _) = decode(&storage.open("images/dawn.jpg").unwrap());
        assert_eq!(img.width(), 300);
    }

    #[test]
    fn form_upload_never_lands_on_another_records_variant() {
        let (_tmp, storage, field) = setup(RustBackend::new());
        let mut a = upload(&field, "dawn.jpg", 200);
        // Named like A's "default" variant, before A's variants exist
        let mut b = upload(&field, "dawn_default.jpg", 150);
        assert_eq!(b.key(), Some("images/dawn_default_1.jpg"));

        field.on_save(&a).unwrap();
        field.on_save(&b).unwrap();
        field.on_delete(&mut a).unwrap();

        assert!(storage.exists("images/dawn_default_1.jpg"));
        assert!(storage.exists("images/dawn_default_1_80.jpg"));
        let report = field.on_delete(&mut b).unwrap();
        assert!(report.missing.is_empty());
    }

    #[test]
    fn form_upload_never_claims_an_existing_source_as_variant() {
        let (_tmp, storage, field) = setup(RustBackend::new());
        let b = upload(&field, "dawn_80.jpg", 150);
        let mut a = upload(&field, "dawn.jpg", 200);

        // "images/dawn.jpg" would make B's source its "80" variant
        assert_eq!(a.key(), Some("images/dawn_1.jpg"));
        field.on_save(&a).unwrap();
        field.on_delete(&mut a).unwrap();

        let (img, _) = decode(&storage.open(b.key().unwrap()).unwrap());
        assert_eq!(img.width(), 150);
    }

    #[test]
    fn form_upload_with_unusable_name_is_rejected() {
        let (_tmp, _storage, field) = setup(MockBackend::new());
        let mut file = FieldFile::empty();
        let result = field.save_form_data(
            &mut file,
            Cleaned::Upload {
                filename: "???".into(),
                bytes: b"x".to_vec(),
            },
        );
        assert!(matches!(result, Err(LifecycleError::InvalidFilename(_))));
        assert!(!file.is_set());
    }
}
