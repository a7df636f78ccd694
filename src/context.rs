//! Values a formula is evaluated against.
//!
//! The evaluator only reads a [`Context`]. Hosts either fill a
//! [`FileContext`] record themselves or, with the `fs` feature, use
//! [`disk::DiskFile`] which reads everything from the file system.
//!
//! The counter is never advanced by the evaluator: the caller assigns a
//! value before each evaluation (see [`WithCounter`] and [`crate::batch`]).

#[cfg(feature = "fs")]
pub mod disk;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::registry::HashAlgorithm;

/// Counter value and its default zero-padding width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counter {
    pub value: u64,
    #[serde(default)]
    pub width: usize,
}

impl Counter {
    pub fn new(value: u64, width: usize) -> Self {
        Counter { value, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Source of keyword values.
///
/// Every method returning `Option` may report that the value does not exist
/// for the current file; the evaluator turns that into
/// [`crate::EvalError::KeywordUnavailable`].
pub trait Context {
    /// Full path of the file being named
    fn path(&self) -> Option<&Path>;

    fn modified(&self) -> Option<NaiveDateTime>;

    /// Lower-case hexadecimal content hash
    fn hash(&self, algorithm: HashAlgorithm) -> Option<String>;

    fn image_size(&self) -> Option<ImageSize>;

    fn now(&self) -> NaiveDateTime;

    fn counter(&self) -> Option<Counter>;

    /// Directory containing the file
    fn directory(&self) -> Option<String> {
        let parent = self.path()?.parent()?;
        Some(parent.to_string_lossy().into_owned())
    }

    fn base_name(&self) -> Option<String> {
        let stem = self.path()?.file_stem()?;
        Some(stem.to_string_lossy().into_owned())
    }

    /// Extension without the dot; empty when the file has none
    fn extension(&self) -> Option<String> {
        let path = self.path()?;
        Some(
            path.extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    }

    /// Declared or detected format, derived from the extension by default
    fn format(&self) -> Option<String> {
        format_from_extension(&self.extension()?)
    }
}

/// `JPG` and `jpg` are reported as `jpeg`, other extensions lower-cased.
pub fn format_from_extension(extension: &str) -> Option<String> {
    match extension.to_lowercase().as_str() {
        "" => None,
        "jpg" => Some("jpeg".to_string()),
        other => Some(other.to_string()),
    }
}

/// In-memory context filled by the host.
///
/// Deserializable so that contexts can be supplied as JSON:
///
/// ```json
/// {"path": "/photos/photo.jpg", "image": {"width": 640, "height": 480},
///  "modified": "2022-06-13T10:20:30", "counter": {"value": 7, "width": 3}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContext {
    pub path: Option<PathBuf>,
    /// Overrides the format derived from the extension
    pub format: Option<String>,
    pub modified: Option<NaiveDateTime>,
    pub image: Option<ImageSize>,
    pub hashes: HashMap<HashAlgorithm, String>,
    pub now: NaiveDateTime,
    pub counter: Option<Counter>,
}

impl Default for FileContext {
    fn default() -> Self {
        FileContext {
            path: None,
            format: None,
            modified: None,
            image: None,
            hashes: HashMap::new(),
            now: Local::now().naive_local(),
            counter: None,
        }
    }
}

impl FileContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileContext {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_modified(mut self, modified: NaiveDateTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.image = Some(ImageSize { width, height });
        self
    }

    pub fn with_hash(mut self, algorithm: HashAlgorithm, hex: impl Into<String>) -> Self {
        self.hashes.insert(algorithm, hex.into());
        self
    }

    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn with_counter(mut self, value: u64, width: usize) -> Self {
        self.counter = Some(Counter::new(value, width));
        self
    }
}

impl Context for FileContext {
    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn modified(&self) -> Option<NaiveDateTime> {
        self.modified
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Option<String> {
        self.hashes.get(&algorithm).cloned()
    }

    fn image_size(&self) -> Option<ImageSize> {
        self.image
    }

    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn counter(&self) -> Option<Counter> {
        self.counter
    }

    fn format(&self) -> Option<String> {
        match &self.format {
            Some(format) => Some(format.clone()),
            None => format_from_extension(&self.extension()?),
        }
    }
}

/// Borrows a context and replaces its counter.
///
/// Used by batch runs to hand each evaluation its own pre-assigned counter
/// value without mutating the shared context.
pub struct WithCounter<'a, C: Context + ?Sized> {
    inner: &'a C,
    counter: Counter,
}

impl<'a, C: Context + ?Sized> WithCounter<'a, C> {
    pub fn new(inner: &'a C, counter: Counter) -> Self {
        WithCounter { inner, counter }
    }
}

impl<C: Context + ?Sized> Context for WithCounter<'_, C> {
    fn path(&self) -> Option<&Path> {
        self.inner.path()
    }

    fn modified(&self) -> Option<NaiveDateTime> {
        self.inner.modified()
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Option<String> {
        self.inner.hash(algorithm)
    }

    fn image_size(&self) -> Option<ImageSize> {
        self.inner.image_size()
    }

    fn now(&self) -> NaiveDateTime {
        self.inner.now()
    }

    fn counter(&self) -> Option<Counter> {
        Some(self.counter)
    }

    fn directory(&self) -> Option<String> {
        self.inner.directory()
    }

    fn base_name(&self) -> Option<String> {
        self.inner.base_name()
    }

    fn extension(&self) -> Option<String> {
        self.inner.extension()
    }

    fn format(&self) -> Option<String> {
        self.inner.format()
    }
}
