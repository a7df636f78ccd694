//! Context backed by a file on disk.
//!
//! Metadata is read when the file is opened. Image dimensions and content
//! hashes are computed on first use and cached, so a formula that never
//! mentions `{file:hash:sha512}` never reads the file content.

use std::{
    fmt::LowerHex,
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, NaiveDateTime};
use md5::Md5;
use once_cell::sync::OnceCell;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512, digest::Output};

use super::{Context, Counter, ImageSize};
use crate::registry::HashAlgorithm;

#[derive(Debug, thiserror::Error)]
pub enum DiskError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not a regular file")]
    NotAFile(String),
}

pub struct DiskFile {
    path: PathBuf,
    modified: Option<NaiveDateTime>,
    now: NaiveDateTime,
    counter: Option<Counter>,
    image: OnceCell<Option<ImageSize>>,
    hashes: [OnceCell<Option<String>>; 4],
}

impl DiskFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DiskError> {
        let path = path.into();
        let metadata = std::fs::metadata(&path).map_err(|source| DiskError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(DiskError::NotAFile(path.display().to_string()));
        }

        let modified = metadata
            .modified()
            .ok()
            .map(|time| DateTime::<Local>::from(time).naive_local());

        Ok(DiskFile {
            path,
            modified,
            now: Local::now().naive_local(),
            counter: None,
            image: OnceCell::new(),
            hashes: Default::default(),
        })
    }

    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn with_counter(mut self, value: u64, width: usize) -> Self {
        self.counter = Some(Counter::new(value, width));
        self
    }

    fn slot(algorithm: HashAlgorithm) -> usize {
        match algorithm {
            HashAlgorithm::Md5 => 0,
            HashAlgorithm::Sha1 => 1,
            HashAlgorithm::Sha256 => 2,
            HashAlgorithm::Sha512 => 3,
        }
    }
}

fn digest_file<D: Digest>(path: &Path) -> io::Result<String>
where
    Output<D>: LowerHex,
{
    let mut file = File::open(path)?;
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

impl Context for DiskFile {
    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn modified(&self) -> Option<NaiveDateTime> {
        self.modified
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Option<String> {
        self.hashes[Self::slot(algorithm)]
            .get_or_init(|| {
                let digest = match algorithm {
                    HashAlgorithm::Md5 => digest_file::<Md5>(&self.path),
                    HashAlgorithm::Sha1 => digest_file::<Sha1>(&self.path),
                    HashAlgorithm::Sha256 => digest_file::<Sha256>(&self.path),
                    HashAlgorithm::Sha512 => digest_file::<Sha512>(&self.path),
                };
                digest
                    .inspect_err(|e| {
                        tracing::debug!(path = %self.path.display(), algorithm = algorithm.name(), error = %e, "hashing failed")
                    })
                    .ok()
            })
            .clone()
    }

    fn image_size(&self) -> Option<ImageSize> {
        *self.image.get_or_init(|| {
            image::image_dimensions(&self.path)
                .inspect_err(|e| {
                    tracing::debug!(path = %self.path.display(), error = %e, "not a readable image")
                })
                .ok()
                .map(|(width, height)| ImageSize { width, height })
        })
    }

    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn counter(&self) -> Option<Counter> {
        self.counter
    }
}
