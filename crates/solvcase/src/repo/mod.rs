//! Repository file formats.
//!
//! A testcase stores each repository in a side file (or inline) and names the
//! format on its `repo` line. Formats are looked up in a [`RepoFormats`]
//! registry; [`testtags`] is always available.

pub mod testtags;

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexMap;

use crate::error::{Result, TestcaseError};
use crate::pool::{Pool, RepoId};

pub use testtags::TestTags;

/// A repository serialization format
pub trait RepoFormat {
    /// Name used on `repo` lines
    fn name(&self) -> &'static str;

    /// Read packages from `input` into `repo`
    fn load(&self, pool: &mut Pool, repo: RepoId, input: &mut dyn BufRead) -> Result<()>;

    /// Write all packages of `repo` to `out`
    fn dump(&self, pool: &Pool, repo: RepoId, out: &mut dyn Write) -> Result<()>;
}

/// Registry of known repository formats
pub struct RepoFormats {
    formats: IndexMap<&'static str, Box<dyn RepoFormat>>,
}

impl std::fmt::Debug for RepoFormats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.formats.keys()).finish()
    }
}

impl Default for RepoFormats {
    fn default() -> Self {
        let mut formats = Self {
            formats: IndexMap::new(),
        };
        formats.register(Box::new(TestTags));
        formats
    }
}

impl RepoFormats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a format, replacing any format of the same name
    pub fn register(&mut self, format: Box<dyn RepoFormat>) {
        self.formats.insert(format.name(), format);
    }

    pub fn get(&self, name: &str) -> Option<&dyn RepoFormat> {
        self.formats.get(name).map(|f| f.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.keys().copied()
    }
}

/// Open a repository file, transparently decompressing `.gz` files
pub fn open_repo_file(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|source| TestcaseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Write a repository dump to `path`, gzip compressed when it ends in `.gz`
pub fn write_repo_file(path: &Path, format: &dyn RepoFormat, pool: &Pool, repo: RepoId) -> Result<()> {
    let write_err = |source| TestcaseError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|source| TestcaseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        let mut encoder = GzEncoder::new(file, Compression::default());
        format.dump(pool, repo, &mut encoder)?;
        encoder.finish().map_err(write_err)?;
    } else {
        let mut out = std::io::BufWriter::new(file);
        format.dump(pool, repo, &mut out)?;
        out.flush().map_err(write_err)?;
    }
    log::debug!("wrote repo {} to {}", repo, path.display());
    Ok(())
}
