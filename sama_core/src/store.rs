//! Flat-file record stores.
//!
//! Every tracker persists its whole collection to one CSV file with a fixed
//! header. Loads read the complete file; saves rewrite it completely through a
//! temp file that is renamed over the original.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A domain record with a fixed serialized row shape
pub trait FlatRecord: Sized {
    /// Serialized row; field order must match `HEADERS`
    type Row: Serialize + DeserializeOwned;

    /// Column names written as the header row
    const HEADERS: &'static [&'static str];

    /// Column that must be present for the file to be loadable
    const KEY_COLUMN: &'static str;

    fn to_row(&self) -> Self::Row;

    fn from_row(row: Self::Row) -> Result<Self>;
}

/// CSV file holding a collection of `R`
#[derive(Clone, Debug)]
pub struct FlatFile<R> {
    path: PathBuf,
    _record: PhantomData<R>,
}

impl<R: FlatRecord> FlatFile<R> {
    /// Create a store for the given path. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record in the file
    ///
    /// A missing (or zero-length) file is created with just the header and
    /// yields an empty collection. A header without `R::KEY_COLUMN` fails with
    /// `Error::MissingColumn`. Rows that fail to parse are skipped with a
    /// warning.
    pub fn load(&self) -> Result<Vec<R>> {
        let is_blank = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        if is_blank {
            self.save(std::iter::empty())?;
            tracing::info!("Created {:?} with header {:?}", self.path, R::HEADERS);
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;
        let records = self.read_records(&file);
        file.unlock()?;

        let records = records?;
        tracing::debug!("Loaded {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn read_records(&self, file: &File) -> Result<Vec<R>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers = reader.headers()?;
        if !headers.iter().any(|h| h == R::KEY_COLUMN) {
            return Err(Error::MissingColumn {
                path: self.path.clone(),
                column: R::KEY_COLUMN,
            });
        }

        let mut records = Vec::new();
        for (index, result) in reader.deserialize::<R::Row>().enumerate() {
            // Header is line 1
            let line = index + 2;
            match result {
                Ok(row) => match R::from_row(row) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!("Skipping row {} of {:?}: {}", line, self.path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read row {} of {:?}: {}", line, self.path, e);
                }
            }
        }

        Ok(records)
    }

    /// Replace the file contents with `records`
    ///
    /// Writes the header and every record to a temp file in the same
    /// directory, syncs it, and renames it over the original.
    pub fn save<'a, I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;

        // Acquire exclusive lock on the temp file while it is written
        temp.as_file().lock_exclusive()?;

        let mut count = 0usize;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file());
            writer.write_record(R::HEADERS)?;
            for record in records {
                writer.serialize(record.to_row())?;
                count += 1;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} records to {:?}", count, self.path);
        Ok(())
    }
}
