use std::fs::{create_dir_all, File};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::layout::DataLayout;
use crate::record::Record;
use crate::repository::{RecordsRepository, RepositoryError, RepositoryResult};

/// CSV file holding one domain's log, header row first.
#[derive(Debug, Clone)]
pub struct CsvFileRepository<R> {
    file: PathBuf,
    phantom: PhantomData<R>,
}

impl<R: Record> CsvFileRepository<R> {
    pub fn new(file: PathBuf) -> CsvFileRepository<R> {
        CsvFileRepository {
            file,
            phantom: PhantomData,
        }
    }

    pub fn in_layout(layout: &DataLayout) -> CsvFileRepository<R> {
        Self::new(layout.csv_path(R::DOMAIN))
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    fn read_rows(&self, file: File) -> Result<Vec<R>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in reader.deserialize::<R>() {
            match row {
                Ok(record) => records.push(record),
                Err(err) if err.is_io_error() => {
                    return Err(err).with_context(|| format!("Failed reading {:?}", self.file));
                }
                Err(err) => {
                    log::debug!("[{}] Skip malformed row: {}", R::DOMAIN, err);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            log::warn!(
                "[{}] Skipped {} malformed rows in {:?}",
                R::DOMAIN,
                skipped,
                self.file
            );
        }

        records.sort_by_key(|record| record.id());
        Ok(records)
    }

    fn write_rows(&self, records: &[R]) -> Result<()> {
        let parent = self
            .file
            .parent()
            .with_context(|| format!("Failed get parent directory for {:?}", self.file))?;
        create_dir_all(parent)
            .with_context(|| format!("Failed create directory {:?}", parent))?;

        let mut sorted = records.iter().collect::<Vec<&R>>();
        sorted.sort_by_key(|record| record.id());

        let mut tmp_file = NamedTempFile::new_in(parent)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut tmp_file);

            writer.write_record(R::DOMAIN.columns())?;
            for record in sorted {
                writer
                    .serialize(record)
                    .with_context(|| format!("Failed csv writing {:?}", self.file))?;
            }
            writer.flush()?;
        }

        tmp_file.flush()?;
        tmp_file.as_file().sync_all()?;
        tmp_file
            .persist(&self.file)
            .with_context(|| format!("Failed replace {:?}", self.file))?;

        Ok(())
    }
}

impl<R: Record> RecordsRepository for CsvFileRepository<R> {
    type Item = R;

    fn load(&self) -> RepositoryResult<Vec<R>> {
        if !self.file.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.file)
            .with_context(|| format!("Failed file open {:?}", self.file))
            .map_err(RepositoryError::Unreadable)?;
        let records = self.read_rows(file).map_err(RepositoryError::Unreadable)?;

        log::debug!("[{}] Loaded {} records", R::DOMAIN, records.len());
        Ok(records)
    }

    fn replace_all(&mut self, records: &[R]) -> RepositoryResult<()> {
        self.write_rows(records)
            .map_err(RepositoryError::WriteError)?;

        log::debug!("[{}] Stored {} records", R::DOMAIN, records.len());
        Ok(())
    }
}
