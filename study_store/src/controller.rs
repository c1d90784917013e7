use chrono::Local;
use thiserror::Error;

use crate::record::{Record, RecordId, ValidationError};
use crate::repository::{RecordsRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum SaveRecordError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("Items were not loaded, the file is left as it is")]
    NotLoaded,
    #[error("Could not save items: {0}")]
    Storage(#[from] RepositoryError),
}

pub type SaveResult<T> = Result<T, SaveRecordError>;

#[derive(Debug, Error)]
pub enum AddRecordError {
    #[error("No item numbers left")]
    IdsExhausted,
    #[error("Items were not loaded, the file is left as it is")]
    NotLoaded,
    #[error("Could not store new item: {0}")]
    Storage(#[from] RepositoryError),
}

pub type AddResult<T> = Result<T, AddRecordError>;

#[derive(Debug, Error)]
pub enum DeleteRecordError {
    #[error("Items were not loaded, the file is left as it is")]
    NotLoaded,
    #[error("Could not delete item: {0}")]
    Storage(#[from] RepositoryError),
}

pub type DeleteResult<T> = Result<T, DeleteRecordError>;

/// Validated mutation surface over one domain's log.
///
/// Holds the in-memory copy the front end renders from. The copy only changes after the
/// repository accepted the write, so a failed save or delete leaves it as it was.
/// A log that failed to load refuses every mutation, so the unreadable file is never replaced.
#[derive(Debug)]
pub struct PracticeLog<T: RecordsRepository> {
    repo: T,
    records: Vec<T::Item>,
    load_warning: Option<String>,
}

impl<T: RecordsRepository> PracticeLog<T> {
    /// Loads the full set. An unreadable store is reported through [`PracticeLog::load_warning`]
    /// and the log starts empty.
    pub fn open(repo: T) -> Self {
        let (records, load_warning) = match repo.load() {
            Ok(records) => (records, None),
            Err(err) => {
                log::error!("[{}] Could not load items: {}", T::Item::DOMAIN, err);
                (Vec::new(), Some(format!("Could not load items: {}", err)))
            }
        };

        PracticeLog {
            repo,
            records,
            load_warning,
        }
    }

    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    pub fn records(&self) -> &[T::Item] {
        &self.records
    }

    pub fn get(&self, record_id: RecordId) -> Option<&T::Item> {
        self.records.iter().find(|record| record.id() == record_id)
    }

    pub fn repository(&self) -> &T {
        &self.repo
    }

    /// Appends a placeholder record dated today.
    ///
    /// Reading and listening keep it in memory until the first save. Speaking writes the
    /// whole set straight away.
    pub fn add_blank(&mut self) -> AddResult<RecordId> {
        if self.load_warning.is_some() {
            return Err(AddRecordError::NotLoaded);
        }
        let id = self
            .repo
            .next_id(&self.records)
            .ok_or(AddRecordError::IdsExhausted)?;
        let blank = T::Item::blank(id, Local::now().date_naive().to_string());

        if T::Item::DOMAIN.persists_on_add() {
            let mut updated = self.records.clone();
            updated.push(blank);
            self.repo.replace_all(&updated)?;
            self.records = updated;
        } else {
            self.records.push(blank);
        }

        log::info!("[{}] Added item {}", T::Item::DOMAIN, id);
        Ok(id)
    }

    /// Validates the draft and upserts it under `record_id`, then rewrites the whole set.
    pub fn save(
        &mut self,
        record_id: RecordId,
        draft: <T::Item as Record>::Draft,
    ) -> SaveResult<()> {
        if self.load_warning.is_some() {
            return Err(SaveRecordError::NotLoaded);
        }
        let record = T::Item::from_draft(record_id, draft)?;

        let mut updated = self.records.clone();
        match updated.iter_mut().find(|it| it.id() == record_id) {
            Some(existing) => *existing = record,
            None => updated.push(record),
        }
        updated.sort_by_key(|it| it.id());

        self.repo.replace_all(&updated)?;
        self.records = updated;

        log::info!("[{}] Saved item {}", T::Item::DOMAIN, record_id);
        Ok(())
    }

    pub fn delete(&mut self, record_id: RecordId) -> DeleteResult<()> {
        if self.load_warning.is_some() {
            return Err(DeleteRecordError::NotLoaded);
        }
        self.repo.delete(record_id)?;
        self.records.retain(|record| record.id() != record_id);

        log::info!("[{}] Deleted item {}", T::Item::DOMAIN, record_id);
        Ok(())
    }
}
