pub mod file;

use std::{fmt::Debug, result::Result as StdResult};

use thiserror::Error;

use crate::record::{Record, RecordId};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Unreadable({0:#})")]
    Unreadable(anyhow::Error),
    #[error("WriteError({0:#})")]
    WriteError(anyhow::Error),
}

pub type RepositoryResult<T> = StdResult<T, RepositoryError>;

/// Whole-set persistence for one domain's log.
///
/// Every mutation rewrites the complete set, there is no partial or append write.
pub trait RecordsRepository: Debug + Send + Sync + 'static {
    type Item: Record;

    /// Reads the persisted set sorted by id. A store that was never written is an empty set.
    fn load(&self) -> RepositoryResult<Vec<Self::Item>>;

    /// Replaces the persisted set with exactly `records`, written in ascending id order.
    fn replace_all(&mut self, records: &[Self::Item]) -> RepositoryResult<()>;

    fn delete(&mut self, record_id: RecordId) -> RepositoryResult<()> {
        let remaining = self
            .load()?
            .into_iter()
            .filter(|record| record.id() != record_id)
            .collect::<Vec<Self::Item>>();

        self.replace_all(&remaining)
    }

    fn next_id(&self, current: &[Self::Item]) -> Option<RecordId> {
        next_id(current)
    }
}

/// One past the largest id, so ids freed by deletion are never handed out again.
///
/// `None` once the largest id is `RecordId::MAX`.
pub fn next_id<R: Record>(records: &[R]) -> Option<RecordId> {
    match records.iter().map(Record::id).max() {
        Some(max_id) => max_id.checked_add(1),
        None => Some(1),
    }
}

#[cfg(test)]
mod tests {
    use super::next_id;
    use crate::record::{Record, RecordId, SpeakingAttempt};

    fn speaking(id: RecordId) -> SpeakingAttempt {
        SpeakingAttempt::blank(id, "2024-01-01".to_string())
    }

    #[test]
    fn test_next_id_empty() {
        assert_eq!(next_id::<SpeakingAttempt>(&[]), Some(1));
    }

    #[test]
    fn test_next_id_with_gaps() {
        let records = vec![speaking(7), speaking(2)];
        assert_eq!(next_id(&records), Some(8));
    }

    #[test]
    fn test_next_id_after_first_deleted() {
        assert_eq!(next_id(&[speaking(2)]), Some(3));
    }

    #[test]
    fn test_next_id_negative_only() {
        assert_eq!(next_id(&[speaking(-3)]), Some(-2));
    }

    #[test]
    fn test_next_id_exhausted() {
        assert_eq!(next_id(&[speaking(1), speaking(RecordId::MAX)]), None);
    }
}
