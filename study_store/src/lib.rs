//! Practice logs for test preparation: typed records, validated edits and whole-file CSV storage.

pub mod audio;
pub mod controller;
pub mod layout;
pub mod record;
pub mod repository;
pub mod timer;
pub mod tips;

use controller::PracticeLog;
use layout::DataLayout;
use record::{ListeningAttempt, ReadingAttempt, SpeakingAttempt};
use repository::file::CsvFileRepository;

pub type ReadingLog = PracticeLog<CsvFileRepository<ReadingAttempt>>;
pub type ListeningLog = PracticeLog<CsvFileRepository<ListeningAttempt>>;
pub type SpeakingLog = PracticeLog<CsvFileRepository<SpeakingAttempt>>;

/// The three logs of one data directory, each loaded once and owning its own store.
#[derive(Debug)]
pub struct StudyLogs {
    pub reading: ReadingLog,
    pub listening: ListeningLog,
    pub speaking: SpeakingLog,
}

impl StudyLogs {
    pub fn open(layout: &DataLayout) -> StudyLogs {
        StudyLogs {
            reading: PracticeLog::open(CsvFileRepository::in_layout(layout)),
            listening: PracticeLog::open(CsvFileRepository::in_layout(layout)),
            speaking: PracticeLog::open(CsvFileRepository::in_layout(layout)),
        }
    }
}
