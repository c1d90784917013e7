use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};

use super::{save_clip, AudioClip, AudioError, AudioResult, CaptureBackend, CaptureFormat};
use crate::record::RecordId;

enum SessionState {
    Idle,
    Recording {
        format: CaptureFormat,
        started: Instant,
        started_at: NaiveDateTime,
    },
    Stopped {
        clip: AudioClip,
        started_at: NaiveDateTime,
    },
}

/// One answer being recorded for a speaking record: start, stop, listen back, save.
pub struct RecordingSession<B> {
    backend: B,
    record_id: RecordId,
    state: SessionState,
    unsaved: bool,
}

impl<B: CaptureBackend> RecordingSession<B> {
    pub fn new(backend: B, record_id: RecordId) -> Self {
        RecordingSession {
            backend,
            record_id,
            state: SessionState::Idle,
            unsaved: false,
        }
    }

    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Starts a new take, dropping any clip that was not saved.
    pub fn start(&mut self, device: Option<&str>) -> AudioResult<()> {
        if self.is_recording() {
            return Err(AudioError::StillRecording);
        }

        self.backend.stop_playback();
        let format = self.backend.start_capture(device)?;
        log::debug!(
            "[audio] Recording item {} at {} Hz, {} channels",
            self.record_id,
            format.sample_rate,
            format.channels
        );

        self.state = SessionState::Recording {
            format,
            started: Instant::now(),
            started_at: Local::now().naive_local(),
        };
        self.unsaved = false;
        Ok(())
    }

    /// Stops capture. Everything captured so far is kept.
    pub fn stop(&mut self) -> AudioResult<&AudioClip> {
        let (format, started_at) = match &self.state {
            SessionState::Recording {
                format, started_at, ..
            } => (*format, *started_at),
            _ => return Err(AudioError::NotRecording),
        };

        let samples = self.backend.stop_capture()?;
        self.unsaved = !samples.is_empty();
        self.state = SessionState::Stopped {
            clip: AudioClip {
                samples,
                sample_rate: format.sample_rate,
                channels: format.channels,
            },
            started_at,
        };

        self.clip().ok_or(AudioError::NothingRecorded)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, SessionState::Recording { .. })
    }

    pub fn recording_elapsed(&self) -> Option<Duration> {
        match &self.state {
            SessionState::Recording { started, .. } => Some(started.elapsed()),
            _ => None,
        }
    }

    pub fn clip(&self) -> Option<&AudioClip> {
        match &self.state {
            SessionState::Stopped { clip, .. } => Some(clip),
            _ => None,
        }
    }

    /// When capture of the current take started.
    pub fn started_at(&self) -> Option<NaiveDateTime> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Recording { started_at, .. } | SessionState::Stopped { started_at, .. } => {
                Some(*started_at)
            }
        }
    }

    fn stopped_clip(&self) -> AudioResult<(&AudioClip, &NaiveDateTime)> {
        match &self.state {
            SessionState::Recording { .. } => Err(AudioError::StillRecording),
            SessionState::Idle => Err(AudioError::NothingRecorded),
            SessionState::Stopped { clip, .. } if clip.is_empty() => {
                Err(AudioError::NothingRecorded)
            }
            SessionState::Stopped { clip, started_at } => Ok((clip, started_at)),
        }
    }

    pub fn play(&mut self, from_secs: f64) -> AudioResult<()> {
        let clip = self.stopped_clip()?.0.from_position(from_secs);
        self.backend.stop_playback();
        self.backend.play(&clip)
    }

    pub fn stop_playback(&mut self) {
        self.backend.stop_playback();
    }

    /// Writes the take under the time its capture started.
    pub fn save(&mut self, dir: &Path) -> AudioResult<PathBuf> {
        let (clip, started_at) = self.stopped_clip()?;
        let path = save_clip(dir, self.record_id, clip, started_at)?;
        self.unsaved = false;
        Ok(path)
    }

    /// True when a take exists that was never written to disk.
    pub fn has_unsaved(&self) -> bool {
        self.unsaved
    }

    pub fn discard(&mut self) -> AudioResult<()> {
        self.backend.stop_playback();
        if self.is_recording() {
            self.backend.stop_capture()?;
        }
        self.state = SessionState::Idle;
        self.unsaved = false;
        Ok(())
    }
}
