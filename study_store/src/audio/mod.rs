#[cfg(feature = "capture")]
pub mod cpal_backend;
pub mod session;

use std::fs::{create_dir_all, read_dir, OpenOptions};
use std::io::{BufWriter, ErrorKind, Seek, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::record::RecordId;

pub use session::RecordingSession;

pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;
pub const DEFAULT_CHANNELS: u16 = 1;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio recording not available: {0}")]
    Unavailable(String),
    #[error("No input device available")]
    NoInputDevice,
    #[error("Audio device error: {0:#}")]
    Device(anyhow::Error),
    #[error("Nothing has been recorded")]
    NothingRecorded,
    #[error("Recording is still running")]
    StillRecording,
    #[error("Recording has not been started")]
    NotRecording,
    #[error("Could not save audio: {0:#}")]
    Write(anyhow::Error),
    #[error("Recording {0:?} already exists")]
    AlreadySaved(PathBuf),
    #[error("Could not read audio: {0:#}")]
    Read(anyhow::Error),
}

pub type AudioResult<T> = Result<T, AudioError>;

/// Captured answer: interleaved samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Tail of the clip starting at `position_secs`, used to resume playback mid-answer.
    pub fn from_position(&self, position_secs: f64) -> AudioClip {
        let position_secs = position_secs.clamp(0.0, self.duration_secs());
        let frame = (position_secs * self.sample_rate as f64) as usize;
        let start = frame
            .saturating_mul(self.channels.max(1) as usize)
            .min(self.samples.len());

        AudioClip {
            samples: self.samples[start..].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

/// Format the device agreed to when capture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for CaptureFormat {
    fn default() -> Self {
        CaptureFormat {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

/// Platform side of a recording session.
///
/// The capture callback is the only writer of the sample buffer. The buffer is handed over by
/// [`CaptureBackend::stop_capture`] once the stream is gone, so no read overlaps a write.
pub trait CaptureBackend {
    fn input_devices(&self) -> AudioResult<Vec<String>>;
    fn start_capture(&mut self, device: Option<&str>) -> AudioResult<CaptureFormat>;
    fn stop_capture(&mut self) -> AudioResult<Vec<f32>>;
    fn play(&mut self, clip: &AudioClip) -> AudioResult<()>;
    fn stop_playback(&mut self);
}

impl<B: CaptureBackend + ?Sized> CaptureBackend for Box<B> {
    fn input_devices(&self) -> AudioResult<Vec<String>> {
        (**self).input_devices()
    }
    fn start_capture(&mut self, device: Option<&str>) -> AudioResult<CaptureFormat> {
        (**self).start_capture(device)
    }
    fn stop_capture(&mut self) -> AudioResult<Vec<f32>> {
        (**self).stop_capture()
    }
    fn play(&mut self, clip: &AudioClip) -> AudioResult<()> {
        (**self).play(clip)
    }
    fn stop_playback(&mut self) {
        (**self).stop_playback()
    }
}

/// Backend used when the crate is built without the `capture` feature.
#[derive(Debug, Default)]
pub struct UnavailableBackend;

impl UnavailableBackend {
    fn error() -> AudioError {
        AudioError::Unavailable("built without the \"capture\" feature".to_string())
    }
}

impl CaptureBackend for UnavailableBackend {
    fn input_devices(&self) -> AudioResult<Vec<String>> {
        Err(Self::error())
    }
    fn start_capture(&mut self, _device: Option<&str>) -> AudioResult<CaptureFormat> {
        Err(Self::error())
    }
    fn stop_capture(&mut self) -> AudioResult<Vec<f32>> {
        Err(Self::error())
    }
    fn play(&mut self, _clip: &AudioClip) -> AudioResult<()> {
        Err(Self::error())
    }
    fn stop_playback(&mut self) {}
}

#[cfg(feature = "capture")]
pub fn default_backend() -> Box<dyn CaptureBackend> {
    Box::new(cpal_backend::CpalBackend::new())
}

#[cfg(not(feature = "capture"))]
pub fn default_backend() -> Box<dyn CaptureBackend> {
    Box::new(UnavailableBackend)
}

pub fn clip_file_name(record_id: RecordId, timestamp: &NaiveDateTime) -> String {
    format!(
        "speaking_{}_{}.wav",
        record_id,
        timestamp.format("%Y%m%d-%H%M%S")
    )
}

/// Writes the clip as 16-bit PCM WAV into `dir` and returns the file path.
///
/// An existing take with the same name is never replaced.
pub fn save_clip(
    dir: &Path,
    record_id: RecordId,
    clip: &AudioClip,
    timestamp: &NaiveDateTime,
) -> AudioResult<PathBuf> {
    if clip.is_empty() {
        return Err(AudioError::NothingRecorded);
    }

    create_dir_all(dir)
        .with_context(|| format!("Failed create directory {:?}", dir))
        .map_err(AudioError::Write)?;

    let path = dir.join(clip_file_name(record_id, timestamp));
    let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Err(AudioError::AlreadySaved(path))
        }
        Err(err) => {
            return Err(AudioError::Write(
                anyhow::Error::new(err).context(format!("Failed create {:?}", path)),
            ))
        }
    };
    write_wav(BufWriter::new(file), clip)
        .with_context(|| format!("Failed write {:?}", path))
        .map_err(AudioError::Write)?;

    log::info!("[audio] Saved {} frames to {:?}", clip.frames(), path);
    Ok(path)
}

fn write_wav<W: Write + Seek>(out: W, clip: &AudioClip) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::new(out, spec)?;
    for sample in &clip.samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Reads a take written by [`save_clip`] back into memory.
pub fn load_clip(path: &Path) -> AudioResult<AudioClip> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed open {:?}", path))
        .map_err(AudioError::Read)?;
    let spec = reader.spec();

    let samples = reader
        .samples::<i16>()
        .map(|sample| sample.map(|value| value as f32 / i16::MAX as f32))
        .collect::<Result<Vec<f32>, hound::Error>>()
        .with_context(|| format!("Failed decode {:?}", path))
        .map_err(AudioError::Read)?;

    Ok(AudioClip {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Saved takes for one record, oldest first.
pub fn list_recordings(dir: &Path, record_id: RecordId) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let prefix = format!("speaking_{}_", record_id);
    let mut takes = read_dir(dir)
        .with_context(|| format!("Failed list {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&prefix) && name.ends_with(".wav"))
                .unwrap_or(false)
        })
        .collect::<Vec<PathBuf>>();

    takes.sort();
    Ok(takes)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempdir::TempDir;

    use super::*;

    fn timestamp(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, second)
            .unwrap()
    }

    fn clip() -> AudioClip {
        AudioClip {
            samples: vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25],
            sample_rate: 4,
            channels: 2,
        }
    }

    #[test]
    fn test_clip_duration() {
        let clip = clip();

        assert_eq!(clip.frames(), 3);
        assert_eq!(clip.duration_secs(), 0.75);
    }

    #[test]
    fn test_clip_from_position() {
        let tail = clip().from_position(0.5);

        assert_eq!(tail.samples, vec![-1.0, 0.25]);
        assert!(clip().from_position(10.0).is_empty());
        assert_eq!(clip().from_position(-1.0), clip());
    }

    #[test]
    fn test_clip_from_far_position() {
        let stereo = AudioClip {
            samples: vec![0.0; 4],
            sample_rate: 16_000,
            channels: 2,
        };

        assert!(stereo.from_position(1e30).is_empty());
        assert!(stereo.from_position(f64::INFINITY).is_empty());
    }

    #[test]
    fn test_clip_file_name() {
        assert_eq!(
            clip_file_name(12, &timestamp(5)),
            "speaking_12_20240517-093005.wav"
        );
    }

    #[test]
    fn test_save_and_load_clip() {
        let tmp_dir = TempDir::new("test_").unwrap();
        let dir = tmp_dir.path().join("speaking_recordings");

        let path = save_clip(&dir, 3, &clip(), &timestamp(0)).unwrap();
        assert_eq!(path, dir.join("speaking_3_20240517-093000.wav"));

        let loaded = load_clip(&path).unwrap();
        assert_eq!(loaded.sample_rate, 4);
        assert_eq!(loaded.channels, 2);
        assert_eq!(loaded.samples.len(), 6);
        assert!((loaded.samples[1] - 0.5).abs() < 0.001);
        assert!((loaded.samples[4] + 1.0).abs() < 0.001);

        tmp_dir.close().unwrap();
    }

    #[test]
    fn test_save_clip_keeps_existing_take() {
        let tmp_dir = TempDir::new("test_").unwrap();

        let path = save_clip(tmp_dir.path(), 3, &clip(), &timestamp(0)).unwrap();
        let quiet = AudioClip {
            samples: vec![0.0; 6],
            ..clip()
        };

        match save_clip(tmp_dir.path(), 3, &quiet, &timestamp(0)) {
            Err(AudioError::AlreadySaved(existing)) => assert_eq!(existing, path),
            other => panic!("unexpected save result {:?}", other),
        }
        assert!((load_clip(&path).unwrap().samples[1] - 0.5).abs() < 0.001);

        tmp_dir.close().unwrap();
    }

    #[test]
    fn test_load_missed_clip() {
        let tmp_dir = TempDir::new("test_").unwrap();

        let result = load_clip(&tmp_dir.path().join("missed.wav"));
        assert!(matches!(result.unwrap_err(), AudioError::Read(_)));

        tmp_dir.close().unwrap();
    }

    #[test]
    fn test_save_empty_clip() {
        let tmp_dir = TempDir::new("test_").unwrap();
        let empty = AudioClip {
            samples: vec![],
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        };

        let result = save_clip(tmp_dir.path(), 1, &empty, &timestamp(0));
        assert!(matches!(result.unwrap_err(), AudioError::NothingRecorded));

        tmp_dir.close().unwrap();
    }

    #[test]
    fn test_list_recordings() {
        let tmp_dir = TempDir::new("test_").unwrap();
        let dir = tmp_dir.path().to_path_buf();

        save_clip(&dir, 1, &clip(), &timestamp(2)).unwrap();
        save_clip(&dir, 1, &clip(), &timestamp(1)).unwrap();
        save_clip(&dir, 11, &clip(), &timestamp(1)).unwrap();

        let takes = list_recordings(&dir, 1).unwrap();
        assert_eq!(
            takes,
            vec![
                dir.join("speaking_1_20240517-093001.wav"),
                dir.join("speaking_1_20240517-093002.wav"),
            ]
        );
        assert!(list_recordings(&dir.join("missed"), 1).unwrap().is_empty());

        tmp_dir.close().unwrap();
    }

    #[cfg(not(feature = "capture"))]
    #[test]
    fn test_default_backend_unavailable() {
        let mut backend = default_backend();

        assert!(matches!(
            backend.start_capture(None).unwrap_err(),
            AudioError::Unavailable(_)
        ));
    }
}
