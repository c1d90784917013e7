use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, Host, SampleFormat, SampleRate, Stream, StreamConfig};

use super::{AudioClip, AudioError, AudioResult, CaptureBackend, CaptureFormat};

fn log_stream_error(err: cpal::StreamError) {
    log::error!("[audio] Stream error: {}", err);
}

fn device_error<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> AudioError + '_ {
    move |err| AudioError::Device(anyhow!("{}: {}", context, err))
}

/// Microphone and speakers of the default cpal host.
pub struct CpalBackend {
    host: Host,
    buffer: Arc<Mutex<Vec<f32>>>,
    input: Option<Stream>,
    output: Option<Stream>,
}

impl CpalBackend {
    pub fn new() -> Self {
        CpalBackend {
            host: cpal::default_host(),
            buffer: Arc::new(Mutex::new(Vec::new())),
            input: None,
            output: None,
        }
    }

    fn input_device(&self, name: Option<&str>) -> AudioResult<Device> {
        match name {
            None => self
                .host
                .default_input_device()
                .ok_or(AudioError::NoInputDevice),
            Some(name) => self
                .host
                .input_devices()
                .map_err(device_error("Failed to enumerate input devices"))?
                .find(|device| device.name().ok().as_deref() == Some(name))
                .ok_or(AudioError::NoInputDevice),
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for CpalBackend {
    fn input_devices(&self) -> AudioResult<Vec<String>> {
        let devices = self
            .host
            .input_devices()
            .map_err(device_error("Failed to enumerate input devices"))?
            .filter_map(|device| device.name().ok())
            .collect::<Vec<String>>();

        log::debug!("[audio] Found {} input devices", devices.len());
        Ok(devices)
    }

    fn start_capture(&mut self, device: Option<&str>) -> AudioResult<CaptureFormat> {
        let device = self.input_device(device)?;
        let supported = device
            .default_input_config()
            .map_err(device_error("Failed to get input configuration"))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();

        match self.buffer.lock() {
            Ok(mut buffer) => buffer.clear(),
            Err(_) => return Err(AudioError::Device(anyhow!("Sample buffer poisoned"))),
        }

        let stream = match sample_format {
            SampleFormat::F32 => {
                let buffer = self.buffer.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if let Ok(mut buffer) = buffer.lock() {
                            buffer.extend_from_slice(data);
                        }
                    },
                    log_stream_error,
                    None,
                )
            }
            SampleFormat::I16 => {
                let buffer = self.buffer.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if let Ok(mut buffer) = buffer.lock() {
                            buffer.extend(data.iter().map(|s| *s as f32 / i16::MAX as f32));
                        }
                    },
                    log_stream_error,
                    None,
                )
            }
            other => {
                return Err(AudioError::Unavailable(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(device_error("Failed to start recording"))?;

        stream
            .play()
            .map_err(device_error("Failed to start recording"))?;
        self.input = Some(stream);

        Ok(CaptureFormat {
            sample_rate: config.sample_rate.0,
            channels: config.channels,
        })
    }

    fn stop_capture(&mut self) -> AudioResult<Vec<f32>> {
        // Dropping the stream ends the callback before the buffer is taken.
        self.input.take();

        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| AudioError::Device(anyhow!("Sample buffer poisoned")))?;
        Ok(std::mem::take(&mut *buffer))
    }

    fn play(&mut self, clip: &AudioClip) -> AudioResult<()> {
        let device = self
            .host
            .default_output_device()
            .ok_or_else(|| AudioError::Unavailable("no output device".to_string()))?;
        let config = StreamConfig {
            channels: clip.channels,
            sample_rate: SampleRate(clip.sample_rate),
            buffer_size: BufferSize::Default,
        };

        let samples = clip.samples.clone();
        let mut position = 0usize;
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for out in data.iter_mut() {
                        *out = samples.get(position).copied().unwrap_or(0.0);
                        position += 1;
                    }
                },
                log_stream_error,
                None,
            )
            .map_err(device_error("Playback failed"))?;

        stream.play().map_err(device_error("Playback failed"))?;
        self.output = Some(stream);
        Ok(())
    }

    fn stop_playback(&mut self) {
        self.output.take();
    }
}
