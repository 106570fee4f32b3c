//! cpal input stream wrapped as an [`AudioSource`]
//!
//! The `cpal::Stream` handle is not `Send`, so the stream lives on a
//! dedicated thread that blocks on a stop-control channel; the audio
//! callback pushes mono chunks into a shared drop-oldest queue and never
//! blocks.
//!
//! [`AudioSource`]: scanwatch_core::AudioSource

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig, StreamError};
use scanwatch_core::{
    AudioChunk, AudioSource, AudioSourceError, DropOldestQueue, AUDIO_QUEUE_CAPACITY,
};
use tracing::{error, info, warn};

use crate::devices::find_input_device;

/// cpal-backed capture source
pub struct CpalAudioSource {
    device_index: i32,
    sample_rate: u32,
    queue: Arc<DropOldestQueue<AudioChunk>>,
    capturing: Arc<AtomicBool>,
    dropped_chunks: Arc<AtomicUsize>,
    stop_tx: Option<mpsc::Sender<()>>,
    stream_thread: Option<JoinHandle<()>>,
}

impl CpalAudioSource {
    /// Create a source for the configured device (-1 auto-detects) and
    /// capture rate
    pub fn new(device_index: i32, sample_rate: u32) -> Self {
        Self {
            device_index,
            sample_rate,
            queue: Arc::new(DropOldestQueue::new(AUDIO_QUEUE_CAPACITY)),
            capturing: Arc::new(AtomicBool::new(false)),
            dropped_chunks: Arc::new(AtomicUsize::new(0)),
            stop_tx: None,
            stream_thread: None,
        }
    }

    fn spawn_stream_thread(&mut self, device: cpal::Device) -> Result<(), AudioSourceError> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        let queue = self.queue.clone();
        let capturing = self.capturing.clone();
        let dropped = self.dropped_chunks.clone();
        let sample_rate = self.sample_rate;

        let thread = std::thread::spawn(move || {
            let default_config = match device.default_input_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("no default input config: {e}")));
                    return;
                }
            };
            let channels = default_config.channels();
            let sample_format = default_config.sample_format();
            let config = StreamConfig {
                channels,
                sample_rate: SampleRate(sample_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            let capturing_cb = capturing.clone();
            let error_callback = move |err: StreamError| {
                error!("audio stream error: {err}");
                if err.to_string().contains("no longer available")
                    || err.to_string().contains("no longer valid")
                {
                    warn!("audio device disconnected; capture stopped");
                    capturing_cb.store(false, Ordering::Relaxed);
                }
            };

            let push = move |mono: Vec<f32>| {
                if queue.push(AudioChunk::new(mono, sample_rate)).is_some() {
                    dropped.fetch_add(1, Ordering::Relaxed);
                }
            };

            let stream = match sample_format {
                SampleFormat::F32 => device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &_| push(to_mono_f32(data, channels)),
                    error_callback,
                    None,
                ),
                SampleFormat::I16 => device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &_| push(to_mono_i16(data, channels)),
                    error_callback,
                    None,
                ),
                other => {
                    let _ = ready_tx.send(Err(format!("unsupported sample format {other}")));
                    return;
                }
            };

            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("failed to build input stream: {e}")));
                    return;
                }
            };
            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(format!("failed to start input stream: {e}")));
                return;
            }

            capturing.store(true, Ordering::Relaxed);
            let _ = ready_tx.send(Ok(()));

            // Park until stop; the stream keeps running while this thread
            // holds it.
            let _ = stop_rx.recv();
            drop(stream);
            capturing.store(false, Ordering::Relaxed);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.stop_tx = Some(stop_tx);
                self.stream_thread = Some(thread);
                Ok(())
            }
            Ok(Err(msg)) => {
                let _ = thread.join();
                Err(AudioSourceError::Stream(msg))
            }
            Err(_) => {
                let _ = thread.join();
                Err(AudioSourceError::Stream(
                    "stream thread exited before reporting readiness".into(),
                ))
            }
        }
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<(), AudioSourceError> {
        if self.capturing.load(Ordering::Relaxed) {
            return Ok(());
        }
        let device = find_input_device(self.device_index)?;
        if let Ok(name) = device.name() {
            info!(device = %name, sample_rate = self.sample_rate, "starting audio capture");
        }
        self.spawn_stream_thread(device)
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.stream_thread.take() {
            let _ = thread.join();
        }
        self.capturing.store(false, Ordering::Relaxed);

        let dropped = self.dropped_chunks.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!(dropped, "audio chunks dropped during capture");
        }
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Relaxed)
    }

    fn try_next_chunk(&mut self) -> Option<AudioChunk> {
        self.queue.try_pop()
    }
}

impl Drop for CpalAudioSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Average interleaved frames down to one channel
fn to_mono_f32(data: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

fn to_mono_i16(data: &[i16], channels: u16) -> Vec<f32> {
    let floats: Vec<f32> = data.iter().map(|&s| s as f32 / 32_768.0).collect();
    to_mono_f32(&floats, channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough() {
        let data = [0.1, 0.2, 0.3];
        assert_eq!(to_mono_f32(&data, 1), data.to_vec());
    }

    #[test]
    fn stereo_averages_pairs() {
        let data = [0.0, 1.0, 0.5, 0.5];
        assert_eq!(to_mono_f32(&data, 2), vec![0.5, 0.5]);
    }

    #[test]
    fn i16_scales_to_unit_range() {
        let data = [i16::MIN, 0, 16_384];
        let mono = to_mono_i16(&data, 1);
        assert!((mono[0] + 1.0).abs() < 1e-6);
        assert!((mono[1]).abs() < 1e-6);
        assert!((mono[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn ragged_tail_frame_still_averages() {
        // 5 samples at 2 channels leaves a 1-sample tail
        let data = [0.2, 0.4, 0.6, 0.8, 1.0];
        let mono = to_mono_f32(&data, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[2] - 1.0).abs() < 1e-6);
    }
}
