//! Application configuration
//!
//! Loaded from a JSON file, every field defaulting so a minimal config only
//! needs the serial port name. CLI flags override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use scanwatch_asr::AsrConfig;
use scanwatch_core::{RadioConfig, ScannerConfig, SegmenterConfig};
use serde::{Deserialize, Serialize};

/// Serial link section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RadioSection {
    /// Serial port path, e.g. `/dev/ttyACM0` or `COM5`
    #[serde(default)]
    pub port_name: String,
    /// Baud rate
    #[serde(default = "default_baud")]
    pub baud_rate: u32,
}

fn default_baud() -> u32 {
    19_200
}

impl Default for RadioSection {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: default_baud(),
        }
    }
}

/// Audio capture section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSection {
    /// Input device index; -1 auto-detects the radio's USB codec
    #[serde(default = "default_device_index")]
    pub device_index: i32,
    /// Capture sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_device_index() -> i32 {
    -1
}

fn default_sample_rate() -> u32 {
    48_000
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            device_index: default_device_index(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Speech recognition section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AsrSection {
    /// GGML model file name
    #[serde(default = "default_model")]
    pub model: String,
    /// Directory holding model files
    #[serde(default = "default_models_directory")]
    pub models_directory: PathBuf,
    /// Offload decoding to the GPU when available
    #[serde(default)]
    pub use_gpu: bool,
    /// Decoder threads; 0 = auto
    #[serde(default)]
    pub threads: usize,
    /// Language code, or `auto`
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_model() -> String {
    "ggml-base.en.bin".into()
}

fn default_models_directory() -> PathBuf {
    PathBuf::from("models")
}

fn default_language() -> String {
    "en".into()
}

impl Default for AsrSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            models_directory: default_models_directory(),
            use_gpu: false,
            threads: 0,
            language: default_language(),
        }
    }
}

/// Scanner and segmenter section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScannerSection {
    /// Squelch poll period in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Callsigns below this confidence are logged, not dispatched
    #[serde(default = "default_min_confidence")]
    pub min_callsign_confidence: f32,
    /// Look-behind retained while the squelch is closed, in milliseconds
    #[serde(default = "default_pre_roll_ms")]
    pub pre_roll_ms: u64,
    /// Hang time after the squelch closes, in milliseconds
    #[serde(default = "default_silence_tail_ms")]
    pub silence_tail_ms: u64,
    /// Minimum transmission length, in milliseconds
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: u64,
    /// Maximum recording length, in milliseconds
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_min_confidence() -> f32 {
    0.5
}

fn default_pre_roll_ms() -> u64 {
    500
}

fn default_silence_tail_ms() -> u64 {
    1_000
}

fn default_min_duration_ms() -> u64 {
    1_000
}

fn default_max_duration_ms() -> u64 {
    60_000
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            min_callsign_confidence: default_min_confidence(),
            pre_roll_ms: default_pre_roll_ms(),
            silence_tail_ms: default_silence_tail_ms(),
            min_duration_ms: default_min_duration_ms(),
            max_duration_ms: default_max_duration_ms(),
        }
    }
}

/// ntfy.sh transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NtfySection {
    /// Server base URL
    #[serde(default = "default_ntfy_server")]
    pub server: String,
    /// Topic to publish to
    pub topic: String,
}

fn default_ntfy_server() -> String {
    "https://ntfy.sh".into()
}

/// Notification transports; each is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationsSection {
    /// JSON POST target
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// ntfy push settings
    #[serde(default)]
    pub ntfy: Option<NtfySection>,
}

/// Full application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub radio: RadioSection,
    #[serde(default)]
    pub audio: AudioSection,
    #[serde(default)]
    pub asr: AsrSection,
    #[serde(default)]
    pub scanner: ScannerSection,
    #[serde(default)]
    pub notifications: NotificationsSection,
}

impl AppConfig {
    /// Load from a JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Radio client configuration
    pub fn radio_config(&self) -> RadioConfig {
        RadioConfig {
            port_name: self.radio.port_name.clone(),
            baud_rate: self.radio.baud_rate,
            ..Default::default()
        }
    }

    /// Scanner coordinator configuration
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            poll_interval: Duration::from_millis(self.scanner.poll_interval_ms),
            min_callsign_confidence: self.scanner.min_callsign_confidence,
            segmenter: SegmenterConfig {
                pre_roll: Duration::from_millis(self.scanner.pre_roll_ms),
                silence_tail: Duration::from_millis(self.scanner.silence_tail_ms),
                min_duration: Duration::from_millis(self.scanner.min_duration_ms),
                max_duration: Duration::from_millis(self.scanner.max_duration_ms),
                sample_rate: self.audio.sample_rate,
            },
        }
    }

    /// Recognizer configuration
    pub fn asr_config(&self) -> AsrConfig {
        AsrConfig {
            model: self.asr.model.clone(),
            models_directory: self.asr.models_directory.clone(),
            use_gpu: self.asr.use_gpu,
            threads: self.asr.threads,
            language: self.asr.language.clone(),
        }
    }
}
