//! scanwatch - passive IC-705 scan monitor
//!
//! The radio scans its memory channels and stops where the squelch opens;
//! scanwatch watches those squelch transitions over CI-V, records each
//! transmission from the radio's USB audio codec, transcribes it offline,
//! extracts amateur-radio callsigns, and pushes notifications.

mod config;
mod notify;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use scanwatch_asr::WhisperRecognizer;
use scanwatch_audio::{input_device_names, CpalAudioSource};
use scanwatch_core::{CompositeNotifier, Notifier, RadioClient, Scanner, ScannerEvent};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{AppConfig, NotificationsSection};
use notify::{LogNotifier, NtfyNotifier, WebhookNotifier};

#[derive(Debug, Parser)]
#[command(name = "scanwatch", about = "Passive IC-705 scan monitor")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, default_value = "scanwatch.json")]
    config: PathBuf,

    /// Serial port override, e.g. /dev/ttyACM0 or COM5
    #[arg(long)]
    port: Option<String>,

    /// Audio input device index override (-1 auto-detects the radio)
    #[arg(long)]
    device_index: Option<i32>,

    /// List audio input devices and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scanwatch_cli=info,scanwatch_core=info,scanwatch_audio=info,\
                 scanwatch_asr=info,civ_protocol=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        for (index, name) in input_device_names()?.iter().enumerate() {
            println!("{index}: {name}");
        }
        return Ok(());
    }

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.radio.port_name = port;
    }
    if let Some(index) = cli.device_index {
        config.audio.device_index = index;
    }

    if config.radio.port_name.is_empty() {
        bail!("no serial port configured; set radio.port_name or pass --port");
    }

    info!("starting scanwatch");

    let notifier = build_notifier(&config.notifications)?;

    let radio = RadioClient::connect(config.radio_config())
        .await
        .context("failed to open the radio control port")?;
    let audio = Box::new(CpalAudioSource::new(
        config.audio.device_index,
        config.audio.sample_rate,
    ));
    let recognizer = Arc::new(WhisperRecognizer::new(config.asr_config()));

    let scanner = Scanner::new(radio, audio, recognizer, notifier, config.scanner_config());

    let mut events = scanner.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ScannerEvent::TranscriptionReady { text }) => info!("heard: {text}"),
                Ok(ScannerEvent::Error { message }) => warn!("scanner: {message}"),
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    scanner.run(shutdown_rx).await?;
    info!("scanwatch stopped");
    Ok(())
}

/// Assemble the configured transports; falls back to log-only so detections
/// stay visible when nothing is configured.
fn build_notifier(section: &NotificationsSection) -> anyhow::Result<Arc<dyn Notifier>> {
    let mut composite = CompositeNotifier::new();

    if let Some(url) = &section.webhook_url {
        composite.push(Arc::new(WebhookNotifier::new(url.clone())?));
        info!("webhook notifications enabled");
    }
    if let Some(ntfy) = &section.ntfy {
        composite.push(Arc::new(NtfyNotifier::new(&ntfy.server, &ntfy.topic)?));
        info!(topic = %ntfy.topic, "ntfy notifications enabled");
    }
    if composite.is_empty() {
        composite.push(Arc::new(LogNotifier));
    }

    Ok(Arc::new(composite))
}
