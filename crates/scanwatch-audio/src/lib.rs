//! OS audio capture for the scan monitor
//!
//! Wraps cpal to deliver mono float chunks from the radio's USB sound
//! interface through the core [`AudioSource`] capability. The IC-705
//! enumerates as a USB audio codec, so [`devices::find_input_device`] can
//! pick it out by name when no explicit device index is configured.
//!
//! [`AudioSource`]: scanwatch_core::AudioSource

pub mod devices;
pub mod stream;

pub use devices::{find_input_device, input_device_names};
pub use stream::CpalAudioSource;
