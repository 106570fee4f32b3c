//! WAV file loading for the file-based transcription path

use std::path::Path;

use scanwatch_core::RecognizerError;

/// Read an uncompressed linear-PCM WAV file as mono float samples.
///
/// 16-bit integer samples scale by 1/32768 into [-1, 1]; float WAVs pass
/// through. Multi-channel files average down to mono. Returns the samples
/// and the file's sample rate.
pub fn read_wav_mono_f32(path: &Path) -> Result<(Vec<f32>, u32), RecognizerError> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| RecognizerError::Decode(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32_768.0))
            .collect::<Result<_, _>>()
            .map_err(|e| RecognizerError::Decode(e.to_string()))?,
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| RecognizerError::Decode(e.to_string()))?,
        (format, bits) => {
            return Err(RecognizerError::Decode(format!(
                "unsupported WAV format: {bits}-bit {format:?}"
            )))
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}
