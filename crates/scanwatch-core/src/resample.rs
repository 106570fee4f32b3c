//! Sample-rate conversion for the recognition path
//!
//! The capture backend delivers audio at the device rate (typically 48 kHz);
//! the recognizer wants 16 kHz mono. Linear interpolation is plenty for
//! speech snippets where latency matters more than phase accuracy.

/// Resample `input` from `from_rate` to `to_rate` by linear interpolation
/// between adjacent samples. Output positions past the last input sample
/// clamp to it.
pub fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if input.is_empty() || from_rate == 0 || from_rate == to_rate {
        return input.to_vec();
    }

    let ratio = to_rate as f32 / from_rate as f32;
    let output_len = (input.len() as f32 * ratio).round() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f32 / ratio;
        let idx = src_idx.floor() as usize;
        let frac = src_idx - idx as f32;

        if idx + 1 < input.len() {
            output.push(input[idx] * (1.0 - frac) + input[idx + 1] * frac);
        } else {
            output.push(*input.last().expect("input checked non-empty"));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_at_equal_rates() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_linear(&input, 16_000, 16_000), input);
    }

    #[test]
    fn empty_input() {
        assert!(resample_linear(&[], 48_000, 16_000).is_empty());
    }

    #[test]
    fn downsample_48k_to_16k_length() {
        let input = vec![0.0f32; 48_000];
        let out = resample_linear(&input, 48_000, 16_000);
        assert_eq!(out.len(), 16_000);
    }

    #[test]
    fn upsample_interpolates_midpoints() {
        let input = vec![0.0, 1.0];
        let out = resample_linear(&input, 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert!((out[2] - 1.0).abs() < 1e-6);
        // Past the last source sample: clamp
        assert!((out[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn downsample_preserves_dc_level() {
        let input = vec![0.5f32; 4_800];
        let out = resample_linear(&input, 48_000, 16_000);
        assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }
}
