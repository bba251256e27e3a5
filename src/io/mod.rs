//! Getting finished PCM out of the synthesis thread.

#[cfg(feature = "rtrb")]
pub mod stream;

/// Convert signed 16-bit PCM to `[-1.0, 1.0)` floats.
#[inline]
pub fn pcm_to_f32(sample: i16) -> f32 {
    sample as f32 / 32_768.0
}

/// Convert a block of PCM, writing `min(src.len(), dst.len())` samples.
pub fn convert_block(src: &[i16], dst: &mut [f32]) -> usize {
    let n = src.len().min(dst.len());
    for (d, &s) in dst.iter_mut().zip(&src[..n]) {
        *d = pcm_to_f32(s);
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_range() {
        assert_eq!(pcm_to_f32(0), 0.0);
        assert_eq!(pcm_to_f32(i16::MIN), -1.0);
        assert!(pcm_to_f32(i16::MAX) < 1.0);
    }

    #[test]
    fn test_convert_block_stops_at_shorter() {
        let mut dst = [9.0f32; 2];
        assert_eq!(convert_block(&[16_384, -16_384, 1], &mut dst), 2);
        assert_eq!(dst, [0.5, -0.5]);
    }
}
