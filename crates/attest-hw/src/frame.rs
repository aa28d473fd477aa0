//! Grayscale frame type, format conversion, and JPEG payload encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use thiserror::Error;

/// JPEG quality for verification payloads. The backend wants motion
/// across a batch, not per-frame fidelity.
const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("JPEG encoding failed: {0}")]
    EncodeFailed(String),
}

/// A captured grayscale camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub sequence: u32,
    pub captured_at: std::time::Instant,
}

impl Frame {
    /// Average pixel brightness (0.0–255.0).
    pub fn avg_brightness(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&b| b as f32).sum::<f32>() / self.data.len() as f32
    }

    /// Encode the frame as a JPEG verification payload.
    pub fn to_jpeg(&self) -> Result<Vec<u8>, FrameError> {
        let mut out = Vec::with_capacity(self.data.len() / 4);
        let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
        encoder
            .encode(&self.data, self.width, self.height, ExtendedColorType::L8)
            .map_err(|e| FrameError::EncodeFailed(e.to_string()))?;
        Ok(out)
    }
}

/// Convert packed YUYV (4:2:2) to grayscale by extracting the Y channel.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V].
pub fn yuyv_to_grayscale(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }
    Ok(yuyv[..expected].iter().step_by(2).copied().collect())
}

/// Downscale 16-bit little-endian grayscale to 8-bit.
pub fn y16_to_grayscale(y16: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let pixels = (width * height) as usize;
    let expected = pixels * 2;
    if y16.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: y16.len(),
        });
    }
    let mut gray = Vec::with_capacity(pixels);
    for idx in 0..pixels {
        let value = u16::from_le_bytes([y16[idx * 2], y16[idx * 2 + 1]]);
        gray.push((value >> 8) as u8);
    }
    Ok(gray)
}

/// Check if a frame is effectively dark: more than `threshold_pct` of
/// pixels in the darkest histogram bucket (0–31). Dark frames carry no
/// liveness signal and are dropped at the source.
pub fn is_dark_frame(gray: &[u8], threshold_pct: f32) -> bool {
    if gray.is_empty() {
        return true;
    }
    let dark_count = gray.iter().filter(|&&p| p < 32).count();
    (dark_count as f32 / gray.len() as f32) > threshold_pct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_extracts_y_channel() {
        // 2x1 image: [Y0=100, U=128, Y1=200, V=128]
        let yuyv = vec![100, 128, 200, 128];
        let gray = yuyv_to_grayscale(&yuyv, 2, 1).unwrap();
        assert_eq!(gray, vec![100, 200]);
    }

    #[test]
    fn test_yuyv_rejects_short_buffer() {
        let yuyv = vec![100, 128];
        assert!(yuyv_to_grayscale(&yuyv, 2, 1).is_err());
    }

    #[test]
    fn test_y16_downscales() {
        // Two pixels: 0x8000 → 0x80, 0x00FF → 0x00
        let y16 = vec![0x00, 0x80, 0xFF, 0x00];
        let gray = y16_to_grayscale(&y16, 2, 1).unwrap();
        assert_eq!(gray, vec![0x80, 0x00]);
    }

    #[test]
    fn test_dark_frame_all_black() {
        assert!(is_dark_frame(&vec![0u8; 1000], 0.95));
    }

    #[test]
    fn test_dark_frame_normal() {
        assert!(!is_dark_frame(&vec![128u8; 1000], 0.95));
    }

    #[test]
    fn test_dark_frame_empty() {
        assert!(is_dark_frame(&[], 0.95));
    }

    #[test]
    fn test_dark_frame_borderline() {
        // 96% dark → dark; 94% dark → not dark.
        let mut mostly = vec![10u8; 960];
        mostly.extend(vec![128u8; 40]);
        assert!(is_dark_frame(&mostly, 0.95));

        let mut bright_enough = vec![10u8; 940];
        bright_enough.extend(vec![128u8; 60]);
        assert!(!is_dark_frame(&bright_enough, 0.95));
    }

    #[test]
    fn test_jpeg_payload_has_soi_marker() {
        let frame = Frame {
            data: (0..64 * 64).map(|i| (i % 256) as u8).collect(),
            width: 64,
            height: 64,
            sequence: 0,
            captured_at: std::time::Instant::now(),
        };
        let jpeg = frame.to_jpeg().unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "missing JPEG SOI marker");
        assert!(!jpeg.is_empty());
    }

    #[test]
    fn test_avg_brightness() {
        let frame = Frame {
            data: vec![0, 255, 0, 255],
            width: 2,
            height: 2,
            sequence: 0,
            captured_at: std::time::Instant::now(),
        };
        assert!((frame.avg_brightness() - 127.5).abs() < 1e-3);
    }
}
