//! Pixel-format normalization and wire downsampling.
//!
//! The pub socket carries packed RGB8 only; whatever layout the
//! capture device delivers is converted here, then shrunk by an
//! integer factor with a triangle filter to keep payloads small.

use bytes::Bytes;
use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::warn;

use contracts::{ColorFrame, PixelFormat};

/// Convert a frame to packed RGB8, stripping alpha and fixing
/// channel order as needed. RGB8 input is passed through unchanged.
pub fn to_rgb8(frame: &ColorFrame) -> ColorFrame {
    match frame.format {
        PixelFormat::Rgb8 => frame.clone(),
        PixelFormat::Rgba8 => repack(frame, |px| [px[0], px[1], px[2]]),
        PixelFormat::Bgra8 => repack(frame, |px| [px[2], px[1], px[0]]),
    }
}

fn repack(frame: &ColorFrame, pick: impl Fn(&[u8]) -> [u8; 3]) -> ColorFrame {
    let mut out = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
    for px in frame.data.chunks_exact(4) {
        out.extend_from_slice(&pick(px));
    }
    ColorFrame {
        width: frame.width,
        height: frame.height,
        format: PixelFormat::Rgb8,
        data: Bytes::from(out),
    }
}

/// Normalize to RGB8 and shrink by `factor` with a triangle filter.
///
/// A factor of 0 or 1 only normalizes the format. Output dimensions
/// never drop below 1x1. An inconsistent buffer is returned
/// normalized but unresized.
pub fn downsample_frame(frame: &ColorFrame, factor: u32) -> ColorFrame {
    let rgb = to_rgb8(frame);
    if factor <= 1 {
        return rgb;
    }

    let out_w = (rgb.width / factor).max(1);
    let out_h = (rgb.height / factor).max(1);

    let Some(img) = RgbImage::from_raw(rgb.width, rgb.height, rgb.data.to_vec()) else {
        warn!(
            width = rgb.width,
            height = rgb.height,
            len = rgb.data.len(),
            "frame buffer does not match its dimensions, skipping resize"
        );
        return rgb;
    };
    let resized = imageops::resize(&img, out_w, out_h, FilterType::Triangle);

    ColorFrame {
        width: out_w,
        height: out_h,
        format: PixelFormat::Rgb8,
        data: Bytes::from(resized.into_raw()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, format: PixelFormat, px: &[u8]) -> ColorFrame {
        let mut data = Vec::new();
        for _ in 0..width * height {
            data.extend_from_slice(px);
        }
        ColorFrame {
            width,
            height,
            format,
            data: Bytes::from(data),
        }
    }

    #[test]
    fn test_bgra_channel_swap() {
        let frame = solid(2, 2, PixelFormat::Bgra8, &[10, 20, 30, 255]);
        let rgb = to_rgb8(&frame);

        assert_eq!(rgb.format, PixelFormat::Rgb8);
        assert_eq!(&rgb.data[0..3], &[30, 20, 10]);
        assert!(rgb.is_consistent());
    }

    #[test]
    fn test_rgba_strips_alpha() {
        let frame = solid(1, 1, PixelFormat::Rgba8, &[1, 2, 3, 99]);
        let rgb = to_rgb8(&frame);

        assert_eq!(&rgb.data[..], &[1, 2, 3]);
    }

    #[test]
    fn test_downsample_halves_dimensions() {
        let frame = solid(8, 6, PixelFormat::Rgb8, &[100, 150, 200]);
        let small = downsample_frame(&frame, 2);

        assert_eq!((small.width, small.height), (4, 3));
        assert!(small.is_consistent());
        // Uniform input stays uniform through the filter
        assert_eq!(&small.data[0..3], &[100, 150, 200]);
    }

    #[test]
    fn test_factor_one_is_format_only() {
        let frame = solid(4, 4, PixelFormat::Rgb8, &[9, 9, 9]);
        let out = downsample_frame(&frame, 1);

        assert_eq!((out.width, out.height), (4, 4));
        assert_eq!(out.data, frame.data);
    }

    #[test]
    fn test_never_below_one_pixel() {
        let frame = solid(3, 2, PixelFormat::Rgb8, &[0, 0, 0]);
        let out = downsample_frame(&frame, 10);

        assert_eq!((out.width, out.height), (1, 1));
        assert!(out.is_consistent());
    }
}
