//! Cover-fit geometry
//!
//! Maps a photo of arbitrary aspect ratio onto a fixed frame. The photo is
//! scaled until it covers the whole frame (never letterboxed), and the
//! overflow is cropped evenly from both sides.

use crate::types::{Rectangle, Result};

/// Result of fitting a source image into a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverFit {
    /// Width of the scaled image, always >= frame width
    pub scaled_width: u32,
    /// Height of the scaled image, always >= frame height
    pub scaled_height: u32,
    /// Left edge of the crop window inside the scaled image
    pub offset_x: u32,
    /// Top edge of the crop window inside the scaled image
    pub offset_y: u32,
    /// Crop window width (the frame width in whole pixels)
    pub crop_width: u32,
    /// Crop window height (the frame height in whole pixels)
    pub crop_height: u32,
}

/// Compute the cover fit of `source` into `frame`.
///
/// When the source is relatively wider than the frame it is scaled to the
/// frame height, otherwise to the frame width. Exact ratio ties take the
/// width path. Scaled sizes are floored, offsets are floor-divided.
pub fn fit(source: Rectangle, frame: Rectangle) -> Result<CoverFit> {
    source.validate()?;
    frame.validate()?;

    let frame_width = frame.width.ceil() as u32;
    let frame_height = frame.height.ceil() as u32;

    let target_ratio = frame.width / frame.height;
    let source_ratio = source.width / source.height;

    let (scaled_width, scaled_height) = if source_ratio > target_ratio {
        let scaled = source.width * frame.height / source.height;
        (scaled.floor() as u32, frame_height)
    } else {
        let scaled = source.height * frame.width / source.width;
        (frame_width, scaled.floor() as u32)
    };

    // Floating point error must never let the scaled image fall short of the frame
    let scaled_width = scaled_width.max(frame_width);
    let scaled_height = scaled_height.max(frame_height);

    Ok(CoverFit {
        scaled_width,
        scaled_height,
        offset_x: (scaled_width - frame_width) / 2,
        offset_y: (scaled_height - frame_height) / 2,
        crop_width: frame_width,
        crop_height: frame_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CardError;

    fn frame() -> Rectangle {
        Rectangle::new(740.0, 540.0)
    }

    #[test]
    fn test_wide_source_scales_to_height() {
        let result = fit(Rectangle::new(4000.0, 2000.0), frame()).unwrap();
        assert_eq!(result.scaled_height, 540);
        assert_eq!(result.scaled_width, 1080);
        assert_eq!(result.offset_x, 170);
        assert_eq!(result.offset_y, 0);
    }

    #[test]
    fn test_tall_source_scales_to_width() {
        let result = fit(Rectangle::new(1000.0, 2000.0), frame()).unwrap();
        assert_eq!(result.scaled_width, 740);
        assert_eq!(result.scaled_height, 1480);
        assert_eq!(result.offset_x, 0);
        assert_eq!(result.offset_y, 470);
    }

    #[test]
    fn test_equal_ratio_takes_width_path() {
        let result = fit(Rectangle::new(370.0, 270.0), frame()).unwrap();
        assert_eq!(result.scaled_width, 740);
        assert_eq!(result.scaled_height, 540);
        assert_eq!((result.offset_x, result.offset_y), (0, 0));
    }

    #[test]
    fn test_odd_overflow_floors_offset() {
        // 741 wide after scaling: one extra pixel, offset floors to 0
        let result = fit(Rectangle::new(741.0, 540.0), frame()).unwrap();
        assert_eq!(result.scaled_width, 741);
        assert_eq!(result.offset_x, 0);
    }

    #[test]
    fn test_zero_area_source_rejected() {
        let err = fit(Rectangle::new(0.0, 100.0), frame()).unwrap_err();
        assert!(matches!(err, CardError::InvalidDimensions { .. }));
        assert!(fit(Rectangle::new(100.0, 0.0), frame()).is_err());
        assert!(fit(Rectangle::new(100.0, 100.0), Rectangle::new(-1.0, 5.0)).is_err());
    }

    #[test]
    fn test_cover_invariant_over_many_sources() {
        let frame = Rectangle::new(740.0, 540.0);
        for w in (1..60).map(|v| v as f64 * 37.0) {
            for h in (1..60).map(|v| v as f64 * 29.0) {
                let result = fit(Rectangle::new(w, h), frame).unwrap();
                assert!(result.scaled_width >= 740, "{w}x{h}");
                assert!(result.scaled_height >= 540, "{w}x{h}");
                assert!(result.offset_x + result.crop_width <= result.scaled_width);
                assert!(result.offset_y + result.crop_height <= result.scaled_height);
            }
        }
    }

    #[test]
    fn test_scale_invariance() {
        let frame = Rectangle::new(740.0, 540.0);
        for source in [
            Rectangle::new(3024.0, 4032.0),
            Rectangle::new(1920.0, 1080.0),
            Rectangle::new(777.0, 333.0),
            Rectangle::new(512.0, 512.0),
        ] {
            let base = fit(source, frame).unwrap();
            for k in [0.25, 0.5, 2.0, 8.0] {
                assert_eq!(fit(source.scaled(k), frame).unwrap(), base);
            }
        }
    }
}
