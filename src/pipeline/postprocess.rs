//! Image post-processing: decode screenshots, flatten alpha, crop borders.
//!
//! Slides rendered letterboxed inside the viewport come back with solid
//! black bars. Cropping keeps only the bounding box of "content" pixels,
//! where content means any channel brighter than the configured threshold.
//! Everything darker than that at the edges is treated as border.
//!
//! Cropping is idempotent: the bounding box of an already-cropped image is
//! the whole image, which is returned unchanged.

use crate::config::CaptureConfig;
use crate::error::DeckError;
use crate::pipeline::scrape::CapturedSlide;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::debug;

/// A decoded, flattened and (optionally) cropped slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideImage {
    /// 1-indexed capture position.
    pub index: usize,
    pub image: RgbImage,
    /// Whether a border was actually removed.
    pub cropped: bool,
}

/// Pixel rectangle, `x`/`y` of the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Decode every screenshot and apply border removal unless disabled.
///
/// Transparency is flattened onto white before the border scan, so a fully
/// transparent margin reads as white content and is kept, even when its
/// colour channels are black. Only opaque dark borders are cropped.
///
/// Output order equals input order.
pub fn prepare_slides(
    captured: &[CapturedSlide],
    config: &CaptureConfig,
) -> Result<Vec<SlideImage>, DeckError> {
    captured
        .iter()
        .map(|slide| {
            let flat = decode_slide(slide)?;
            if config.skip_border_removal {
                return Ok(SlideImage {
                    index: slide.index,
                    image: flat,
                    cropped: false,
                });
            }
            let before = flat.dimensions();
            let image = crop_black_borders(&flat, config.border_threshold);
            let cropped = image.dimensions() != before;
            if cropped {
                debug!(
                    "Slide {}: cropped {}x{} → {}x{}",
                    slide.index,
                    before.0,
                    before.1,
                    image.width(),
                    image.height()
                );
            }
            Ok(SlideImage {
                index: slide.index,
                image,
                cropped,
            })
        })
        .collect()
}

/// Decode a PNG screenshot into RGB, compositing transparency onto white.
pub fn decode_slide(slide: &CapturedSlide) -> Result<RgbImage, DeckError> {
    let img = image::load_from_memory_with_format(&slide.png, ImageFormat::Png).map_err(|e| {
        DeckError::ImageDecode {
            slide: slide.index,
            detail: e.to_string(),
        }
    })?;
    Ok(flatten_onto_white(&img))
}

/// Drop the alpha channel by blending each pixel over a white background.
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let a = a as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

/// Bounding box of pixels with any channel above `threshold`.
///
/// `None` when the whole image is at or below the threshold.
pub fn content_bounds(img: &RgbImage, threshold: u8) -> Option<Bounds> {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut found = false;

    for (x, y, px) in img.enumerate_pixels() {
        if px.0.iter().any(|&c| c > threshold) {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop uniform black margins; returns the image unchanged when there are none.
pub fn crop_black_borders(img: &RgbImage, threshold: u8) -> RgbImage {
    match content_bounds(img, threshold) {
        Some(b) if (b.width, b.height) != img.dimensions() => {
            image::imageops::crop_imm(img, b.x, b.y, b.width, b.height).to_image()
        }
        _ => img.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    /// 40×30 black frame with a 20×10 coloured block at (10, 8).
    fn letterboxed() -> RgbImage {
        let mut img = RgbImage::from_pixel(40, 30, Rgb([0, 0, 0]));
        for y in 8..18 {
            for x in 10..30 {
                img.put_pixel(x, y, Rgb([200, 40, 90]));
            }
        }
        img
    }

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn crops_to_content() {
        let out = crop_black_borders(&letterboxed(), 100);
        assert_eq!(out.dimensions(), (20, 10));
        assert_eq!(out.get_pixel(0, 0), &Rgb([200, 40, 90]));
    }

    #[test]
    fn crop_is_idempotent() {
        let once = crop_black_borders(&letterboxed(), 100);
        let twice = crop_black_borders(&once, 100);
        assert_eq!(once, twice);
    }

    #[test]
    fn no_border_is_unchanged() {
        let mut img = RgbImage::from_pixel(16, 9, Rgb([10, 10, 10]));
        img.put_pixel(0, 0, Rgb([255, 255, 255]));
        img.put_pixel(15, 8, Rgb([0, 0, 180]));
        assert_eq!(crop_black_borders(&img, 100), img);
    }

    #[test]
    fn all_dark_is_unchanged() {
        let img = RgbImage::from_pixel(8, 8, Rgb([30, 30, 30]));
        assert_eq!(content_bounds(&img, 100), None);
        assert_eq!(crop_black_borders(&img, 100), img);
    }

    #[test]
    fn dark_grey_counts_as_border() {
        // Channels at the threshold are border, one above is content.
        let mut img = RgbImage::from_pixel(5, 5, Rgb([100, 100, 100]));
        img.put_pixel(2, 2, Rgb([101, 0, 0]));
        assert_eq!(
            content_bounds(&img, 100),
            Some(Bounds {
                x: 2,
                y: 2,
                width: 1,
                height: 1
            })
        );
    }

    #[test]
    fn transparency_becomes_white() {
        let mut rgba = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn prepare_respects_skip_border_removal() {
        let png = png_bytes(&DynamicImage::ImageRgb8(letterboxed()));
        let captured = vec![CapturedSlide { index: 1, png }];

        let config = CaptureConfig::builder()
            .skip_border_removal(true)
            .build()
            .unwrap();
        let kept = prepare_slides(&captured, &config).unwrap();
        assert_eq!(kept[0].image, letterboxed());
        assert!(!kept[0].cropped);

        let cropped = prepare_slides(&captured, &CaptureConfig::default()).unwrap();
        assert_eq!(cropped[0].image.dimensions(), (20, 10));
        assert!(cropped[0].cropped);
    }

    #[test]
    fn transparent_black_margin_is_kept() {
        let mut rgba = RgbaImage::from_pixel(12, 8, Rgba([0, 0, 0, 0]));
        for y in 2..6 {
            for x in 3..9 {
                rgba.put_pixel(x, y, Rgba([200, 40, 90, 255]));
            }
        }
        let png = png_bytes(&DynamicImage::ImageRgba8(rgba));
        let captured = vec![CapturedSlide { index: 1, png }];

        let out = prepare_slides(&captured, &CaptureConfig::default()).unwrap();
        assert_eq!(out[0].image.dimensions(), (12, 8));
        assert_eq!(out[0].image.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert!(!out[0].cropped);
    }

    #[test]
    fn undecodable_screenshot_is_an_error() {
        let captured = CapturedSlide {
            index: 4,
            png: b"not a png".to_vec(),
        };
        match decode_slide(&captured) {
            Err(DeckError::ImageDecode { slide, .. }) => assert_eq!(slide, 4),
            other => panic!("expected ImageDecode, got {other:?}"),
        }
    }
}
