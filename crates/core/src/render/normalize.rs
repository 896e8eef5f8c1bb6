use std::path::Path;

use image::{imageops::FilterType, GrayImage, ImageError, ImageReader, Luma, RgbaImage};
use once_cell::sync::Lazy;
use tracing::debug;

use super::layout::{CARD_CORNER_RADIUS, CARD_HEIGHT, CARD_WIDTH};
use crate::error::{Error, Result};

static CARD_ALPHA_MASK: Lazy<GrayImage> =
    Lazy::new(|| rounded_rect_mask(CARD_WIDTH, CARD_HEIGHT, CARD_CORNER_RADIUS));

/// A card face resized to the card footprint with rounded, transparent corners.
///
/// Each value owns its pixels; clones are independent buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardImage {
    pixels: RgbaImage,
}

impl CardImage {
    /// Decode `path` and fit it to the card footprint.
    pub fn normalize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |source| Error::ImageLoad {
            path: path.to_path_buf(),
            source,
        };
        // Sniff the format from the contents; card art often carries the wrong extension.
        let source = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|err| load_error(ImageError::IoError(err)))?
            .decode()
            .map_err(load_error)?;
        debug!(
            "normalizing {} ({}x{})",
            path.display(),
            source.width(),
            source.height()
        );

        let mut pixels = source
            .resize_to_fill(CARD_WIDTH, CARD_HEIGHT, FilterType::Lanczos3)
            .into_rgba8();
        apply_mask(&mut pixels, &CARD_ALPHA_MASK);
        Ok(Self { pixels })
    }

    /// Borrow the RGBA pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Replace the alpha channel of `pixels` with `mask`.
fn apply_mask(pixels: &mut RgbaImage, mask: &GrayImage) {
    for (pixel, alpha) in pixels.pixels_mut().zip(mask.pixels()) {
        pixel[3] = alpha[0];
    }
}

/// Binary mask of a `width`×`height` rectangle with quarter-circle corners.
pub(crate) fn rounded_rect_mask(width: u32, height: u32, radius: u32) -> GrayImage {
    let radius = radius.min(width / 2).min(height / 2);
    let r = f64::from(radius);

    GrayImage::from_fn(width, height, |x, y| {
        // Distance from the nearest corner centre, measured at the pixel centre.
        let cx = corner_offset(x, width, radius);
        let cy = corner_offset(y, height, radius);
        let inside = match (cx, cy) {
            (Some(dx), Some(dy)) => {
                let dx = r - dx;
                let dy = r - dy;
                dx * dx + dy * dy <= r * r
            }
            _ => true,
        };
        Luma([if inside { 255 } else { 0 }])
    })
}

/// Pixel-centre position inside a corner band, counted from the outer edge.
fn corner_offset(coord: u32, extent: u32, radius: u32) -> Option<f64> {
    if coord < radius {
        Some(f64::from(coord) + 0.5)
    } else if coord >= extent - radius {
        Some(f64::from(extent - 1 - coord) + 0.5)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use image::{Rgb, RgbImage, Rgba};
    use tempfile::tempdir;

    #[test]
    fn mask_clears_only_the_corners() {
        let mask = rounded_rect_mask(100, 60, 10);
        for (x, y) in [(0, 0), (99, 0), (0, 59), (99, 59), (1, 1), (98, 58)] {
            assert_eq!(mask.get_pixel(x, y)[0], 0, "corner ({x}, {y})");
        }
        for (x, y) in [(50, 0), (0, 30), (99, 30), (50, 59), (10, 10), (50, 30)] {
            assert_eq!(mask.get_pixel(x, y)[0], 255, "interior ({x}, {y})");
        }
    }

    #[test]
    fn mask_is_mirror_symmetric() {
        let mask = rounded_rect_mask(40, 30, 8);
        for y in 0..30 {
            for x in 0..40 {
                let value = mask.get_pixel(x, y)[0];
                assert_eq!(value, mask.get_pixel(39 - x, y)[0]);
                assert_eq!(value, mask.get_pixel(x, 29 - y)[0]);
            }
        }
    }

    #[test]
    fn radius_is_capped_by_half_the_shorter_side() {
        let mask = rounded_rect_mask(10, 40, 36);
        // Radius 5 makes the top edge a semicircle: its midpoint stays opaque.
        assert_eq!(mask.get_pixel(5, 0)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(0, 20)[0], 255);
    }

    #[test]
    fn normalize_fits_and_masks() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("wide.png");
        RgbImage::from_pixel(300, 100, Rgb([200, 10, 10])).save(&path)?;

        let card = CardImage::normalize(&path)?;
        let pixels = card.pixels();
        assert_eq!(pixels.dimensions(), (CARD_WIDTH, CARD_HEIGHT));
        assert_eq!(pixels.get_pixel(0, 0)[3], 0);
        let centre = pixels.get_pixel(CARD_WIDTH / 2, CARD_HEIGHT / 2);
        assert_eq!(centre[3], 255);
        assert!(centre[0] > 190 && centre[1] < 20, "{centre:?}");
        Ok(())
    }

    #[test]
    fn source_transparency_is_replaced_by_the_mask() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("ghost.png");
        RgbaImage::from_pixel(80, 120, Rgba([0, 0, 255, 0])).save(&path)?;

        let card = CardImage::normalize(&path)?;
        assert_eq!(card.pixels().get_pixel(CARD_WIDTH / 2, CARD_HEIGHT / 2)[3], 255);
        Ok(())
    }

    #[test]
    fn normalize_is_deterministic() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("gradient.png");
        RgbImage::from_fn(123, 77, |x, y| Rgb([(x * 2) as u8, (y * 3) as u8, 90])).save(&path)?;

        let first = CardImage::normalize(&path)?;
        let second = CardImage::normalize(&path)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn format_is_detected_from_contents() -> Result<()> {
        let temp = tempdir()?;
        let png = temp.path().join("card.png");
        RgbImage::from_pixel(40, 60, Rgb([10, 200, 10])).save(&png)?;
        let mislabelled = temp.path().join("card.jpg");
        std::fs::copy(&png, &mislabelled)?;

        let card = CardImage::normalize(&mislabelled)?;
        assert_eq!(card, CardImage::normalize(&png)?);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_image_load_error() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("absent.png");
        assert!(matches!(
            CardImage::normalize(&path),
            Err(Error::ImageLoad { .. })
        ));
        Ok(())
    }

    #[test]
    fn undecodable_file_is_an_image_load_error() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("broken.png");
        std::fs::write(&path, b"not an image")?;

        match CardImage::normalize(&path) {
            Err(Error::ImageLoad { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected ImageLoad, got {other:?}"),
        }
        Ok(())
    }
}
