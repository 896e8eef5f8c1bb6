use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tracing::debug;

use super::{
    layout::{SlotGrid, PAGE_HEIGHT, PAGE_WIDTH},
    normalize::CardImage,
};
use crate::error::Result;

/// A finished, opaque sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    raster: RgbImage,
    filled_slots: usize,
}

impl Page {
    /// Flattened RGB pixels.
    pub fn raster(&self) -> &RgbImage {
        &self.raster
    }

    /// Number of grid slots that received a card; the rest stay white.
    pub fn filled_slots(&self) -> usize {
        self.filled_slots
    }
}

/// Page under construction.
struct Canvas {
    pixels: RgbaImage,
    cursor: usize,
}

impl Canvas {
    fn blank() -> Self {
        Self {
            pixels: RgbaImage::from_pixel(PAGE_WIDTH, PAGE_HEIGHT, Rgba([255, 255, 255, 255])),
            cursor: 0,
        }
    }

    fn paste(&mut self, card: &CardImage, grid: &SlotGrid) {
        let slot = grid.slots()[self.cursor];
        paste_masked(&mut self.pixels, card.pixels(), slot.x, slot.y);
        self.cursor += 1;
    }

    fn finish(self) -> Page {
        Page {
            raster: flatten_on_white(&self.pixels),
            filled_slots: self.cursor,
        }
    }
}

/// Lay `cards` out on pages, filling `grid` slots in order.
///
/// A page is flushed once every slot is used; a trailing partial page is kept and
/// an empty stream yields no pages. The first failing item aborts composition.
pub fn render_pages<I>(cards: I, grid: &SlotGrid) -> Result<Vec<Page>>
where
    I: IntoIterator<Item = Result<CardImage>>,
{
    let mut pages = Vec::new();
    let mut canvas: Option<Canvas> = None;

    for card in cards {
        let card = card?;
        let page = canvas.get_or_insert_with(Canvas::blank);
        page.paste(&card, grid);

        if page.cursor == grid.len() {
            if let Some(full) = canvas.take() {
                pages.push(full.finish());
                debug!("flushed page {}", pages.len());
            }
        }
    }

    if let Some(partial) = canvas.take() {
        debug!("flushed partial page with {} cards", partial.cursor);
        pages.push(partial.finish());
    }

    Ok(pages)
}

/// Paste `card` at (`x`, `y`) using its own alpha channel as the mask.
///
/// Only colour channels are blended; the page stays opaque.
fn paste_masked(page: &mut RgbaImage, card: &RgbaImage, x: u32, y: u32) {
    for (dx, dy, source) in card.enumerate_pixels() {
        let alpha = u32::from(source[3]);
        if alpha == 0 {
            continue;
        }
        let Some(target) = page.get_pixel_mut_checked(x + dx, y + dy) else {
            continue;
        };
        if alpha == 255 {
            *target = *source;
            continue;
        }
        for channel in 0..3 {
            let blended = u32::from(source[channel]) * alpha
                + u32::from(target[channel]) * (255 - alpha);
            target[channel] = ((blended + 127) / 255) as u8;
        }
    }
}

fn flatten_on_white(pixels: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        let Rgba([r, g, b, a]) = *pixels.get_pixel(x, y);
        let blend = |channel: u8| -> u8 {
            let alpha = u32::from(a);
            ((u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}
