//! Fixed sheet geometry: an A4 portrait page at 300 dpi holding a 3×3 card grid.

/// Page width in pixels.
pub const PAGE_WIDTH: u32 = 3111;
/// Page height in pixels.
pub const PAGE_HEIGHT: u32 = 4404;
/// Raster resolution of the printed sheet.
pub const PAGE_DPI: u32 = 300;
/// Card width in pixels.
pub const CARD_WIDTH: u32 = 796;
/// Card height in pixels.
pub const CARD_HEIGHT: u32 = 1244;
/// Gap between neighbouring cards.
pub const CARD_SPACING: u32 = 0;
/// Requested corner radius of a card.
pub const CARD_CORNER_RADIUS: u32 = 36;
/// Cards per row.
pub const COLUMN_COUNT: u32 = 3;
/// Rows per page.
pub const ROW_COUNT: u32 = 3;
/// Slots on a single page.
pub const CARDS_PER_PAGE: usize = (COLUMN_COUNT * ROW_COUNT) as usize;

/// Top-left pixel coordinate of one grid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPosition {
    /// Horizontal offset from the left page edge.
    pub x: u32,
    /// Vertical offset from the top page edge.
    pub y: u32,
}

/// Ordered slot coordinates, row-major: row 0 left to right, then row 1, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    slots: Vec<SlotPosition>,
}

impl SlotGrid {
    /// The grid used for every printed sheet, centred within the page.
    pub fn a4() -> Self {
        let columns = axis_offsets(PAGE_WIDTH, CARD_WIDTH, COLUMN_COUNT);
        let rows = axis_offsets(PAGE_HEIGHT, CARD_HEIGHT, ROW_COUNT);

        let slots = rows
            .iter()
            .flat_map(|&y| columns.iter().map(move |&x| SlotPosition { x, y }))
            .collect();
        Self { slots }
    }

    /// Slot coordinates in fill order.
    pub fn slots(&self) -> &[SlotPosition] {
        &self.slots
    }

    /// Number of slots on one page.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false for grids built by [`SlotGrid::a4`].
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn axis_offsets(page: u32, card: u32, count: u32) -> Vec<u32> {
    let grid = count * card + count.saturating_sub(1) * CARD_SPACING;
    let margin = (f64::from(page) - f64::from(grid)) / 2.0;
    (0..count)
        .map(|index| (margin + f64::from(index * (card + CARD_SPACING))).round() as u32)
        .collect()
}
