//! Card normalization and page composition.

/// Page compositing onto the slot grid.
pub mod compositor;
/// Fixed sheet geometry.
pub mod layout;
/// Card image loading and corner masking.
pub mod normalize;
/// Quantity expansion into card streams.
pub mod sequence;

pub use compositor::{render_pages, Page};
pub use layout::{SlotGrid, SlotPosition};
pub use normalize::CardImage;
pub use sequence::{build_back_sequence, build_front_sequence, BackSequence, FrontSequence};
