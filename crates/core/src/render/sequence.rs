//! Lazy expansion of requested quantities into card image streams.
//!
//! Each card is decoded once and then handed out `count` times as independent
//! buffers. Streams are single-pass; build a new one to iterate again.

use std::slice;

use super::normalize::CardImage;
use crate::{
    error::Result,
    models::{CardAsset, QuantityMap},
};

/// One decoded card handed out a fixed number of times; the last copy moves the buffer.
struct Repeat {
    image: Option<CardImage>,
    remaining: u64,
}

impl Repeat {
    fn new(image: CardImage, count: u64) -> Self {
        Self {
            image: Some(image),
            remaining: count,
        }
    }

    fn next(&mut self) -> Option<CardImage> {
        match self.remaining {
            0 => None,
            1 => {
                self.remaining = 0;
                self.image.take()
            }
            _ => {
                self.remaining -= 1;
                self.image.clone()
            }
        }
    }
}

/// Front faces in catalog order, each repeated by its requested count.
pub struct FrontSequence<'a> {
    cards: slice::Iter<'a, CardAsset>,
    quantities: &'a QuantityMap,
    current: Option<Repeat>,
    failed: bool,
}

/// Start the front stream for `cards`; cards with a zero count are skipped.
pub fn build_front_sequence<'a>(
    cards: &'a [CardAsset],
    quantities: &'a QuantityMap,
) -> FrontSequence<'a> {
    FrontSequence {
        cards: cards.iter(),
        quantities,
        current: None,
        failed: false,
    }
}

impl Iterator for FrontSequence<'_> {
    type Item = Result<CardImage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(image) = self.current.as_mut().and_then(Repeat::next) {
                return Some(Ok(image));
            }
            self.current = None;

            let card = self.cards.next()?;
            let count = self.quantities.count(&card.name);
            if count == 0 {
                continue;
            }

            match CardImage::normalize(&card.path) {
                Ok(image) => self.current = Some(Repeat::new(image, u64::from(count))),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// `count` copies of the back face.
pub struct BackSequence<'a> {
    card: &'a CardAsset,
    count: u64,
    current: Option<Repeat>,
    failed: bool,
}

/// Start the back stream; the image is decoded on the first pull.
pub fn build_back_sequence(card: &CardAsset, count: u64) -> BackSequence<'_> {
    BackSequence {
        card,
        count,
        current: None,
        failed: false,
    }
}

impl Iterator for BackSequence<'_> {
    type Item = Result<CardImage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if self.current.is_none() {
            if self.count == 0 {
                return None;
            }
            match CardImage::normalize(&self.card.path) {
                Ok(image) => {
                    self.current = Some(Repeat::new(image, self.count));
                    self.count = 0;
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }

        self.current.as_mut().and_then(Repeat::next).map(Ok)
    }
}
