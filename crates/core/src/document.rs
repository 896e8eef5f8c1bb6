//! Front/back document assembly and PDF serialization.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};
use image::codecs::jpeg::JpegEncoder;
use lopdf::{
    content::{Content, Operation},
    dictionary, Document as PdfDocument, Object, ObjectId, Stream,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    models::{GameAssets, QuantityMap},
    render::{
        build_back_sequence, build_front_sequence,
        layout::{PAGE_DPI, PAGE_HEIGHT, PAGE_WIDTH},
        render_pages, Page, SlotGrid,
    },
};

const JPEG_QUALITY: u8 = 95;
const POINTS_PER_INCH: f32 = 72.0;

/// Composed pages for one game selection: fronts first, then matching backs.
#[derive(Debug)]
pub struct Document {
    pages: Vec<Page>,
    front_page_count: usize,
}

impl Document {
    /// Compose the front and back pages for `quantities` entirely in memory.
    pub fn compose(game: &GameAssets, quantities: &QuantityMap, grid: &SlotGrid) -> Result<Self> {
        let total_front = quantities.total_for(&game.front_cards);
        if total_front == 0 {
            return Err(Error::EmptySelection);
        }

        let front_pages = render_pages(build_front_sequence(&game.front_cards, quantities), grid)?;
        let back_pages = render_pages(build_back_sequence(&game.back_card, total_front), grid)?;
        debug!(
            "{}: {} cards on {} front and {} back pages",
            game.name,
            total_front,
            front_pages.len(),
            back_pages.len()
        );

        let front_page_count = front_pages.len();
        let mut pages = front_pages;
        pages.extend(back_pages);
        if pages.is_empty() {
            return Err(Error::NoPagesProduced);
        }

        Ok(Self {
            pages,
            front_page_count,
        })
    }

    /// Every page in print order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Pages carrying front faces.
    pub fn front_pages(&self) -> &[Page] {
        &self.pages[..self.front_page_count]
    }

    /// Pages carrying back faces.
    pub fn back_pages(&self) -> &[Page] {
        &self.pages[self.front_page_count..]
    }

    /// Serialize to a paginated PDF at 300 dpi.
    ///
    /// The file is staged next to `path` and only moved into place once fully written.
    pub fn write_pdf(&self, path: &Path) -> Result<()> {
        let mut pdf = build_pdf(&self.pages)?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir).map_err(|err| Error::io(dir, err))?;
        pdf.save_to(&mut staged).map_err(|err| Error::io(path, err))?;
        staged
            .persist(path)
            .map_err(|err| Error::io(path, err.error))?;
        Ok(())
    }
}

/// Writes documents for a game selection into an output directory.
pub struct DocumentAssembler {
    output_dir: PathBuf,
    grid: SlotGrid,
}

impl DocumentAssembler {
    /// Create an assembler writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            grid: SlotGrid::a4(),
        }
    }

    /// Generate today's document for `game` and return its path.
    pub fn assemble(&self, game: &GameAssets, quantities: &QuantityMap) -> Result<PathBuf> {
        self.assemble_dated(game, quantities, Local::now().date_naive())
    }

    /// Generate the document for `game`, stamping its file name with `date`.
    ///
    /// Nothing is written when the selection is empty or any card fails to load.
    /// An existing document with the same name is overwritten.
    pub fn assemble_dated(
        &self,
        game: &GameAssets,
        quantities: &QuantityMap,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let document = Document::compose(game, quantities, &self.grid)?;

        fs::create_dir_all(&self.output_dir).map_err(|err| Error::io(&self.output_dir, err))?;
        let path = self.output_dir.join(document_file_name(&game.name, date));
        document.write_pdf(&path)?;

        info!(
            "wrote {} ({} pages)",
            path.display(),
            document.pages().len()
        );
        Ok(path)
    }
}

/// `<GAME>_<DD-MM-YYYY>.pdf` with the game name upper-cased.
pub fn document_file_name(game_name: &str, date: NaiveDate) -> String {
    format!("{}_{}.pdf", game_name.to_uppercase(), date.format("%d-%m-%Y"))
}

fn px_to_pt(pixels: u32) -> f32 {
    pixels as f32 * POINTS_PER_INCH / PAGE_DPI as f32
}

fn build_pdf(pages: &[Page]) -> Result<PdfDocument> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let width = px_to_pt(PAGE_WIDTH);
    let height = px_to_pt(PAGE_HEIGHT);

    let mut kids = Vec::with_capacity(pages.len());
    for (index, page) in pages.iter().enumerate() {
        let image_id = embed_raster(&mut doc, page, index)?;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(width),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(height),
                        Object::Real(0.0),
                        Object::Real(0.0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

fn embed_raster(doc: &mut PdfDocument, page: &Page, index: usize) -> Result<ObjectId> {
    let raster = page.raster();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY)
        .encode_image(raster)
        .map_err(|source| Error::Encode {
            page: index,
            source,
        })?;

    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(raster.width()),
            "Height" => i64::from(raster.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "DCTDecode",
        },
        encoded,
    );
    stream.allows_compression = false;
    Ok(doc.add_object(stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_upper_case_game_and_day_first_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(document_file_name("Foo Bar", date), "FOO BAR_07-03-2024.pdf");
    }

    #[test]
    fn page_size_matches_a4_at_300_dpi() {
        let width = px_to_pt(PAGE_WIDTH);
        let height = px_to_pt(PAGE_HEIGHT);
        assert!((width - 746.64).abs() < 0.01, "{width}");
        assert!((height - 1056.96).abs() < 0.01, "{height}");
    }
}
