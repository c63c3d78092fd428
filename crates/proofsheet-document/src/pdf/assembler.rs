// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page assembler — turn an ordered list of entries into a multi-page PDF using
// `printpdf` 0.8.
//
// Each kept entry becomes one page: header text at the top-left, then the
// entry's image rotated to match the page and placed by the containment
// layout. printpdf 0.8 builds pages from `Vec<Op>` lists and serialises the
// whole document with `PdfDocument::save()`; JPEG pages then get their
// original DCT data swapped back in.

use printpdf::{
    BuiltinFont, Color, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt,
    RawImage, RawImageData, RawImageFormat, Rgb, TextItem, XObjectTransform,
};
use proofsheet_core::config::PageSetup;
use proofsheet_core::error::ProofsheetError;
use proofsheet_core::{Entry, PageOrientation};
use tracing::{debug, error, info, instrument, warn};

use crate::image::{RasterEncoding, RotatedRaster, rotate_for_page};
use crate::layout::{self, Rect};
use crate::orientation;
use crate::pdf::jpeg::{JpegXObject, embed_dct_images};

/// Millimetres per typographic point.
const MM_PER_PT: f32 = 25.4 / 72.0;
/// Baseline-to-baseline distance as a multiple of the font size.
const LINE_SPACING: f32 = 1.2;
/// Average Helvetica-Bold glyph width as a fraction of the font size.
const AVG_CHAR_WIDTH_EM: f32 = 0.55;
/// Filename used when the job number is empty.
const FALLBACK_FILENAME: &str = "output";

/// Typography of one header line.
#[derive(Debug, Clone, Copy)]
struct HeaderStyle {
    size_pt: f32,
    rgb: (f32, f32, f32),
    wrap: bool,
}

const JOB_NUMBER_STYLE: HeaderStyle = HeaderStyle {
    size_pt: 20.0,
    rgb: (0.13, 0.13, 0.13),
    wrap: false,
};

const TITLE_STYLE: HeaderStyle = HeaderStyle {
    size_pt: 16.0,
    rgb: (0.05, 0.33, 0.65),
    wrap: true,
};

const SIZE_STYLE: HeaderStyle = HeaderStyle {
    size_pt: 13.0,
    rgb: (0.80, 0.20, 0.10),
    wrap: true,
};

/// A finished export: the PDF bytes and the name to save them under.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Header text laid out on a page.
pub struct HeaderLayout {
    /// Drawing operations for every header line.
    pub ops: Vec<Op>,
    /// Number of lines drawn (wrapped lines count individually).
    pub lines: usize,
    /// Distance from the page top to the bottom of the last line, in mm.
    pub bottom_mm: f32,
}

/// One kept entry with its page orientation decided.
struct PagePlan {
    entry: Entry,
    orientation: PageOrientation,
}

/// Builds proof documents from entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageAssembler {
    setup: PageSetup,
}

impl PageAssembler {
    pub fn new(setup: PageSetup) -> Self {
        Self { setup }
    }

    pub fn setup(&self) -> &PageSetup {
        &self.setup
    }

    /// Assemble and name the document.
    pub async fn export(
        &self,
        job_number: &str,
        entries: &[Entry],
    ) -> Result<ExportedDocument, ProofsheetError> {
        let bytes = self.assemble(job_number, entries).await?;
        let page_count = entries.iter().filter(|e| e.has_image()).count();
        Ok(ExportedDocument {
            filename: document_filename(job_number),
            bytes,
            page_count,
        })
    }

    /// Build the PDF for `entries`, one page per entry with an image, in
    /// order.
    ///
    /// Orientations are resolved for every page before the document exists.
    /// Images are decoded and rotated on the blocking pool one entry at a
    /// time. Any failure aborts the whole document.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn assemble(
        &self,
        job_number: &str,
        entries: &[Entry],
    ) -> Result<Vec<u8>, ProofsheetError> {
        let plans = plan_pages(entries)?;
        if plans.is_empty() {
            warn!("No entries with an image; nothing to assemble");
            return Err(ProofsheetError::EmptyDocument);
        }

        info!(pages = plans.len(), job_number, "Assembling proof document");

        let mut doc = PdfDocument::new(&document_title(job_number));
        let mut pages: Vec<PdfPage> = Vec::with_capacity(plans.len());
        let mut jpegs: Vec<JpegXObject> = Vec::new();

        for (index, plan) in plans.into_iter().enumerate() {
            let Some(source) = plan.entry.image.clone() else {
                continue;
            };
            let rotation = plan.entry.rotation;
            let orientation = plan.orientation;

            let (rotated, raw) = tokio::task::spawn_blocking(move || {
                let rotated = rotate_for_page(source.bytes(), rotation, orientation)?;
                let raw = raw_image(&rotated)?;
                Ok::<_, ProofsheetError>((rotated, raw))
            })
            .await
            .map_err(|err| ProofsheetError::Task(err.to_string()))?
            .inspect_err(|err| error!(page = index + 1, error = %err, "Aborting export"))?;

            let (page_w, page_h) = orientation.page_dimensions_mm(self.setup.paper);
            let header = layout_header(job_number, &plan.entry, page_w, page_h, &self.setup);
            let content = content_rect(&header, page_w, page_h, &self.setup);
            let placed = layout::place(
                content,
                rotated.aspect_ratio(),
                plan.entry.scale,
                plan.entry.offset_x,
                plan.entry.offset_y,
            );

            let xobject_id = doc.add_image(&raw);
            let mut ops = header.ops;
            ops.push(Op::UseXobject {
                id: xobject_id.clone(),
                transform: image_transform(&placed, &rotated, page_h),
            });

            debug!(
                page = index + 1,
                %orientation,
                rotation = rotated.applied.degrees(),
                x_mm = placed.x,
                y_mm = placed.y,
                w_mm = placed.width,
                h_mm = placed.height,
                "Page laid out"
            );

            pages.push(PdfPage::new(Mm(page_w), Mm(page_h), ops));
            if let RasterEncoding::Jpeg { .. } = rotated.encoding {
                jpegs.push(JpegXObject {
                    name: xobject_id.0,
                    width: rotated.width,
                    height: rotated.height,
                    bytes: rotated.bytes,
                });
            }
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        let output = tokio::task::spawn_blocking(move || embed_dct_images(output, jpegs))
            .await
            .map_err(|err| ProofsheetError::Task(err.to_string()))??;

        info!(bytes = output.len(), "Proof document assembled");
        Ok(output)
    }
}

/// Keep entries with an image and resolve each page orientation.
fn plan_pages(entries: &[Entry]) -> Result<Vec<PagePlan>, ProofsheetError> {
    entries
        .iter()
        .filter(|entry| entry.has_image())
        .map(|entry| {
            let orientation = orientation::resolve_entry(entry)?;
            Ok(PagePlan {
                entry: entry.clone(),
                orientation,
            })
        })
        .collect()
}

/// `"<job number>.pdf"`, or `"output.pdf"` when the job number is blank.
/// Path separators in the job number are replaced.
pub fn document_filename(job_number: &str) -> String {
    let trimmed = job_number.trim();
    let stem = if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.replace(['/', '\\'], "-")
    };
    format!("{stem}.pdf")
}

fn document_title(job_number: &str) -> String {
    match job_number.trim() {
        "" => "Proof".to_string(),
        job => format!("Proof {job}"),
    }
}

/// Lay out the header lines of a page, top to bottom, starting at the top
/// margin. Blank fields draw nothing and take no space.
pub fn layout_header(
    job_number: &str,
    entry: &Entry,
    page_w_mm: f32,
    page_h_mm: f32,
    setup: &PageSetup,
) -> HeaderLayout {
    let usable_w_mm = (page_w_mm - 2.0 * setup.margin_mm).max(0.0);
    let page_h_pt = Mm(page_h_mm).into_pt().0;

    let fields = [
        (Some(job_number), JOB_NUMBER_STYLE),
        (entry.title.as_deref(), TITLE_STYLE),
        (entry.size.as_deref(), SIZE_STYLE),
    ];

    let mut ops = Vec::new();
    let mut lines = 0;
    let mut cursor_mm = setup.margin_mm;

    for (text, style) in fields {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            continue;
        };

        let size_mm = style.size_pt * MM_PER_PT;
        let wrapped = if style.wrap {
            let char_w_mm = AVG_CHAR_WIDTH_EM * size_mm;
            wrap_text(text, ((usable_w_mm / char_w_mm) as usize).max(1))
        } else {
            vec![text.to_string()]
        };

        for line in wrapped {
            let baseline_mm = cursor_mm + size_mm;
            ops.push(Op::StartTextSection);
            ops.push(Op::SetFillColor {
                col: Color::Rgb(Rgb::new(style.rgb.0, style.rgb.1, style.rgb.2, None)),
            });
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Mm(setup.margin_mm).into_pt(),
                    y: Pt(page_h_pt - Mm(baseline_mm).into_pt().0),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(style.size_pt),
                font: BuiltinFont::HelveticaBold,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line)],
                font: BuiltinFont::HelveticaBold,
            });
            ops.push(Op::EndTextSection);

            cursor_mm += size_mm * LINE_SPACING;
            lines += 1;
        }
    }

    HeaderLayout {
        ops,
        lines,
        bottom_mm: cursor_mm,
    }
}

/// The image area: below the header (plus the gap when any line was drawn),
/// inside the side and bottom margins.
pub fn content_rect(
    header: &HeaderLayout,
    page_w_mm: f32,
    page_h_mm: f32,
    setup: &PageSetup,
) -> Rect {
    let top = if header.lines > 0 {
        header.bottom_mm + setup.header_gap_mm
    } else {
        setup.margin_mm
    };
    Rect {
        x: setup.margin_mm,
        y: top,
        width: (page_w_mm - 2.0 * setup.margin_mm).max(0.0),
        height: (page_h_mm - setup.margin_mm - top).max(0.0),
    }
}

/// Decode a rotated raster into printpdf's raw pixel form. PNG keeps alpha;
/// JPEG is placed as opaque RGB until its DCT data replaces it.
fn raw_image(rotated: &RotatedRaster) -> Result<RawImage, ProofsheetError> {
    let decoded = ::image::load_from_memory(&rotated.bytes)
        .map_err(|err| ProofsheetError::Decode(format!("rotated raster unreadable: {err}")))?;
    let (width, height) = (decoded.width() as usize, decoded.height() as usize);

    let (pixels, data_format) = match rotated.encoding {
        RasterEncoding::Png => (decoded.to_rgba8().into_raw(), RawImageFormat::RGBA8),
        RasterEncoding::Jpeg { .. } => (decoded.to_rgb8().into_raw(), RawImageFormat::RGB8),
    };

    Ok(RawImage {
        pixels: RawImageData::U8(pixels),
        width,
        height,
        data_format,
        tag: Vec::new(),
    })
}

/// Transform that draws the raster exactly over `placed` (top-left mm).
///
/// At 72 DPI one pixel is one point, so the scale is points per pixel.
fn image_transform(placed: &Rect, rotated: &RotatedRaster, page_h_mm: f32) -> XObjectTransform {
    let w_pt = Mm(placed.width).into_pt().0;
    let h_pt = Mm(placed.height).into_pt().0;
    let bottom_pt = Mm(page_h_mm - placed.bottom()).into_pt().0;

    XObjectTransform {
        translate_x: Some(Mm(placed.x).into_pt()),
        translate_y: Some(Pt(bottom_pt)),
        scale_x: Some(w_pt / rotated.width.max(1) as f32),
        scale_y: Some(h_pt / rotated.height.max(1) as f32),
        dpi: Some(72.0),
        rotate: None,
    }
}

// -- Text wrapping helper -----------------------------------------------------

/// Word-wrap `text` so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first. Words longer than `max_width` are
/// force-broken on character boundaries.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let mut current_line = String::with_capacity(max_width);
        let mut current_len = 0usize;

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        result.push(chunk.iter().collect());
                    } else {
                        current_line = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageProcessor;
    use crate::pdf::reader::PdfReader;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
    use proofsheet_core::{OrientationPreference, RasterHandle, Rotation, Scale};

    fn png_entry(width: u32, height: u32) -> Entry {
        let img = RgbaImage::from_pixel(width, height, Rgba([40, 90, 160, 255]));
        let bytes = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(img))
            .to_png_bytes()
            .unwrap();
        Entry {
            image: Some(RasterHandle::external(bytes)),
            ..Entry::new()
        }
    }

    fn jpeg_entry(width: u32, height: u32) -> Entry {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 200, 20]));
        let bytes = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .to_jpeg_bytes(90)
            .unwrap();
        Entry {
            image: Some(RasterHandle::external(bytes)),
            ..Entry::new()
        }
    }

    #[tokio::test]
    async fn pages_follow_entry_order_and_orientation() {
        let first = Entry {
            title: Some("Route 10".into()),
            size: Some("48x14".into()),
            ..png_entry(300, 100)
        };
        let second = jpeg_entry(100, 150);

        let assembler = PageAssembler::default();
        let bytes = assembler.assemble("J-1042", &[first, second]).await.unwrap();

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 2);
        assert_eq!(
            reader.page_orientations().unwrap(),
            vec![PageOrientation::Landscape, PageOrientation::Portrait]
        );

        let sizes = reader.page_sizes_pt().unwrap();
        let letter_long_pt = Mm(279.0).into_pt().0;
        assert!((sizes[0].0 - letter_long_pt).abs() < 1.0);
        assert!((sizes[1].1 - letter_long_pt).abs() < 1.0);
    }

    /// Decoded operations of every page's content stream.
    fn page_operations(bytes: &[u8]) -> Vec<Vec<lopdf::content::Operation>> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .into_values()
            .map(|page_id| {
                let content = doc.get_page_content(page_id).unwrap();
                lopdf::content::Content::decode(&content).unwrap().operations
            })
            .collect()
    }

    /// `/Filter` of every image XObject in the document.
    fn image_filters(bytes: &[u8]) -> Vec<Option<Vec<u8>>> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        doc.objects
            .values()
            .filter_map(|object| match object {
                lopdf::Object::Stream(stream)
                    if stream.dict.get(b"Subtype").and_then(lopdf::Object::as_name).ok()
                        == Some(b"Image".as_slice()) =>
                {
                    Some(
                        stream
                            .dict
                            .get(b"Filter")
                            .and_then(lopdf::Object::as_name)
                            .ok()
                            .map(<[u8]>::to_vec),
                    )
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn jpeg_pages_embed_dct_and_png_pages_stay_lossless() {
        let bytes = PageAssembler::default()
            .assemble("J-1", &[jpeg_entry(120, 80)])
            .await
            .unwrap();
        let filters = image_filters(&bytes);
        assert_eq!(filters, vec![Some(b"DCTDecode".to_vec())]);

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let jpeg = doc
            .objects
            .values()
            .find_map(|object| match object {
                lopdf::Object::Stream(stream)
                    if stream.dict.get(b"Filter").and_then(lopdf::Object::as_name).ok()
                        == Some(b"DCTDecode".as_slice()) =>
                {
                    Some(stream.content.clone())
                }
                _ => None,
            })
            .unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 80));

        let bytes = PageAssembler::default()
            .assemble("J-1", &[png_entry(120, 80)])
            .await
            .unwrap();
        assert!(
            image_filters(&bytes)
                .iter()
                .all(|filter| filter.as_deref() != Some(b"DCTDecode".as_slice()))
        );
    }

    #[tokio::test]
    async fn image_matrix_matches_layout_and_header_is_drawn() {
        let entry = Entry {
            title: Some("Route 10".into()),
            ..jpeg_entry(3000, 1000)
        };
        let bytes = PageAssembler::default()
            .assemble("J-1042", std::slice::from_ref(&entry))
            .await
            .unwrap();

        let setup = PageSetup::default();
        let (page_w, page_h) = PageOrientation::Landscape.page_dimensions_mm(setup.paper);
        let header = layout_header("J-1042", &entry, page_w, page_h, &setup);
        let content = content_rect(&header, page_w, page_h, &setup);
        let placed = layout::place(content, 3.0, entry.scale, entry.offset_x, entry.offset_y);
        let expected = [
            Mm(placed.width).into_pt().0,
            0.0,
            0.0,
            Mm(placed.height).into_pt().0,
            Mm(placed.x).into_pt().0,
            Mm(page_h - placed.bottom()).into_pt().0,
        ];

        let pages = page_operations(&bytes);
        assert_eq!(pages.len(), 1);
        let ops = &pages[0];

        let cm: Vec<f32> = ops
            .iter()
            .find(|op| op.operator == "cm")
            .unwrap()
            .operands
            .iter()
            .map(|operand| operand.as_float().unwrap())
            .collect();
        assert_eq!(cm.len(), 6);
        for (actual, wanted) in cm.iter().zip(expected) {
            assert!((actual - wanted).abs() < 0.05, "cm {cm:?}, expected {expected:?}");
        }
        assert!(content.contains(&placed, 1e-3));
        assert!(expected[5] >= Mm(setup.margin_mm).into_pt().0 - 0.05);

        let text_runs = ops
            .iter()
            .filter(|op| op.operator == "Tj" || op.operator == "TJ")
            .count();
        assert_eq!(text_runs, header.lines);
        assert_eq!(text_runs, 2);

        let title_blue = ops.iter().any(|op| {
            op.operator == "rg"
                && op
                    .operands
                    .iter()
                    .map(|o| o.as_float().unwrap())
                    .zip([0.05, 0.33, 0.65])
                    .all(|(a, b)| (a - b).abs() < 1e-3)
        });
        assert!(title_blue);
    }

    #[tokio::test]
    async fn entries_without_images_are_skipped() {
        let entries = vec![Entry::new(), png_entry(40, 60), Entry::new()];
        let exported = PageAssembler::default().export("", &entries).await.unwrap();
        assert_eq!(exported.page_count, 1);
        assert_eq!(exported.filename, "output.pdf");
        assert_eq!(PdfReader::from_bytes(&exported.bytes).unwrap().page_count(), 1);
    }

    #[tokio::test]
    async fn explicit_orientation_overrides_ratio() {
        let entry = Entry {
            orientation: OrientationPreference::Landscape,
            rotation: Rotation::Deg90,
            scale: Scale::new(70),
            ..png_entry(40, 60)
        };
        let bytes = PageAssembler::default().assemble("7", &[entry]).await.unwrap();
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_orientations().unwrap(), vec![PageOrientation::Landscape]);
    }

    #[tokio::test]
    async fn undecodable_image_aborts_export() {
        let broken = Entry {
            orientation: OrientationPreference::Portrait,
            image: Some(RasterHandle::external(b"broken".to_vec())),
            ..Entry::new()
        };
        let err = PageAssembler::default()
            .assemble("9", &[png_entry(20, 20), broken])
            .await
            .unwrap_err();
        assert!(matches!(err, ProofsheetError::Decode(_)));
    }

    #[tokio::test]
    async fn nothing_to_export_is_an_error() {
        let err = PageAssembler::default()
            .assemble("9", &[Entry::new()])
            .await
            .unwrap_err();
        assert!(matches!(err, ProofsheetError::EmptyDocument));
    }

    #[test]
    fn filename_derives_from_job_number() {
        assert_eq!(document_filename("  J-77 "), "J-77.pdf");
        assert_eq!(document_filename(""), "output.pdf");
        assert_eq!(document_filename("  "), "output.pdf");
        assert_eq!(document_filename("a/b\\c"), "a-b-c.pdf");
    }

    #[test]
    fn absent_header_fields_take_no_space() {
        let setup = PageSetup::default();
        let empty = layout_header("", &Entry::new(), 216.0, 279.0, &setup);
        assert_eq!(empty.lines, 0);
        assert!(empty.ops.is_empty());
        assert_eq!(empty.bottom_mm, setup.margin_mm);

        let content = content_rect(&empty, 216.0, 279.0, &setup);
        assert_eq!(content.y, setup.margin_mm);
        assert_eq!(content.height, 279.0 - 2.0 * setup.margin_mm);
    }

    #[test]
    fn header_lines_advance_the_cursor() {
        let setup = PageSetup::default();
        let job_only = layout_header("J-1", &Entry::new(), 216.0, 279.0, &setup);
        let with_title = layout_header(
            "J-1",
            &Entry {
                title: Some("Route 10".into()),
                size: Some("48x14".into()),
                ..Entry::new()
            },
            216.0,
            279.0,
            &setup,
        );
        assert_eq!(job_only.lines, 1);
        assert_eq!(with_title.lines, 3);
        assert!(with_title.bottom_mm > job_only.bottom_mm);

        let content = content_rect(&with_title, 216.0, 279.0, &setup);
        assert!((content.y - (with_title.bottom_mm + setup.header_gap_mm)).abs() < 1e-4);
        assert!((content.bottom() - (279.0 - setup.margin_mm)).abs() < 1e-3);
    }

    #[test]
    fn long_titles_wrap_to_page_width() {
        let setup = PageSetup::default();
        let entry = Entry {
            title: Some("Northbound interchange directional sign ".repeat(6)),
            ..Entry::new()
        };
        let header = layout_header("", &entry, 216.0, 279.0, &setup);
        assert!(header.lines > 1);
    }

    #[test]
    fn wrap_text_breaks_long_words() {
        assert_eq!(wrap_text("alpha beta gamma", 10), vec!["alpha beta", "gamma"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap_text("   ", 5).is_empty());
    }
}
