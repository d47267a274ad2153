//! Page-image PDF export.
//!
//! The rendered template is laid out at A4 width, painted onto one tall
//! scratch page with the standard PDF fonts, and rasterised at
//! `export_scale × 96/72` pixels per point. The bitmap is then cut into
//! A4-proportioned slices, one per output page, each placed at the top-left
//! of an A4 page and scaled to the page width.
//!
//! The output is pixels: it matches the preview, and its text cannot be
//! selected or searched.
//!
//! ## Fonts
//!
//! By default text is painted with the standard PDF fonts (Helvetica, Times,
//! Courier). They carry WinAnsi glyphs only, so Cyrillic, Greek, CJK and most
//! symbols come out blank. Set [`RevampConfig::export_font`] to a TrueType file
//! with the needed coverage; it is embedded and used for every face. Layout
//! still measures with the standard-font metrics, so line breaks can differ
//! slightly from the font's own widths.
//!
//! [`RevampConfig::export_font`]: crate::config::RevampConfig::export_font
//!
//! ## Why spawn_blocking?
//!
//! Same reason as ingestion: pdfium is synchronous C++ and a tall canvas at
//! 2× takes a noticeable moment to rasterise.

use crate::error::ExportError;
use crate::pdfium;
use crate::record::ResumeRecord;
use crate::template::block::{FontFamily, Rgb};
use crate::template::layout::{self, Canvas, DrawOp, FontFace};
use crate::template::{self, RenderMode, Template, A4_HEIGHT_PT, A4_WIDTH_PT};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

const A4_WIDTH_MM: f64 = 210.0;
const A4_HEIGHT_MM: f64 = 297.0;

/// Stroke width for outlined rectangles.
const OUTLINE_PT: f32 = 0.75;

/// One output page's share of the rasterised canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub top: u32,
    pub height: u32,
}

/// Pixels per point at a given export scale (CSS px are 1/96 inch).
pub fn pixels_per_point(export_scale: f32) -> f32 {
    export_scale * 96.0 / 72.0
}

/// Height of one A4 page for an image `width_px` wide.
pub fn page_height_px(width_px: u32) -> u32 {
    ((width_px as f64 * A4_HEIGHT_MM / A4_WIDTH_MM).round() as u32).max(1)
}

/// Cut an image into A4-proportioned slices from the top. Always at least one
/// page; the last slice may be shorter than a full page.
pub fn paginate(width_px: u32, height_px: u32) -> Vec<PageSlice> {
    let page = page_height_px(width_px);
    let count = height_px.div_ceil(page).max(1);
    (0..count)
        .map(|i| {
            let top = i * page;
            PageSlice {
                top,
                height: page.min(height_px.saturating_sub(top)),
            }
        })
        .collect()
}

/// Render, rasterise and paginate. Returns the PDF bytes.
pub async fn export_pdf(
    record: &ResumeRecord,
    template: &Template,
    mode: RenderMode,
    export_scale: f32,
    export_font: Option<&Path>,
) -> Result<Vec<u8>, ExportError> {
    let font = match export_font {
        Some(path) => Some(tokio::fs::read(path).await.map_err(|e| {
            ExportError::FontUnavailable {
                path: path.display().to_string(),
                detail: e.to_string(),
            }
        })?),
        None => None,
    };
    let doc = template::render(record, template, mode);
    let canvas = layout::layout(&doc, A4_WIDTH_PT);
    debug!(
        "Laid out '{}' at {:.0}x{:.0} pt ({} ops)",
        template,
        canvas.width,
        canvas.height,
        canvas.ops.len()
    );
    tokio::task::spawn_blocking(move || export_blocking(&canvas, export_scale, font.as_deref()))
        .await
        .map_err(|e| ExportError::Internal(format!("Export task panicked: {}", e)))?
}

fn export_blocking(
    canvas: &Canvas,
    export_scale: f32,
    font: Option<&[u8]>,
) -> Result<Vec<u8>, ExportError> {
    let pdfium = pdfium::bind().map_err(ExportError::PdfiumUnavailable)?;
    let image = rasterise_canvas(&pdfium, canvas, export_scale, font)?;
    assemble(&pdfium, &image)
}

fn rasterise_canvas(
    pdfium: &Pdfium,
    canvas: &Canvas,
    export_scale: f32,
    font: Option<&[u8]>,
) -> Result<DynamicImage, ExportError> {
    let failed = |e: PdfiumError| ExportError::Rasterisation(format!("{:?}", e));

    let mut document = pdfium.create_new_pdf().map_err(failed)?;

    let embedded = match font {
        Some(bytes) => Some(
            document
                .fonts_mut()
                .load_true_type_from_bytes(bytes, true)
                .map_err(|e| ExportError::FontUnavailable {
                    path: "<export font>".into(),
                    detail: format!("{:?}", e),
                })?,
        ),
        None => None,
    };

    let mut fonts: HashMap<FontFace, PdfFontToken> = HashMap::new();
    let mut uncovered = 0usize;
    for op in &canvas.ops {
        if let DrawOp::Text { face, text, .. } = op {
            if embedded.is_none() && !standard_fonts_cover(text) {
                uncovered += 1;
            }
            fonts.entry(*face).or_insert_with(|| match embedded {
                Some(token) => token,
                None => standard_font(document.fonts_mut(), *face),
            });
        }
    }
    if uncovered > 0 {
        warn!(
            "{} text run(s) use characters the standard PDF fonts lack; \
they will be blank. Configure an export font to embed one.",
            uncovered
        );
    }

    let mut page = document
        .pages_mut()
        .create_page_at_end(PdfPagePaperSize::Custom(
            PdfPoints::new(canvas.width),
            PdfPoints::new(canvas.height),
        ))
        .map_err(failed)?;

    paint(&mut page, canvas, &fonts).map_err(failed)?;
    page.regenerate_content().map_err(failed)?;

    let scale = pixels_per_point(export_scale);
    let width_px = (canvas.width * scale).round() as i32;
    let height_px = (canvas.height * scale).round() as i32;
    let config = PdfRenderConfig::new()
        .set_target_width(width_px)
        .set_maximum_height(height_px);
    let image = page.render_with_config(&config).map_err(failed)?.as_image();
    debug!("Rasterised canvas → {}x{} px", image.width(), image.height());
    Ok(image)
}

/// Paint the draw list. Canvas coordinates run top-down; PDF runs bottom-up.
fn paint(
    page: &mut PdfPage,
    canvas: &Canvas,
    fonts: &HashMap<FontFace, PdfFontToken>,
) -> Result<(), PdfiumError> {
    let flip = |y: f32| PdfPoints::new(canvas.height - y);
    let objects = page.objects_mut();

    objects.create_path_object_rect(
        PdfRect::new_from_values(0.0, 0.0, canvas.height, canvas.width),
        None,
        None,
        Some(pdf_color(canvas.background)),
    )?;

    for op in &canvas.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                w,
                h,
                fill,
                stroke,
            } => {
                objects.create_path_object_rect(
                    PdfRect::new_from_values(canvas.height - (y + h), *x, canvas.height - y, x + w),
                    stroke.map(pdf_color),
                    stroke.map(|_| PdfPoints::new(OUTLINE_PT)),
                    fill.map(pdf_color),
                )?;
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                objects.create_path_object_line(
                    PdfPoints::new(*x1),
                    flip(*y1),
                    PdfPoints::new(*x2),
                    flip(*y2),
                    pdf_color(*color),
                    PdfPoints::new(*width),
                )?;
            }
            DrawOp::Circle { cx, cy, r, fill } => {
                objects.create_path_object_circle_at(
                    PdfPoints::new(*cx),
                    flip(*cy),
                    PdfPoints::new(*r),
                    None,
                    None,
                    Some(pdf_color(*fill)),
                )?;
            }
            DrawOp::Text {
                x,
                y,
                text,
                face,
                size,
                color,
            } => {
                let Some(font) = fonts.get(face) else {
                    continue;
                };
                let mut object = objects.create_text_object(
                    PdfPoints::new(*x),
                    flip(*y),
                    text,
                    *font,
                    PdfPoints::new(*size),
                )?;
                object.set_fill_color(pdf_color(*color))?;
            }
        }
    }
    Ok(())
}

/// Slice the bitmap onto A4 pages.
fn assemble(pdfium: &Pdfium, image: &DynamicImage) -> Result<Vec<u8>, ExportError> {
    let failed = |e: PdfiumError| ExportError::Encoding(format!("{:?}", e));

    let (width_px, height_px) = (image.width(), image.height());
    let slices = paginate(width_px, height_px);
    let fit = A4_WIDTH_PT / width_px.max(1) as f32;

    let mut document = pdfium.create_new_pdf().map_err(failed)?;
    for slice in &slices {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(failed)?;
        if slice.height == 0 {
            continue;
        }
        let piece = image.crop_imm(0, slice.top, width_px, slice.height);
        let height_pt = slice.height as f32 * fit;
        page.objects_mut()
            .create_image_object(
                PdfPoints::new(0.0),
                PdfPoints::new(A4_HEIGHT_PT - height_pt),
                &piece,
                Some(PdfPoints::new(A4_WIDTH_PT)),
                Some(PdfPoints::new(height_pt)),
            )
            .map_err(failed)?;
    }
    debug!("Assembled {} page(s)", slices.len());
    document.save_to_bytes().map_err(failed)
}

/// Characters of WinAnsi (cp1252) above ASCII that are not Latin-1.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

/// Whether every character of `text` has a glyph in the standard PDF fonts.
pub fn standard_fonts_cover(text: &str) -> bool {
    text.chars().all(|c| {
        matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}') || WIN_ANSI_EXTRAS.contains(c)
    })
}

fn standard_font(fonts: &mut PdfFonts, face: FontFace) -> PdfFontToken {
    match (face.family, face.bold, face.italic) {
        (FontFamily::Sans, false, false) => fonts.helvetica(),
        (FontFamily::Sans, true, false) => fonts.helvetica_bold(),
        (FontFamily::Sans, false, true) => fonts.helvetica_oblique(),
        (FontFamily::Sans, true, true) => fonts.helvetica_bold_oblique(),
        (FontFamily::Serif, false, false) => fonts.times_roman(),
        (FontFamily::Serif, true, false) => fonts.times_bold(),
        (FontFamily::Serif, false, true) => fonts.times_italic(),
        (FontFamily::Serif, true, true) => fonts.times_bold_italic(),
        (FontFamily::Mono, false, false) => fonts.courier(),
        (FontFamily::Mono, true, false) => fonts.courier_bold(),
        (FontFamily::Mono, false, true) => fonts.courier_oblique(),
        (FontFamily::Mono, true, true) => fonts.courier_bold_oblique(),
    }
}

fn pdf_color(rgb: Rgb) -> PdfColor {
    PdfColor::new(rgb.0, rgb.1, rgb.2, 255)
}
