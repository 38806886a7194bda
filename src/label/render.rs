// Copyright 2023 Remi Bernotavicius

use super::content::DrawOp;
use super::font::LabelFont;
use super::layout::CellOrigin;
use super::preset::PageSize;
use super::{Error, Result};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

const LAYER_NAME: &str = "Labels";

fn pdf_error(error: printpdf::Error) -> Error {
    Error::Pdf(error.to_string())
}

fn add_font(doc: &PdfDocumentReference, font: &LabelFont) -> Result<IndirectFontRef> {
    if let LabelFont::Embedded(embedded) = font {
        match doc.add_external_font(embedded.bytes.as_slice()) {
            Ok(font_ref) => return Ok(font_ref),
            Err(error) => log::warn!(
                "couldn't embed {}, using Helvetica: {error}",
                embedded.path.display()
            ),
        }
    }
    doc.add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)
}

fn draw_line(layer: &PdfLayerReference, points: &[(f32, f32)], is_closed: bool) {
    let points = points
        .iter()
        .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
        .collect();
    layer.add_line(Line { points, is_closed });
}

fn draw_cell(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    origin: &CellOrigin,
    ops: &[DrawOp],
) {
    let (ox, oy) = (origin.x, origin.y);
    for op in ops {
        match op {
            DrawOp::Text { x, y, size, text } => {
                layer.use_text(text.as_str(), *size, Mm(ox + x), Mm(oy + y), font);
            }
            DrawOp::Line {
                from,
                to,
                thickness,
            } => {
                layer.set_outline_thickness(*thickness);
                draw_line(
                    layer,
                    &[(ox + from.0, oy + from.1), (ox + to.0, oy + to.1)],
                    false,
                );
            }
            DrawOp::Border {
                width,
                height,
                thickness,
            } => {
                layer.set_outline_thickness(*thickness);
                draw_line(
                    layer,
                    &[
                        (ox, oy),
                        (ox + width, oy),
                        (ox + width, oy + height),
                        (ox, oy + height),
                    ],
                    true,
                );
            }
        }
    }
}

/// Draws `ops` once per cell and returns the finished PDF. A job with no cells still produces
/// a single blank page.
pub fn render(
    title: &str,
    page: &PageSize,
    pages: &[Vec<CellOrigin>],
    ops: &[DrawOp],
    font: &LabelFont,
) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(page.width), Mm(page.height), LAYER_NAME);
    let font_ref = add_font(&doc, font)?;

    for (n, cells) in pages.iter().enumerate() {
        let layer = if n == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(page.width), Mm(page.height), LAYER_NAME);
            doc.get_page(p).get_layer(l)
        };
        layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        for origin in cells {
            draw_cell(&layer, &font_ref, origin, ops);
        }
    }
    log::debug!("rendered {} page(s)", pages.len().max(1));

    doc.save_to_bytes().map_err(pdf_error)
}
