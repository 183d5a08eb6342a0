//! PDF output.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfPageIndex};

use crate::error::{ReportError, ReportResult};
use crate::layout::{
    Align, Cell, ReportLayout, CELL_HEIGHT_MM, CELL_WIDTH_MM, FONT_SIZE_PT, MARGIN_MM,
    PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};

const PT_TO_MM: f32 = 25.4 / 72.0;
/// Gap between a cell's left edge and its text.
const CELL_PADDING_MM: f32 = 1.0;
/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH_EM: f32 = 0.5;
const LAYER_NAME: &str = "Report";

/// Write the layout as a PDF document using Helvetica.
pub fn render_pdf(layout: &ReportLayout) -> ReportResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
        };

        for cell in page.cells.iter().filter(|cell| !cell.text.is_empty()) {
            draw_cell(&doc, page_index, layer_index, &font, cell);
        }
    }

    doc.save_to_bytes().map_err(|e| ReportError::Pdf(e.to_string()))
}

fn draw_cell(
    doc: &PdfDocumentReference,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    font: &IndirectFontRef,
    cell: &Cell,
) {
    let x = match cell.align {
        Align::Left => MARGIN_MM + CELL_PADDING_MM,
        Align::Center => {
            let width = estimate_text_width_mm(&cell.text).min(CELL_WIDTH_MM);
            MARGIN_MM + (CELL_WIDTH_MM - width) / 2.0
        }
    };

    // Baseline sits a little below the vertical centre of the cell
    let font_mm = FONT_SIZE_PT * PT_TO_MM;
    let baseline_from_top = cell.y_mm + CELL_HEIGHT_MM / 2.0 + 0.3 * font_mm;
    // PDF user space starts at the bottom-left corner
    let y = PAGE_HEIGHT_MM - baseline_from_top;

    doc.get_page(page)
        .get_layer(layer)
        .use_text(cell.text.as_str(), FONT_SIZE_PT, Mm(x), Mm(y), font);
}

fn estimate_text_width_mm(text: &str) -> f32 {
    text.chars().count() as f32 * FONT_SIZE_PT * PT_TO_MM * AVG_GLYPH_WIDTH_EM
}
