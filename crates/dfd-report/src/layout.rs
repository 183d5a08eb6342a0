//! Paginated cell layout.
//!
//! A report is a column of fixed-size text cells on A4 pages. Positions are
//! measured in millimetres from the top-left corner of the page.

use dfd_models::{ResultRecord, ResultShapeError};

use crate::text::entry_lines;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;
/// Space kept free at the bottom of every page.
pub const BOTTOM_MARGIN_MM: f32 = 20.0;
pub const CELL_WIDTH_MM: f32 = 200.0;
pub const CELL_HEIGHT_MM: f32 = 10.0;
pub const FONT_SIZE_PT: f32 = 12.0;

pub const REPORT_TITLE: &str = "Deepfake Detection Report";

/// Horizontal alignment of a cell's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One line of text placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub align: Align,
    /// Distance of the cell's top edge from the top of the page
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub cells: Vec<Cell>,
}

/// Report pages ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub pages: Vec<Page>,
}

impl ReportLayout {
    /// Lay out the header followed by one section per analyzed video.
    pub fn build(model_path: &str, result: &ResultRecord) -> Result<Self, ResultShapeError> {
        let entries = result.entries()?;
        let mut builder = LayoutBuilder::new();

        builder.push(REPORT_TITLE, Align::Center);
        builder.push(format!("Model: {}", model_path), Align::Left);
        builder.push("Results:", Align::Left);

        for entry in &entries {
            for line in entry_lines(entry) {
                builder.push(line, Align::Left);
            }
            builder.push("", Align::Left);
        }

        Ok(Self {
            title: REPORT_TITLE.to_string(),
            pages: builder.finish(),
        })
    }

    /// All cell texts in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|page| page.cells.iter().map(|cell| cell.text.as_str()))
    }
}

struct LayoutBuilder {
    pages: Vec<Page>,
    cursor_mm: f32,
}

impl LayoutBuilder {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            cursor_mm: MARGIN_MM,
        }
    }

    fn push(&mut self, text: impl Into<String>, align: Align) {
        if self.cursor_mm + CELL_HEIGHT_MM > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.pages.push(Page::default());
            self.cursor_mm = MARGIN_MM;
        }

        let cell = Cell {
            text: text.into(),
            align,
            y_mm: self.cursor_mm,
        };
        // pages is never empty
        if let Some(page) = self.pages.last_mut() {
            page.cells.push(cell);
        }
        self.cursor_mm += CELL_HEIGHT_MM;
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}

/// Cells that fit on one page.
pub fn cells_per_page() -> usize {
    ((PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM - MARGIN_MM) / CELL_HEIGHT_MM) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfd_models::VideoEntry;

    fn record(count: usize) -> ResultRecord {
        let mut record = ResultRecord::new();
        for i in 0..count {
            record.store(VideoEntry {
                name: format!("video_{i}.mp4"),
                pred: 0.9,
                klass: "uncategorized".to_string(),
                pred_label: "FAKE".to_string(),
                correct_label: "0".to_string(),
            });
        }
        record
    }

    #[test]
    fn test_empty_result_is_header_only() {
        let layout = ReportLayout::build("cvit2.pth", &ResultRecord::new()).unwrap();

        assert_eq!(layout.pages.len(), 1);
        let lines: Vec<_> = layout.lines().collect();
        assert_eq!(lines, vec!["Deepfake Detection Report", "Model: cvit2.pth", "Results:"]);
        assert_eq!(layout.pages[0].cells[0].align, Align::Center);
        assert_eq!(layout.pages[0].cells[1].align, Align::Left);
    }

    #[test]
    fn test_sections_follow_name_order() {
        let layout = ReportLayout::build("m.pth", &record(2)).unwrap();
        let lines: Vec<_> = layout.lines().collect();

        assert_eq!(lines.len(), 3 + 2 * 6);
        assert_eq!(lines[3], "Video: video_0.mp4");
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "Video: video_1.mp4");
        assert_eq!(lines[13], "Correct Label: 0");
    }

    #[test]
    fn test_cells_advance_down_the_page() {
        let layout = ReportLayout::build("m.pth", &record(1)).unwrap();
        let cells = &layout.pages[0].cells;

        assert_eq!(cells[0].y_mm, MARGIN_MM);
        assert_eq!(cells[1].y_mm, MARGIN_MM + CELL_HEIGHT_MM);
    }

    #[test]
    fn test_long_results_paginate() {
        // 3 header cells + 6 per video
        let layout = ReportLayout::build("m.pth", &record(10)).unwrap();
        let total: usize = 3 + 10 * 6;
        let per_page = cells_per_page();

        assert_eq!(per_page, 26);
        assert_eq!(layout.pages.len(), total.div_ceil(per_page));
        assert_eq!(layout.pages[0].cells.len(), per_page);
        assert_eq!(layout.pages[1].cells[0].y_mm, MARGIN_MM);
        assert_eq!(layout.lines().count(), total);
    }

    #[test]
    fn test_malformed_result_is_rejected() {
        let mut result = record(1);
        result.video.klass.push("extra".to_string());
        assert!(ReportLayout::build("m.pth", &result).is_err());
    }
}
