//! Table layout for the query report.
//!
//! Layout is computed as plain drawing operations in PDF points (origin at the
//! bottom-left corner) so that pagination can be checked without producing a
//! PDF. A `Cursor` carries the current vertical position from one drawing
//! step to the next.

use crate::error::{AppError, Result};

/// US letter, in points.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

const MARGIN_X: f32 = 40.0;
const MARGIN_TOP: f32 = 50.0;
const MARGIN_BOTTOM: f32 = 50.0;
const HEADER_HEIGHT: f32 = 20.0;
const LINE_HEIGHT: f32 = 15.0;
const TEXT_DROP: f32 = 13.0;
const CELL_PADDING: f32 = 5.0;
/// Average glyph advance at the report font size, used to size wrapped lines.
const GLYPH_WIDTH: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Text { x: f32, y: f32, text: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    pub ops: Vec<DrawOp>,
}

impl LayoutPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Line { .. } => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<LayoutPage>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    y: f32,
}

impl Cursor {
    fn top() -> Self {
        Self {
            y: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    fn fits(self, height: f32) -> bool {
        self.y - height >= MARGIN_BOTTOM
    }

    fn advance(self, height: f32) -> Self {
        Self { y: self.y - height }
    }

    /// Whole text lines that still fit above the bottom margin.
    fn lines_left(self) -> usize {
        ((self.y - MARGIN_BOTTOM) / LINE_HEIGHT).floor().max(0.0) as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct Grid {
    columns: usize,
    column_width: f32,
    wrap_width: usize,
}

impl Grid {
    fn new(columns: usize) -> Self {
        let column_width = (PAGE_WIDTH - 2.0 * MARGIN_X) / columns as f32;
        let wrap_width = ((column_width / GLYPH_WIDTH) - CELL_PADDING).floor().max(1.0) as usize;
        Self {
            columns,
            column_width,
            wrap_width,
        }
    }

    fn column_x(&self, index: usize) -> f32 {
        MARGIN_X + index as f32 * self.column_width
    }

    fn right_edge(&self) -> f32 {
        self.column_x(self.columns)
    }

    /// Top and bottom rules plus a vertical rule at every column boundary.
    fn rule_box(&self, top: f32, height: f32) -> Vec<DrawOp> {
        let bottom = top - height;
        let mut ops = vec![
            DrawOp::Line {
                x1: MARGIN_X,
                y1: top,
                x2: self.right_edge(),
                y2: top,
            },
            DrawOp::Line {
                x1: MARGIN_X,
                y1: bottom,
                x2: self.right_edge(),
                y2: bottom,
            },
        ];
        ops.extend((0..=self.columns).map(|i| {
            let x = self.column_x(i);
            DrawOp::Line {
                x1: x,
                y1: top,
                x2: x,
                y2: bottom,
            }
        }));
        ops
    }
}

fn draw_header(grid: &Grid, columns: &[String], cursor: Cursor) -> (Vec<DrawOp>, Cursor) {
    let mut ops = grid.rule_box(cursor.y, HEADER_HEIGHT);
    ops.extend(columns.iter().enumerate().map(|(i, label)| DrawOp::Text {
        x: grid.column_x(i) + CELL_PADDING,
        y: cursor.y - TEXT_DROP,
        text: label.clone(),
    }));
    (ops, cursor.advance(HEADER_HEIGHT))
}

fn wrap_cells(grid: &Grid, row: &[String]) -> Vec<Vec<String>> {
    row.iter()
        .map(|cell| {
            textwrap::wrap(cell, grid.wrap_width)
                .into_iter()
                .map(|line| line.into_owned())
                .collect()
        })
        .collect()
}

fn row_height(wrapped: &[Vec<String>]) -> f32 {
    let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
    LINE_HEIGHT * lines as f32
}

fn draw_row(grid: &Grid, wrapped: &[Vec<String>], cursor: Cursor) -> (Vec<DrawOp>, Cursor) {
    let height = row_height(wrapped);
    let mut ops = grid.rule_box(cursor.y, height);
    for (i, lines) in wrapped.iter().enumerate() {
        ops.extend(lines.iter().enumerate().map(|(j, line)| DrawOp::Text {
            x: grid.column_x(i) + CELL_PADDING,
            y: cursor.y - TEXT_DROP - j as f32 * LINE_HEIGHT,
            text: line.clone(),
        }));
    }
    (ops, cursor.advance(height))
}

/// Splits wrapped cells after `lines` lines; the tail continues on the next page.
fn split_wrapped(wrapped: Vec<Vec<String>>, lines: usize) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
    wrapped
        .into_iter()
        .map(|mut cell| {
            let tail = cell.split_off(lines.min(cell.len()));
            (cell, tail)
        })
        .unzip()
}

fn start_page(grid: &Grid, columns: &[String]) -> (LayoutPage, Cursor) {
    let (ops, cursor) = draw_header(grid, columns, Cursor::top());
    (LayoutPage { ops }, cursor)
}

/// Lays out a ruled table, breaking pages before a row that would cross the
/// bottom margin and repeating the header on every page. A row taller than a
/// page is split line by line across as many pages as it needs.
pub fn layout_table(columns: &[String], rows: &[Vec<String>]) -> Result<TableLayout> {
    if columns.is_empty() {
        return Err(AppError::Render("a table needs at least one column".to_string()));
    }
    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != columns.len())
    {
        return Err(AppError::Render(format!(
            "row {} has {} cells, expected {}",
            index,
            row.len(),
            columns.len()
        )));
    }

    let grid = Grid::new(columns.len());
    let mut pages = Vec::new();
    let (mut page, mut cursor) = start_page(&grid, columns);
    let mut rows_on_page = 0usize;

    let page_lines = Cursor::top().advance(HEADER_HEIGHT).lines_left();

    for (index, row) in rows.iter().enumerate() {
        let mut wrapped = wrap_cells(&grid, row);
        loop {
            let height = row_height(&wrapped);
            if cursor.fits(height) {
                let (ops, next) = draw_row(&grid, &wrapped, cursor);
                page.ops.extend(ops);
                cursor = next;
                rows_on_page += 1;
                break;
            }

            let room = cursor.lines_left();
            if height <= LINE_HEIGHT * page_lines as f32 || room == 0 {
                pages.push(std::mem::take(&mut page));
                (page, cursor) = start_page(&grid, columns);
                rows_on_page = 0;
                continue;
            }

            // Taller than a whole page: fill what is left and carry the rest over.
            tracing::warn!("report row {} is taller than a page, splitting it", index);
            let (head, tail) = split_wrapped(wrapped, room);
            let (ops, _) = draw_row(&grid, &head, cursor);
            page.ops.extend(ops);
            pages.push(std::mem::take(&mut page));
            (page, cursor) = start_page(&grid, columns);
            rows_on_page = 0;
            wrapped = tail;
        }
    }
    pages.push(page);

    Ok(TableLayout {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        pages,
    })
}
