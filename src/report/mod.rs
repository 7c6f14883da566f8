mod layout;
mod pdf;

pub use layout::{layout_table, DrawOp, LayoutPage, TableLayout, PAGE_HEIGHT, PAGE_WIDTH};
pub use pdf::render_pdf;

use crate::error::Result;
use crate::models::QueryTable;

/// Renders the time-range listing as a PDF table.
pub fn queries_pdf(table: &QueryTable) -> Result<Vec<u8>> {
    let columns: Vec<String> = table.columns.iter().map(|c| c.to_string()).collect();
    let layout = layout_table(&columns, &table.cell_rows())?;
    tracing::debug!(
        "Rendering {} queries over {} pages",
        table.rows.len(),
        layout.pages.len()
    );
    render_pdf("Queries", &layout)
}
