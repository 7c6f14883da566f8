use printpdf::{
    BuiltinFont, FontId, Layer, Line, LinePoint, Mm, Op, ParsedFont, PdfDocument, PdfPage,
    PdfSaveOptions, Point, Pt, TextItem, TextMatrix, TextRenderingMode,
};

use crate::error::{AppError, Result};

use super::layout::{DrawOp, TableLayout};

const FONT_SIZE: f32 = 10.0;

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn text_ops(font: &FontId, x: f32, y: f32, text: &str) -> [Op; 6] {
    [
        Op::SetFontSize {
            size: Pt(FONT_SIZE),
            font: font.clone(),
        },
        Op::StartTextSection,
        Op::SetTextMatrix {
            matrix: TextMatrix::Translate(Pt(x), Pt(y)),
        },
        Op::SetTextRenderingMode {
            mode: TextRenderingMode::Fill,
        },
        Op::WriteText {
            items: vec![TextItem::Text(text.to_string())],
            font: font.clone(),
        },
        Op::EndTextSection,
    ]
}

/// Serializes a laid-out table into PDF bytes, one PDF page per layout page.
pub fn render_pdf(title: &str, layout: &TableLayout) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(title);
    let layer_id = doc.add_layer(&Layer::new("Table"));

    let font_bytes = BuiltinFont::Helvetica.get_subset_font().bytes;
    let font = ParsedFont::from_bytes(&font_bytes, 0, &mut Vec::new())
        .ok_or_else(|| AppError::Render("failed to load the built-in Helvetica font".to_string()))?;
    let font_id = doc.add_font(&font);

    for page in &layout.pages {
        let mut ops = vec![Op::BeginLayer {
            layer_id: layer_id.clone(),
        }];
        for op in &page.ops {
            match op {
                DrawOp::Line { x1, y1, x2, y2 } => ops.push(Op::DrawLine {
                    line: Line {
                        points: vec![point(*x1, *y1), point(*x2, *y2)],
                        is_closed: false,
                    },
                }),
                DrawOp::Text { x, y, text } => ops.extend(text_ops(&font_id, *x, *y, text)),
            }
        }
        ops.push(Op::EndLayer {
            layer_id: layer_id.clone(),
        });

        doc.pages.push(PdfPage::new(
            pt_to_mm(layout.width),
            pt_to_mm(layout.height),
            ops,
        ));
    }

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        tracing::debug!("PDF generation produced {} warnings", warnings.len());
    }

    Ok(bytes)
}
