use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::models::{SalesReport, format_rupiah};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 20.0;
const MARGIN_TOP: f32 = 277.0;
const MARGIN_BOTTOM: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, printpdf::Error> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(PdfWriter {
            doc,
            layer,
            regular,
            bold,
            y: MARGIN_TOP,
        })
    }

    fn line(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        if self.y < MARGIN_BOTTOM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = MARGIN_TOP;
        }
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN_LEFT + indent), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT / 2.0;
    }

    fn finish(self) -> Result<Vec<u8>, printpdf::Error> {
        self.doc.save_to_bytes()
    }
}

/// Renders the sales report as an A4 PDF: one block per completed order,
/// then the aggregate totals. An empty range renders a "no data" row.
pub fn render(report: &SalesReport) -> Result<Vec<u8>, printpdf::Error> {
    let mut writer = PdfWriter::new("Laporan Penjualan")?;

    writer.line("Laporan Penjualan", 16.0, true, 0.0);
    writer.line(
        &format!(
            "Periode: {} s/d {}",
            report.start_date.format("%d %b %Y"),
            report.end_date.format("%d %b %Y"),
        ),
        10.0,
        false,
        0.0,
    );
    writer.line(
        &format!("Dicetak: {}", report.generated_at.format("%d %b %Y %H:%M")),
        10.0,
        false,
        0.0,
    );
    writer.gap();

    if report.lines.is_empty() {
        writer.line("Tidak ada data untuk periode ini.", 11.0, false, 0.0);
    }

    for line in &report.lines {
        writer.line(
            &format!(
                "#{}  {}  {}  {}",
                line.order_id,
                line.order_date.format("%d %b %Y"),
                line.buyer_name,
                format_rupiah(line.total),
            ),
            11.0,
            true,
            0.0,
        );
        for item in &line.items {
            writer.line(
                &format!(
                    "{} x {}  ({})",
                    item.quantity,
                    item.name,
                    format_rupiah(item.subtotal),
                ),
                10.0,
                false,
                6.0,
            );
        }
        writer.gap();
    }

    writer.gap();
    writer.line(
        &format!("Jumlah Pesanan: {}", report.total_orders),
        11.0,
        true,
        0.0,
    );
    writer.line(
        &format!("Total Pendapatan: {}", format_rupiah(report.total_revenue)),
        11.0,
        true,
        0.0,
    );

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::models::build_report;
    use chrono::NaiveDate;

    #[test]
    fn renders_a_pdf_for_an_empty_report() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
        let generated = end.and_hms_opt(12, 0, 0).unwrap();

        let report = build_report(start, end, generated, Vec::new());
        let bytes = render(&report).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }
}
