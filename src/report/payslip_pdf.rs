//! Paginated PDF payslip: one page layered on a single payroll record.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::error::ApiError;
use crate::model::payroll::PayrollRecord;
use crate::model::payslip::Payslip;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;

struct Page {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
}

impl Page {
    fn heading(&mut self, text: &str) {
        self.layer
            .use_text(text, 14.0, Mm(MARGIN), Mm(self.cursor), &self.bold);
        self.cursor -= LINE_HEIGHT * 1.5;
    }

    fn line(&mut self, text: &str) {
        self.layer
            .use_text(text, 10.0, Mm(MARGIN), Mm(self.cursor), &self.regular);
        self.cursor -= LINE_HEIGHT;
    }

    fn amount_line(&mut self, label: &str, amount: f64) {
        self.layer
            .use_text(label, 10.0, Mm(MARGIN), Mm(self.cursor), &self.regular);
        self.layer.use_text(
            format!("{:>14.2}", amount),
            10.0,
            Mm(PAGE_WIDTH - MARGIN - 35.0),
            Mm(self.cursor),
            &self.regular,
        );
        self.cursor -= LINE_HEIGHT;
    }

    fn section(&mut self, title: &str) {
        self.cursor -= LINE_HEIGHT * 0.5;
        self.layer
            .use_text(title, 11.0, Mm(MARGIN), Mm(self.cursor), &self.bold);
        self.cursor -= LINE_HEIGHT;
    }
}

/// Render one payroll+payslip pair as a single-page PDF.
pub fn render_payslip(payroll: &PayrollRecord, payslip: &Payslip) -> Result<Vec<u8>, ApiError> {
    let (doc, page_idx, layer_idx) = PdfDocument::new(
        format!("Payslip #{}", payslip.id),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "payslip",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ApiError::internal(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ApiError::internal(format!("PDF font error: {e}")))?;

    let mut page = Page {
        layer: doc.get_page(page_idx).get_layer(layer_idx),
        regular,
        bold,
        cursor: PAGE_HEIGHT - MARGIN,
    };

    page.heading("PAYSLIP");
    page.line(&format!(
        "Cutoff period: {} to {}",
        payslip.cutoff_start, payslip.cutoff_end
    ));
    page.line(&format!("Generated: {}", payslip.generated_at));

    page.section("Employee");
    page.line(&format!("Name: {}", payslip.employee_name));
    page.line(&format!("Employee ID: {}", payroll.employee_id));
    page.line(&format!("Payroll record: #{}", payroll.id));
    page.line(&format!("Status: {}", payroll.status));

    // Overtime pay is not persisted separately; back it out of the stored
    // gross and the other earning components.
    let overtime_pay = crate::payroll::round2(
        payroll.gross_pay - payroll.basic_salary - payroll.holiday_pay
            - payroll.night_differential
            - payroll.salary_adjustment
            + payroll.absences
            + payroll.late_deductions,
    )
    .max(0.0);

    page.section("Earnings");
    page.amount_line("Basic salary", payroll.basic_salary);
    page.amount_line(
        &format!("Overtime ({} hrs)", payroll.overtime_hours),
        overtime_pay,
    );
    page.amount_line("Holiday pay", payroll.holiday_pay);
    page.amount_line("Night differential", payroll.night_differential);
    page.amount_line("Salary adjustment", payroll.salary_adjustment);

    page.section("Deductions");
    page.amount_line("Absences", payroll.absences);
    page.amount_line("Late", payroll.late_deductions);
    page.amount_line("SSS", payroll.sss);
    page.amount_line("PhilHealth", payroll.philhealth);
    page.amount_line("Pag-IBIG", payroll.pagibig);
    page.amount_line("Withholding tax", payroll.withholding_tax);

    page.section("Summary");
    page.amount_line("Gross pay", payroll.gross_pay);
    page.amount_line("Total deductions", payroll.total_deductions);
    page.amount_line("NET PAY", payroll.net_pay);

    doc.save_to_bytes()
        .map_err(|e| ApiError::internal(format!("PDF render error: {e}")))
}

/// Download name for a rendered payslip.
pub fn payslip_filename(payslip: &Payslip) -> String {
    format!(
        "Payslip_{}_{}_to_{}.pdf",
        payslip.id, payslip.cutoff_start, payslip.cutoff_end
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payroll::PayrollStatus;
    use chrono::NaiveDate;

    #[test]
    fn renders_a_non_empty_pdf() {
        let date = |d: u32| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let payroll = PayrollRecord {
            id: 42,
            employee_id: 1,
            employee_name: "Juan Dela Cruz".to_string(),
            cutoff_start: date(1),
            cutoff_end: date(15),
            basic_salary: 25_000.0,
            worked_hours: 160.0,
            overtime_hours: 0.0,
            rest_day_ot_hours: 0.0,
            regular_ot_hours: 0.0,
            holiday_pay: 0.0,
            night_differential: 0.0,
            salary_adjustment: 0.0,
            absences: 0.0,
            late_deductions: 0.0,
            sss: 1_500.0,
            philhealth: 625.0,
            pagibig: 200.0,
            withholding_tax: 274.65,
            gross_pay: 25_000.0,
            total_deductions: 2_599.65,
            net_pay: 22_400.35,
            status: PayrollStatus::Processed,
            offset_hours: 0.0,
            holiday_offset_hours: 0.0,
            other_leave_hours: 0.0,
            daily_hours: None,
            special_holiday_hours: None,
            created_at: date(16).and_hms_opt(8, 0, 0).unwrap(),
            updated_at: date(16).and_hms_opt(8, 0, 0).unwrap(),
        };
        let payslip = Payslip {
            id: 7,
            payroll_id: 42,
            employee_name: "Juan Dela Cruz".to_string(),
            cutoff_start: date(1),
            cutoff_end: date(15),
            net_pay: 22_400.35,
            generated_at: date(16).and_hms_opt(8, 0, 0).unwrap(),
        };

        let bytes = render_payslip(&payroll, &payslip).expect("pdf");
        assert!(!bytes.is_empty());
        assert_eq!(payslip_filename(&payslip), "Payslip_7_2024-01-01_to_2024-01-15.pdf");
    }
}
