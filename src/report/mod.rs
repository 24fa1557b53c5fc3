pub mod aggregator;
pub mod payslip_pdf;
pub mod workbook;
