//! Serializes the aggregator's sheets into a binary xlsx workbook.
//!
//! Thin formatting layer: sheet order, header styling and column widths
//! only. What every cell holds is decided by the aggregator.

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};

use crate::report::aggregator::{Cell, DateRange, Sheet, TimekeepingReport};
use crate::payroll::tables::ContributionTable;

/// Download name convention for the timekeeping export.
pub fn workbook_filename(range: &DateRange) -> String {
    format!("Timekeeping-Data_{}_to_{}.xlsx", range.start, range.end)
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

fn write_sheet(workbook: &mut Workbook, sheet: &Sheet) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    let header = header_format();
    let hours = Format::new().set_num_format("0.00");

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                Cell::Text(text) if row_idx == 0 => {
                    worksheet.write_string_with_format(r, c, text, &header)?;
                }
                Cell::Text(text) => {
                    worksheet.write_string(r, c, text)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number_with_format(r, c, *value, &hours)?;
                }
                Cell::Empty => {}
            }
        }
    }

    for (col_idx, width) in sheet.col_widths.iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, *width)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    Ok(())
}

/// Static reference sheet: the effective-year SSS schedule plus the
/// percentage rules applied outside it.
fn write_reference_sheet(
    workbook: &mut Workbook,
    tables: &dyn ContributionTable,
) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Contributions")?;

    let header = header_format();
    let money = Format::new().set_num_format("0.00");

    let headers = ["Bracket", "Salary From", "Salary To", "EE Share", "ER Share"];
    for (col, text) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *text, &header)?;
    }

    let schedule = tables.sss_schedule();
    for (idx, bracket) in schedule.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_number(row, 0, (idx + 1) as f64)?;
        worksheet.write_number_with_format(row, 1, bracket.min, &money)?;
        if bracket.max == f64::MAX {
            worksheet.write_string(row, 2, "and above")?;
        } else {
            worksheet.write_number_with_format(row, 2, bracket.max, &money)?;
        }
        worksheet.write_number_with_format(row, 3, bracket.employee_share, &money)?;
        worksheet.write_number_with_format(row, 4, bracket.employer_share, &money)?;
    }

    let notes_start = (schedule.len() + 2) as u32;
    let notes = [
        format!("SSS salary-bracket schedule, {} revision.", tables.year()),
        "PhilHealth: 2.5% employee share of monthly basic (floor 10,000.00, ceiling 100,000.00).".to_string(),
        "Pag-IBIG: 1% employee share up to 1,500.00 monthly, otherwise 2%, fund salary capped at 10,000.00.".to_string(),
        "Withholding tax: TRAIN graduated monthly schedule on basic net of statutory contributions.".to_string(),
    ];
    for (i, note) in notes.iter().enumerate() {
        worksheet.write_string(notes_start + i as u32, 0, note)?;
    }

    worksheet.set_column_width(0, 10)?;
    for col in 1..5 {
        worksheet.set_column_width(col, 14)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    Ok(())
}

/// Emit the workbook: the contribution reference sheet first, then the
/// aggregator's sheets in their fixed order.
pub fn write_workbook(
    report: &TimekeepingReport,
    tables: &dyn ContributionTable,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    write_reference_sheet(&mut workbook, tables)?;
    for sheet in &report.sheets {
        write_sheet(&mut workbook, sheet)?;
    }
    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::tables::DEFAULT_TABLES;
    use crate::report::aggregator::Cell;
    use chrono::NaiveDate;

    #[test]
    fn filename_follows_the_export_convention() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        };
        assert_eq!(
            workbook_filename(&range),
            "Timekeeping-Data_2024-01-01_to_2024-01-15.xlsx"
        );
    }

    #[test]
    fn workbook_serializes_to_a_non_empty_buffer() {
        let report = TimekeepingReport {
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            },
            sheets: vec![Sheet {
                name: "Daily Hours".to_string(),
                col_widths: vec![10.0, 28.0],
                rows: vec![
                    vec![Cell::Text("Code".into()), Cell::Text("Employee Name".into())],
                    vec![Cell::Text("EMP001".into()), Cell::Text("Alice".into())],
                ],
            }],
        };
        let bytes = write_workbook(&report, &DEFAULT_TABLES).expect("workbook");
        assert!(!bytes.is_empty());
    }
}
