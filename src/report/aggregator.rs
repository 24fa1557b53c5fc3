//! Aggregates payroll records into the multi-sheet timekeeping export.
//!
//! Pure data shaping: records in, named tabular sheets out. The workbook
//! emitter turns the sheets into a binary spreadsheet; this module decides
//! what every cell holds.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::error::ApiError;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::payroll::PayrollRecord;
use crate::payroll::round2;

pub const UNKNOWN_EMPLOYEE: &str = "Unknown Employee";
const GRAND_TOTAL: &str = "GRAND TOTAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(s: impl Into<String>) -> Cell {
        Cell::Text(s.into())
    }
}

/// One worksheet-to-be: header row first, grand-total row (when present)
/// always the last data row, no separator rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub col_widths: Vec<f64>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug)]
pub struct TimekeepingReport {
    pub range: DateRange,
    pub sheets: Vec<Sheet>,
}

/// Row identity fixed once per report run and reused by every sheet, so
/// cross-references stay aligned.
struct RosterEntry<'a> {
    record: &'a PayrollRecord,
    code: String,
}

/// Inclusive interval overlap against the cutoff period.
fn overlaps(record: &PayrollRecord, filter: &DateRange) -> bool {
    record.cutoff_start <= filter.end && record.cutoff_end >= filter.start
}

/// Explicit filter wins; otherwise the min/max of the selected cutoffs;
/// otherwise the current calendar month.
fn effective_range(filter: Option<DateRange>, records: &[&PayrollRecord]) -> DateRange {
    if let Some(range) = filter {
        return range;
    }
    let start = records.iter().map(|r| r.cutoff_start).min();
    let end = records.iter().map(|r| r.cutoff_end).max();
    match (start, end) {
        (Some(start), Some(end)) => DateRange { start, end },
        _ => current_month(),
    }
}

fn current_month() -> DateRange {
    let today = Local::now().date_naive();
    let start = today.with_day(1).unwrap_or(today);
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let end = next_month
        .map(|d| d - Duration::days(1))
        .unwrap_or(today);
    DateRange { start, end }
}

fn days_in(range: &DateRange) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = range.start;
    while current <= range.end {
        days.push(current);
        current += Duration::days(1);
    }
    days
}

/// Sort by employee name case-insensitively (record id as tiebreak) and
/// assign each row its short code: the stored employee code when present,
/// otherwise EMP001, EMP002, ... in the sorted order.
fn build_roster<'a>(
    records: &[&'a PayrollRecord],
    employees: &HashMap<u64, Employee>,
) -> Vec<RosterEntry<'a>> {
    let mut sorted: Vec<&PayrollRecord> = records.to_vec();
    sorted.sort_by(|a, b| {
        a.employee_name
            .to_lowercase()
            .cmp(&b.employee_name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let stored = employees
                .get(&record.employee_id)
                .and_then(|e| e.employee_code.clone())
                .filter(|c| !c.is_empty());
            RosterEntry {
                record,
                code: stored.unwrap_or_else(|| format!("EMP{:03}", i + 1)),
            }
        })
        .collect()
}

fn employee_name(record: &PayrollRecord) -> String {
    if record.employee_name.trim().is_empty() {
        UNKNOWN_EMPLOYEE.to_string()
    } else {
        record.employee_name.clone()
    }
}

fn site_for(
    record: &PayrollRecord,
    employees: &HashMap<u64, Employee>,
    departments: &HashMap<u64, Department>,
) -> String {
    employees
        .get(&record.employee_id)
        .and_then(|e| departments.get(&e.department_id))
        .map(|d| d.site.clone())
        .unwrap_or_default()
}

/// Zero renders blank on presentation sheets.
fn hours_cell(v: f64) -> Cell {
    if v == 0.0 { Cell::Empty } else { Cell::Number(v) }
}

/// Sum the `Number` cells of one column across the data rows.
fn column_sum(rows: &[Vec<Cell>], col: usize) -> f64 {
    round2(
        rows.iter()
            .map(|row| match row.get(col) {
                Some(Cell::Number(v)) => *v,
                _ => 0.0,
            })
            .sum(),
    )
}

fn daily_hours_sheet(roster: &[RosterEntry<'_>], range: &DateRange) -> Sheet {
    let days = days_in(range);

    let mut header = vec![Cell::text("Code"), Cell::text("Employee Name")];
    header.extend(days.iter().map(|d| Cell::text(d.format("%b %d").to_string())));
    header.push(Cell::text("Total"));

    let mut widths = vec![10.0, 28.0];
    widths.extend(std::iter::repeat(7.0).take(days.len()));
    widths.push(10.0);

    let mut data_rows: Vec<Vec<Cell>> = Vec::with_capacity(roster.len());
    for entry in roster {
        let mut row = vec![Cell::text(&entry.code), Cell::text(employee_name(entry.record))];
        let mut daily_sum = 0.0;
        for day in &days {
            let key = day.format("%Y-%m-%d").to_string();
            match entry.record.daily().and_then(|m| m.get(&key)) {
                Some(hours) => {
                    daily_sum = round2(daily_sum + hours);
                    row.push(Cell::Number(*hours));
                }
                None => row.push(Cell::Empty),
            }
        }
        // Prefer the explicit worked-hours total, fall back to the sum of
        // the displayed daily cells.
        let total = if entry.record.worked_hours > 0.0 {
            entry.record.worked_hours
        } else {
            daily_sum
        };
        row.push(Cell::Number(total));
        data_rows.push(row);
    }

    let mut total_row = vec![Cell::Empty, Cell::text(GRAND_TOTAL)];
    for col in 2..2 + days.len() + 1 {
        total_row.push(Cell::Number(column_sum(&data_rows, col)));
    }

    let mut rows = vec![header];
    rows.append(&mut data_rows);
    rows.push(total_row);

    Sheet {
        name: "Daily Hours".to_string(),
        col_widths: widths,
        rows,
    }
}

/// Transposed view: one column per record in encounter order, one row per
/// payroll component, for side-by-side comparison.
fn breakdown_sheet(records: &[&PayrollRecord]) -> Sheet {
    let mut header = vec![Cell::text("Component")];
    header.extend(records.iter().map(|r| Cell::text(employee_name(r))));

    let mut widths = vec![24.0];
    widths.extend(std::iter::repeat(18.0).take(records.len()));

    let mut rows = vec![header];
    rows.push(
        std::iter::once(Cell::text("Cutoff Period"))
            .chain(records.iter().map(|r| {
                Cell::text(format!("{} to {}", r.cutoff_start, r.cutoff_end))
            }))
            .collect(),
    );

    let numeric_rows: [(&str, fn(&PayrollRecord) -> f64); 14] = [
        ("Basic Salary", |r| r.basic_salary),
        ("Worked Hours", |r| r.worked_hours),
        ("Overtime Hours", |r| r.overtime_hours),
        ("Holiday Pay", |r| r.holiday_pay),
        ("Night Differential", |r| r.night_differential),
        ("Salary Adjustment", |r| r.salary_adjustment),
        ("Absences", |r| r.absences),
        ("Late Deductions", |r| r.late_deductions),
        ("SSS", |r| r.sss),
        ("PhilHealth", |r| r.philhealth),
        ("Pag-IBIG", |r| r.pagibig),
        ("Withholding Tax", |r| r.withholding_tax),
        ("Gross Pay", |r| r.gross_pay),
        ("Total Deductions", |r| r.total_deductions),
    ];
    for (label, get) in numeric_rows {
        rows.push(
            std::iter::once(Cell::text(label))
                .chain(records.iter().map(|r| Cell::Number(get(r))))
                .collect(),
        );
    }
    rows.push(
        std::iter::once(Cell::text("Net Pay"))
            .chain(records.iter().map(|r| Cell::Number(r.net_pay)))
            .collect(),
    );
    rows.push(
        std::iter::once(Cell::text("Status"))
            .chain(records.iter().map(|r| Cell::text(r.status.to_string())))
            .collect(),
    );

    Sheet {
        name: "Payroll Breakdown".to_string(),
        col_widths: widths,
        rows,
    }
}

fn overtime_sheet(roster: &[RosterEntry<'_>]) -> Sheet {
    let header = vec![
        Cell::text("Code"),
        Cell::text("Employee Name"),
        Cell::text("Overtime Hours"),
        Cell::text("Rest Day OT"),
        Cell::text("Regular OT"),
        Cell::text("Special Holiday OT"),
        Cell::text("Total"),
    ];

    let mut data_rows: Vec<Vec<Cell>> = Vec::with_capacity(roster.len());
    for entry in roster {
        let r = entry.record;
        let special = r.special_holiday_total();
        let total = round2(r.rest_day_ot_hours + r.regular_ot_hours + special);
        data_rows.push(vec![
            Cell::text(&entry.code),
            Cell::text(employee_name(r)),
            Cell::Number(r.overtime_hours),
            Cell::Number(r.rest_day_ot_hours),
            Cell::Number(r.regular_ot_hours),
            Cell::Number(special),
            Cell::Number(total),
        ]);
    }

    let mut total_row = vec![Cell::Empty, Cell::text(GRAND_TOTAL)];
    for col in 2..7 {
        total_row.push(Cell::Number(column_sum(&data_rows, col)));
    }

    let mut rows = vec![header];
    rows.append(&mut data_rows);
    rows.push(total_row);

    Sheet {
        name: "Overtime".to_string(),
        col_widths: vec![10.0, 28.0, 14.0, 12.0, 12.0, 16.0, 10.0],
        rows,
    }
}

fn special_holiday_sheet(
    roster: &[RosterEntry<'_>],
    employees: &HashMap<u64, Employee>,
    departments: &HashMap<u64, Department>,
) -> Sheet {
    // Distinct holiday dates: union over every record's map, chronological.
    // ISO keys sort lexicographically in date order.
    let dates: BTreeSet<String> = roster
        .iter()
        .filter_map(|e| e.record.special_holidays())
        .flat_map(|m| m.keys().cloned())
        .collect();

    let mut header = vec![
        Cell::text("Code"),
        Cell::text("Employee Name"),
        Cell::text("Site"),
    ];
    header.extend(dates.iter().map(Cell::text));
    header.push(Cell::text("Total"));

    let mut widths = vec![10.0, 28.0, 14.0];
    widths.extend(std::iter::repeat(12.0).take(dates.len()));
    widths.push(10.0);

    let mut data_rows: Vec<Vec<Cell>> = Vec::with_capacity(roster.len());
    for entry in roster {
        let r = entry.record;
        let mut row = vec![
            Cell::text(&entry.code),
            Cell::text(employee_name(r)),
            Cell::text(site_for(r, employees, departments)),
        ];
        let mut total = 0.0;
        for date in &dates {
            match r.special_holidays().and_then(|m| m.get(date)) {
                Some(hours) => {
                    total = round2(total + hours);
                    row.push(Cell::Number(*hours));
                }
                None => row.push(Cell::Empty),
            }
        }
        row.push(Cell::Number(total));
        data_rows.push(row);
    }

    let mut total_row = vec![Cell::Empty, Cell::text(GRAND_TOTAL), Cell::Empty];
    for col in 3..3 + dates.len() + 1 {
        total_row.push(Cell::Number(column_sum(&data_rows, col)));
    }

    let mut rows = vec![header];
    rows.append(&mut data_rows);
    rows.push(total_row);

    Sheet {
        name: "Special Holidays".to_string(),
        col_widths: widths,
        rows,
    }
}

/// Tenure-based leave credits: one working day (8h) per full year of
/// service as of the cutoff end, capped at five days.
fn tenure_leave_hours(record: &PayrollRecord, employees: &HashMap<u64, Employee>) -> f64 {
    let Some(employee) = employees.get(&record.employee_id) else {
        return 0.0;
    };
    let mut years = record.cutoff_end.year() - employee.hire_date.year();
    let anniversary = (employee.hire_date.month(), employee.hire_date.day());
    if (record.cutoff_end.month(), record.cutoff_end.day()) < anniversary {
        years -= 1;
    }
    (years.clamp(0, 5) * 8) as f64
}

fn leave_sheet(roster: &[RosterEntry<'_>], employees: &HashMap<u64, Employee>) -> Sheet {
    let header = vec![
        Cell::text("Code"),
        Cell::text("Employee Name"),
        Cell::text("CTO Hours"),
        Cell::text("Holiday Not Worked"),
        Cell::text("Tenure Leave"),
        Cell::text("Other Leave"),
        Cell::text("Total"),
    ];

    let mut data_rows: Vec<Vec<Cell>> = Vec::with_capacity(roster.len());
    for entry in roster {
        let r = entry.record;
        let tenure = tenure_leave_hours(r, employees);
        let total = round2(
            r.offset_hours + r.holiday_offset_hours + tenure + r.other_leave_hours,
        );
        data_rows.push(vec![
            Cell::text(&entry.code),
            Cell::text(employee_name(r)),
            hours_cell(r.offset_hours),
            hours_cell(r.holiday_offset_hours),
            hours_cell(tenure),
            hours_cell(r.other_leave_hours),
            hours_cell(total),
        ]);
    }

    let mut total_row = vec![Cell::Empty, Cell::text(GRAND_TOTAL)];
    for col in 2..7 {
        total_row.push(hours_cell(column_sum(&data_rows, col)));
    }

    let mut rows = vec![header];
    rows.append(&mut data_rows);
    rows.push(total_row);

    Sheet {
        name: "Leave & Offsets".to_string(),
        col_widths: vec![10.0, 28.0, 12.0, 18.0, 13.0, 12.0, 10.0],
        rows,
    }
}

/// Build the full timekeeping report from payroll records and reference
/// data. An empty selection after filtering is a `NotFound`, not a crash.
pub fn build_report(
    records: &[PayrollRecord],
    employees: &HashMap<u64, Employee>,
    departments: &HashMap<u64, Department>,
    filter: Option<DateRange>,
) -> Result<TimekeepingReport, ApiError> {
    let selected: Vec<&PayrollRecord> = match &filter {
        Some(range) => records.iter().filter(|r| overlaps(r, range)).collect(),
        None => records.iter().collect(),
    };
    if selected.is_empty() {
        return Err(ApiError::not_found(
            "No payroll data found for the selected period",
        ));
    }

    let range = effective_range(filter, &selected);
    let roster = build_roster(&selected, employees);

    let sheets = vec![
        daily_hours_sheet(&roster, &range),
        breakdown_sheet(&selected),
        overtime_sheet(&roster),
        special_holiday_sheet(&roster, employees, departments),
        leave_sheet(&roster, employees),
    ];

    Ok(TimekeepingReport { range, sheets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payroll::PayrollStatus;
    use chrono::NaiveDate;
    use sqlx::types::Json;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: u64, employee_id: u64, name: &str, start: NaiveDate, end: NaiveDate) -> PayrollRecord {
        PayrollRecord {
            id,
            employee_id,
            employee_name: name.to_string(),
            cutoff_start: start,
            cutoff_end: end,
            basic_salary: 20_000.0,
            worked_hours: 0.0,
            overtime_hours: 0.0,
            rest_day_ot_hours: 0.0,
            regular_ot_hours: 0.0,
            holiday_pay: 0.0,
            night_differential: 0.0,
            salary_adjustment: 0.0,
            absences: 0.0,
            late_deductions: 0.0,
            sss: 0.0,
            philhealth: 0.0,
            pagibig: 0.0,
            withholding_tax: 0.0,
            gross_pay: 20_000.0,
            total_deductions: 0.0,
            net_pay: 20_000.0,
            status: PayrollStatus::Pending,
            offset_hours: 0.0,
            holiday_offset_hours: 0.0,
            other_leave_hours: 0.0,
            daily_hours: None,
            special_holiday_hours: None,
            created_at: date(2024, 1, 16).and_hms_opt(8, 0, 0).unwrap(),
            updated_at: date(2024, 1, 16).and_hms_opt(8, 0, 0).unwrap(),
        }
    }

    fn employee(id: u64, name: &str, code: Option<&str>) -> Employee {
        Employee {
            id,
            employee_code: code.map(str::to_string),
            name: name.to_string(),
            position: "CSR".to_string(),
            monthly_salary: 20_000.0,
            sss_no: None,
            philhealth_no: None,
            pagibig_no: None,
            department_id: 1,
            hire_date: date(2020, 6, 1),
            status: "active".to_string(),
        }
    }

    fn department(id: u64, site: &str) -> Department {
        Department {
            id,
            name: "Operations".to_string(),
            code: "OPS".to_string(),
            site: site.to_string(),
            manager: None,
            status: "active".to_string(),
        }
    }

    fn no_refs() -> (HashMap<u64, Employee>, HashMap<u64, Department>) {
        (HashMap::new(), HashMap::new())
    }

    #[test]
    fn overlapping_cutoffs_are_selected_and_disjoint_ones_are_not() {
        let records = vec![
            record(1, 1, "A", date(2024, 1, 1), date(2024, 1, 15)),
            record(2, 2, "B", date(2024, 1, 10), date(2024, 1, 20)),
        ];
        let (employees, departments) = no_refs();

        let report = build_report(
            &records,
            &employees,
            &departments,
            Some(DateRange { start: date(2024, 1, 12), end: date(2024, 1, 14) }),
        )
        .expect("report");
        // daily sheet: header + 2 employees + grand total
        assert_eq!(report.sheets[0].rows.len(), 4);

        let none = build_report(
            &records,
            &employees,
            &departments,
            Some(DateRange { start: date(2024, 2, 1), end: date(2024, 2, 5) }),
        );
        assert!(matches!(none, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn effective_range_is_derived_from_cutoffs_when_no_filter_given() {
        let records = vec![
            record(1, 1, "A", date(2024, 1, 5), date(2024, 1, 15)),
            record(2, 2, "B", date(2024, 1, 1), date(2024, 1, 10)),
        ];
        let (employees, departments) = no_refs();
        let report = build_report(&records, &employees, &departments, None).expect("report");
        assert_eq!(report.range, DateRange { start: date(2024, 1, 1), end: date(2024, 1, 15) });
    }

    #[test]
    fn roster_order_and_codes_are_stable_across_runs() {
        let records = vec![
            record(1, 3, "charlie", date(2024, 1, 1), date(2024, 1, 5)),
            record(2, 1, "Alice", date(2024, 1, 1), date(2024, 1, 5)),
            record(3, 2, "Bob", date(2024, 1, 1), date(2024, 1, 5)),
        ];
        let mut employees = HashMap::new();
        employees.insert(2, employee(2, "Bob", Some("BOB-7")));
        let departments = HashMap::new();

        let run = |records: &[PayrollRecord]| {
            let report = build_report(records, &employees, &departments, None).expect("report");
            report.sheets[0]
                .rows
                .iter()
                .skip(1)
                .take(3)
                .map(|row| match (&row[0], &row[1]) {
                    (Cell::Text(code), Cell::Text(name)) => (code.clone(), name.clone()),
                    _ => panic!("unexpected cells"),
                })
                .collect::<Vec<_>>()
        };

        let first = run(&records);
        let second = run(&records);
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                ("EMP001".to_string(), "Alice".to_string()),
                ("BOB-7".to_string(), "Bob".to_string()),
                ("EMP003".to_string(), "charlie".to_string()),
            ]
        );
    }

    #[test]
    fn daily_sheet_grand_total_equals_the_sum_of_displayed_cells() {
        let mut a = record(1, 1, "A", date(2024, 1, 1), date(2024, 1, 3));
        let mut map = BTreeMap::new();
        map.insert("2024-01-01".to_string(), 8.0);
        map.insert("2024-01-02".to_string(), 7.5);
        map.insert("2024-01-03".to_string(), 8.0);
        a.daily_hours = Some(Json(map));

        let mut b = record(2, 2, "B", date(2024, 1, 1), date(2024, 1, 3));
        let mut map = BTreeMap::new();
        map.insert("2024-01-01".to_string(), 6.0);
        map.insert("2024-01-03".to_string(), 4.0);
        b.daily_hours = Some(Json(map));

        let (employees, departments) = no_refs();
        let report =
            build_report(&[a, b], &employees, &departments, None).expect("report");
        let sheet = &report.sheets[0];
        // columns: code, name, 3 days, total
        assert_eq!(sheet.rows[0].len(), 6);
        let total_row = sheet.rows.last().unwrap();
        assert_eq!(total_row[1], Cell::text(GRAND_TOTAL));
        assert_eq!(total_row[2], Cell::Number(14.0));
        assert_eq!(total_row[3], Cell::Number(7.5));
        assert_eq!(total_row[4], Cell::Number(12.0));
        // 8 + 7.5 + 8 + 6 + 4 = sum of all displayed daily cells
        assert_eq!(total_row[5], Cell::Number(33.5));
    }

    #[test]
    fn daily_sheet_prefers_the_explicit_worked_hours_total() {
        let mut a = record(1, 1, "A", date(2024, 1, 1), date(2024, 1, 2));
        a.worked_hours = 80.0;
        let mut map = BTreeMap::new();
        map.insert("2024-01-01".to_string(), 8.0);
        a.daily_hours = Some(Json(map));

        let (employees, departments) = no_refs();
        let report = build_report(&[a], &employees, &departments, None).expect("report");
        let row = &report.sheets[0].rows[1];
        assert_eq!(*row.last().unwrap(), Cell::Number(80.0));
    }

    #[test]
    fn breakdown_sheet_keeps_encounter_order_and_transposes() {
        let records = vec![
            record(1, 1, "Zed", date(2024, 1, 1), date(2024, 1, 15)),
            record(2, 2, "Amy", date(2024, 1, 1), date(2024, 1, 15)),
        ];
        let (employees, departments) = no_refs();
        let report = build_report(&records, &employees, &departments, None).expect("report");
        let sheet = &report.sheets[1];
        // not sorted: Zed stays first
        assert_eq!(sheet.rows[0][1], Cell::text("Zed"));
        assert_eq!(sheet.rows[0][2], Cell::text("Amy"));
        let status_row = sheet.rows.last().unwrap();
        assert_eq!(status_row[0], Cell::text("Status"));
        assert_eq!(status_row[1], Cell::text("pending"));
    }

    #[test]
    fn overtime_sheet_totals_every_numeric_column() {
        let mut a = record(1, 1, "A", date(2024, 1, 1), date(2024, 1, 15));
        a.overtime_hours = 10.0;
        a.rest_day_ot_hours = 4.0;
        a.regular_ot_hours = 6.0;
        let mut b = record(2, 2, "B", date(2024, 1, 1), date(2024, 1, 15));
        b.overtime_hours = 2.0;
        b.regular_ot_hours = 2.0;

        let (employees, departments) = no_refs();
        let report = build_report(&[a, b], &employees, &departments, None).expect("report");
        let sheet = &report.sheets[2];
        let total_row = sheet.rows.last().unwrap();
        assert_eq!(total_row[2], Cell::Number(12.0)); // overtime hours
        assert_eq!(total_row[3], Cell::Number(4.0)); // rest day
        assert_eq!(total_row[4], Cell::Number(8.0)); // regular
        assert_eq!(total_row[6], Cell::Number(12.0)); // row totals
    }

    #[test]
    fn special_holiday_dates_are_the_sorted_union_of_all_maps() {
        let mut a = record(1, 1, "A", date(2024, 1, 1), date(2024, 1, 31));
        let mut map = BTreeMap::new();
        map.insert("2024-01-23".to_string(), 8.0);
        a.special_holiday_hours = Some(Json(map));

        let mut b = record(2, 2, "B", date(2024, 1, 1), date(2024, 1, 31));
        let mut map = BTreeMap::new();
        map.insert("2024-01-02".to_string(), 4.0);
        map.insert("2024-01-23".to_string(), 6.0);
        b.special_holiday_hours = Some(Json(map));

        let mut employees = HashMap::new();
        employees.insert(1, employee(1, "A", None));
        let mut departments = HashMap::new();
        departments.insert(1, department(1, "Clark"));

        let report = build_report(&[a, b], &employees, &departments, None).expect("report");
        let sheet = &report.sheets[3];
        assert_eq!(sheet.rows[0][3], Cell::text("2024-01-02"));
        assert_eq!(sheet.rows[0][4], Cell::text("2024-01-23"));
        // employee A resolves its department site, B has no reference data
        assert_eq!(sheet.rows[1][2], Cell::text("Clark"));
        assert_eq!(sheet.rows[2][2], Cell::text(""));
        let total_row = sheet.rows.last().unwrap();
        assert_eq!(total_row[3], Cell::Number(4.0));
        assert_eq!(total_row[4], Cell::Number(14.0));
        assert_eq!(total_row[5], Cell::Number(18.0));
    }

    #[test]
    fn leave_sheet_renders_zeroes_as_blank() {
        let mut a = record(1, 1, "A", date(2024, 1, 1), date(2024, 1, 15));
        a.offset_hours = 8.0;
        let (employees, departments) = no_refs();
        let report = build_report(&[a], &employees, &departments, None).expect("report");
        let row = &report.sheets[4].rows[1];
        assert_eq!(row[2], Cell::Number(8.0));
        assert_eq!(row[3], Cell::Empty); // holiday not worked: zero -> blank
        assert_eq!(row[4], Cell::Empty); // no employee reference, no tenure
    }

    #[test]
    fn tenure_leave_caps_at_five_days() {
        let rec = record(1, 1, "A", date(2024, 1, 1), date(2024, 1, 15));
        let mut employees = HashMap::new();
        let mut veteran = employee(1, "A", None);
        veteran.hire_date = date(2005, 3, 1);
        employees.insert(1, veteran);
        assert_eq!(tenure_leave_hours(&rec, &employees), 40.0);

        let mut hired_recently = employee(1, "A", None);
        hired_recently.hire_date = date(2023, 6, 1);
        employees.insert(1, hired_recently);
        assert_eq!(tenure_leave_hours(&rec, &employees), 0.0);
    }

    #[test]
    fn blank_employee_name_degrades_to_unknown() {
        let rec = record(1, 1, "", date(2024, 1, 1), date(2024, 1, 15));
        let (employees, departments) = no_refs();
        let report = build_report(&[rec], &employees, &departments, None).expect("report");
        assert_eq!(report.sheets[0].rows[1][1], Cell::text(UNKNOWN_EMPLOYEE));
    }

    #[test]
    fn grand_total_row_is_the_last_row_with_no_separator() {
        let records = vec![record(1, 1, "A", date(2024, 1, 1), date(2024, 1, 3))];
        let (employees, departments) = no_refs();
        let report = build_report(&records, &employees, &departments, None).expect("report");
        for sheet in [&report.sheets[0], &report.sheets[2], &report.sheets[3], &report.sheets[4]] {
            // header + 1 employee + grand total, nothing in between
            assert_eq!(sheet.rows.len(), 3, "sheet {}", sheet.name);
            assert_eq!(sheet.rows[2][1], Cell::text(GRAND_TOTAL), "sheet {}", sheet.name);
        }
    }
}
