//! Builds and re-merges persisted payroll records around the calculator.
//!
//! Everything here is pure: the HTTP handlers resolve rows and do the I/O,
//! this module owns validation, field merging and recomputation so totals
//! can never be trusted from the client.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::types::Json;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::employee::Employee;
use crate::model::payroll::{PayrollRecord, PayrollStatus};
use crate::model::settings::ContributionOverrides;
use crate::payroll::calculator::{self, PayInputs};
use crate::payroll::tables::DEFAULT_TABLES;

/// Payroll creation/update payload. Every field is optional; on update,
/// absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PayrollRequest {
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub cutoff_start: Option<NaiveDate>,

    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub cutoff_end: Option<NaiveDate>,

    /// Defaults to the employee's monthly salary when absent.
    #[schema(example = 25000.0)]
    pub basic_salary: Option<f64>,

    #[schema(example = 160.0)]
    pub worked_hours: Option<f64>,

    #[schema(example = 8.0)]
    pub overtime_hours: Option<f64>,

    pub rest_day_ot_hours: Option<f64>,
    pub regular_ot_hours: Option<f64>,
    pub holiday_pay: Option<f64>,
    pub night_differential: Option<f64>,
    pub salary_adjustment: Option<f64>,
    pub absences: Option<f64>,
    pub late_deductions: Option<f64>,

    /// Manual contribution amounts; computed from tables/overrides when
    /// absent.
    pub sss: Option<f64>,
    pub philhealth: Option<f64>,
    pub pagibig: Option<f64>,
    pub withholding_tax: Option<f64>,

    pub offset_hours: Option<f64>,
    pub holiday_offset_hours: Option<f64>,
    pub other_leave_hours: Option<f64>,

    /// ISO date string -> hours worked that day.
    #[schema(value_type = Option<Object>)]
    pub daily_hours: Option<BTreeMap<String, f64>>,

    /// ISO date string -> special-holiday hours.
    #[schema(value_type = Option<Object>)]
    pub special_holiday_hours: Option<BTreeMap<String, f64>>,

    /// Create directly in `processed` status instead of `pending`.
    #[schema(example = false)]
    pub process_immediately: Option<bool>,
}

/// Bulk "select all employees" payload: the base request applies to every
/// active employee, the override map replaces individual fields per
/// employee id.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BulkPayrollRequest {
    #[serde(flatten)]
    pub base: PayrollRequest,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub employee_overrides: HashMap<u64, PayrollRequest>,
}

#[derive(Debug, Clone, serde::Serialize, ToSchema)]
pub struct BulkError {
    #[schema(example = 1003)]
    pub employee_id: u64,

    #[schema(example = "Pedro Penduko")]
    pub employee_name: String,

    #[schema(example = "Basic salary could not be resolved")]
    pub reason: String,
}

pub fn require_employee_id(req: &PayrollRequest) -> Result<u64, ApiError> {
    req.employee_id
        .ok_or_else(|| ApiError::validation("employee_id is required"))
}

fn require_cutoff(req: &PayrollRequest) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let start = req
        .cutoff_start
        .ok_or_else(|| ApiError::validation("cutoff_start is required"))?;
    let end = req
        .cutoff_end
        .ok_or_else(|| ApiError::validation("cutoff_end is required"))?;
    if start > end {
        return Err(ApiError::validation(
            "cutoff_start cannot be after cutoff_end",
        ));
    }
    Ok((start, end))
}

fn resolve_basic_salary(req: &PayrollRequest, employee: &Employee) -> Result<f64, ApiError> {
    let salary = req.basic_salary.unwrap_or(employee.monthly_salary);
    if !salary.is_finite() || salary <= 0.0 {
        return Err(ApiError::validation("Basic salary could not be resolved"));
    }
    Ok(salary)
}

/// Build a fresh payroll record (id 0, assigned on insert) for one
/// employee's cutoff period.
pub fn build_record(
    req: &PayrollRequest,
    employee: &Employee,
    overrides: Option<&ContributionOverrides>,
    now: NaiveDateTime,
) -> Result<PayrollRecord, ApiError> {
    let (cutoff_start, cutoff_end) = require_cutoff(req)?;
    let basic_salary = resolve_basic_salary(req, employee)?;

    let inputs = PayInputs {
        basic_salary,
        worked_hours: req.worked_hours.unwrap_or(0.0),
        overtime_hours: req.overtime_hours.unwrap_or(0.0),
        holiday_pay: req.holiday_pay.unwrap_or(0.0),
        night_differential: req.night_differential.unwrap_or(0.0),
        salary_adjustment: req.salary_adjustment.unwrap_or(0.0),
        absences: req.absences.unwrap_or(0.0),
        late_deductions: req.late_deductions.unwrap_or(0.0),
        sss: req.sss,
        philhealth: req.philhealth,
        pagibig: req.pagibig,
        withholding_tax: req.withholding_tax,
    };
    let out = calculator::calculate(&inputs, overrides, &DEFAULT_TABLES);

    let status = if req.process_immediately.unwrap_or(false) {
        PayrollStatus::Processed
    } else {
        PayrollStatus::Pending
    };

    Ok(PayrollRecord {
        id: 0,
        employee_id: employee.id,
        employee_name: employee.name.clone(),
        cutoff_start,
        cutoff_end,
        basic_salary,
        worked_hours: req.worked_hours.unwrap_or(0.0),
        overtime_hours: req.overtime_hours.unwrap_or(0.0),
        rest_day_ot_hours: req.rest_day_ot_hours.unwrap_or(0.0),
        regular_ot_hours: req.regular_ot_hours.unwrap_or(0.0),
        holiday_pay: req.holiday_pay.unwrap_or(0.0),
        night_differential: req.night_differential.unwrap_or(0.0),
        salary_adjustment: req.salary_adjustment.unwrap_or(0.0),
        absences: req.absences.unwrap_or(0.0),
        late_deductions: req.late_deductions.unwrap_or(0.0),
        sss: out.sss,
        philhealth: out.philhealth,
        pagibig: out.pagibig,
        withholding_tax: out.withholding_tax,
        gross_pay: out.gross_pay,
        total_deductions: out.total_deductions,
        net_pay: out.net_pay,
        status,
        offset_hours: req.offset_hours.unwrap_or(0.0),
        holiday_offset_hours: req.holiday_offset_hours.unwrap_or(0.0),
        other_leave_hours: req.other_leave_hours.unwrap_or(0.0),
        daily_hours: req.daily_hours.clone().map(Json),
        special_holiday_hours: req.special_holiday_hours.clone().map(Json),
        created_at: now,
        updated_at: now,
    })
}

/// Merge caller-supplied fields over the stored record and recompute all
/// three totals. Completed records are immutable.
pub fn merge_update(
    existing: &PayrollRecord,
    req: &PayrollRequest,
    overrides: Option<&ContributionOverrides>,
    now: NaiveDateTime,
) -> Result<PayrollRecord, ApiError> {
    if existing.status == PayrollStatus::Completed {
        return Err(ApiError::conflict(
            "Completed payroll records cannot be modified",
        ));
    }

    let mut merged = existing.clone();
    if let Some(v) = req.cutoff_start {
        merged.cutoff_start = v;
    }
    if let Some(v) = req.cutoff_end {
        merged.cutoff_end = v;
    }
    if merged.cutoff_start > merged.cutoff_end {
        return Err(ApiError::validation(
            "cutoff_start cannot be after cutoff_end",
        ));
    }
    if let Some(v) = req.basic_salary {
        merged.basic_salary = v;
    }
    if let Some(v) = req.worked_hours {
        merged.worked_hours = v;
    }
    if let Some(v) = req.overtime_hours {
        merged.overtime_hours = v;
    }
    if let Some(v) = req.rest_day_ot_hours {
        merged.rest_day_ot_hours = v;
    }
    if let Some(v) = req.regular_ot_hours {
        merged.regular_ot_hours = v;
    }
    if let Some(v) = req.holiday_pay {
        merged.holiday_pay = v;
    }
    if let Some(v) = req.night_differential {
        merged.night_differential = v;
    }
    if let Some(v) = req.salary_adjustment {
        merged.salary_adjustment = v;
    }
    if let Some(v) = req.absences {
        merged.absences = v;
    }
    if let Some(v) = req.late_deductions {
        merged.late_deductions = v;
    }
    if let Some(v) = req.sss {
        merged.sss = v;
    }
    if let Some(v) = req.philhealth {
        merged.philhealth = v;
    }
    if let Some(v) = req.pagibig {
        merged.pagibig = v;
    }
    if let Some(v) = req.withholding_tax {
        merged.withholding_tax = v;
    }
    if let Some(v) = req.offset_hours {
        merged.offset_hours = v;
    }
    if let Some(v) = req.holiday_offset_hours {
        merged.holiday_offset_hours = v;
    }
    if let Some(v) = req.other_leave_hours {
        merged.other_leave_hours = v;
    }
    if let Some(v) = req.daily_hours.clone() {
        merged.daily_hours = Some(Json(v));
    }
    if let Some(v) = req.special_holiday_hours.clone() {
        merged.special_holiday_hours = Some(Json(v));
    }

    // Stored contribution amounts are kept as given values; only the three
    // totals are re-derived. Client-sent totals are ignored outright.
    let inputs = PayInputs {
        basic_salary: merged.basic_salary,
        worked_hours: merged.worked_hours,
        overtime_hours: merged.overtime_hours,
        holiday_pay: merged.holiday_pay,
        night_differential: merged.night_differential,
        salary_adjustment: merged.salary_adjustment,
        absences: merged.absences,
        late_deductions: merged.late_deductions,
        sss: Some(merged.sss),
        philhealth: Some(merged.philhealth),
        pagibig: Some(merged.pagibig),
        withholding_tax: Some(merged.withholding_tax),
    };
    let out = calculator::calculate(&inputs, overrides, &DEFAULT_TABLES);
    merged.gross_pay = out.gross_pay;
    merged.total_deductions = out.total_deductions;
    merged.net_pay = out.net_pay;
    merged.updated_at = now;

    Ok(merged)
}

/// Overlay per-employee override fields onto the bulk base request.
fn overlay(base: &PayrollRequest, over: &PayrollRequest) -> PayrollRequest {
    PayrollRequest {
        employee_id: over.employee_id.or(base.employee_id),
        cutoff_start: over.cutoff_start.or(base.cutoff_start),
        cutoff_end: over.cutoff_end.or(base.cutoff_end),
        basic_salary: over.basic_salary.or(base.basic_salary),
        worked_hours: over.worked_hours.or(base.worked_hours),
        overtime_hours: over.overtime_hours.or(base.overtime_hours),
        rest_day_ot_hours: over.rest_day_ot_hours.or(base.rest_day_ot_hours),
        regular_ot_hours: over.regular_ot_hours.or(base.regular_ot_hours),
        holiday_pay: over.holiday_pay.or(base.holiday_pay),
        night_differential: over.night_differential.or(base.night_differential),
        salary_adjustment: over.salary_adjustment.or(base.salary_adjustment),
        absences: over.absences.or(base.absences),
        late_deductions: over.late_deductions.or(base.late_deductions),
        sss: over.sss.or(base.sss),
        philhealth: over.philhealth.or(base.philhealth),
        pagibig: over.pagibig.or(base.pagibig),
        withholding_tax: over.withholding_tax.or(base.withholding_tax),
        offset_hours: over.offset_hours.or(base.offset_hours),
        holiday_offset_hours: over.holiday_offset_hours.or(base.holiday_offset_hours),
        other_leave_hours: over.other_leave_hours.or(base.other_leave_hours),
        daily_hours: over.daily_hours.clone().or_else(|| base.daily_hours.clone()),
        special_holiday_hours: over
            .special_holiday_hours
            .clone()
            .or_else(|| base.special_holiday_hours.clone()),
        process_immediately: over.process_immediately.or(base.process_immediately),
    }
}

/// Build one record per active employee. Each employee's individual salary
/// replaces the base basic salary unless the per-employee override supplies
/// one. Failures are collected, never aborting the batch.
pub fn build_bulk(
    employees: &[Employee],
    req: &BulkPayrollRequest,
    overrides: Option<&ContributionOverrides>,
    now: NaiveDateTime,
) -> (Vec<PayrollRecord>, Vec<BulkError>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for employee in employees.iter().filter(|e| e.is_active()) {
        let per_employee = req.employee_overrides.get(&employee.id);
        let mut item = match per_employee {
            Some(over) => overlay(&req.base, over),
            None => req.base.clone(),
        };
        item.employee_id = Some(employee.id);
        // Bulk mode substitutes the individual salary, not the shared one.
        if per_employee.and_then(|o| o.basic_salary).is_none() {
            item.basic_salary = None;
        }

        match build_record(&item, employee, overrides, now) {
            Ok(record) => records.push(record),
            Err(e) => errors.push(BulkError {
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    (records, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn employee(id: u64, name: &str, salary: f64) -> Employee {
        Employee {
            id,
            employee_code: None,
            name: name.to_string(),
            position: "CSR".to_string(),
            monthly_salary: salary,
            sss_no: None,
            philhealth_no: None,
            pagibig_no: None,
            department_id: 1,
            hire_date: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
            status: "active".to_string(),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 16)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn period_request() -> PayrollRequest {
        PayrollRequest {
            cutoff_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            cutoff_end: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..Default::default()
        }
    }

    #[test]
    fn create_defaults_to_pending_and_stamps_timestamps() {
        let rec = build_record(&period_request(), &employee(1, "A", 20_000.0), None, now())
            .expect("build");
        assert_eq!(rec.status, PayrollStatus::Pending);
        assert_eq!(rec.created_at, now());
        assert_eq!(rec.updated_at, now());
        assert_eq!(rec.basic_salary, 20_000.0);
        assert!(rec.net_pay > 0.0);
    }

    #[test]
    fn create_can_process_immediately() {
        let req = PayrollRequest {
            process_immediately: Some(true),
            ..period_request()
        };
        let rec = build_record(&req, &employee(1, "A", 20_000.0), None, now()).expect("build");
        assert_eq!(rec.status, PayrollStatus::Processed);
    }

    #[test]
    fn inverted_cutoff_is_a_validation_error() {
        let req = PayrollRequest {
            cutoff_start: NaiveDate::from_ymd_opt(2024, 1, 20),
            cutoff_end: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..Default::default()
        };
        let err = build_record(&req, &employee(1, "A", 20_000.0), None, now()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn unresolvable_salary_is_a_validation_error() {
        let err =
            build_record(&period_request(), &employee(1, "A", 0.0), None, now()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn request_salary_wins_over_employee_salary() {
        let req = PayrollRequest {
            basic_salary: Some(30_000.0),
            ..period_request()
        };
        let rec = build_record(&req, &employee(1, "A", 20_000.0), None, now()).expect("build");
        assert_eq!(rec.basic_salary, 30_000.0);
    }

    #[test]
    fn merge_rejects_completed_records() {
        let mut rec = build_record(&period_request(), &employee(1, "A", 20_000.0), None, now())
            .expect("build");
        rec.status = PayrollStatus::Completed;
        let err = merge_update(&rec, &PayrollRequest::default(), None, now()).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn merge_recomputes_totals_instead_of_trusting_the_client() {
        let rec = build_record(&period_request(), &employee(1, "A", 20_000.0), None, now())
            .expect("build");
        let req = PayrollRequest {
            basic_salary: Some(40_000.0),
            ..Default::default()
        };
        let updated = merge_update(&rec, &req, None, now()).expect("merge");
        assert_eq!(updated.basic_salary, 40_000.0);
        assert!(updated.gross_pay > rec.gross_pay);
        // contribution amounts are treated as given values on update
        assert_eq!(updated.sss, rec.sss);
    }

    #[test]
    fn merge_keeps_the_employee_name_snapshot() {
        let rec = build_record(&period_request(), &employee(1, "Old Name", 20_000.0), None, now())
            .expect("build");
        let updated = merge_update(&rec, &PayrollRequest::default(), None, now()).expect("merge");
        assert_eq!(updated.employee_name, "Old Name");
    }

    #[test]
    fn bulk_collects_failures_without_aborting() {
        let employees = vec![
            employee(1, "A", 20_000.0),
            employee(2, "B", 21_000.0),
            employee(3, "C", 0.0), // unresolvable salary
            employee(4, "D", 22_000.0),
            employee(5, "E", 23_000.0),
        ];
        let req = BulkPayrollRequest {
            base: period_request(),
            ..Default::default()
        };
        let (records, errors) = build_bulk(&employees, &req, None, now());
        assert_eq!(records.len(), 4);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].employee_id, 3);
    }

    #[test]
    fn bulk_substitutes_each_employees_own_salary() {
        let employees = vec![employee(1, "A", 18_000.0), employee(2, "B", 26_000.0)];
        let req = BulkPayrollRequest {
            base: PayrollRequest {
                basic_salary: Some(99_000.0), // ignored in bulk mode
                ..period_request()
            },
            ..Default::default()
        };
        let (records, errors) = build_bulk(&employees, &req, None, now());
        assert!(errors.is_empty());
        assert_eq!(records[0].basic_salary, 18_000.0);
        assert_eq!(records[1].basic_salary, 26_000.0);
    }

    #[test]
    fn bulk_applies_per_employee_overrides() {
        let employees = vec![employee(1, "A", 18_000.0), employee(2, "B", 26_000.0)];
        let mut overrides_map = HashMap::new();
        overrides_map.insert(
            2,
            PayrollRequest {
                overtime_hours: Some(10.0),
                ..Default::default()
            },
        );
        let req = BulkPayrollRequest {
            base: period_request(),
            employee_overrides: overrides_map,
        };
        let (records, _) = build_bulk(&employees, &req, None, now());
        assert_eq!(records[0].overtime_hours, 0.0);
        assert_eq!(records[1].overtime_hours, 10.0);
    }

    #[test]
    fn bulk_skips_inactive_employees() {
        let mut inactive = employee(9, "Z", 30_000.0);
        inactive.status = "inactive".to_string();
        let employees = vec![employee(1, "A", 18_000.0), inactive];
        let req = BulkPayrollRequest {
            base: period_request(),
            ..Default::default()
        };
        let (records, errors) = build_bulk(&employees, &req, None, now());
        assert_eq!(records.len(), 1);
        assert!(errors.is_empty());
    }
}
