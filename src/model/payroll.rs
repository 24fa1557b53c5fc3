use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a payroll record. Created as `pending` (draft), moved to
/// `processed` by the process endpoint. `completed` is set by a downstream
/// workflow; records in that state are immutable here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PayrollStatus {
    Pending,
    Processed,
    Completed,
}

/// One employee's pay for one cutoff period.
///
/// `employee_name` is a point-in-time snapshot: the employee may later be
/// renamed or deleted while this record must stay readable, so it is never
/// "repaired" from the live employee row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "Juan Dela Cruz")]
    pub employee_name: String,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub cutoff_start: NaiveDate,

    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub cutoff_end: NaiveDate,

    #[schema(example = 25000.0)]
    pub basic_salary: f64,

    #[schema(example = 160.0)]
    pub worked_hours: f64,

    #[schema(example = 8.0)]
    pub overtime_hours: f64,

    #[schema(example = 0.0)]
    pub rest_day_ot_hours: f64,

    #[schema(example = 8.0)]
    pub regular_ot_hours: f64,

    #[schema(example = 0.0)]
    pub holiday_pay: f64,

    #[schema(example = 0.0)]
    pub night_differential: f64,

    /// Signed one-off adjustment (+/-).
    #[schema(example = 0.0)]
    pub salary_adjustment: f64,

    #[schema(example = 0.0)]
    pub absences: f64,

    #[schema(example = 0.0)]
    pub late_deductions: f64,

    #[schema(example = 1125.0)]
    pub sss: f64,

    #[schema(example = 625.0)]
    pub philhealth: f64,

    #[schema(example = 200.0)]
    pub pagibig: f64,

    #[schema(example = 330.96)]
    pub withholding_tax: f64,

    #[schema(example = 26562.5)]
    pub gross_pay: f64,

    #[schema(example = 2280.96)]
    pub total_deductions: f64,

    #[schema(example = 24281.54)]
    pub net_pay: f64,

    #[schema(example = "pending")]
    pub status: PayrollStatus,

    /// Compensatory time off, hours.
    #[schema(example = 0.0)]
    pub offset_hours: f64,

    /// Holiday-not-worked hours.
    #[schema(example = 0.0)]
    pub holiday_offset_hours: f64,

    #[schema(example = 0.0)]
    pub other_leave_hours: f64,

    /// ISO date string -> hours worked that day.
    #[schema(value_type = Option<Object>)]
    pub daily_hours: Option<Json<BTreeMap<String, f64>>>,

    /// ISO date string -> hours worked on that special holiday.
    #[schema(value_type = Option<Object>)]
    pub special_holiday_hours: Option<Json<BTreeMap<String, f64>>>,

    #[schema(example = "2024-01-16T08:00:00", value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,

    #[schema(example = "2024-01-16T08:00:00", value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}

impl PayrollRecord {
    pub fn daily(&self) -> Option<&BTreeMap<String, f64>> {
        self.daily_hours.as_ref().map(|j| &j.0)
    }

    pub fn special_holidays(&self) -> Option<&BTreeMap<String, f64>> {
        self.special_holiday_hours.as_ref().map(|j| &j.0)
    }

    /// Sum of the special-holiday hour map.
    pub fn special_holiday_total(&self) -> f64 {
        self.special_holidays()
            .map(|m| m.values().sum())
            .unwrap_or(0.0)
    }
}
