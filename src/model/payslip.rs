use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One payslip per payroll record. Name, cutoff and net pay are denormalized
/// so the slip stays readable after the payroll record is edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "payroll_id": 42,
        "employee_name": "Juan Dela Cruz",
        "cutoff_start": "2024-01-01",
        "cutoff_end": "2024-01-15",
        "net_pay": 24281.54,
        "generated_at": "2024-01-16T08:00:00"
    })
)]
pub struct Payslip {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub payroll_id: u64,

    #[schema(example = "Juan Dela Cruz")]
    pub employee_name: String,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub cutoff_start: NaiveDate,

    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub cutoff_end: NaiveDate,

    #[schema(example = 24281.54)]
    pub net_pay: f64,

    #[schema(example = "2024-01-16T08:00:00", value_type = String, format = "date-time")]
    pub generated_at: NaiveDateTime,
}
