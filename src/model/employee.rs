use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP001",
        "name": "Juan Dela Cruz",
        "position": "Customer Service Representative",
        "monthly_salary": 25000.0,
        "sss_no": "34-1234567-8",
        "philhealth_no": "12-345678901-2",
        "pagibig_no": "1234-5678-9012",
        "department_id": 10,
        "hire_date": "2022-06-01",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    /// Short code used on timekeeping exports. The report aggregator
    /// generates a sequential one when this is absent.
    #[schema(example = "EMP001")]
    pub employee_code: Option<String>,

    #[schema(example = "Juan Dela Cruz")]
    pub name: String,

    #[schema(example = "Customer Service Representative")]
    pub position: String,

    /// Default basic-salary source for payroll runs.
    #[schema(example = 25000.0)]
    pub monthly_salary: f64,

    #[schema(example = "34-1234567-8", nullable = true)]
    pub sss_no: Option<String>,

    #[schema(example = "12-345678901-2", nullable = true)]
    pub philhealth_no: Option<String>,

    #[schema(example = "1234-5678-9012", nullable = true)]
    pub pagibig_no: Option<String>,

    #[schema(example = 10)]
    pub department_id: u64,

    #[schema(example = "2022-06-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    #[schema(example = "active")]
    pub status: String,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}
