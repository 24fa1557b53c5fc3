use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Operator-managed override rates, stored as a single row. Percentage
/// fields, when present, are applied flatly against basic salary instead of
/// the statutory bracket tables (used for flat-rate test scenarios).
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "sss_rate": null,
        "philhealth_rate": 2.5,
        "pagibig_rate": null,
        "tax_rate": null,
        "overtime_multiplier": 1.25,
        "night_diff_rate": 10.0,
        "holiday_rate": 100.0,
        "standard_hours": 160.0,
        "working_days": 22.0
    })
)]
pub struct Settings {
    #[schema(example = 1)]
    pub id: u64,

    /// Flat SSS percentage of basic salary. `null` = use the bracket table.
    pub sss_rate: Option<f64>,

    pub philhealth_rate: Option<f64>,

    pub pagibig_rate: Option<f64>,

    pub tax_rate: Option<f64>,

    #[schema(example = 1.25)]
    pub overtime_multiplier: Option<f64>,

    /// Operator reference data: night differential and holiday pay reach
    /// payroll as pre-computed amounts, so these rates are stored for the
    /// payroll clerks but never read by the calculator.
    pub night_diff_rate: Option<f64>,

    /// Operator reference data, see `night_diff_rate`.
    pub holiday_rate: Option<f64>,

    /// Standard worked hours per cutoff, the divisor for the hourly rate.
    #[schema(example = 160.0)]
    pub standard_hours: Option<f64>,

    /// Operator reference data, see `night_diff_rate`.
    pub working_days: Option<f64>,
}

/// Override rates as seen by the calculator, resolved once per calculation
/// call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContributionOverrides {
    pub sss_rate: Option<f64>,
    pub philhealth_rate: Option<f64>,
    pub pagibig_rate: Option<f64>,
    pub tax_rate: Option<f64>,
    pub overtime_multiplier: Option<f64>,
    pub standard_hours: Option<f64>,
}

impl From<&Settings> for ContributionOverrides {
    fn from(s: &Settings) -> Self {
        ContributionOverrides {
            sss_rate: s.sss_rate,
            philhealth_rate: s.philhealth_rate,
            pagibig_rate: s.pagibig_rate,
            tax_rate: s.tax_rate,
            overtime_multiplier: s.overtime_multiplier,
            standard_hours: s.standard_hours,
        }
    }
}
