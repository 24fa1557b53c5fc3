//! Statutory contribution schedules.
//!
//! The tables are tied to one effective year, so they live behind the
//! `ContributionTable` trait: adding a future year means adding another
//! implementation, not touching calculation logic.

use once_cell::sync::Lazy;

use crate::payroll::round2;

/// One row of the SSS salary-bracket schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct SssBracket {
    pub min: f64,
    pub max: f64,
    pub employee_share: f64,
    /// Informational only; exported on the reference sheet, never persisted
    /// on payroll records.
    pub employer_share: f64,
}

/// Year-versioned lookup strategy for the four statutory deductions.
pub trait ContributionTable: Send + Sync {
    fn year(&self) -> i32;

    /// First bracket whose `[min, max]` contains the salary; salaries above
    /// the last bracket's max clamp to the last bracket.
    fn sss_bracket(&self, monthly_salary: f64) -> &SssBracket;

    fn sss_employee_share(&self, monthly_salary: f64) -> f64 {
        self.sss_bracket(monthly_salary).employee_share
    }

    fn philhealth(&self, monthly_salary: f64) -> f64;

    fn pagibig(&self, monthly_salary: f64) -> f64;

    /// Withholding tax on monthly taxable income (basic salary net of the
    /// three statutory contributions).
    fn withholding(&self, taxable: f64) -> f64;

    /// Full SSS schedule, for the contribution reference sheet.
    fn sss_schedule(&self) -> &[SssBracket];
}

/// 2024 SSS schedule: 31 brackets. The bottom bracket pegs to the 4,000
/// monthly salary credit, the open-ended top bracket to the 30,000 ceiling.
static SSS_TABLE_2024: Lazy<Vec<SssBracket>> = Lazy::new(|| {
    let mut rows = Vec::with_capacity(31);
    rows.push(SssBracket {
        min: 0.0,
        max: 4_249.99,
        employee_share: 180.0,
        employer_share: 380.0,
    });
    // 4,250 .. 18,749.99 in 500-peso steps, MSC 4,500 .. 18,500.
    for i in 0..29 {
        let min = 4_250.0 + 500.0 * i as f64;
        let msc = 4_500.0 + 500.0 * i as f64;
        rows.push(SssBracket {
            min,
            max: min + 499.99,
            employee_share: round2(msc * 0.045),
            employer_share: round2(msc * 0.095),
        });
    }
    rows.push(SssBracket {
        min: 18_750.0,
        max: f64::MAX,
        employee_share: 1_500.0,
        employer_share: 3_250.0,
    });
    rows
});

/// Contribution rules in effect for 2024.
pub struct Tables2024;

/// Default strategy used when no explicit one is supplied.
pub static DEFAULT_TABLES: Tables2024 = Tables2024;

impl ContributionTable for Tables2024 {
    fn year(&self) -> i32 {
        2024
    }

    fn sss_bracket(&self, monthly_salary: f64) -> &SssBracket {
        let salary = if monthly_salary.is_finite() {
            monthly_salary.max(0.0)
        } else {
            0.0
        };
        let table = &*SSS_TABLE_2024;
        table
            .iter()
            .find(|b| salary >= b.min && salary <= b.max)
            .unwrap_or_else(|| &table[table.len() - 1])
    }

    // 5% premium split evenly; salary floor 10,000, ceiling 100,000.
    fn philhealth(&self, monthly_salary: f64) -> f64 {
        if monthly_salary <= 10_000.0 {
            250.0
        } else if monthly_salary >= 100_000.0 {
            2_500.0
        } else {
            round2(monthly_salary * 0.025)
        }
    }

    // 1% employee share at or below 1,500, otherwise 2%, on a fund salary
    // capped at 10,000.
    fn pagibig(&self, monthly_salary: f64) -> f64 {
        let fund_salary = monthly_salary.clamp(0.0, 10_000.0);
        let rate = if monthly_salary <= 1_500.0 { 0.01 } else { 0.02 };
        round2(fund_salary * rate)
    }

    // TRAIN monthly withholding schedule, 2023 revision.
    fn withholding(&self, taxable: f64) -> f64 {
        let t = if taxable.is_finite() { taxable.max(0.0) } else { 0.0 };
        let tax = if t <= 20_833.0 {
            0.0
        } else if t <= 33_332.0 {
            (t - 20_833.0) * 0.15
        } else if t <= 66_666.0 {
            1_875.0 + (t - 33_333.0) * 0.20
        } else if t <= 166_666.0 {
            8_541.80 + (t - 66_667.0) * 0.25
        } else if t <= 666_666.0 {
            33_541.80 + (t - 166_667.0) * 0.30
        } else {
            183_541.80 + (t - 666_667.0) * 0.35
        };
        round2(tax)
    }

    fn sss_schedule(&self) -> &[SssBracket] {
        &SSS_TABLE_2024
    }
}
