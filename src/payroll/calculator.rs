//! Pay-period computation: statutory contributions, gross, deductions, net.
//!
//! Pure module, never touches the database. Malformed numeric input parses
//! to zero rather than erroring; identity validation belongs to the record
//! builder.

use crate::model::settings::ContributionOverrides;
use crate::payroll::round2;
use crate::payroll::tables::ContributionTable;

/// Divisor fallback when worked hours are missing or zero.
pub const DEFAULT_WORKED_HOURS: f64 = 160.0;

pub const DEFAULT_OT_MULTIPLIER: f64 = 1.25;

/// Totals above this are treated as a unit/parse defect upstream (the
/// string-concatenation class of bug) and zeroed instead of propagated.
const SANITY_CEILING: f64 = 10_000_000.0;

/// Per-employee pay-period inputs. The four contribution fields are
/// optional; when `None` they are derived from override rates or the
/// bracket tables.
#[derive(Debug, Clone, Default)]
pub struct PayInputs {
    pub basic_salary: f64,
    pub worked_hours: f64,
    pub overtime_hours: f64,
    pub holiday_pay: f64,
    pub night_differential: f64,
    /// Signed one-off adjustment.
    pub salary_adjustment: f64,
    pub absences: f64,
    pub late_deductions: f64,
    pub sss: Option<f64>,
    pub philhealth: Option<f64>,
    pub pagibig: Option<f64>,
    pub withholding_tax: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PayBreakdown {
    pub sss: f64,
    pub philhealth: f64,
    pub pagibig: f64,
    pub withholding_tax: f64,
    pub overtime_pay: f64,
    pub gross_pay: f64,
    pub total_deductions: f64,
    pub net_pay: f64,
}

/// Parse-or-zero: NaN/infinity collapse to 0 instead of poisoning totals.
fn num(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Non-negative money component.
fn pos(v: f64) -> f64 {
    num(v).max(0.0)
}

pub fn calculate(
    inputs: &PayInputs,
    overrides: Option<&ContributionOverrides>,
    tables: &dyn ContributionTable,
) -> PayBreakdown {
    let basic = pos(inputs.basic_salary);
    let absences = pos(inputs.absences);
    let late = pos(inputs.late_deductions);

    // Guard against division by zero: substitute the configured standard.
    let standard_hours = overrides
        .and_then(|o| o.standard_hours)
        .filter(|h| *h > 0.0)
        .unwrap_or(DEFAULT_WORKED_HOURS);
    let worked_hours = match pos(inputs.worked_hours) {
        h if h > 0.0 => h,
        _ => standard_hours,
    };
    let hourly_rate = basic / worked_hours;

    let ot_multiplier = overrides
        .and_then(|o| o.overtime_multiplier)
        .filter(|m| *m > 0.0)
        .unwrap_or(DEFAULT_OT_MULTIPLIER);
    let overtime_pay = round2(pos(inputs.overtime_hours) * hourly_rate * ot_multiplier);

    // Contribution precedence: caller-supplied amount, then flat override
    // rate, then the bracket table.
    let sss = match (inputs.sss, overrides.and_then(|o| o.sss_rate)) {
        (Some(v), _) => round2(pos(v)),
        (None, Some(rate)) => round2(basic * rate / 100.0),
        (None, None) => tables.sss_employee_share(basic),
    };
    let philhealth = match (inputs.philhealth, overrides.and_then(|o| o.philhealth_rate)) {
        (Some(v), _) => round2(pos(v)),
        (None, Some(rate)) => round2(basic * rate / 100.0),
        (None, None) => tables.philhealth(basic),
    };
    let pagibig = match (inputs.pagibig, overrides.and_then(|o| o.pagibig_rate)) {
        (Some(v), _) => round2(pos(v)),
        (None, Some(rate)) => round2(basic * rate / 100.0),
        (None, None) => tables.pagibig(basic),
    };
    let withholding_tax = match (inputs.withholding_tax, overrides.and_then(|o| o.tax_rate)) {
        (Some(v), _) => round2(pos(v)),
        (None, Some(rate)) => round2(basic * rate / 100.0),
        (None, None) => tables.withholding(basic - sss - philhealth - pagibig),
    };

    // Running sum is rounded to cents after every addition.
    let mut gross = round2(basic);
    gross = round2(gross + overtime_pay);
    gross = round2(gross + num(inputs.holiday_pay));
    gross = round2(gross + num(inputs.night_differential));
    gross = round2(gross + num(inputs.salary_adjustment));
    gross = round2(gross - absences);
    gross = round2(gross - late);
    let gross_pay = gross.max(0.0);

    let mut deductions = round2(absences);
    deductions = round2(deductions + late);
    deductions = round2(deductions + sss);
    deductions = round2(deductions + philhealth);
    deductions = round2(deductions + pagibig);
    deductions = round2(deductions + withholding_tax);
    let total_deductions = deductions.max(0.0);

    let net_pay = round2((gross_pay - total_deductions).max(0.0));

    if gross_pay > SANITY_CEILING || total_deductions > SANITY_CEILING || net_pay > SANITY_CEILING {
        tracing::warn!(
            gross_pay,
            total_deductions,
            net_pay,
            "payroll totals breached the sanity ceiling, returning zeroed results"
        );
        return PayBreakdown::default();
    }

    PayBreakdown {
        sss,
        philhealth,
        pagibig,
        withholding_tax,
        overtime_pay,
        gross_pay,
        total_deductions,
        net_pay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::tables::DEFAULT_TABLES;

    fn calc(inputs: &PayInputs) -> PayBreakdown {
        calculate(inputs, None, &DEFAULT_TABLES)
    }

    fn base_inputs() -> PayInputs {
        PayInputs {
            basic_salary: 25_000.0,
            worked_hours: 160.0,
            ..Default::default()
        }
    }

    #[test]
    fn net_is_gross_minus_deductions_floored_at_zero() {
        let out = calc(&base_inputs());
        assert!(out.gross_pay >= 0.0);
        assert!(out.total_deductions >= 0.0);
        assert_eq!(
            out.net_pay,
            ((out.gross_pay - out.total_deductions).max(0.0) * 100.0).round() / 100.0
        );

        let drained = calc(&PayInputs {
            basic_salary: 1_000.0,
            absences: 5_000.0,
            ..Default::default()
        });
        assert_eq!(drained.net_pay, 0.0);
    }

    #[test]
    fn recomputation_is_bit_identical() {
        let inputs = PayInputs {
            basic_salary: 23_456.78,
            worked_hours: 157.5,
            overtime_hours: 9.25,
            holiday_pay: 1_203.45,
            night_differential: 311.11,
            salary_adjustment: -250.0,
            absences: 423.07,
            late_deductions: 86.4,
            ..Default::default()
        };
        let a = calc(&inputs);
        let b = calc(&inputs);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_worked_hours_substitutes_the_default_divisor() {
        let out = calc(&PayInputs {
            basic_salary: 16_000.0,
            worked_hours: 0.0,
            overtime_hours: 4.0,
            ..Default::default()
        });
        // 16,000 / 160 * 1.25 * 4h
        assert_eq!(out.overtime_pay, 500.0);
        assert!(out.gross_pay.is_finite());
    }

    #[test]
    fn caller_supplied_contributions_win_over_tables() {
        let out = calc(&PayInputs {
            sss: Some(100.0),
            philhealth: Some(50.0),
            pagibig: Some(25.0),
            withholding_tax: Some(0.0),
            ..base_inputs()
        });
        assert_eq!(out.sss, 100.0);
        assert_eq!(out.philhealth, 50.0);
        assert_eq!(out.pagibig, 25.0);
        assert_eq!(out.withholding_tax, 0.0);
        assert_eq!(out.total_deductions, 175.0);
    }

    #[test]
    fn override_rates_replace_bracket_lookups() {
        let overrides = ContributionOverrides {
            sss_rate: Some(4.5),
            philhealth_rate: Some(2.5),
            pagibig_rate: Some(2.0),
            tax_rate: Some(10.0),
            ..Default::default()
        };
        let out = calculate(&base_inputs(), Some(&overrides), &DEFAULT_TABLES);
        assert_eq!(out.sss, 1_125.0);
        assert_eq!(out.philhealth, 625.0);
        assert_eq!(out.pagibig, 500.0);
        assert_eq!(out.withholding_tax, 2_500.0);
    }

    #[test]
    fn overtime_multiplier_override_applies() {
        let overrides = ContributionOverrides {
            overtime_multiplier: Some(2.0),
            ..Default::default()
        };
        let out = calculate(
            &PayInputs {
                basic_salary: 16_000.0,
                worked_hours: 160.0,
                overtime_hours: 2.0,
                ..Default::default()
            },
            Some(&overrides),
            &DEFAULT_TABLES,
        );
        assert_eq!(out.overtime_pay, 400.0);
    }

    #[test]
    fn sanity_ceiling_returns_zeroed_results() {
        let out = calc(&PayInputs {
            basic_salary: 250_000_000.0,
            ..Default::default()
        });
        assert_eq!(out, PayBreakdown::default());
    }

    #[test]
    fn non_finite_inputs_parse_to_zero() {
        let out = calc(&PayInputs {
            basic_salary: 20_000.0,
            holiday_pay: f64::NAN,
            night_differential: f64::INFINITY,
            ..Default::default()
        });
        assert!(out.gross_pay.is_finite());
        assert_eq!(out.gross_pay, 20_000.0);
    }
}
