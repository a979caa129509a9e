//! SIP and lumpsum future value

use crate::error::Result;
use crate::plan::{validate_amount, validate_rate, validate_years, InvestmentPlan};
use crate::rates::{annual_rate, annuity_due_factor, monthly_rate};
use serde::{Deserialize, Serialize};

/// Future value of a monthly SIP with contributions at the start of each month.
///
/// `FV = A * ((1+i)^n - 1) / i * (1+i)` with `i = annual_pct / 12 / 100`;
/// a zero rate gives `A * n`.
pub fn sip_future_value(monthly_amount: f64, annual_pct: f64, months: u32) -> f64 {
    monthly_amount * annuity_due_factor(monthly_rate(annual_pct), months)
}

/// Future value of a one-time investment compounded annually
pub fn lumpsum_future_value(principal: f64, annual_pct: f64, years: f64) -> f64 {
    principal * (1.0 + annual_rate(annual_pct)).powf(years)
}

/// Output of the SIP calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SipProjection {
    pub invested: f64,
    pub estimated_returns: f64,
    pub total_value: f64,
    /// Total value deflated to today's money by the plan's inflation rate
    pub real_value: f64,
}

/// Run the SIP calculator for a validated plan
pub fn project_sip(plan: &InvestmentPlan) -> Result<SipProjection> {
    plan.validate()?;

    let invested = plan.monthly_amount * plan.months as f64;
    let total_value = sip_future_value(plan.monthly_amount, plan.annual_rate_pct, plan.months);
    let real_value = total_value / (1.0 + annual_rate(plan.inflation_pct)).powf(plan.years());

    log::debug!(
        "SIP {} x {} months @ {}%: invested {:.2}, value {:.2}",
        plan.monthly_amount, plan.months, plan.annual_rate_pct, invested, total_value
    );

    Ok(SipProjection {
        invested,
        estimated_returns: total_value - invested,
        total_value,
        real_value,
    })
}

/// SIP value at the end of a given year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: u32,
    pub invested: f64,
    pub value: f64,
}

/// Year-by-year SIP growth from year 0 through `years` (inclusive)
pub fn sip_value_by_year(monthly_amount: f64, annual_pct: f64, years: u32) -> Vec<YearValue> {
    (0..=years)
        .map(|year| {
            let months = year * 12;
            YearValue {
                year,
                invested: monthly_amount * months as f64,
                value: sip_future_value(monthly_amount, annual_pct, months),
            }
        })
        .collect()
}

/// Input for the lumpsum calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpsumInput {
    /// One-time investment
    pub principal: f64,
    /// Expected annual return, in percent
    pub annual_rate_pct: f64,
    /// Holding period in years
    pub years: u32,
}

/// Output of the lumpsum calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpsumProjection {
    pub invested: f64,
    pub estimated_returns: f64,
    pub total_value: f64,
    pub absolute_return_pct: f64,
}

pub fn project_lumpsum(input: &LumpsumInput) -> Result<LumpsumProjection> {
    validate_amount("principal", input.principal)?;
    validate_rate("annual_rate_pct", input.annual_rate_pct)?;
    validate_years("years", input.years)?;

    let total_value = lumpsum_future_value(input.principal, input.annual_rate_pct, input.years as f64);
    let estimated_returns = total_value - input.principal;
    let absolute_return_pct = if input.principal > 0.0 {
        estimated_returns / input.principal * 100.0
    } else {
        0.0
    };

    Ok(LumpsumProjection {
        invested: input.principal,
        estimated_returns,
        total_value,
        absolute_return_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sip_known_value() {
        // 25,000/month at 12% for 10 years (dashboard default)
        let fv = sip_future_value(25_000.0, 12.0, 120);
        let i: f64 = 0.01;
        let expected = 25_000.0 * ((1.0 + i).powi(120) - 1.0) / i * (1.0 + i);
        assert_relative_eq!(fv, expected, max_relative = 1e-12);
        assert!((fv - 5_808_476.91).abs() < 0.01, "got {}", fv);
    }

    #[test]
    fn test_sip_zero_rate_is_simple_sum() {
        assert_relative_eq!(sip_future_value(1000.0, 0.0, 36), 36_000.0);
    }

    #[test]
    fn test_sip_monotonic_in_each_argument() {
        let base = sip_future_value(5000.0, 10.0, 120);
        assert!(sip_future_value(5001.0, 10.0, 120) > base);
        assert!(sip_future_value(5000.0, 10.5, 120) > base);
        assert!(sip_future_value(5000.0, 10.0, 121) > base);

        let mut previous = 0.0;
        for months in 1..=360 {
            let fv = sip_future_value(1000.0, 8.0, months);
            assert!(fv > previous);
            previous = fv;
        }
    }

    #[test]
    fn test_project_sip_splits_returns() {
        let plan = InvestmentPlan::new(10_000.0, 12.0, 5).with_inflation(6.0);
        let projection = project_sip(&plan).unwrap();

        assert_relative_eq!(projection.invested, 600_000.0);
        assert_relative_eq!(
            projection.invested + projection.estimated_returns,
            projection.total_value,
            max_relative = 1e-12
        );
        assert!(projection.real_value < projection.total_value);
    }

    #[test]
    fn test_project_sip_rejects_zero_tenure() {
        let plan = InvestmentPlan::new(10_000.0, 12.0, 0);
        assert!(project_sip(&plan).is_err());
    }

    #[test]
    fn test_value_by_year_starts_at_zero() {
        let rows = sip_value_by_year(15_000.0, 12.5, 15);
        assert_eq!(rows.len(), 16);
        assert_eq!(rows[0].value, 0.0);
        assert_relative_eq!(rows[15].value, sip_future_value(15_000.0, 12.5, 180));
    }

    #[test]
    fn test_lumpsum() {
        let result = project_lumpsum(&LumpsumInput {
            principal: 100_000.0,
            annual_rate_pct: 10.0,
            years: 2,
        })
        .unwrap();

        assert_relative_eq!(result.total_value, 121_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.absolute_return_pct, 21.0, epsilon = 1e-9);
    }
}
