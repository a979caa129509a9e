//! Investment plan input and shared field validation

use crate::config::InputLimits;
use crate::error::{CalcError, Result};
use serde::{Deserialize, Serialize};

/// Longest tenure any calculator accepts
pub const MAX_TENURE_YEARS: u32 = 100;

/// A periodic investment plan as entered on the calculator forms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPlan {
    /// Monthly contribution
    pub monthly_amount: f64,

    /// Expected annual return, in percent
    pub annual_rate_pct: f64,

    /// Tenure in months
    pub months: u32,

    /// Expected annual inflation, in percent
    #[serde(default)]
    pub inflation_pct: f64,
}

impl InvestmentPlan {
    pub fn new(monthly_amount: f64, annual_rate_pct: f64, years: u32) -> Self {
        Self {
            monthly_amount,
            annual_rate_pct,
            months: years.saturating_mul(12),
            inflation_pct: 0.0,
        }
    }

    pub fn with_inflation(mut self, inflation_pct: f64) -> Self {
        self.inflation_pct = inflation_pct;
        self
    }

    pub fn years(&self) -> f64 {
        self.months as f64 / 12.0
    }

    /// Reject negative or non-finite values and a zero tenure
    pub fn validate(&self) -> Result<()> {
        validate_amount("monthly_amount", self.monthly_amount)?;
        validate_rate("annual_rate_pct", self.annual_rate_pct)?;
        validate_rate("inflation_pct", self.inflation_pct)?;
        validate_tenure("months", self.months)
    }

    /// Pull every field into the configured range, as the input forms do
    pub fn clamp(&self, limits: &InputLimits) -> Self {
        let min_months = limits.min_years.saturating_mul(12);
        let max_months = limits.max_years.saturating_mul(12);
        Self {
            monthly_amount: clamp_value(self.monthly_amount, 0.0, limits.max_amount),
            annual_rate_pct: clamp_value(self.annual_rate_pct, 0.0, limits.max_return_pct),
            months: self.months.max(min_months).min(max_months),
            inflation_pct: clamp_value(self.inflation_pct, 0.0, limits.max_inflation_pct),
        }
    }
}

/// Clamp into `[min, max]`, mapping NaN to `min`. An inverted range
/// resolves to `max`.
pub fn clamp_value(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

pub fn validate_amount(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(CalcError::invalid(field, format!("must not be negative (got {})", value)));
    }
    Ok(())
}

pub fn validate_rate(field: &'static str, value_pct: f64) -> Result<()> {
    if !value_pct.is_finite() {
        return Err(CalcError::invalid(field, "must be a finite number"));
    }
    if value_pct < 0.0 {
        return Err(CalcError::invalid(field, format!("must not be negative (got {}%)", value_pct)));
    }
    Ok(())
}

/// Tenure in months: at least one, at most `MAX_TENURE_YEARS` years
pub fn validate_tenure(field: &'static str, months: u32) -> Result<()> {
    if months == 0 {
        return Err(CalcError::invalid(field, "must be greater than zero"));
    }
    if months > MAX_TENURE_YEARS * 12 {
        return Err(CalcError::invalid(
            field,
            format!("must be at most {} months (got {})", MAX_TENURE_YEARS * 12, months),
        ));
    }
    Ok(())
}

/// Tenure in whole years: at least one, at most `MAX_TENURE_YEARS`
pub fn validate_years(field: &'static str, years: u32) -> Result<()> {
    if years == 0 {
        return Err(CalcError::invalid(field, "must be greater than zero"));
    }
    if years > MAX_TENURE_YEARS {
        return Err(CalcError::invalid(
            field,
            format!("must be at most {} years (got {})", MAX_TENURE_YEARS, years),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_normal_plan() {
        let plan = InvestmentPlan::new(25_000.0, 12.0, 10).with_inflation(6.0);
        assert!(plan.validate().is_ok());
        assert_eq!(plan.months, 120);
        assert!((plan.years() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let zero_tenure = InvestmentPlan::new(1000.0, 12.0, 0);
        assert!(matches!(
            zero_tenure.validate(),
            Err(CalcError::InvalidInput { field: "months", .. })
        ));

        let negative = InvestmentPlan::new(-1.0, 12.0, 5);
        assert!(negative.validate().is_err());

        let nan_rate = InvestmentPlan::new(1000.0, f64::NAN, 5);
        assert!(nan_rate.validate().is_err());
    }

    #[test]
    fn test_oversized_tenure_is_rejected() {
        let huge = InvestmentPlan::new(1000.0, 12.0, 400_000_000);
        assert_eq!(huge.months, u32::MAX);
        assert!(matches!(
            huge.validate(),
            Err(CalcError::InvalidInput { field: "months", .. })
        ));

        assert!(validate_tenure("months", MAX_TENURE_YEARS * 12).is_ok());
        assert!(validate_tenure("months", MAX_TENURE_YEARS * 12 + 1).is_err());
        assert!(validate_years("years", MAX_TENURE_YEARS).is_ok());
        assert!(validate_years("years", MAX_TENURE_YEARS + 1).is_err());
        assert!(validate_years("years", 0).is_err());
    }

    #[test]
    fn test_clamp_with_inverted_limits_does_not_panic() {
        let limits = InputLimits {
            max_amount: -1.0,
            min_years: 60,
            max_years: 10,
            ..InputLimits::default()
        };
        let clamped = InvestmentPlan::new(1_000.0, 12.0, 20).clamp(&limits);
        assert_eq!(clamped.months, 120);
        assert_eq!(clamped.monthly_amount, -1.0);
        assert_eq!(clamp_value(5.0, 10.0, 1.0), 1.0);
    }

    #[test]
    fn test_clamp_pulls_into_range() {
        let limits = InputLimits::default();
        let plan = InvestmentPlan {
            monthly_amount: -50.0,
            annual_rate_pct: 250.0,
            months: 0,
            inflation_pct: f64::NAN,
        };

        let clamped = plan.clamp(&limits);
        assert_eq!(clamped.monthly_amount, 0.0);
        assert_eq!(clamped.annual_rate_pct, 100.0);
        assert_eq!(clamped.months, 12);
        assert_eq!(clamped.inflation_pct, 0.0);
        assert!(clamped.validate().is_ok());
    }
}
