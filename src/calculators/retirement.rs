//! Retirement corpus sizing
//!
//! Two chained annuities: the present value at retirement of an
//! inflation-indexed income stream, then the monthly SIP that accumulates
//! that corpus by the retirement date.

use super::goal::required_monthly_sip;
use crate::error::{CalcError, Result};
use crate::plan::{validate_amount, validate_rate};
use crate::rates::{annual_rate, growing_annuity_pv_factor, EPSILON};
use serde::{Deserialize, Serialize};

/// Youngest age the calculator accepts
pub const MIN_CURRENT_AGE: u32 = 18;
/// Oldest life expectancy the calculator accepts
pub const MAX_LIFE_EXPECTANCY: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementInput {
    /// Age today, in whole years
    pub current_age: u32,
    /// Age at which the monthly income starts
    pub retirement_age: u32,
    /// Age until which the income must last
    pub life_expectancy: u32,
    /// Current monthly household expense
    pub monthly_expense: f64,
    /// Expected annual return while saving, in percent
    pub return_before_pct: f64,
    /// Expected annual return on the corpus after retirement, in percent
    pub return_after_pct: f64,
    /// Expected annual inflation, in percent
    pub inflation_pct: f64,
    /// Savings already set aside, counted at face value against the corpus
    #[serde(default)]
    pub existing_savings: f64,
}

impl RetirementInput {
    fn validate(&self) -> Result<()> {
        if self.current_age < MIN_CURRENT_AGE {
            return Err(CalcError::invalid("current_age", format!("must be at least {}", MIN_CURRENT_AGE)));
        }
        if self.retirement_age <= self.current_age {
            return Err(CalcError::invalid("retirement_age", "must be greater than current age"));
        }
        if self.life_expectancy <= self.retirement_age {
            return Err(CalcError::invalid("life_expectancy", "must be greater than retirement age"));
        }
        if self.life_expectancy > MAX_LIFE_EXPECTANCY {
            return Err(CalcError::invalid(
                "life_expectancy",
                format!("must be at most {} (got {})", MAX_LIFE_EXPECTANCY, self.life_expectancy),
            ));
        }
        validate_amount("monthly_expense", self.monthly_expense)?;
        if self.monthly_expense <= 0.0 {
            return Err(CalcError::invalid("monthly_expense", "must be greater than zero"));
        }
        validate_rate("return_before_pct", self.return_before_pct)?;
        validate_rate("return_after_pct", self.return_after_pct)?;
        validate_rate("inflation_pct", self.inflation_pct)?;
        validate_amount("existing_savings", self.existing_savings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementPlan {
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    /// First year's expenses at retirement, in then-current money
    pub annual_income_at_retirement: f64,
    pub corpus_needed: f64,
    pub net_corpus_needed: f64,
    pub monthly_savings: f64,
}

pub fn plan_retirement(input: &RetirementInput) -> Result<RetirementPlan> {
    input.validate()?;

    let years_to_retirement = input.retirement_age - input.current_age;
    let years_in_retirement = input.life_expectancy - input.retirement_age;

    let inflation = annual_rate(input.inflation_pct);
    let return_after = annual_rate(input.return_after_pct);

    let annual_income_at_retirement =
        input.monthly_expense * 12.0 * (1.0 + inflation).powi(years_to_retirement as i32);

    if (return_after - inflation).abs() < EPSILON {
        log::warn!(
            "post-retirement return equals inflation ({}%), using limit form",
            input.inflation_pct
        );
    }
    let corpus_needed =
        annual_income_at_retirement * growing_annuity_pv_factor(return_after, inflation, years_in_retirement);

    let net_corpus_needed = (corpus_needed - input.existing_savings).max(0.0);
    let monthly_savings = required_monthly_sip(net_corpus_needed, input.return_before_pct, years_to_retirement * 12);

    log::debug!(
        "retirement in {} years: income {:.2}, corpus {:.2}, monthly {:.2}",
        years_to_retirement, annual_income_at_retirement, corpus_needed, monthly_savings
    );

    Ok(RetirementPlan {
        years_to_retirement,
        years_in_retirement,
        annual_income_at_retirement,
        corpus_needed,
        net_corpus_needed,
        monthly_savings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::sip::sip_future_value;
    use approx::assert_relative_eq;

    fn base_input() -> RetirementInput {
        RetirementInput {
            current_age: 30,
            retirement_age: 60,
            life_expectancy: 85,
            monthly_expense: 50_000.0,
            return_before_pct: 15.0,
            return_after_pct: 8.0,
            inflation_pct: 6.0,
            existing_savings: 0.0,
        }
    }

    #[test]
    fn test_plan_retirement() {
        let plan = plan_retirement(&base_input()).unwrap();

        assert_eq!(plan.years_to_retirement, 30);
        assert_eq!(plan.years_in_retirement, 25);

        let income = 600_000.0 * 1.06_f64.powi(30);
        assert_relative_eq!(plan.annual_income_at_retirement, income, max_relative = 1e-12);

        let factor = (1.0 - (1.06_f64 / 1.08).powi(25)) / (0.08 - 0.06);
        assert_relative_eq!(plan.corpus_needed, income * factor, max_relative = 1e-12);

        // Monthly savings reproduce the corpus through the SIP formula
        assert_relative_eq!(
            sip_future_value(plan.monthly_savings, 15.0, 360),
            plan.net_corpus_needed,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_return_equal_to_inflation_is_finite() {
        let plan = plan_retirement(&RetirementInput {
            return_after_pct: 6.0,
            ..base_input()
        })
        .unwrap();

        assert!(plan.corpus_needed.is_finite());
        assert_relative_eq!(
            plan.corpus_needed,
            plan.annual_income_at_retirement * 25.0 / 1.06,
            max_relative = 1e-12
        );

        let nearby = plan_retirement(&RetirementInput {
            return_after_pct: 6.0001,
            ..base_input()
        })
        .unwrap();
        assert_relative_eq!(plan.corpus_needed, nearby.corpus_needed, max_relative = 1e-3);
    }

    #[test]
    fn test_existing_savings_reduce_requirement() {
        let without = plan_retirement(&base_input()).unwrap();
        let with = plan_retirement(&RetirementInput {
            existing_savings: 5_000_000.0,
            ..base_input()
        })
        .unwrap();

        assert_relative_eq!(with.net_corpus_needed, without.corpus_needed - 5_000_000.0, max_relative = 1e-12);
        assert!(with.monthly_savings < without.monthly_savings);

        let covered = plan_retirement(&RetirementInput {
            existing_savings: 1e12,
            ..base_input()
        })
        .unwrap();
        assert_eq!(covered.net_corpus_needed, 0.0);
        assert_eq!(covered.monthly_savings, 0.0);
    }

    #[test]
    fn test_zero_pre_retirement_return() {
        let plan = plan_retirement(&RetirementInput {
            return_before_pct: 0.0,
            ..base_input()
        })
        .unwrap();
        assert_relative_eq!(plan.monthly_savings, plan.net_corpus_needed / 360.0, max_relative = 1e-12);
    }

    #[test]
    fn test_validation() {
        let too_young = RetirementInput { current_age: 16, ..base_input() };
        assert!(plan_retirement(&too_young).is_err());

        let retired = RetirementInput { retirement_age: 30, ..base_input() };
        assert!(plan_retirement(&retired).is_err());

        let short_life = RetirementInput { life_expectancy: 60, ..base_input() };
        assert!(plan_retirement(&short_life).is_err());

        let no_expense = RetirementInput { monthly_expense: 0.0, ..base_input() };
        assert!(plan_retirement(&no_expense).is_err());

        let far_future = RetirementInput {
            retirement_age: 400_000_000,
            life_expectancy: u32::MAX,
            ..base_input()
        };
        assert!(matches!(
            plan_retirement(&far_future),
            Err(CalcError::InvalidInput { field: "life_expectancy", .. })
        ));
    }
}
