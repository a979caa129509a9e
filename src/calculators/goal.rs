//! Goal corpus sizing: SIP-Need and child education/marriage goals
//!
//! A goal is priced in today's money, inflated to the goal date, reduced by
//! whatever existing investments will have grown to, and the remainder is
//! solved for the monthly SIP that reaches it.

use crate::error::{CalcError, Result};
use crate::plan::{validate_amount, validate_rate, validate_years};
use crate::rates::{annual_rate, annuity_due_factor, growing_annuity_due_factor, monthly_rate, EPSILON};
use serde::{Deserialize, Serialize};

/// Investments already held towards the goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExistingInvestment {
    pub amount: f64,
    pub annual_return_pct: f64,
}

impl ExistingInvestment {
    /// Value at the goal date, compounded annually
    pub fn future_value(&self, years: u32) -> f64 {
        self.amount * (1.0 + annual_rate(self.annual_return_pct)).powi(years as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalInput {
    /// Cost of the goal in today's money
    pub target_today: f64,
    /// Years until the money is needed
    pub years: u32,
    /// Expected annual SIP return, in percent
    pub expected_return_pct: f64,
    /// Expected annual inflation, in percent
    pub inflation_pct: f64,

    /// Annual growth of the SIP contribution, applied monthly as `g / 12`
    #[serde(default)]
    pub step_up_pct: Option<f64>,

    #[serde(default)]
    pub existing: Option<ExistingInvestment>,
}

impl GoalInput {
    pub fn new(target_today: f64, years: u32, expected_return_pct: f64, inflation_pct: f64) -> Self {
        Self {
            target_today,
            years,
            expected_return_pct,
            inflation_pct,
            step_up_pct: None,
            existing: None,
        }
    }

    fn validate(&self) -> Result<()> {
        validate_amount("target_today", self.target_today)?;
        validate_years("years", self.years)?;
        validate_rate("expected_return_pct", self.expected_return_pct)?;
        validate_rate("inflation_pct", self.inflation_pct)?;
        if let Some(step_up) = self.step_up_pct {
            validate_rate("step_up_pct", step_up)?;
        }
        if let Some(existing) = &self.existing {
            validate_amount("existing.amount", existing.amount)?;
            validate_rate("existing.annual_return_pct", existing.annual_return_pct)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub inflation_adjusted_target: f64,
    pub existing_future_value: f64,
    /// Amount the SIP must accumulate after existing investments
    pub net_target: f64,
    /// First month's SIP (stays flat without a step-up)
    pub monthly_sip: f64,
    pub total_investment: f64,
    /// Inflation-adjusted target divided by total SIP investment
    pub growth_multiple: f64,
    /// Existing investments' future value minus the target; negative is a shortfall
    pub surplus: f64,
}

/// Monthly SIP (paid at month start) needed to accumulate `target_fv`
pub fn required_monthly_sip(target_fv: f64, annual_pct: f64, months: u32) -> f64 {
    if months == 0 || target_fv <= 0.0 {
        return 0.0;
    }
    target_fv / annuity_due_factor(monthly_rate(annual_pct), months)
}

/// Size a goal and solve for the monthly SIP
pub fn plan_goal(input: &GoalInput) -> Result<GoalPlan> {
    input.validate()?;

    let months = input.years * 12;
    let i = monthly_rate(input.expected_return_pct);

    let inflation_adjusted_target =
        input.target_today * (1.0 + annual_rate(input.inflation_pct)).powi(input.years as i32);
    let existing_future_value = input
        .existing
        .map(|e| e.future_value(input.years))
        .unwrap_or(0.0);
    let net_target = (inflation_adjusted_target - existing_future_value).max(0.0);

    let (monthly_sip, total_investment) = match input.step_up_pct {
        Some(step_up) if step_up > 0.0 => {
            let g = monthly_rate(step_up);
            if (i - g).abs() < EPSILON {
                log::warn!("SIP step-up equals expected return ({}%), using limit form", step_up);
            }
            let factor = growing_annuity_due_factor(i, g, months);
            let first = if net_target > 0.0 { net_target / factor } else { 0.0 };
            (first, first * stepped_contribution_sum(g, months))
        }
        _ => {
            let sip = required_monthly_sip(net_target, input.expected_return_pct, months);
            (sip, sip * months as f64)
        }
    };

    if !monthly_sip.is_finite() {
        return Err(CalcError::invalid("expected_return_pct", "goal has no finite SIP solution"));
    }

    let growth_multiple = if total_investment > 0.0 {
        inflation_adjusted_target / total_investment
    } else {
        0.0
    };

    log::debug!(
        "goal {:.2} in {} years -> target {:.2}, sip {:.2}",
        input.target_today, input.years, inflation_adjusted_target, monthly_sip
    );

    Ok(GoalPlan {
        inflation_adjusted_target,
        existing_future_value,
        net_target,
        monthly_sip,
        total_investment,
        growth_multiple,
        surplus: existing_future_value - inflation_adjusted_target,
    })
}

/// Sum of `(1+g)^k` for k in 0..n: total paid by a SIP starting at 1
fn stepped_contribution_sum(growth: f64, months: u32) -> f64 {
    if growth.abs() < EPSILON {
        return months as f64;
    }
    ((1.0 + growth).powi(months as i32) - 1.0) / growth
}

/// The SIP-Need calculator: no step-up and no existing savings
pub fn sip_need(target_today: f64, years: u32, expected_return_pct: f64, inflation_pct: f64) -> Result<GoalPlan> {
    plan_goal(&GoalInput::new(target_today, years, expected_return_pct, inflation_pct))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildGoalKind {
    Education,
    Marriage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChildGoalInput {
    pub kind: ChildGoalKind,
    pub child_age: u32,
    /// Age of the child when the money is needed
    pub goal_age: u32,
    pub cost_today: f64,
    pub expected_return_pct: f64,
    pub inflation_pct: f64,
    #[serde(default)]
    pub step_up_pct: Option<f64>,
    #[serde(default)]
    pub existing: Option<ExistingInvestment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChildGoalPlan {
    pub kind: ChildGoalKind,
    pub years_to_goal: u32,
    #[serde(flatten)]
    pub plan: GoalPlan,
}

/// Child education or marriage corpus
pub fn child_goal(input: &ChildGoalInput) -> Result<ChildGoalPlan> {
    if input.goal_age <= input.child_age {
        return Err(CalcError::invalid(
            "goal_age",
            format!("must be after the child's current age ({})", input.child_age),
        ));
    }
    let years_to_goal = input.goal_age - input.child_age;

    let plan = plan_goal(&GoalInput {
        target_today: input.cost_today,
        years: years_to_goal,
        expected_return_pct: input.expected_return_pct,
        inflation_pct: input.inflation_pct,
        step_up_pct: input.step_up_pct,
        existing: input.existing,
    })?;

    Ok(ChildGoalPlan {
        kind: input.kind,
        years_to_goal,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::sip::sip_future_value;
    use approx::assert_relative_eq;

    #[test]
    fn test_sip_need_round_trip() {
        let plan = sip_need(10_000_000.0, 10, 12.0, 8.0).unwrap();

        let expected_target = 10_000_000.0 * 1.08_f64.powi(10);
        assert_relative_eq!(plan.inflation_adjusted_target, expected_target, max_relative = 1e-12);

        let reproduced = sip_future_value(plan.monthly_sip, 12.0, 120);
        assert_relative_eq!(reproduced, plan.inflation_adjusted_target, max_relative = 1e-9);
    }

    #[test]
    fn test_round_trip_across_inputs() {
        for &(years, ret, infl) in &[(1, 1.0, 0.0), (5, 8.0, 5.0), (20, 15.0, 7.5), (35, 0.0, 6.0)] {
            let plan = sip_need(2_500_000.0, years, ret, infl).unwrap();
            let reproduced = sip_future_value(plan.monthly_sip, ret, years * 12);
            assert_relative_eq!(reproduced, plan.net_target, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_existing_investment_reduces_sip() {
        let base = GoalInput::new(5_000_000.0, 15, 12.0, 6.0);
        let without = plan_goal(&base).unwrap();

        let with = plan_goal(&GoalInput {
            existing: Some(ExistingInvestment { amount: 500_000.0, annual_return_pct: 9.7 }),
            ..base
        })
        .unwrap();

        let existing_fv = 500_000.0 * 1.097_f64.powi(15);
        assert_relative_eq!(with.existing_future_value, existing_fv, max_relative = 1e-12);
        assert!(with.monthly_sip < without.monthly_sip);
        assert_relative_eq!(
            sip_future_value(with.monthly_sip, 12.0, 180),
            with.net_target,
            max_relative = 1e-9
        );
        assert!(with.surplus < 0.0);
    }

    #[test]
    fn test_existing_investment_covering_goal() {
        let plan = plan_goal(&GoalInput {
            existing: Some(ExistingInvestment { amount: 1_000_000.0, annual_return_pct: 10.0 }),
            ..GoalInput::new(100_000.0, 5, 12.0, 6.0)
        })
        .unwrap();

        assert_eq!(plan.net_target, 0.0);
        assert_eq!(plan.monthly_sip, 0.0);
        assert_eq!(plan.growth_multiple, 0.0);
        assert!(plan.surplus > 0.0);
    }

    #[test]
    fn test_step_up_lowers_first_installment() {
        let base = GoalInput::new(5_000_000.0, 10, 12.0, 6.0);
        let flat = plan_goal(&base).unwrap();
        let stepped = plan_goal(&GoalInput { step_up_pct: Some(7.5), ..base }).unwrap();

        assert!(stepped.monthly_sip < flat.monthly_sip);

        // Rebuild the stepped SIP month by month and check it lands on target
        let i = monthly_rate(12.0);
        let g = monthly_rate(7.5);
        let mut balance = 0.0;
        let mut contribution = stepped.monthly_sip;
        for _ in 0..120 {
            balance = (balance + contribution) * (1.0 + i);
            contribution *= 1.0 + g;
        }
        assert_relative_eq!(balance, stepped.net_target, max_relative = 1e-9);
    }

    #[test]
    fn test_step_up_equal_to_return_is_finite() {
        let plan = plan_goal(&GoalInput {
            step_up_pct: Some(12.0),
            ..GoalInput::new(5_000_000.0, 10, 12.0, 6.0)
        })
        .unwrap();

        assert!(plan.monthly_sip.is_finite());
        assert!(plan.monthly_sip > 0.0);
    }

    #[test]
    fn test_zero_return_goal() {
        let plan = sip_need(120_000.0, 1, 0.0, 0.0).unwrap();
        assert_relative_eq!(plan.monthly_sip, 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(plan.growth_multiple, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_child_goal_years_from_ages() {
        let result = child_goal(&ChildGoalInput {
            kind: ChildGoalKind::Education,
            child_age: 3,
            goal_age: 18,
            cost_today: 2_000_000.0,
            expected_return_pct: 12.0,
            inflation_pct: 8.0,
            step_up_pct: None,
            existing: None,
        })
        .unwrap();

        assert_eq!(result.years_to_goal, 15);
        let direct = sip_need(2_000_000.0, 15, 12.0, 8.0).unwrap();
        assert_relative_eq!(result.plan.monthly_sip, direct.monthly_sip, max_relative = 1e-12);
    }

    #[test]
    fn test_child_goal_rejects_past_goal_age() {
        let input = ChildGoalInput {
            kind: ChildGoalKind::Marriage,
            child_age: 26,
            goal_age: 25,
            cost_today: 1_000_000.0,
            expected_return_pct: 12.0,
            inflation_pct: 6.0,
            step_up_pct: None,
            existing: None,
        };
        assert!(child_goal(&input).is_err());
    }

    #[test]
    fn test_oversized_tenure_is_rejected() {
        assert!(matches!(
            plan_goal(&GoalInput::new(1_000.0, 400_000_000, 12.0, 6.0)),
            Err(CalcError::InvalidInput { field: "years", .. })
        ));

        let far_goal = ChildGoalInput {
            kind: ChildGoalKind::Education,
            child_age: 0,
            goal_age: u32::MAX,
            cost_today: 1_000_000.0,
            expected_return_pct: 12.0,
            inflation_pct: 6.0,
            step_up_pct: None,
            existing: None,
        };
        assert!(child_goal(&far_goal).is_err());
    }
}
