//! Tagged calculator requests and responses
//!
//! One JSON shape for every calculator, shared by the CLI `eval` command,
//! the batch runner and the Lambda handler:
//!
//! ```json
//! { "calculator": "sip", "monthly_amount": 25000, "annual_rate_pct": 12, "months": 120 }
//! ```

use crate::calculators::{
    capital_gains_tax, child_goal, compare_emi_vs_sip, emi_summary, plan_goal, plan_retirement, project_lumpsum,
    project_sip, simulate_swp, sip_need, sip_value_by_year, CapitalGainsInput, CapitalGainsResult, ChildGoalInput,
    ChildGoalPlan, EmiSummary, EmiVsSipInput, EmiVsSipResult, GoalInput, GoalPlan, LumpsumInput, LumpsumProjection,
    RetirementInput, RetirementPlan, SipProjection, SwpInput, SwpResult, YearValue,
};
use crate::config::CalculatorConfig;
use crate::error::Result;
use crate::plan::InvestmentPlan;
use crate::returns::{xirr, CashFlow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalculatorRequest {
    Sip(InvestmentPlan),
    Lumpsum(LumpsumInput),
    SipNeed {
        /// Cost of the goal in today's money
        target_today: f64,
        years: u32,
        /// Expected annual return, in percent
        expected_return_pct: f64,
        /// Expected annual inflation, in percent
        inflation_pct: f64,
    },
    Goal(GoalInput),
    ChildGoal(ChildGoalInput),
    Swp(SwpInput),
    Emi {
        /// Loan principal
        principal: f64,
        /// Annual interest rate, in percent
        annual_rate_pct: f64,
        /// Loan tenure in months
        months: u32,
        /// Include the month-by-month amortization schedule
        #[serde(default)]
        schedule: bool,
    },
    EmiVsSip(EmiVsSipInput),
    CapitalGains(CapitalGainsInput),
    Retirement(RetirementInput),
    Xirr {
        /// Dated flows; negative for money invested
        flows: Vec<CashFlow>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalculatorResponse {
    Sip {
        #[serde(flatten)]
        projection: SipProjection,
        yearly: Vec<YearValue>,
    },
    Lumpsum(LumpsumProjection),
    SipNeed(GoalPlan),
    Goal(GoalPlan),
    ChildGoal(ChildGoalPlan),
    Swp(SwpResult),
    Emi(EmiSummary),
    EmiVsSip(EmiVsSipResult),
    CapitalGains(CapitalGainsResult),
    Retirement(RetirementPlan),
    Xirr { rate_pct: f64 },
}

impl CalculatorRequest {
    /// The `calculator` tag this request carries
    pub fn name(&self) -> &'static str {
        match self {
            CalculatorRequest::Sip(_) => "sip",
            CalculatorRequest::Lumpsum(_) => "lumpsum",
            CalculatorRequest::SipNeed { .. } => "sip_need",
            CalculatorRequest::Goal(_) => "goal",
            CalculatorRequest::ChildGoal(_) => "child_goal",
            CalculatorRequest::Swp(_) => "swp",
            CalculatorRequest::Emi { .. } => "emi",
            CalculatorRequest::EmiVsSip(_) => "emi_vs_sip",
            CalculatorRequest::CapitalGains(_) => "capital_gains",
            CalculatorRequest::Retirement(_) => "retirement",
            CalculatorRequest::Xirr { .. } => "xirr",
        }
    }

    /// Run the calculator this request names
    pub fn evaluate(&self, config: &CalculatorConfig) -> Result<CalculatorResponse> {
        log::debug!("evaluating {} request", self.name());

        let response = match self {
            CalculatorRequest::Sip(plan) => {
                plan.validate()?;
                config.limits.validate()?;
                let clamped = plan.clamp(&config.limits);
                if clamped != *plan {
                    log::debug!("SIP inputs clamped to configured limits: {:?}", clamped);
                }
                let projection = project_sip(&clamped)?;
                let yearly = sip_value_by_year(clamped.monthly_amount, clamped.annual_rate_pct, clamped.months / 12);
                CalculatorResponse::Sip { projection, yearly }
            }
            CalculatorRequest::Lumpsum(input) => CalculatorResponse::Lumpsum(project_lumpsum(input)?),
            CalculatorRequest::SipNeed {
                target_today,
                years,
                expected_return_pct,
                inflation_pct,
            } => CalculatorResponse::SipNeed(sip_need(*target_today, *years, *expected_return_pct, *inflation_pct)?),
            CalculatorRequest::Goal(input) => CalculatorResponse::Goal(plan_goal(input)?),
            CalculatorRequest::ChildGoal(input) => CalculatorResponse::ChildGoal(child_goal(input)?),
            CalculatorRequest::Swp(input) => CalculatorResponse::Swp(simulate_swp(input, &config.solver)?),
            CalculatorRequest::Emi {
                principal,
                annual_rate_pct,
                months,
                schedule,
            } => CalculatorResponse::Emi(emi_summary(*principal, *annual_rate_pct, *months, *schedule)?),
            CalculatorRequest::EmiVsSip(input) => CalculatorResponse::EmiVsSip(compare_emi_vs_sip(input)?),
            CalculatorRequest::CapitalGains(input) => {
                CalculatorResponse::CapitalGains(capital_gains_tax(input, &config.tax)?)
            }
            CalculatorRequest::Retirement(input) => CalculatorResponse::Retirement(plan_retirement(input)?),
            CalculatorRequest::Xirr { flows } => CalculatorResponse::Xirr {
                rate_pct: xirr(flows, &config.solver)? * 100.0,
            },
        };

        Ok(response)
    }
}
