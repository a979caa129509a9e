//! The dashboard calculators

mod sip;
mod goal;
mod swp;
mod nav_swp;
mod loan;
mod tax;
mod retirement;

pub use sip::{
    lumpsum_future_value, project_lumpsum, project_sip, sip_future_value, sip_value_by_year, LumpsumInput,
    LumpsumProjection, SipProjection, YearValue,
};
pub use goal::{
    child_goal, plan_goal, required_monthly_sip, sip_need, ChildGoalInput, ChildGoalKind, ChildGoalPlan,
    ExistingInvestment, GoalInput, GoalPlan,
};
pub use swp::{months_until_depleted, simulate_swp, SwpInput, SwpResult, SwpRow};
pub use nav_swp::{nav_swp_report, NavSwpInput, NavSwpReport, NavSwpRow, SwpInterval};
pub use loan::{
    amortization_schedule, compare_emi_vs_sip, emi, emi_summary, outstanding_balance, AmortizationRow, EmiSummary,
    EmiVsSipInput, EmiVsSipResult, EmiVsSipYear, Strategy,
};
pub use tax::{capital_gains_tax, CapitalGainsInput, CapitalGainsResult, HoldingPeriod};
pub use retirement::{plan_retirement, RetirementInput, RetirementPlan, MAX_LIFE_EXPECTANCY, MIN_CURRENT_AGE};
