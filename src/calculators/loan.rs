//! EMI amortization and the EMI-vs-SIP trade-off

use super::sip::sip_future_value;
use crate::error::{CalcError, Result};
use crate::plan::{validate_amount, validate_rate, validate_tenure, validate_years};
use crate::rates::{annuity_factor, monthly_rate, EPSILON};
use serde::{Deserialize, Serialize};

/// Equated monthly installment: `P * r(1+r)^n / ((1+r)^n - 1)`.
/// A zero rate gives `P / n`, which is also the limit as `r -> 0`.
pub fn emi(principal: f64, annual_pct: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    let r = monthly_rate(annual_pct);
    if r.abs() < EPSILON {
        return principal / months as f64;
    }
    let growth = (1.0 + r).powi(months as i32);
    principal * r * growth / (growth - 1.0)
}

/// Loan balance after `months_paid` payments of `payment`:
/// `P(1+r)^k - payment * ((1+r)^k - 1) / r`, floored at zero.
pub fn outstanding_balance(principal: f64, annual_pct: f64, payment: f64, months_paid: u32) -> f64 {
    let r = monthly_rate(annual_pct);
    let balance = principal * (1.0 + r).powi(months_paid as i32) - payment * annuity_factor(r, months_paid);
    balance.max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub opening_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

/// Month-by-month split of each EMI into interest and principal
pub fn amortization_schedule(principal: f64, annual_pct: f64, months: u32) -> Vec<AmortizationRow> {
    let r = monthly_rate(annual_pct);
    let payment = emi(principal, annual_pct, months);

    let mut balance = principal;
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let interest = balance * r;
        // Last installment clears any rounding residue
        let principal_part = if month == months { balance } else { (payment - interest).min(balance) };
        let closing = balance - principal_part;

        rows.push(AmortizationRow {
            month,
            opening_balance: balance,
            payment: principal_part + interest,
            interest,
            principal: principal_part,
            closing_balance: closing,
        });
        balance = closing;
    }

    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiSummary {
    pub emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<AmortizationRow>,
}

/// The EMI calculator: installment, totals and optionally the full schedule
pub fn emi_summary(principal: f64, annual_pct: f64, months: u32, with_schedule: bool) -> Result<EmiSummary> {
    validate_amount("principal", principal)?;
    validate_rate("annual_rate_pct", annual_pct)?;
    validate_tenure("months", months)?;

    let payment = emi(principal, annual_pct, months);
    let total_payment = payment * months as f64;
    let schedule = if with_schedule {
        amortization_schedule(principal, annual_pct, months)
    } else {
        Vec::new()
    };

    Ok(EmiSummary {
        emi: payment,
        total_payment,
        total_interest: total_payment - principal,
        schedule,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmiVsSipInput {
    /// Loan principal
    pub loan_amount: f64,
    /// Annual loan interest rate, in percent
    pub loan_rate_pct: f64,
    /// Loan tenure in years; the SIP runs for the same term
    pub years: u32,
    /// Part of the EMI diverted into the SIP each month; at most the full EMI
    pub monthly_sip: f64,
    /// Expected annual SIP return, in percent
    pub sip_rate_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    FullEmi,
    ReducedEmiWithSip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmiVsSipYear {
    pub year: u32,
    pub emi_paid: f64,
    pub sip_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiVsSipResult {
    pub full_emi: f64,
    pub total_emi_outflow: f64,
    pub total_interest: f64,
    pub sip_future_value: f64,
    /// Total EMI outflow less what the parallel SIP grows to
    pub net_cost_after_sip: f64,

    /// EMI left after diverting `monthly_sip` into the SIP
    pub reduced_emi: f64,
    /// Loan balance still owed at the end of the term on the reduced EMI
    pub remaining_balance: f64,
    /// SIP value left after clearing the remaining balance
    pub surplus_after_clearing: f64,
    pub full_emi_net_cost: f64,
    pub diverted_net_cost: f64,
    pub better_strategy: Strategy,

    pub yearly: Vec<EmiVsSipYear>,
}

/// Compare paying the full EMI against paying less and running a SIP with the difference
pub fn compare_emi_vs_sip(input: &EmiVsSipInput) -> Result<EmiVsSipResult> {
    validate_amount("loan_amount", input.loan_amount)?;
    validate_rate("loan_rate_pct", input.loan_rate_pct)?;
    validate_years("years", input.years)?;
    validate_amount("monthly_sip", input.monthly_sip)?;
    validate_rate("sip_rate_pct", input.sip_rate_pct)?;

    let n = input.years * 12;
    let full_emi = emi(input.loan_amount, input.loan_rate_pct, n);
    let total_emi_outflow = full_emi * n as f64;
    let sip_value = sip_future_value(input.monthly_sip, input.sip_rate_pct, n);

    if input.monthly_sip > full_emi {
        return Err(CalcError::invalid(
            "monthly_sip",
            format!("must not exceed the EMI of {:.2} (got {:.2})", full_emi, input.monthly_sip),
        ));
    }

    let reduced_emi = full_emi - input.monthly_sip;
    let remaining_balance = outstanding_balance(input.loan_amount, input.loan_rate_pct, reduced_emi, n);
    let surplus_after_clearing = sip_value - remaining_balance;

    // Both strategies spend full_emi every month; the SIP side then settles the loan
    let full_emi_net_cost = total_emi_outflow;
    let diverted_net_cost = (reduced_emi + input.monthly_sip) * n as f64 - surplus_after_clearing;

    let better_strategy = if diverted_net_cost < full_emi_net_cost {
        Strategy::ReducedEmiWithSip
    } else {
        Strategy::FullEmi
    };

    let yearly = (0..=input.years)
        .map(|year| {
            let months = year * 12;
            EmiVsSipYear {
                year,
                emi_paid: (full_emi * months as f64).min(total_emi_outflow),
                sip_value: sip_future_value(input.monthly_sip, input.sip_rate_pct, months),
            }
        })
        .collect();

    log::debug!(
        "EMI vs SIP: emi {:.2}, sip value {:.2}, remaining {:.2}, better {:?}",
        full_emi, sip_value, remaining_balance, better_strategy
    );

    Ok(EmiVsSipResult {
        full_emi,
        total_emi_outflow,
        total_interest: total_emi_outflow - input.loan_amount,
        sip_future_value: sip_value,
        net_cost_after_sip: total_emi_outflow - sip_value,
        reduced_emi,
        remaining_balance,
        surplus_after_clearing,
        full_emi_net_cost,
        diverted_net_cost,
        better_strategy,
        yearly,
    })
}
