//! Systematic Withdrawal Plan: month-by-month corpus depletion

use crate::config::SolverSettings;
use crate::error::Result;
use crate::plan::{validate_amount, validate_rate, validate_years};
use crate::rates::monthly_rate;
use crate::returns::periodic_irr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwpInput {
    /// Amount invested at the start of the plan
    pub corpus: f64,
    /// Withdrawn at the start of every month
    pub monthly_withdrawal: f64,
    /// Expected annual return on the remaining balance, in percent
    pub annual_return_pct: f64,
    /// Length of the withdrawal plan in years
    pub years: u32,
}

/// One month of the withdrawal walk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwpRow {
    pub month: u32,
    pub opening_balance: f64,
    pub withdrawal: f64,
    pub growth: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwpResult {
    pub rows: Vec<SwpRow>,
    pub total_withdrawn: f64,
    pub final_balance: f64,
    /// Month in which the corpus ran out, if it did
    pub depleted_in_month: Option<u32>,
    /// Money-weighted annual return of the plan, in percent
    pub xirr_pct: Option<f64>,
}

impl SwpResult {
    pub fn installments(&self) -> u32 {
        self.rows.len() as u32
    }
}

/// Withdraw at the start of each month, then grow what is left:
/// `balance = (balance - withdrawal) * (1 + i)`.
///
/// The month the corpus cannot cover a full withdrawal pays out what remains
/// and ends the walk.
pub fn simulate_swp(input: &SwpInput, settings: &SolverSettings) -> Result<SwpResult> {
    validate_amount("corpus", input.corpus)?;
    validate_amount("monthly_withdrawal", input.monthly_withdrawal)?;
    validate_rate("annual_return_pct", input.annual_return_pct)?;
    validate_years("years", input.years)?;

    let i = monthly_rate(input.annual_return_pct);
    let months = input.years * 12;

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = input.corpus;
    let mut depleted_in_month = None;

    for month in 1..=months {
        let opening_balance = balance;
        let withdrawal = input.monthly_withdrawal.min(opening_balance);
        let remaining = opening_balance - withdrawal;
        let growth = remaining * i;
        balance = remaining + growth;

        rows.push(SwpRow {
            month,
            opening_balance,
            withdrawal,
            growth,
            closing_balance: balance,
        });

        if balance <= 0.0 {
            balance = 0.0;
            depleted_in_month = Some(month);
            break;
        }
    }

    let total_withdrawn = rows.iter().map(|r| r.withdrawal).sum();

    // Flows at month starts: corpus out and first withdrawal in at t=0,
    // later withdrawals at t=1.., and the closing balance after the last month
    let mut flows: Vec<f64> = rows.iter().map(|r| r.withdrawal).collect();
    if let Some(first) = flows.first_mut() {
        *first -= input.corpus;
    }
    flows.push(balance);

    let xirr_pct = match periodic_irr(&flows, 12, settings) {
        Ok(rate) => Some(rate * 100.0),
        Err(e) => {
            log::debug!("SWP return not computable: {}", e);
            None
        }
    };

    log::debug!(
        "SWP {:.2} withdrawing {:.2}/month: {} installments, final {:.2}",
        input.corpus, input.monthly_withdrawal, rows.len(), balance
    );

    Ok(SwpResult {
        rows,
        total_withdrawn,
        final_balance: balance,
        depleted_in_month,
        xirr_pct,
    })
}

/// Number of monthly withdrawals until the corpus is exhausted, searching at
/// most `max_months`. `None` means the corpus outlasts the search.
pub fn months_until_depleted(corpus: f64, monthly_withdrawal: f64, annual_pct: f64, max_months: u32) -> Option<u32> {
    if corpus <= 0.0 {
        return Some(0);
    }
    if monthly_withdrawal <= 0.0 {
        return None;
    }

    let i = monthly_rate(annual_pct);
    let mut balance = corpus;
    for month in 1..=max_months {
        balance = (balance - monthly_withdrawal) * (1.0 + i);
        if balance <= 0.0 {
            return Some(month);
        }
    }
    None
}
