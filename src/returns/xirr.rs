//! XIRR: annualised money-weighted return for irregularly dated cash flows
//!
//! Newton-Raphson on the NPV-zero condition with a central numerical
//! derivative. If it does not converge within the iteration cap, or steps
//! outside the valid domain, the solver brackets a root and bisects. Failure
//! of both is reported as [`CalcError::NotConverged`] rather than returning an
//! unconverged estimate.

use crate::config::SolverSettings;
use crate::error::{CalcError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rates at or below this make `(1 + r)` non-positive
const RATE_FLOOR: f64 = -0.9999;
const BRACKET_CEILING: f64 = 1e6;
const DAYS_PER_YEAR: f64 = 365.0;

/// A dated cash flow; negative is money invested, positive is money received
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Annualised XIRR as a decimal (0.12 for 12%)
pub fn xirr(flows: &[CashFlow], settings: &SolverSettings) -> Result<f64> {
    if flows.len() < 2 {
        return Err(CalcError::EmptySeries);
    }
    if !flows.iter().any(|f| f.amount > 0.0) || !flows.iter().any(|f| f.amount < 0.0) {
        return Err(CalcError::NoSignChange);
    }

    let origin = flows.iter().map(|f| f.date).min().unwrap_or(flows[0].date);
    let timed: Vec<(f64, f64)> = flows
        .iter()
        .map(|f| ((f.date - origin).num_days() as f64 / DAYS_PER_YEAR, f.amount))
        .collect();

    match newton(&timed, settings) {
        Some(rate) => Ok(rate),
        None => {
            log::warn!("XIRR: Newton-Raphson failed after {} iterations, bisecting", settings.max_iterations);
            bisect(&timed, settings)
        }
    }
}

/// Net present value of `(years, amount)` pairs at an annual rate
fn npv(timed: &[(f64, f64)], rate: f64) -> f64 {
    timed
        .iter()
        .map(|&(years, amount)| amount / (1.0 + rate).powf(years))
        .sum()
}

fn newton(timed: &[(f64, f64)], settings: &SolverSettings) -> Option<f64> {
    let h = settings.derivative_step;
    let mut rate = settings.initial_guess;

    for _ in 0..settings.max_iterations {
        let value = npv(timed, rate);
        let slope = (npv(timed, rate + h) - npv(timed, rate - h)) / (2.0 * h);

        if !slope.is_finite() || slope.abs() < 1e-12 {
            return None;
        }

        let next = rate - value / slope;
        if !next.is_finite() || next <= RATE_FLOOR {
            return None;
        }
        if (next - rate).abs() < settings.tolerance {
            return Some(next);
        }
        rate = next;
    }

    None
}

fn bisect(timed: &[(f64, f64)], settings: &SolverSettings) -> Result<f64> {
    let mut low = RATE_FLOOR;
    let mut high = 1.0;
    let mut npv_low = npv(timed, low);

    // Grow the upper bound until the NPV changes sign
    while npv_low * npv(timed, high) > 0.0 {
        if high >= BRACKET_CEILING {
            return Err(CalcError::NotConverged {
                iterations: settings.max_iterations,
                last_rate: f64::NAN,
            });
        }
        high *= 10.0;
    }

    let mut iterations = 0;
    while iterations < 500 {
        iterations += 1;
        let mid = (low + high) / 2.0;
        let npv_mid = npv(timed, mid);

        if npv_mid == 0.0 || (high - low) / 2.0 < settings.tolerance {
            return Ok(mid);
        }
        if npv_low * npv_mid < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    Err(CalcError::NotConverged {
        iterations,
        last_rate: (low + high) / 2.0,
    })
}
