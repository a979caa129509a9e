//! Internal Rate of Return for equally spaced cash flows
//!
//! Used for the SWP money-weighted return, where every flow falls on a month
//! boundary.

use crate::config::SolverSettings;
use crate::error::{CalcError, Result};

/// Lowest periodic rate the solvers will consider
const MIN_RATE: f64 = -0.99;
/// Highest periodic rate the solvers will consider
const MAX_RATE: f64 = 10.0;

/// Calculate the annualised IRR of a series of equally spaced cash flows
/// using Newton-Raphson, falling back to bisection.
///
/// # Arguments
/// * `cashflows` - Cash flow per period (positive = inflow, negative = outflow)
/// * `periods_per_year` - Number of periods per year (12 for monthly)
///
/// # Returns
/// Annual effective rate as a decimal (e.g., 0.05 for 5%)
pub fn periodic_irr(cashflows: &[f64], periods_per_year: u32, settings: &SolverSettings) -> Result<f64> {
    if cashflows.len() < 2 {
        return Err(CalcError::EmptySeries);
    }

    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return Err(CalcError::NoSignChange);
    }

    let annualise = |periodic: f64| (1.0 + periodic).powi(periods_per_year as i32) - 1.0;

    // Initial guess: the configured annual rate spread over the periods
    let mut rate = settings.initial_guess / periods_per_year as f64;

    for _ in 0..settings.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < 1e-20 {
            break;
        }

        let new_rate = (rate - npv / dnpv).clamp(MIN_RATE, MAX_RATE);

        if (new_rate - rate).abs() < settings.tolerance {
            return Ok(annualise(new_rate));
        }

        rate = new_rate;
    }

    log::warn!("IRR: Newton-Raphson did not converge, falling back to bisection");
    bisection(cashflows, settings).map(annualise)
}

/// NPV and its derivative with respect to the periodic rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

fn bisection(cashflows: &[f64], settings: &SolverSettings) -> Result<f64> {
    let mut low = MIN_RATE;
    let mut high = MAX_RATE;
    let mut npv_low = npv_at_rate(cashflows, low);

    if npv_low * npv_at_rate(cashflows, high) > 0.0 {
        return Err(CalcError::NotConverged {
            iterations: settings.max_iterations,
            last_rate: f64::NAN,
        });
    }

    // Bisection halves the bracket each step; 200 steps exhausts f64 precision
    for _ in 0..200 {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < settings.tolerance || (high - low) / 2.0 < settings.tolerance {
            return Ok(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    Err(CalcError::NotConverged {
        iterations: 200,
        last_rate: (low + high) / 2.0,
    })
}
