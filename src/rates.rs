//! Closed-form annuity and compounding factors
//!
//! Every factor guards its singular case (zero rate, or rate equal to the
//! growth rate) and returns the analytic limit instead of NaN/Infinity.

/// Rates closer than this are treated as equal
pub const EPSILON: f64 = 1e-10;

/// Convert an annual percentage rate to a monthly decimal rate (12 -> 0.01)
pub fn monthly_rate(annual_pct: f64) -> f64 {
    annual_pct / 12.0 / 100.0
}

/// Convert an annual percentage rate to a decimal (12 -> 0.12)
pub fn annual_rate(annual_pct: f64) -> f64 {
    annual_pct / 100.0
}

/// `amount * (1 + rate)^periods`
pub fn compound(amount: f64, rate: f64, periods: f64) -> f64 {
    amount * (1.0 + rate).powf(periods)
}

/// Future value of 1 per period, paid at period end: `((1+i)^n - 1) / i`
pub fn annuity_factor(rate: f64, periods: u32) -> f64 {
    if rate.abs() < EPSILON {
        return periods as f64;
    }
    ((1.0 + rate).powi(periods as i32) - 1.0) / rate
}

/// Future value of 1 per period, paid at period start
pub fn annuity_due_factor(rate: f64, periods: u32) -> f64 {
    annuity_factor(rate, periods) * (1.0 + rate)
}

/// Future value of a payment stream starting at 1 and growing by `growth`
/// each period, paid at period start.
///
/// When `rate == growth` the closed form is singular; the limit
/// `n (1+i)^(n-1)` is used instead.
pub fn growing_annuity_due_factor(rate: f64, growth: f64, periods: u32) -> f64 {
    let n = periods as i32;
    if (rate - growth).abs() < EPSILON {
        log::debug!("growing annuity: rate equals growth ({}), using limit form", rate);
        if periods == 0 {
            return 0.0;
        }
        return periods as f64 * (1.0 + rate).powi(n - 1) * (1.0 + rate);
    }
    ((1.0 + rate).powi(n) - (1.0 + growth).powi(n)) / (rate - growth) * (1.0 + rate)
}

/// Present value (at the first payment's period start) of an annual payment
/// of 1 that grows with `growth` for `years` years, discounted at `rate`.
///
/// When `rate == growth` every payment discounts to `1 / (1 + rate)`, so the
/// value is `years / (1 + rate)`.
pub fn growing_annuity_pv_factor(rate: f64, growth: f64, years: u32) -> f64 {
    if (rate - growth).abs() < EPSILON {
        log::debug!("growing annuity PV: rate equals growth ({}), using limit form", rate);
        return years as f64 / (1.0 + rate);
    }
    (1.0 - ((1.0 + growth) / (1.0 + rate)).powi(years as i32)) / (rate - growth)
}
