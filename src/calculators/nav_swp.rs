//! SWP report against real NAV history
//!
//! Units are bought at the NAV on the investment date and redeemed on each
//! withdrawal date at that day's NAV (or the last NAV before it).

use crate::config::SolverSettings;
use crate::error::{CalcError, Result};
use crate::nav::NavSeries;
use crate::plan::validate_amount;
use crate::returns::{xirr, CashFlow};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwpInterval {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl SwpInterval {
    pub fn months(&self) -> u32 {
        match self {
            SwpInterval::Monthly => 1,
            SwpInterval::Quarterly => 3,
            SwpInterval::HalfYearly => 6,
            SwpInterval::Yearly => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavSwpInput {
    /// Date of the one-time purchase
    pub invest_date: NaiveDate,
    /// Withdrawals begin on the first `swp_day` on or after this date
    pub start_date: NaiveDate,
    /// Last date a withdrawal may fall on; remaining units are valued here
    pub end_date: NaiveDate,
    /// Amount invested on `invest_date`
    pub total_invested_amount: f64,
    /// Cash redeemed on each withdrawal date
    pub withdrawal_amount: f64,
    /// Months between withdrawals
    pub interval: SwpInterval,
    /// Day of month for withdrawals; clamped to the month's last day
    pub swp_day: u32,
}

/// One line of the SWP report. The first line is the purchase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavSwpRow {
    pub current_date: NaiveDate,
    pub current_nav: f64,
    /// Units bought (positive) or redeemed (negative)
    pub units: f64,
    pub cumulative_units: f64,
    /// Investor's cash flow: negative for the purchase, positive for withdrawals
    pub cash_flow: f64,
    /// Invested amount less everything withdrawn so far
    pub net_amount: f64,
    /// Gain or loss realised by this redemption against the purchase NAV
    pub capital_gains_loss: f64,
    pub current_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavSwpReport {
    pub rows: Vec<NavSwpRow>,
    pub installments: u32,
    pub total_withdrawn: f64,
    pub final_value: f64,
    pub total_capital_gains: f64,
    pub xirr_pct: Option<f64>,
}

/// Walk the withdrawal schedule over the NAV history
pub fn nav_swp_report(series: &NavSeries, input: &NavSwpInput, settings: &SolverSettings) -> Result<NavSwpReport> {
    validate_amount("total_invested_amount", input.total_invested_amount)?;
    validate_amount("withdrawal_amount", input.withdrawal_amount)?;
    if input.total_invested_amount <= 0.0 {
        return Err(CalcError::invalid("total_invested_amount", "must be greater than zero"));
    }
    if !(1..=31).contains(&input.swp_day) {
        return Err(CalcError::invalid("swp_day", format!("must be 1-31 (got {})", input.swp_day)));
    }
    if input.start_date < input.invest_date {
        return Err(CalcError::invalid("start_date", "must not be before the investment date"));
    }
    if input.end_date <= input.start_date {
        return Err(CalcError::invalid("end_date", "must be after the start date"));
    }

    let purchase = series.require_nav(input.invest_date)?;
    let mut units_held = input.total_invested_amount / purchase.nav;
    let mut net_amount = input.total_invested_amount;

    let mut rows = vec![NavSwpRow {
        current_date: input.invest_date,
        current_nav: purchase.nav,
        units: units_held,
        cumulative_units: units_held,
        cash_flow: -input.total_invested_amount,
        net_amount,
        capital_gains_loss: 0.0,
        current_value: input.total_invested_amount,
    }];
    let mut flows = vec![CashFlow::new(input.invest_date, -input.total_invested_amount)];
    let mut total_withdrawn = 0.0;
    let mut total_capital_gains = 0.0;

    for date in withdrawal_dates(input.start_date, input.end_date, input.swp_day, input.interval) {
        if units_held <= 0.0 {
            break;
        }
        let nav = series.require_nav(date)?.nav;

        let redeemed = (input.withdrawal_amount / nav).min(units_held);
        let cash = redeemed * nav;
        let gain = redeemed * (nav - purchase.nav);

        units_held -= redeemed;
        net_amount -= cash;
        total_withdrawn += cash;
        total_capital_gains += gain;

        rows.push(NavSwpRow {
            current_date: date,
            current_nav: nav,
            units: -redeemed,
            cumulative_units: units_held,
            cash_flow: cash,
            net_amount,
            capital_gains_loss: gain,
            current_value: units_held * nav,
        });
        flows.push(CashFlow::new(date, cash));
    }

    let final_value = series.value_of(units_held, input.end_date)?;
    if final_value > 0.0 {
        flows.push(CashFlow::new(input.end_date, final_value));
    }

    let xirr_pct = match xirr(&flows, settings) {
        Ok(rate) => Some(rate * 100.0),
        Err(e) => {
            log::warn!("SWP report XIRR unavailable: {}", e);
            None
        }
    };

    Ok(NavSwpReport {
        installments: (rows.len() - 1) as u32,
        rows,
        total_withdrawn,
        final_value,
        total_capital_gains,
        xirr_pct,
    })
}

/// `day` in the given month, pulled back to the month's last day if needed
fn day_in_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day).rev().find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

fn withdrawal_dates(start: NaiveDate, end: NaiveDate, day: u32, interval: SwpInterval) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let Some(mut anchor) = NaiveDate::from_ymd_opt(start.year(), start.month(), 1) else {
        return dates;
    };

    if day_in_month(anchor.year(), anchor.month(), day).is_some_and(|d| d < start) {
        match anchor.checked_add_months(Months::new(1)) {
            Some(next) => anchor = next,
            None => return dates,
        }
    }

    while let Some(date) = day_in_month(anchor.year(), anchor.month(), day) {
        if date > end {
            break;
        }
        dates.push(date);
        match anchor.checked_add_months(Months::new(interval.months())) {
            Some(next) => anchor = next,
            None => break,
        }
    }

    dates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::NavPoint;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Daily NAV growing 1% per calendar month, starting at 100
    fn growing_series() -> NavSeries {
        let mut points = Vec::new();
        let mut day = date(2020, 1, 1);
        let end = date(2023, 12, 31);
        while day <= end {
            let months = (day.year() - 2020) * 12 + day.month() as i32 - 1;
            points.push(NavPoint { date: day, nav: 100.0 * 1.01_f64.powi(months) });
            day = day.succ_opt().unwrap();
        }
        NavSeries::new(points)
    }

    fn input() -> NavSwpInput {
        NavSwpInput {
            invest_date: date(2020, 1, 1),
            start_date: date(2020, 2, 1),
            end_date: date(2022, 1, 10),
            total_invested_amount: 1_000_000.0,
            withdrawal_amount: 5_000.0,
            interval: SwpInterval::Monthly,
            swp_day: 10,
        }
    }

    #[test]
    fn test_schedule_clamps_to_month_end() {
        let dates = withdrawal_dates(date(2024, 1, 15), date(2024, 4, 30), 31, SwpInterval::Monthly);
        assert_eq!(
            dates,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
        );

        let quarterly = withdrawal_dates(date(2024, 1, 15), date(2024, 12, 31), 10, SwpInterval::Quarterly);
        assert_eq!(quarterly, vec![date(2024, 2, 10), date(2024, 5, 10), date(2024, 8, 10), date(2024, 11, 10)]);
    }

    #[test]
    fn test_report_accumulates() {
        let series = growing_series();
        let report = nav_swp_report(&series, &input(), &SolverSettings::default()).unwrap();

        assert_eq!(report.installments, 24);
        assert_relative_eq!(report.total_withdrawn, 120_000.0, epsilon = 1e-6);
        assert!(report.total_capital_gains > 0.0);

        let last = report.rows.last().unwrap();
        assert_relative_eq!(last.net_amount, 880_000.0, epsilon = 1e-6);
        assert!(report.final_value > 880_000.0);

        // NAV steps up 1% a month; withdrawals land nine days into each step
        let xirr = report.xirr_pct.unwrap();
        assert!(xirr > 12.3 && xirr < 12.68, "got {}", xirr);
    }

    #[test]
    fn test_report_stops_when_units_run_out() {
        let series = growing_series();
        let report = nav_swp_report(
            &series,
            &NavSwpInput {
                total_invested_amount: 10_000.0,
                withdrawal_amount: 3_000.0,
                ..input()
            },
            &SolverSettings::default(),
        )
        .unwrap();

        assert_eq!(report.installments, 4);
        assert_eq!(report.final_value, 0.0);
        assert!(report.rows.last().unwrap().cumulative_units.abs() < 1e-12);
    }

    #[test]
    fn test_report_rejects_bad_dates() {
        let series = growing_series();
        let bad = NavSwpInput {
            end_date: date(2020, 1, 15),
            ..input()
        };
        assert!(nav_swp_report(&series, &bad, &SolverSettings::default()).is_err());
    }
}
