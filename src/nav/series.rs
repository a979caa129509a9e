//! NAV time series and the returns derived from it

use crate::error::{CalcError, Result};
use crate::returns::{absolute_return_pct, cagr_pct};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.0;

/// NAV per unit on a given date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub nav: f64,
}

/// Date-ordered NAV history for one scheme
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavSeries {
    points: Vec<NavPoint>,
}

/// Look-back windows shown on the fund page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailingPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
    FiveYears,
}

impl TrailingPeriod {
    pub const ALL: [TrailingPeriod; 6] = [
        TrailingPeriod::OneMonth,
        TrailingPeriod::ThreeMonths,
        TrailingPeriod::SixMonths,
        TrailingPeriod::OneYear,
        TrailingPeriod::ThreeYears,
        TrailingPeriod::FiveYears,
    ];

    pub fn months(&self) -> u32 {
        match self {
            TrailingPeriod::OneMonth => 1,
            TrailingPeriod::ThreeMonths => 3,
            TrailingPeriod::SixMonths => 6,
            TrailingPeriod::OneYear => 12,
            TrailingPeriod::ThreeYears => 36,
            TrailingPeriod::FiveYears => 60,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrailingPeriod::OneMonth => "1M",
            TrailingPeriod::ThreeMonths => "3M",
            TrailingPeriod::SixMonths => "6M",
            TrailingPeriod::OneYear => "1Y",
            TrailingPeriod::ThreeYears => "3Y",
            TrailingPeriod::FiveYears => "5Y",
        }
    }
}

/// Return over one trailing window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub period: TrailingPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_nav: f64,
    pub end_nav: f64,
    pub absolute_pct: f64,
    /// Only reported for windows of a year or longer
    pub cagr_pct: Option<f64>,
}

/// The 1Y/3Y/5Y summary used in fund listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailingReturns {
    pub one_year: Option<PeriodReturn>,
    pub three_years: Option<PeriodReturn>,
    pub five_years: Option<PeriodReturn>,
}

/// Result of investing a lumpsum between two dates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpsumReturn {
    pub invested: f64,
    pub end_value: f64,
    pub profit: f64,
    pub cagr_pct: f64,
    pub absolute_pct: f64,
}

impl LumpsumReturn {
    fn from_values(invested: f64, end_value: f64, years: f64) -> Self {
        Self {
            invested,
            end_value,
            profit: end_value - invested,
            cagr_pct: cagr_pct(invested, end_value, years),
            absolute_pct: absolute_return_pct(invested, end_value),
        }
    }
}

impl NavSeries {
    /// Build a series, sorting by date. On duplicate dates the later entry
    /// wins. Non-positive or non-finite NAVs are dropped.
    pub fn new(mut points: Vec<NavPoint>) -> Self {
        let before = points.len();
        points.retain(|p| p.nav.is_finite() && p.nav > 0.0);
        if points.len() < before {
            log::warn!("dropped {} NAV points with invalid values", before - points.len());
        }

        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<NavPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self { points: deduped }
    }

    pub fn points(&self) -> &[NavPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&NavPoint> {
        self.points.first()
    }

    pub fn latest(&self) -> Option<&NavPoint> {
        self.points.last()
    }

    /// Most recent NAV published on or before `date` (markets skip holidays)
    pub fn nav_on_or_before(&self, date: NaiveDate) -> Option<&NavPoint> {
        let idx = self.points.partition_point(|p| p.date <= date);
        if idx == 0 {
            None
        } else {
            self.points.get(idx - 1)
        }
    }

    pub(crate) fn require_nav(&self, date: NaiveDate) -> Result<NavPoint> {
        if self.is_empty() {
            return Err(CalcError::EmptySeries);
        }
        self.nav_on_or_before(date)
            .copied()
            .ok_or(CalcError::DateOutOfRange { date })
    }

    /// Market value of `units` on `date`
    pub fn value_of(&self, units: f64, date: NaiveDate) -> Result<f64> {
        Ok(units * self.require_nav(date)?.nav)
    }

    /// Return over a window ending at the latest NAV. `None` when the
    /// history does not reach back far enough.
    pub fn trailing_return(&self, period: TrailingPeriod) -> Option<PeriodReturn> {
        let end = *self.latest()?;
        let start_date = end.date.checked_sub_months(Months::new(period.months()))?;

        if self.first()?.date > start_date {
            return None;
        }
        let start = *self.nav_on_or_before(start_date)?;

        let years = (end.date - start.date).num_days() as f64 / DAYS_PER_YEAR;
        let cagr = if period.months() >= 12 {
            Some(cagr_pct(start.nav, end.nav, years))
        } else {
            None
        };

        Some(PeriodReturn {
            period,
            start_date: start.date,
            end_date: end.date,
            start_nav: start.nav,
            end_nav: end.nav,
            absolute_pct: absolute_return_pct(start.nav, end.nav),
            cagr_pct: cagr,
        })
    }

    pub fn trailing_returns(&self) -> TrailingReturns {
        TrailingReturns {
            one_year: self.trailing_return(TrailingPeriod::OneYear),
            three_years: self.trailing_return(TrailingPeriod::ThreeYears),
            five_years: self.trailing_return(TrailingPeriod::FiveYears),
        }
    }

    /// Historical lumpsum: buy at the NAV on `start`, value at the NAV on `end`
    pub fn lumpsum_return(&self, amount: f64, start: NaiveDate, end: NaiveDate) -> Result<LumpsumReturn> {
        if end <= start {
            return Err(CalcError::invalid("end", "must be after the start date"));
        }
        crate::plan::validate_amount("amount", amount)?;

        let buy = self.require_nav(start)?;
        let sell = self.require_nav(end)?;
        let units = amount / buy.nav;
        let years = (end - start).num_days() as f64 / DAYS_PER_YEAR;

        Ok(LumpsumReturn::from_values(amount, units * sell.nav, years))
    }
}

/// Lumpsum grown at a fixed annual rate (FD, PPF, ...) for comparison
pub fn benchmark_return(amount: f64, annual_rate_pct: f64, start: NaiveDate, end: NaiveDate) -> LumpsumReturn {
    let years = ((end - start).num_days() as f64 / DAYS_PER_YEAR).max(0.0);
    let end_value = amount * (1.0 + annual_rate_pct / 100.0).powf(years);
    LumpsumReturn::from_values(amount, end_value, years)
}
