//! NAV history: series queries, trailing returns and loaders

mod series;
pub mod loader;

pub use series::{benchmark_return, LumpsumReturn, NavPoint, NavSeries, PeriodReturn, TrailingPeriod, TrailingReturns};
pub use loader::{load_cash_flows, parse_date};
