//! Return measures: CAGR, periodic IRR and dated XIRR

mod cagr;
mod irr;
mod xirr;

pub use cagr::{absolute_return_pct, cagr_pct};
pub use irr::periodic_irr;
pub use xirr::{xirr, CashFlow};
