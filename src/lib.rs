//! Fund Calculators - projection and return calculators for mutual fund investing
//!
//! This library provides:
//! - SIP and lumpsum future value, with year-by-year growth
//! - Goal, child goal and retirement corpus sizing
//! - Systematic withdrawal plans, on fixed returns or over NAV history
//! - XIRR, periodic IRR and CAGR
//! - EMI amortization and the EMI-vs-SIP comparison
//! - Capital gains tax on redemptions
//! - Tagged JSON requests and a parallel batch runner

pub mod config;
pub mod error;
pub mod rates;
pub mod plan;
pub mod calculators;
pub mod returns;
pub mod nav;
pub mod request;
pub mod scenario;

// Re-export commonly used types
pub use config::{CalculatorConfig, InputLimits, SolverSettings, TaxRules};
pub use error::{CalcError, Result};
pub use plan::InvestmentPlan;
pub use nav::{NavPoint, NavSeries};
pub use returns::CashFlow;
pub use request::{CalculatorRequest, CalculatorResponse};
pub use scenario::{ScenarioRunner, SensitivityPoint};
