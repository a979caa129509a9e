//! Scenario runner for batch calculator evaluation
//!
//! Holds one configuration and evaluates many requests against it in
//! parallel. Also produces the rate x tenure grid behind the SIP
//! sensitivity table.

use crate::calculators::sip_future_value;
use crate::config::CalculatorConfig;
use crate::error::Result;
use crate::plan::validate_years;
use crate::request::{CalculatorRequest, CalculatorResponse};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One cell of the SIP sensitivity grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub annual_rate_pct: f64,
    pub years: u32,
    pub invested: f64,
    pub total_value: f64,
}

/// Pre-configured runner for batch evaluation
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(CalculatorConfig::from_env());
/// let responses = runner.run_batch(&requests);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: CalculatorConfig,
}

impl ScenarioRunner {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Evaluate a single request
    pub fn run(&self, request: &CalculatorRequest) -> Result<CalculatorResponse> {
        request.evaluate(&self.config)
    }

    /// Evaluate requests in parallel; results line up with the input order
    pub fn run_batch(&self, requests: &[CalculatorRequest]) -> Vec<Result<CalculatorResponse>> {
        let results: Vec<_> = requests.par_iter().map(|request| self.run(request)).collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            log::warn!("{} of {} requests failed", failed, requests.len());
        }
        results
    }

    /// SIP value for every combination of rate and tenure, rate-major
    pub fn sip_sensitivity(
        &self,
        monthly_amount: f64,
        rates_pct: &[f64],
        years: &[u32],
    ) -> Result<Vec<SensitivityPoint>> {
        for &y in years {
            validate_years("years", y)?;
        }

        let grid: Vec<(f64, u32)> = rates_pct
            .iter()
            .flat_map(|&rate| years.iter().map(move |&y| (rate, y)))
            .collect();

        let points = grid
            .par_iter()
            .map(|&(annual_rate_pct, years)| {
                let months = years * 12;
                SensitivityPoint {
                    annual_rate_pct,
                    years,
                    invested: monthly_amount * months as f64,
                    total_value: sip_future_value(monthly_amount, annual_rate_pct, months),
                }
            })
            .collect();
        Ok(points)
    }
}
