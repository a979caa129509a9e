//! Calculator configuration
//!
//! Statutory tax parameters, solver settings and the input clamp ranges the
//! dashboard applies. Defaults can be overridden from a JSON file or from
//! `FUNDCALC_*` environment variables.

use crate::error::{CalcError, Result};
use crate::plan::MAX_TENURE_YEARS;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Default short-term capital gains rate (20%)
pub const DEFAULT_STCG_RATE: f64 = 0.20;
/// Default long-term capital gains rate (12.5%)
pub const DEFAULT_LTCG_RATE: f64 = 0.125;
/// Default long-term exemption cap (₹1,00,000)
pub const DEFAULT_LTCG_EXEMPTION: f64 = 100_000.0;
/// Months an equity holding must be kept to count as long term
pub const DEFAULT_LTCG_HOLDING_MONTHS: u32 = 12;

/// Capital gains tax parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRules {
    pub stcg_rate: f64,
    pub ltcg_rate: f64,
    pub ltcg_exemption: f64,
    pub ltcg_holding_months: u32,
}

impl TaxRules {
    pub fn validate(&self) -> Result<()> {
        check_fraction("tax.stcg_rate", self.stcg_rate)?;
        check_fraction("tax.ltcg_rate", self.ltcg_rate)?;
        check_non_negative("tax.ltcg_exemption", self.ltcg_exemption)
    }
}

impl Default for TaxRules {
    fn default() -> Self {
        Self {
            stcg_rate: DEFAULT_STCG_RATE,
            ltcg_rate: DEFAULT_LTCG_RATE,
            ltcg_exemption: DEFAULT_LTCG_EXEMPTION,
            ltcg_holding_months: DEFAULT_LTCG_HOLDING_MONTHS,
        }
    }
}

/// Settings for the XIRR / IRR root finders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub max_iterations: u32,
    pub tolerance: f64,
    /// Step used for the central-difference derivative in Newton-Raphson
    pub derivative_step: f64,
    /// Starting annual rate (decimal)
    pub initial_guess: f64,
}

impl SolverSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(CalcError::invalid("solver.max_iterations", "must be at least 1"));
        }
        check_positive("solver.tolerance", self.tolerance)?;
        check_positive("solver.derivative_step", self.derivative_step)?;
        if !self.initial_guess.is_finite() || self.initial_guess <= -1.0 {
            return Err(CalcError::invalid("solver.initial_guess", "must be a finite rate above -100%"));
        }
        Ok(())
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-7,
            derivative_step: 1e-6,
            initial_guess: 0.1,
        }
    }
}

/// Inclusive clamp ranges for user-entered values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLimits {
    pub max_amount: f64,
    pub max_return_pct: f64,
    pub max_inflation_pct: f64,
    pub min_years: u32,
    pub max_years: u32,
}

impl InputLimits {
    /// Ranges must be non-empty and the tenure range must sit inside
    /// `1..=MAX_TENURE_YEARS`
    pub fn validate(&self) -> Result<()> {
        check_non_negative("limits.max_amount", self.max_amount)?;
        check_non_negative("limits.max_return_pct", self.max_return_pct)?;
        check_non_negative("limits.max_inflation_pct", self.max_inflation_pct)?;
        if self.min_years == 0 {
            return Err(CalcError::invalid("limits.min_years", "must be at least 1"));
        }
        if self.max_years > MAX_TENURE_YEARS {
            return Err(CalcError::invalid(
                "limits.max_years",
                format!("must be at most {} (got {})", MAX_TENURE_YEARS, self.max_years),
            ));
        }
        if self.min_years > self.max_years {
            return Err(CalcError::invalid(
                "limits.min_years",
                format!("must not exceed max_years ({} > {})", self.min_years, self.max_years),
            ));
        }
        Ok(())
    }
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_amount: 1_000_000_000.0,
            max_return_pct: 100.0,
            max_inflation_pct: 25.0,
            min_years: 1,
            max_years: 50,
        }
    }
}

/// Top-level configuration passed to every request evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub tax: TaxRules,
    pub solver: SolverSettings,
    pub limits: InputLimits,
}

impl CalculatorConfig {
    /// Load configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with any `FUNDCALC_*` environment variables.
    /// Falls back to the defaults if the overrides leave an invalid config.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        if let Err(e) = config.validate() {
            log::warn!("ignoring FUNDCALC_* overrides: {}", e);
            return Self::default();
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.tax.validate()?;
        self.solver.validate()?;
        self.limits.validate()
    }

    /// Overlay `FUNDCALC_*` environment variables onto this configuration.
    /// Unparseable values are ignored with a warning.
    pub fn apply_env(&mut self) {
        override_from_env("FUNDCALC_STCG_RATE", &mut self.tax.stcg_rate);
        override_from_env("FUNDCALC_LTCG_RATE", &mut self.tax.ltcg_rate);
        override_from_env("FUNDCALC_LTCG_EXEMPTION", &mut self.tax.ltcg_exemption);
        override_from_env("FUNDCALC_LTCG_HOLDING_MONTHS", &mut self.tax.ltcg_holding_months);
        override_from_env("FUNDCALC_XIRR_MAX_ITERATIONS", &mut self.solver.max_iterations);
        override_from_env("FUNDCALC_XIRR_TOLERANCE", &mut self.solver.tolerance);
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid(field, format!("must be a finite non-negative number (got {})", value)));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid(field, format!("must be greater than zero (got {})", value)));
    }
    Ok(())
}

fn check_fraction(field: &'static str, value: f64) -> Result<()> {
    check_non_negative(field, value)?;
    if value > 1.0 {
        return Err(CalcError::invalid(field, format!("must be a decimal rate no greater than 1 (got {})", value)));
    }
    Ok(())
}

fn override_from_env<T: FromStr>(key: &str, slot: &mut T) {
    if let Ok(raw) = env::var(key) {
        match raw.trim().parse() {
            Ok(value) => *slot = value,
            Err(_) => log::warn!("ignoring {}={:?}: not a valid value", key, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tax_rules() {
        let rules = TaxRules::default();
        assert!((rules.stcg_rate - 0.20).abs() < 1e-12);
        assert!((rules.ltcg_rate - 0.125).abs() < 1e-12);
        assert!((rules.ltcg_exemption - 100_000.0).abs() < 1e-9);
        assert_eq!(rules.ltcg_holding_months, 12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: CalculatorConfig =
            serde_json::from_str(r#"{ "tax": { "ltcg_exemption": 125000.0 } }"#).unwrap();

        assert!((config.tax.ltcg_exemption - 125_000.0).abs() < 1e-9);
        assert!((config.tax.stcg_rate - DEFAULT_STCG_RATE).abs() < 1e-12);
        assert_eq!(config.solver.max_iterations, 100);
    }

    #[test]
    fn test_env_override_parses_and_ignores_garbage() {
        let mut rate = 0.2_f64;
        env::set_var("FUNDCALC_TEST_RATE_OK", "0.15");
        override_from_env("FUNDCALC_TEST_RATE_OK", &mut rate);
        assert!((rate - 0.15).abs() < 1e-12);

        env::set_var("FUNDCALC_TEST_RATE_BAD", "fifteen");
        override_from_env("FUNDCALC_TEST_RATE_BAD", &mut rate);
        assert!((rate - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_limits_are_rejected() {
        assert!(CalculatorConfig::default().validate().is_ok());

        let inverted = InputLimits { min_years: 60, max_years: 10, ..InputLimits::default() };
        assert!(matches!(
            inverted.validate(),
            Err(CalcError::InvalidInput { field: "limits.min_years", .. })
        ));

        let unbounded = InputLimits { max_years: 10_000, ..InputLimits::default() };
        assert!(unbounded.validate().is_err());

        let negative = InputLimits { max_amount: -1.0, ..InputLimits::default() };
        assert!(negative.validate().is_err());

        let path = env::temp_dir().join(format!("fundcalc-inverted-limits-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "limits": { "min_years": 60, "max_years": 10 } }"#).unwrap();
        let loaded = CalculatorConfig::from_json_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(loaded, Err(CalcError::InvalidInput { field: "limits.min_years", .. })));
    }

    #[test]
    fn test_tax_and_solver_validation() {
        let rules = TaxRules { stcg_rate: 20.0, ..TaxRules::default() };
        assert!(rules.validate().is_err());

        let solver = SolverSettings { tolerance: 0.0, ..SolverSettings::default() };
        assert!(solver.validate().is_err());

        let solver = SolverSettings { max_iterations: 0, ..SolverSettings::default() };
        assert!(solver.validate().is_err());
    }
}
