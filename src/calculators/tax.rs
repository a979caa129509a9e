//! Capital gains tax on mutual fund redemptions

use crate::config::TaxRules;
use crate::error::{CalcError, Result};
use crate::plan::validate_amount;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldingPeriod {
    #[serde(rename = "STCG", alias = "short_term")]
    ShortTerm,
    #[serde(rename = "LTCG", alias = "long_term")]
    LongTerm,
}

impl HoldingPeriod {
    /// Long term once the units have been held for the configured number of months
    pub fn classify(purchase: NaiveDate, sale: NaiveDate, rules: &TaxRules) -> Result<Self> {
        if sale < purchase {
            return Err(CalcError::invalid("sale_date", "must not be before the purchase date"));
        }
        let threshold = purchase
            .checked_add_months(Months::new(rules.ltcg_holding_months))
            .ok_or_else(|| CalcError::invalid("purchase_date", "out of range"))?;

        if sale >= threshold {
            Ok(HoldingPeriod::LongTerm)
        } else {
            Ok(HoldingPeriod::ShortTerm)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HoldingPeriod::ShortTerm => "Short Term Capital Gain",
            HoldingPeriod::LongTerm => "Long Term Capital Gain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalGainsInput {
    /// `STCG` or `LTCG`
    pub holding: HoldingPeriod,
    /// Redemption proceeds
    pub sale_value: f64,
    /// Cost of acquisition
    pub purchase_value: f64,
    /// Transfer expenses (brokerage, STT, ...)
    #[serde(default)]
    pub expenses: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalGainsResult {
    /// Holding period the rate was chosen for
    pub holding: HoldingPeriod,
    /// Sale less purchase less expenses; negative is a loss
    pub capital_gain: f64,
    /// Long-term exemption applied, never more than the configured cap
    pub exemption: f64,
    /// Gain left after the exemption, floored at zero
    pub taxable_gain: f64,
    /// Rate applied, as a decimal
    pub tax_rate: f64,
    /// Tax payable; zero on a loss
    pub tax: f64,
}

pub fn capital_gains_tax(input: &CapitalGainsInput, rules: &TaxRules) -> Result<CapitalGainsResult> {
    validate_amount("sale_value", input.sale_value)?;
    validate_amount("purchase_value", input.purchase_value)?;
    validate_amount("expenses", input.expenses)?;

    let capital_gain = input.sale_value - input.purchase_value - input.expenses;

    let (exemption, tax_rate) = match input.holding {
        HoldingPeriod::ShortTerm => (0.0, rules.stcg_rate),
        HoldingPeriod::LongTerm => (capital_gain.max(0.0).min(rules.ltcg_exemption), rules.ltcg_rate),
    };

    let taxable_gain = (capital_gain - exemption).max(0.0);
    let tax = taxable_gain * tax_rate;

    log::debug!(
        "{}: gain {:.2}, exemption {:.2}, tax {:.2}",
        input.holding.label(), capital_gain, exemption, tax
    );

    Ok(CapitalGainsResult {
        holding: input.holding,
        capital_gain,
        exemption,
        taxable_gain,
        tax_rate,
        tax,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(holding: HoldingPeriod, sale: f64, purchase: f64, expenses: f64) -> CapitalGainsInput {
        CapitalGainsInput {
            holding,
            sale_value: sale,
            purchase_value: purchase,
            expenses,
        }
    }

    #[test]
    fn test_short_term_flat_rate_no_exemption() {
        // Dashboard defaults: sale 1,00,000, purchase 20,000, expenses 9,000
        let result = capital_gains_tax(&input(HoldingPeriod::ShortTerm, 100_000.0, 20_000.0, 9_000.0), &TaxRules::default()).unwrap();

        assert_relative_eq!(result.capital_gain, 71_000.0);
        assert_eq!(result.exemption, 0.0);
        assert_relative_eq!(result.taxable_gain, 71_000.0);
        assert_relative_eq!(result.tax, 14_200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_long_term_small_gain_fully_exempt() {
        let result = capital_gains_tax(&input(HoldingPeriod::LongTerm, 100_000.0, 20_000.0, 9_000.0), &TaxRules::default()).unwrap();

        assert_relative_eq!(result.exemption, 71_000.0);
        assert_eq!(result.taxable_gain, 0.0);
        assert_eq!(result.tax, 0.0);
    }

    #[test]
    fn test_long_term_exemption_never_exceeds_cap() {
        let rules = TaxRules::default();
        for &sale in &[150_000.0, 1_000_000.0, 50_000_000.0] {
            let result = capital_gains_tax(&input(HoldingPeriod::LongTerm, sale, 10_000.0, 0.0), &rules).unwrap();
            assert!(result.exemption <= rules.ltcg_exemption);
            assert_relative_eq!(result.exemption, rules.ltcg_exemption);
            assert_relative_eq!(result.tax, (sale - 10_000.0 - 100_000.0) * 0.125, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_loss_is_not_taxed() {
        for holding in [HoldingPeriod::ShortTerm, HoldingPeriod::LongTerm] {
            let result = capital_gains_tax(&input(holding, 50_000.0, 80_000.0, 500.0), &TaxRules::default()).unwrap();
            assert_relative_eq!(result.capital_gain, -30_500.0);
            assert_eq!(result.exemption, 0.0);
            assert_eq!(result.tax, 0.0);
        }
    }

    #[test]
    fn test_custom_rules() {
        let rules = TaxRules {
            ltcg_exemption: 125_000.0,
            ..TaxRules::default()
        };
        let result = capital_gains_tax(&input(HoldingPeriod::LongTerm, 300_000.0, 100_000.0, 0.0), &rules).unwrap();
        assert_relative_eq!(result.tax, 75_000.0 * 0.125);
    }

    #[test]
    fn test_classify_holding_period() {
        let rules = TaxRules::default();
        let bought = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap();

        let early = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let anniversary = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        assert_eq!(HoldingPeriod::classify(bought, early, &rules).unwrap(), HoldingPeriod::ShortTerm);
        assert_eq!(HoldingPeriod::classify(bought, anniversary, &rules).unwrap(), HoldingPeriod::LongTerm);
        assert!(HoldingPeriod::classify(anniversary, bought, &rules).is_err());
    }

    #[test]
    fn test_holding_serde_names() {
        let parsed: HoldingPeriod = serde_json::from_str("\"LTCG\"").unwrap();
        assert_eq!(parsed, HoldingPeriod::LongTerm);
        let parsed: HoldingPeriod = serde_json::from_str("\"short_term\"").unwrap();
        assert_eq!(parsed, HoldingPeriod::ShortTerm);
    }
}
