//! Point-to-point return measures

/// Compound annual growth rate, in percent.
/// Degenerate inputs (non-positive start or end, zero years) give 0.
pub fn cagr_pct(start_value: f64, end_value: f64, years: f64) -> f64 {
    if start_value <= 0.0 || end_value <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    ((end_value / start_value).powf(1.0 / years) - 1.0) * 100.0
}

/// Simple percentage change from `start_value` to `end_value`
pub fn absolute_return_pct(start_value: f64, end_value: f64) -> f64 {
    if start_value <= 0.0 {
        return 0.0;
    }
    (end_value - start_value) / start_value * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cagr_doubling() {
        // Doubling in ~7.27 years is 10% CAGR
        let years = 2.0_f64.ln() / 1.1_f64.ln();
        assert_relative_eq!(cagr_pct(100.0, 200.0, years), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(cagr_pct(0.0, 200.0, 3.0), 0.0);
        assert_eq!(cagr_pct(100.0, 200.0, 0.0), 0.0);
        assert_eq!(absolute_return_pct(0.0, 10.0), 0.0);
        assert_relative_eq!(absolute_return_pct(80.0, 100.0), 25.0);
    }
}
