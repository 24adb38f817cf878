use super::amortization::monthly_rate;
use super::types::{Investment, InvestmentSummary};

/// Closed-form value after `months` periods with end-of-month contributions.
pub fn future_value(
    current_amount: f64,
    monthly_contribution: f64,
    annual_return_rate: f64,
    months: u32,
) -> f64 {
    let rate = monthly_rate(annual_return_rate);
    if rate == 0.0 {
        return current_amount + monthly_contribution * months as f64;
    }
    let growth = (1.0 + rate).powi(months as i32);
    current_amount * growth + monthly_contribution * ((growth - 1.0) / rate)
}

/// One iterative period for balances whose contribution changes month to month.
pub fn grow_one_month(value: f64, monthly_rate: f64, contribution: f64) -> f64 {
    value * (1.0 + monthly_rate) + contribution
}

pub fn total_contributions(investment: &Investment, months: u32) -> f64 {
    investment.current_amount + investment.monthly_contribution * months as f64
}

pub(crate) fn summarize_investment(investment: &Investment, months: u32) -> InvestmentSummary {
    let value = future_value(
        investment.current_amount,
        investment.monthly_contribution,
        investment.annual_return_rate,
        months,
    );
    let contributed = total_contributions(investment, months);
    InvestmentSummary {
        id: None,
        name: investment.name.clone(),
        future_value: value,
        total_contributions: contributed,
        growth: value - contributed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn one_percent_monthly_for_a_year() {
        assert_approx_tol(future_value(1_000.0, 0.0, 12.0, 12), 1_126.825, 0.01);
    }

    #[test]
    fn zero_rate_is_linear_in_contributions() {
        assert_eq!(future_value(500.0, 100.0, 0.0, 24), 2_900.0);
        assert_eq!(future_value(500.0, 0.0, 0.0, 600), 500.0);
    }

    #[test]
    fn zero_months_is_current_amount() {
        assert_eq!(future_value(1_234.0, 250.0, 9.0, 0), 1_234.0);
    }

    #[test]
    fn closed_form_matches_iterative_growth_for_fixed_contribution() {
        let rate = monthly_rate(6.0);
        let mut value = 10_000.0;
        for _ in 0..120 {
            value = grow_one_month(value, rate, 300.0);
        }
        assert_approx_tol(future_value(10_000.0, 300.0, 6.0, 120), value, 1e-6);
    }

    #[test]
    fn summary_splits_contributions_and_growth() {
        let investment = Investment {
            name: "Index fund".to_string(),
            current_amount: 1_000.0,
            monthly_contribution: 100.0,
            annual_return_rate: 6.0,
        };
        let summary = summarize_investment(&investment, 60);
        assert_approx_tol(summary.total_contributions, 7_000.0, 1e-9);
        assert_approx_tol(
            summary.growth,
            summary.future_value - summary.total_contributions,
            1e-9,
        );
        assert!(summary.growth > 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_no_contribution_no_rate_never_grows(
            amount in 0u32..10_000_000,
            months in 0u32..1_200
        ) {
            let amount = amount as f64 / 100.0;
            prop_assert!(future_value(amount, 0.0, 0.0, months) == amount);
        }

        #[test]
        fn prop_value_is_never_below_contributions(
            amount in 0u32..1_000_000,
            contribution in 0u32..10_000,
            rate_bp in 0u32..2_000,
            months in 0u32..600
        ) {
            let amount = amount as f64;
            let contribution = contribution as f64;
            let value = future_value(amount, contribution, rate_bp as f64 / 100.0, months);
            let contributed = amount + contribution * months as f64;
            prop_assert!(value >= contributed - 1e-6 * contributed.max(1.0));
        }
    }
}
