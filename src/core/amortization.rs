use chrono::{Months, NaiveDate};

use super::types::{AmortizationSummary, BalanceOutcome, Payoff};

pub const MAX_PAYOFF_MONTHS: u32 = 1000;
pub const NEVER_LABEL: &str = "never";

pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 100.0 / 12.0
}

/// One period: accrue interest on the balance, then subtract the payment.
pub fn step_balance(balance: f64, monthly_rate: f64, payment: f64) -> BalanceOutcome {
    if balance <= 0.0 {
        return BalanceOutcome::Retired;
    }
    if payment <= balance * monthly_rate {
        return BalanceOutcome::Stuck(balance);
    }
    let next = balance * (1.0 + monthly_rate) - payment;
    if next <= 0.0 {
        BalanceOutcome::Retired
    } else {
        BalanceOutcome::Outstanding(next)
    }
}

/// Amount that retires the balance this month, interest included.
pub fn payoff_amount(balance: f64, monthly_rate: f64) -> f64 {
    (balance * (1.0 + monthly_rate)).max(0.0)
}

pub fn months_to_payoff(principal: f64, annual_rate: f64, payment: f64) -> Payoff {
    match amortize(principal, annual_rate, payment) {
        Some(summary) => Payoff::Months(summary.months),
        None => Payoff::Unreachable,
    }
}

/// Full payoff schedule totals, or `None` when the payment never retires the debt.
pub fn amortize(principal: f64, annual_rate: f64, payment: f64) -> Option<AmortizationSummary> {
    let rate = monthly_rate(annual_rate);
    if principal <= 0.0 {
        return Some(AmortizationSummary {
            months: 0,
            total_interest: 0.0,
            total_paid: 0.0,
        });
    }
    if payment <= principal * rate {
        return None;
    }

    let mut balance = principal;
    let mut months = 0;
    let mut total_paid = 0.0;
    loop {
        if months == MAX_PAYOFF_MONTHS {
            tracing::debug!(principal, annual_rate, payment, "payoff iteration ceiling reached");
            return None;
        }
        total_paid += payment.min(payoff_amount(balance, rate));
        months += 1;
        match step_balance(balance, rate, payment) {
            BalanceOutcome::Retired => break,
            BalanceOutcome::Outstanding(next) => balance = next,
            BalanceOutcome::Stuck(_) => return None,
        }
    }

    Some(AmortizationSummary {
        months,
        total_interest: (total_paid - principal).max(0.0),
        total_paid,
    })
}

pub fn project_balance(principal: f64, annual_rate: f64, payment: f64, months: u32) -> BalanceOutcome {
    let rate = monthly_rate(annual_rate);
    let mut outcome = if principal > 0.0 {
        BalanceOutcome::Outstanding(principal)
    } else {
        BalanceOutcome::Retired
    };
    for _ in 0..months {
        let BalanceOutcome::Outstanding(balance) = outcome else {
            break;
        };
        outcome = step_balance(balance, rate, payment);
    }
    outcome
}

pub fn remaining_balance(principal: f64, annual_rate: f64, payment: f64, months: u32) -> f64 {
    project_balance(principal, annual_rate, payment, months).balance()
}

pub fn payoff_date(start: NaiveDate, payoff: Payoff) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(payoff.months()?))
}

pub fn payoff_label(start: NaiveDate, payoff: Payoff) -> String {
    payoff_date(start, payoff)
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_else(|| NEVER_LABEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, prop_assume, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn zero_rate_pays_off_in_principal_over_payment_months() {
        assert_eq!(months_to_payoff(1_000.0, 0.0, 100.0), Payoff::Months(10));
        assert_eq!(months_to_payoff(1_000.0, 0.0, 1_500.0), Payoff::Months(1));
    }

    #[test]
    fn payment_equal_to_interest_is_unreachable() {
        assert_eq!(months_to_payoff(1_200.0, 12.0, 12.0), Payoff::Unreachable);
        assert_eq!(months_to_payoff(1_200.0, 12.0, 5.0), Payoff::Unreachable);
        assert_eq!(months_to_payoff(1_200.0, 0.0, 0.0), Payoff::Unreachable);
    }

    #[test]
    fn iteration_ceiling_reports_unreachable() {
        // Interest is 1000/month, so the balance barely moves.
        assert_eq!(
            months_to_payoff(100_000.0, 12.0, 1_000.01),
            Payoff::Unreachable
        );
    }

    #[test]
    fn interest_accrues_before_payment() {
        // 1000 * 1.01 - 1000 leaves 10 outstanding after the first month.
        assert_eq!(months_to_payoff(1_000.0, 12.0, 1_000.0), Payoff::Months(2));
        assert_approx(remaining_balance(1_000.0, 12.0, 1_000.0, 1), 10.0);
    }

    #[test]
    fn amortize_totals_use_exact_final_payment() {
        let summary = amortize(1_000.0, 12.0, 1_000.0).expect("reachable");
        assert_eq!(summary.months, 2);
        assert_approx(summary.total_paid, 1_010.1);
        assert_approx(summary.total_interest, 10.1);
    }

    #[test]
    fn remaining_balance_returns_zero_once_retired() {
        assert_approx(remaining_balance(1_000.0, 0.0, 100.0, 50), 0.0);
        assert_eq!(
            project_balance(1_000.0, 0.0, 100.0, 50),
            BalanceOutcome::Retired
        );
    }

    #[test]
    fn remaining_balance_holds_when_payment_is_insufficient() {
        assert_eq!(
            project_balance(1_200.0, 12.0, 10.0, 24),
            BalanceOutcome::Stuck(1_200.0)
        );
        assert_approx(remaining_balance(1_200.0, 12.0, 10.0, 24), 1_200.0);
    }

    #[test]
    fn remaining_balance_with_zero_months_is_principal() {
        assert_approx(remaining_balance(750.0, 20.0, 50.0, 0), 750.0);
    }

    #[test]
    fn payoff_label_formats_month_and_year() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");
        assert_eq!(payoff_label(start, Payoff::Months(3)), "Apr 2024");
        assert_eq!(payoff_label(start, Payoff::Months(12)), "Jan 2025");
        assert_eq!(payoff_label(start, Payoff::Unreachable), NEVER_LABEL);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_finite_payoff_matches_remaining_balance(
            principal in 100u32..100_000,
            rate_bp in 0u32..3_000,
            margin in 1u32..5_000
        ) {
            let principal = principal as f64;
            let rate = rate_bp as f64 / 100.0;
            let payment = principal * rate / 1200.0 + margin as f64;
            prop_assume!(payment > principal * monthly_rate(rate));

            let Payoff::Months(n) = months_to_payoff(principal, rate, payment) else {
                // Only the iteration ceiling can land here.
                prop_assert!(amortize(principal, rate, payment).is_none());
                return Ok(());
            };
            prop_assert!(n >= 1);
            prop_assert_eq!(remaining_balance(principal, rate, payment, n), 0.0);
            prop_assert!(remaining_balance(principal, rate, payment, n - 1) > 0.0);
        }

        #[test]
        fn prop_payment_not_covering_interest_is_unreachable(
            principal in 100u32..100_000,
            rate_bp in 1u32..3_000,
            share in 0u32..=100
        ) {
            let principal = principal as f64;
            let rate = rate_bp as f64 / 100.0;
            let payment = principal * monthly_rate(rate) * (share as f64 / 100.0);
            prop_assert_eq!(months_to_payoff(principal, rate, payment), Payoff::Unreachable);
        }
    }
}
