use serde::Serialize;

use super::types::{Debt, Investment};

pub const DEFAULT_BENCHMARK_RATE: f64 = 7.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Benchmark {
    Fixed(f64),
    /// Mean of the entered investments' return rates.
    InvestmentMean,
}

impl Default for Benchmark {
    fn default() -> Self {
        Benchmark::Fixed(DEFAULT_BENCHMARK_RATE)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Guidance {
    PrioritizeDebt,
    Balanced,
    DebtOnly,
    InvestmentOnly,
    NoData,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenchmarkSource {
    Fixed,
    InvestmentMean,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub guidance: Guidance,
    pub highest_debt_rate: Option<f64>,
    pub benchmark_rate: Option<f64>,
    pub benchmark_source: BenchmarkSource,
    pub message: String,
}

pub fn recommend(debts: &[Debt], investments: &[Investment], benchmark: Benchmark) -> Recommendation {
    let highest_debt_rate = debts
        .iter()
        .map(|debt| debt.annual_interest_rate)
        .max_by(f64::total_cmp);
    let (benchmark_rate, benchmark_source) = match benchmark {
        Benchmark::Fixed(rate) => (Some(rate), BenchmarkSource::Fixed),
        Benchmark::InvestmentMean => (
            mean_return_rate(investments),
            BenchmarkSource::InvestmentMean,
        ),
    };

    let (guidance, message) = match (highest_debt_rate, investments.is_empty()) {
        (None, true) => (
            Guidance::NoData,
            "Add a debt or an investment to get a recommendation.".to_string(),
        ),
        (Some(rate), true) => (
            Guidance::DebtOnly,
            format!("Only debts entered: direct spare cash at the {rate:.2}% debt first."),
        ),
        (None, false) => (
            Guidance::InvestmentOnly,
            "No debts entered: the whole budget can go to investments.".to_string(),
        ),
        (Some(rate), false) => {
            let benchmark = benchmark_rate.unwrap_or(DEFAULT_BENCHMARK_RATE);
            if rate > benchmark {
                (
                    Guidance::PrioritizeDebt,
                    format!(
                        "Highest debt rate {rate:.2}% beats the {benchmark:.2}% expected return: pay down debt first."
                    ),
                )
            } else {
                (
                    Guidance::Balanced,
                    format!(
                        "Highest debt rate {rate:.2}% is at or below the {benchmark:.2}% expected return: keep minimums and invest more."
                    ),
                )
            }
        }
    };

    Recommendation {
        guidance,
        highest_debt_rate,
        benchmark_rate,
        benchmark_source,
        message,
    }
}

fn mean_return_rate(investments: &[Investment]) -> Option<f64> {
    if investments.is_empty() {
        return None;
    }
    let total: f64 = investments.iter().map(|inv| inv.annual_return_rate).sum();
    Some(total / investments.len() as f64)
}
