mod allocation;
mod amortization;
mod compounding;
mod engine;
mod error;
mod ledger;
mod recommendation;
mod types;

pub use allocation::{DebtAllocation, DebtPosition, allocate_debt_payments, scheduled_debt_payments};
pub use amortization::{
    MAX_PAYOFF_MONTHS, NEVER_LABEL, amortize, monthly_rate, months_to_payoff, payoff_date,
    payoff_label, project_balance, remaining_balance,
};
pub use compounding::{future_value, grow_one_month, total_contributions};
pub use engine::{ReportOptions, build_report, project, projected_payoff_month, summarize_debt};
pub use error::{InputError, LedgerError};
pub(crate) use error::non_negative;
pub use ledger::{Entry, Ledger};
pub use recommendation::{
    Benchmark, BenchmarkSource, DEFAULT_BENCHMARK_RATE, Guidance, Recommendation, recommend,
};
pub use types::{
    AllocationParams, AmortizationSummary, BalanceOutcome, Debt, DebtSummary, Investment,
    InvestmentSummary, MAX_HORIZON_MONTHS, PaymentStrategy, Payoff, ProjectionReport,
    ProjectionRow, RecordId, validate_horizon,
};
