use chrono::NaiveDate;

use super::allocation::{
    DebtAllocation, DebtPosition, allocate_debt_payments, scheduled_debt_payments,
};
use super::amortization::{amortize, monthly_rate, payoff_label, remaining_balance, step_balance};
use super::compounding::{future_value, grow_one_month, summarize_investment};
use super::recommendation::{Benchmark, recommend};
use super::types::{
    AllocationParams, Debt, DebtSummary, Investment, Payoff, PaymentStrategy, ProjectionReport,
    ProjectionRow,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReportOptions {
    /// Month 0 of the projection, used for payoff dates.
    pub start_date: NaiveDate,
    pub benchmark: Benchmark,
}

/// Month-by-month projection, `horizon_months + 1` rows starting at month 0.
///
/// Debt balances are carried from month to month because the allocation depends on
/// which debts are still active. Explicit investments are evaluated in closed form
/// at every month, and the pooled investment is grown iteratively since its
/// contribution changes as debts retire.
pub fn project(
    debts: &[Debt],
    investments: &[Investment],
    params: &AllocationParams,
    horizon_months: u32,
) -> Vec<ProjectionRow> {
    tracing::debug!(
        horizon_months,
        debts = debts.len(),
        investments = investments.len(),
        "running projection"
    );

    let mut balances: Vec<f64> = debts.iter().map(|debt| debt.principal.max(0.0)).collect();
    let pooled_rate = monthly_rate(params.pooled_return_rate);
    let mut pooled = params.pooled_initial;

    let mut rows = Vec::with_capacity(horizon_months as usize + 1);
    rows.push(build_row(0, &balances, investments, pooled, 0.0, 0.0));

    for month in 1..=horizon_months {
        let positions = debt_positions(debts, &balances);
        let allocation = match params.strategy {
            PaymentStrategy::Avalanche => {
                allocate_debt_payments(&positions, params.debt_allocation)
            }
            PaymentStrategy::Scheduled => scheduled_debt_payments(&positions),
        };

        for (idx, debt) in debts.iter().enumerate() {
            let rate = monthly_rate(debt.annual_interest_rate);
            balances[idx] = step_balance(balances[idx], rate, allocation.payments[idx]).balance();
        }

        let paid = allocation.total_paid();
        let contribution = pooled_contribution(params, &allocation);
        pooled = grow_one_month(pooled, pooled_rate, contribution);
        rows.push(build_row(
            month,
            &balances,
            investments,
            pooled,
            paid,
            contribution,
        ));
    }

    rows
}

pub fn build_report(
    debts: &[Debt],
    investments: &[Investment],
    params: &AllocationParams,
    horizon_months: u32,
    options: &ReportOptions,
) -> ProjectionReport {
    let rows = project(debts, investments, params, horizon_months);
    let debt_summaries = debts
        .iter()
        .enumerate()
        .map(|(idx, debt)| {
            let mut summary = summarize_debt(debt, options.start_date, horizon_months);
            summary.projected_payoff_month = projected_payoff_month(&rows, idx);
            summary
        })
        .collect();
    let investment_summaries = investments
        .iter()
        .map(|investment| summarize_investment(investment, horizon_months))
        .collect();

    ProjectionReport {
        horizon_months,
        rows,
        debts: debt_summaries,
        investments: investment_summaries,
        recommendation: recommend(debts, investments, options.benchmark),
    }
}

/// Standalone view of one debt paying its scheduled payment, independent of the budget.
pub fn summarize_debt(debt: &Debt, start_date: NaiveDate, horizon_months: u32) -> DebtSummary {
    let payment = debt.scheduled_payment();
    let schedule = amortize(debt.principal, debt.annual_interest_rate, payment);
    let payoff = match schedule {
        Some(summary) => Payoff::Months(summary.months),
        None => Payoff::Unreachable,
    };

    DebtSummary {
        id: None,
        name: debt.name.clone(),
        scheduled_payment: payment,
        months_to_payoff: payoff.months(),
        payoff_date: payoff_label(start_date, payoff),
        years_to_payoff: payoff.months().map(|months| months as f64 / 12.0),
        total_interest: schedule.map(|summary| summary.total_interest),
        remaining_balance: remaining_balance(
            debt.principal,
            debt.annual_interest_rate,
            payment,
            horizon_months,
        ),
        projected_payoff_month: None,
    }
}

pub fn projected_payoff_month(rows: &[ProjectionRow], debt_index: usize) -> Option<u32> {
    rows.iter()
        .find(|row| {
            row.debt_balances
                .get(debt_index)
                .is_some_and(|&balance| balance <= 0.0)
        })
        .map(|row| row.month)
}

fn debt_positions(debts: &[Debt], balances: &[f64]) -> Vec<DebtPosition> {
    debts
        .iter()
        .zip(balances)
        .map(|(debt, &balance)| DebtPosition {
            balance,
            annual_rate: debt.annual_interest_rate,
            minimum_payment: debt.minimum_payment,
            scheduled_payment: debt.scheduled_payment(),
        })
        .collect()
}

fn pooled_contribution(params: &AllocationParams, allocation: &DebtAllocation) -> f64 {
    match params.strategy {
        PaymentStrategy::Avalanche => {
            let rollover = if params.rollover_unspent {
                allocation.unallocated
            } else {
                0.0
            };
            params.investment_allocation() + rollover
        }
        PaymentStrategy::Scheduled => (params.monthly_budget - allocation.total_paid()).max(0.0),
    }
}

fn build_row(
    month: u32,
    balances: &[f64],
    investments: &[Investment],
    pooled: f64,
    debt_payments: f64,
    pooled_contribution: f64,
) -> ProjectionRow {
    let investment_values: Vec<f64> = investments
        .iter()
        .map(|investment| {
            future_value(
                investment.current_amount,
                investment.monthly_contribution,
                investment.annual_return_rate,
                month,
            )
        })
        .collect();
    let total_debt: f64 = balances.iter().sum();
    let total_investments = investment_values.iter().sum::<f64>() + pooled;

    ProjectionRow {
        month,
        net_worth: total_investments - total_debt,
        total_debt,
        total_investments,
        pooled_investment: pooled,
        pooled_contribution,
        debt_payments,
        debt_balances: balances.to_vec(),
        investment_values,
    }
}
