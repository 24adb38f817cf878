use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{InputError, non_negative};
use super::recommendation::Recommendation;

pub const MAX_HORIZON_MONTHS: u32 = 1200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub name: String,
    pub principal: f64,
    /// Annual percentage, e.g. 19.9.
    pub annual_interest_rate: f64,
    pub minimum_payment: f64,
    #[serde(default)]
    pub current_payment: Option<f64>,
}

impl Debt {
    /// Payment used for standalone payoff display and the scheduled strategy.
    pub fn scheduled_payment(&self) -> f64 {
        self.current_payment.unwrap_or(self.minimum_payment)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.name.trim().is_empty() {
            return Err(InputError::EmptyName { field: "debt name" });
        }
        if !self.principal.is_finite() {
            return Err(InputError::NotFinite { field: "principal" });
        }
        if self.principal <= 0.0 {
            return Err(InputError::NonPositivePrincipal);
        }
        non_negative("annual interest rate", self.annual_interest_rate)?;
        non_negative("minimum payment", self.minimum_payment)?;
        if let Some(payment) = self.current_payment {
            non_negative("current payment", payment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub name: String,
    pub current_amount: f64,
    pub monthly_contribution: f64,
    /// Annual percentage, e.g. 7.
    pub annual_return_rate: f64,
}

impl Investment {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.name.trim().is_empty() {
            return Err(InputError::EmptyName {
                field: "investment name",
            });
        }
        non_negative("current amount", self.current_amount)?;
        non_negative("monthly contribution", self.monthly_contribution)?;
        non_negative("annual return rate", self.annual_return_rate)?;
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStrategy {
    /// Minimums first, remainder of the debt pool to the highest rate.
    #[default]
    Avalanche,
    /// Every debt pays its own scheduled payment; the debt pool is ignored.
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationParams {
    pub monthly_budget: f64,
    pub debt_allocation: f64,
    pub strategy: PaymentStrategy,
    pub pooled_initial: f64,
    pub pooled_return_rate: f64,
    pub rollover_unspent: bool,
}

impl AllocationParams {
    pub fn new(monthly_budget: f64, debt_allocation: f64) -> Result<Self, InputError> {
        let params = Self {
            monthly_budget,
            debt_allocation,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn from_fraction(monthly_budget: f64, fraction: f64) -> Result<Self, InputError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(InputError::FractionOutOfRange(fraction));
        }
        Self::new(monthly_budget, monthly_budget * fraction)
    }

    pub fn investment_allocation(&self) -> f64 {
        (self.monthly_budget - self.debt_allocation).max(0.0)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        non_negative("monthly budget", self.monthly_budget)?;
        non_negative("debt allocation", self.debt_allocation)?;
        non_negative("pooled initial", self.pooled_initial)?;
        non_negative("pooled return rate", self.pooled_return_rate)?;
        if self.debt_allocation > self.monthly_budget {
            return Err(InputError::AllocationExceedsBudget {
                allocation: self.debt_allocation,
                budget: self.monthly_budget,
            });
        }
        Ok(())
    }
}

impl Default for AllocationParams {
    fn default() -> Self {
        Self {
            monthly_budget: 0.0,
            debt_allocation: 0.0,
            strategy: PaymentStrategy::Avalanche,
            pooled_initial: 0.0,
            pooled_return_rate: 7.0,
            rollover_unspent: true,
        }
    }
}

pub fn validate_horizon(months: u32) -> Result<(), InputError> {
    if months > MAX_HORIZON_MONTHS {
        return Err(InputError::HorizonTooLong {
            months,
            max: MAX_HORIZON_MONTHS,
        });
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Payoff {
    Months(u32),
    Unreachable,
}

impl Payoff {
    pub fn months(self) -> Option<u32> {
        match self {
            Payoff::Months(months) => Some(months),
            Payoff::Unreachable => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BalanceOutcome {
    Retired,
    Outstanding(f64),
    /// Payment does not cover the month's interest; the balance is held where it was.
    Stuck(f64),
}

impl BalanceOutcome {
    pub fn balance(self) -> f64 {
        match self {
            BalanceOutcome::Retired => 0.0,
            BalanceOutcome::Outstanding(balance) | BalanceOutcome::Stuck(balance) => {
                balance.max(0.0)
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmortizationSummary {
    pub months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    pub month: u32,
    pub net_worth: f64,
    pub total_debt: f64,
    pub total_investments: f64,
    pub pooled_investment: f64,
    pub pooled_contribution: f64,
    pub debt_payments: f64,
    /// Same order as the debts passed to the projection.
    pub debt_balances: Vec<f64>,
    /// Same order as the investments passed to the projection.
    pub investment_values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    pub id: Option<RecordId>,
    pub name: String,
    pub scheduled_payment: f64,
    pub months_to_payoff: Option<u32>,
    pub payoff_date: String,
    pub years_to_payoff: Option<f64>,
    pub total_interest: Option<f64>,
    pub remaining_balance: f64,
    pub projected_payoff_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSummary {
    pub id: Option<RecordId>,
    pub name: String,
    pub future_value: f64,
    pub total_contributions: f64,
    pub growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub horizon_months: u32,
    pub rows: Vec<ProjectionRow>,
    pub debts: Vec<DebtSummary>,
    pub investments: Vec<InvestmentSummary>,
    pub recommendation: Recommendation,
}
