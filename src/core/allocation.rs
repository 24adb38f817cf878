use super::amortization::{monthly_rate, payoff_amount};

/// A debt as seen by the allocator in a given month: its simulated balance, not the stored principal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DebtPosition {
    pub balance: f64,
    pub annual_rate: f64,
    pub minimum_payment: f64,
    pub scheduled_payment: f64,
}

impl DebtPosition {
    pub fn is_active(&self) -> bool {
        self.balance > 0.0
    }

    fn payoff(&self) -> f64 {
        payoff_amount(self.balance, monthly_rate(self.annual_rate))
    }

    fn minimum_due(&self) -> f64 {
        self.minimum_payment.min(self.payoff())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebtAllocation {
    /// Same order as the positions passed in; inactive debts get 0.
    pub payments: Vec<f64>,
    /// Part of the pool left over once every active debt is covered in full.
    pub unallocated: f64,
}

impl DebtAllocation {
    pub fn total_paid(&self) -> f64 {
        self.payments.iter().sum()
    }
}

pub fn allocate_debt_payments(debts: &[DebtPosition], pool: f64) -> DebtAllocation {
    let pool = pool.max(0.0);
    let mut payments: Vec<f64> = debts
        .iter()
        .map(|debt| if debt.is_active() { debt.minimum_due() } else { 0.0 })
        .collect();
    let total_minimum: f64 = payments.iter().sum();

    if pool < total_minimum {
        let scale = pool / total_minimum;
        for payment in &mut payments {
            *payment *= scale;
        }
        return DebtAllocation {
            payments,
            unallocated: 0.0,
        };
    }

    let mut order: Vec<usize> = (0..debts.len())
        .filter(|&idx| debts[idx].is_active())
        .collect();
    // Stable, so equal rates keep insertion order.
    order.sort_by(|&a, &b| debts[b].annual_rate.total_cmp(&debts[a].annual_rate));

    let mut remaining = pool - total_minimum;
    for idx in order {
        if remaining <= 0.0 {
            break;
        }
        let headroom = (debts[idx].payoff() - payments[idx]).max(0.0);
        let extra = remaining.min(headroom);
        payments[idx] += extra;
        remaining -= extra;
    }

    DebtAllocation {
        payments,
        unallocated: remaining.max(0.0),
    }
}

/// Each active debt pays its own scheduled amount, capped at what retires it.
pub fn scheduled_debt_payments(debts: &[DebtPosition]) -> DebtAllocation {
    let payments = debts
        .iter()
        .map(|debt| {
            if debt.is_active() {
                debt.scheduled_payment.max(0.0).min(debt.payoff())
            } else {
                0.0
            }
        })
        .collect();
    DebtAllocation {
        payments,
        unallocated: 0.0,
    }
}
