use serde::Serialize;

use super::engine::{ReportOptions, build_report};
use super::error::LedgerError;
use super::types::{AllocationParams, Debt, Investment, ProjectionReport, RecordId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<T> {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: T,
}

/// In-memory session state: debts and investments keyed by generated ids, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    debts: Vec<Entry<Debt>>,
    investments: Vec<Entry<Investment>>,
    params: AllocationParams,
}

impl Ledger {
    pub fn new(params: AllocationParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &AllocationParams {
        &self.params
    }

    pub fn set_params(&mut self, params: AllocationParams) -> Result<(), LedgerError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn debts(&self) -> &[Entry<Debt>] {
        &self.debts
    }

    pub fn debt(&self, id: RecordId) -> Option<&Debt> {
        find(&self.debts, id).map(|idx| &self.debts[idx].record)
    }

    pub fn find_debt_by_name(&self, name: &str) -> Option<&Entry<Debt>> {
        self.debts.iter().find(|entry| entry.record.name == name)
    }

    pub fn add_debt(&mut self, debt: Debt) -> Result<RecordId, LedgerError> {
        debt.validate()?;
        let id = RecordId::generate();
        tracing::info!(%id, name = %debt.name, "debt added");
        self.debts.push(Entry { id, record: debt });
        Ok(id)
    }

    pub fn update_debt(&mut self, id: RecordId, debt: Debt) -> Result<(), LedgerError> {
        debt.validate()?;
        let idx = find(&self.debts, id).ok_or(LedgerError::NotFound(id))?;
        tracing::info!(%id, name = %debt.name, "debt updated");
        self.debts[idx].record = debt;
        Ok(())
    }

    pub fn remove_debt(&mut self, id: RecordId) -> Result<Debt, LedgerError> {
        let idx = find(&self.debts, id).ok_or(LedgerError::NotFound(id))?;
        tracing::info!(%id, "debt removed");
        Ok(self.debts.remove(idx).record)
    }

    pub fn investments(&self) -> &[Entry<Investment>] {
        &self.investments
    }

    pub fn investment(&self, id: RecordId) -> Option<&Investment> {
        find(&self.investments, id).map(|idx| &self.investments[idx].record)
    }

    pub fn find_investment_by_name(&self, name: &str) -> Option<&Entry<Investment>> {
        self.investments
            .iter()
            .find(|entry| entry.record.name == name)
    }

    pub fn add_investment(&mut self, investment: Investment) -> Result<RecordId, LedgerError> {
        investment.validate()?;
        let id = RecordId::generate();
        tracing::info!(%id, name = %investment.name, "investment added");
        self.investments.push(Entry {
            id,
            record: investment,
        });
        Ok(id)
    }

    pub fn update_investment(
        &mut self,
        id: RecordId,
        investment: Investment,
    ) -> Result<(), LedgerError> {
        investment.validate()?;
        let idx = find(&self.investments, id).ok_or(LedgerError::NotFound(id))?;
        tracing::info!(%id, name = %investment.name, "investment updated");
        self.investments[idx].record = investment;
        Ok(())
    }

    pub fn remove_investment(&mut self, id: RecordId) -> Result<Investment, LedgerError> {
        let idx = find(&self.investments, id).ok_or(LedgerError::NotFound(id))?;
        tracing::info!(%id, "investment removed");
        Ok(self.investments.remove(idx).record)
    }

    /// Recomputes the whole report from the current records; nothing is cached.
    pub fn project(&self, horizon_months: u32, options: &ReportOptions) -> ProjectionReport {
        let debts: Vec<Debt> = self.debts.iter().map(|e| e.record.clone()).collect();
        let investments: Vec<Investment> =
            self.investments.iter().map(|e| e.record.clone()).collect();

        let mut report = build_report(
            &debts,
            &investments,
            &self.params,
            horizon_months,
            options,
        );
        for (summary, entry) in report.debts.iter_mut().zip(&self.debts) {
            summary.id = Some(entry.id);
        }
        for (summary, entry) in report.investments.iter_mut().zip(&self.investments) {
            summary.id = Some(entry.id);
        }
        report
    }
}

fn find<T>(entries: &[Entry<T>], id: RecordId) -> Option<usize> {
    entries.iter().position(|entry| entry.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::InputError;
    use crate::core::recommendation::Benchmark;
    use chrono::NaiveDate;

    fn card() -> Debt {
        Debt {
            name: "Card".to_string(),
            principal: 2_500.0,
            annual_interest_rate: 19.9,
            minimum_payment: 75.0,
            current_payment: None,
        }
    }

    fn fund() -> Investment {
        Investment {
            name: "Index".to_string(),
            current_amount: 4_000.0,
            monthly_contribution: 150.0,
            annual_return_rate: 7.0,
        }
    }

    fn options() -> ReportOptions {
        ReportOptions {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
            benchmark: Benchmark::default(),
        }
    }

    #[test]
    fn add_update_remove_by_id() {
        let mut ledger = Ledger::default();
        let first = ledger.add_debt(card()).expect("valid debt");
        let mut loan = card();
        loan.name = "Loan".to_string();
        let second = ledger.add_debt(loan).expect("valid debt");
        assert_ne!(first, second);

        let mut edited = card();
        edited.minimum_payment = 120.0;
        ledger.update_debt(first, edited).expect("known id");
        assert_eq!(ledger.debt(first).map(|d| d.minimum_payment), Some(120.0));

        let removed = ledger.remove_debt(first).expect("known id");
        assert_eq!(removed.name, "Card");
        // The remaining record keeps its id after the removal ahead of it.
        assert_eq!(ledger.debts().len(), 1);
        assert_eq!(ledger.debts()[0].id, second);
        assert!(ledger.debt(second).is_some());
        assert_eq!(ledger.find_debt_by_name("Loan").map(|e| e.id), Some(second));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut ledger = Ledger::default();
        let ghost = RecordId::generate();
        assert_eq!(ledger.remove_debt(ghost), Err(LedgerError::NotFound(ghost)));
        assert_eq!(
            ledger.update_investment(ghost, fund()),
            Err(LedgerError::NotFound(ghost))
        );
    }

    #[test]
    fn invalid_records_are_rejected_before_storage() {
        let mut ledger = Ledger::default();
        let mut bad = card();
        bad.principal = 0.0;
        assert_eq!(
            ledger.add_debt(bad),
            Err(LedgerError::Invalid(InputError::NonPositivePrincipal))
        );
        let mut bad = fund();
        bad.monthly_contribution = -1.0;
        assert!(matches!(
            ledger.add_investment(bad),
            Err(LedgerError::Invalid(InputError::Negative { .. }))
        ));
        assert!(ledger.debts().is_empty());
        assert!(ledger.investments().is_empty());
    }

    #[test]
    fn set_params_validates_allocation() {
        let mut ledger = Ledger::default();
        let params = AllocationParams {
            monthly_budget: 500.0,
            debt_allocation: 600.0,
            ..AllocationParams::default()
        };
        assert!(matches!(
            ledger.set_params(params),
            Err(LedgerError::Invalid(InputError::AllocationExceedsBudget { .. }))
        ));
    }

    #[test]
    fn project_attaches_record_ids() {
        let mut ledger =
            Ledger::new(AllocationParams::new(800.0, 500.0).expect("valid params"));
        let debt_id = ledger.add_debt(card()).expect("valid debt");
        let fund_id = ledger.add_investment(fund()).expect("valid investment");
        let id = ledger.find_investment_by_name("Index").map(|e| e.id);
        assert_eq!(id, Some(fund_id));

        let report = ledger.project(12, &options());
        assert_eq!(report.rows.len(), 13);
        assert_eq!(report.debts[0].id, Some(debt_id));
        assert_eq!(report.investments[0].id, Some(fund_id));
        assert_eq!(ledger.debt(debt_id), Some(&card()));
    }
}
