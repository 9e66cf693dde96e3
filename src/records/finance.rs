use chrono::NaiveDate;

use super::{FieldValue, Record, date};
use crate::domain::DeskError;
use crate::loader::{FromRow, RawRow};

#[derive(Debug, Clone, PartialEq)]
pub struct FinanceExecutive {
    pub id: u32,
    pub name: String,
    pub company: String,
    pub department: String,
    pub budget: f64,
    pub spent: f64,
    pub status: String,
    pub appointed_on: NaiveDate,
}

impl FinanceExecutive {
    /// Share of the budget already spent, in percent.
    pub fn utilization(&self) -> f64 {
        if self.budget <= 0.0 {
            0.0
        } else {
            self.spent / self.budget * 100.0
        }
    }

    pub fn sample() -> Vec<Self> {
        let rows = [
            (1, "Aaron Blake", "Northwind Ltd", "Treasury", 250_000.0, 180_500.0, "Active", (2020, 2, 3)),
            (2, "Bianca Costa", "Contoso Bank", "Controlling", 400_000.0, 410_250.0, "Active", (2018, 7, 16)),
            (3, "Carlos Mendes", "Fabrikam Inc", "Accounting", 120_000.0, 64_000.0, "Active", (2021, 10, 1)),
            (4, "Dana Whitfield", "Tailspin Air", "Treasury", 310_000.0, 0.0, "Onboarding", (2024, 4, 22)),
            (5, "Emeka Obi", "Contoso Bank", "Procurement", 95_000.0, 91_200.0, "Active", (2019, 3, 11)),
            (6, "Fiona Grant", "Northwind Ltd", "Controlling", 180_000.0, 72_900.0, "Suspended", (2017, 9, 5)),
            (7, "Gustavo Lima", "Fabrikam Inc", "Procurement", 60_000.0, 58_800.0, "Active", (2022, 1, 17)),
            (8, "Helena Berg", "Tailspin Air", "Accounting", 140_000.0, 35_000.0, "Active", (2023, 6, 30)),
        ];
        rows.into_iter()
            .map(|(id, name, company, department, budget, spent, status, appointed)| FinanceExecutive {
                id,
                name: name.to_string(),
                company: company.to_string(),
                department: department.to_string(),
                budget,
                spent,
                status: status.to_string(),
                appointed_on: date(appointed.0, appointed.1, appointed.2),
            })
            .collect()
    }
}

impl Record for FinanceExecutive {
    type Id = u32;
    const KIND: &'static str = "Finance executives";

    fn id(&self) -> u32 {
        self.id
    }

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "company",
            "department",
            "budget",
            "spent",
            "utilization",
            "status",
            "appointed_on",
        ]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["name", "company", "department", "status"]
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value: FieldValue = match name {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "company" => self.company.as_str().into(),
            "department" => self.department.as_str().into(),
            "budget" => self.budget.into(),
            "spent" => self.spent.into(),
            "utilization" => self.utilization().into(),
            "status" => self.status.as_str().into(),
            "appointed_on" => self.appointed_on.into(),
            _ => return None,
        };
        Some(value)
    }
}

impl FromRow for FinanceExecutive {
    fn from_row(row: &RawRow<'_>) -> Result<Self, DeskError> {
        Ok(FinanceExecutive {
            id: row.integer("id")?,
            name: row.text("name")?,
            company: row.text("company")?,
            department: row.text("department")?,
            budget: row.decimal("budget")?,
            spent: row.decimal("spent")?,
            status: row.text("status")?,
            appointed_on: row.date("appointed_on")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_is_spent_share_of_budget() {
        let execs = FinanceExecutive::sample();
        assert!((execs[2].utilization() - 53.333).abs() < 0.01);
        assert!(execs[1].utilization() > 100.0);
    }

    #[test]
    fn zero_budget_has_zero_utilization() {
        let mut exec = FinanceExecutive::sample().remove(0);
        exec.budget = 0.0;
        assert_eq!(exec.utilization(), 0.0);
    }
}
