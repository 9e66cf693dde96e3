use chrono::NaiveDate;

use super::{FieldValue, Record, date};
use crate::domain::DeskError;
use crate::loader::{FromRow, RawRow};

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseLine {
    pub id: u32,
    pub description: String,
    pub category: String,
    pub submitted_by: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub status: String,
}

impl ExpenseLine {
    pub fn sample() -> Vec<Self> {
        let rows = [
            (1, "Client dinner", "Meals", "Amelia Hart", 182.40, (2024, 1, 9), "Reimbursed"),
            (2, "Train to Leeds", "Travel", "Ben Okafor", 96.00, (2024, 1, 11), "Approved"),
            (3, "Laptop stand", "Equipment", "Kofi Mensah", 45.99, (2024, 1, 19), "Pending"),
            (4, "Hotel Berlin", "Travel", "Chloe Martin", 412.00, (2024, 2, 2), "Approved"),
            (5, "Team offsite catering", "Meals", "Julia Rossi", 960.00, (2024, 2, 14), "Pending"),
            (6, "Compliance handbook", "Books", "Hana Sato", 38.50, (2024, 2, 20), "Reimbursed"),
            (7, "Taxi airport", "Travel", "Ivan Petrov", 64.20, (2024, 3, 1), "Rejected"),
            (8, "Monitor", "Equipment", "Daniel Reyes", 289.00, (2024, 3, 6), "Approved"),
            (9, "Conference ticket", "Training", "Farah Nasser", 750.00, (2024, 3, 21), "Pending"),
            (10, "Coffee beans", "Meals", "George Liu", 24.00, (2024, 4, 2), "Reimbursed"),
        ];
        rows.into_iter()
            .map(|(id, description, category, submitted_by, amount, d, status)| ExpenseLine {
                id,
                description: description.to_string(),
                category: category.to_string(),
                submitted_by: submitted_by.to_string(),
                amount,
                date: date(d.0, d.1, d.2),
                status: status.to_string(),
            })
            .collect()
    }
}

impl Record for ExpenseLine {
    type Id = u32;
    const KIND: &'static str = "Expenses";

    fn id(&self) -> u32 {
        self.id
    }

    fn columns() -> &'static [&'static str] {
        &["id", "description", "category", "submitted_by", "amount", "date", "status"]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["description", "category", "submitted_by"]
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value: FieldValue = match name {
            "id" => self.id.into(),
            "description" => self.description.as_str().into(),
            "category" => self.category.as_str().into(),
            "submitted_by" => self.submitted_by.as_str().into(),
            "amount" => self.amount.into(),
            "date" => self.date.into(),
            "status" => self.status.as_str().into(),
            _ => return None,
        };
        Some(value)
    }
}

impl FromRow for ExpenseLine {
    fn from_row(row: &RawRow<'_>) -> Result<Self, DeskError> {
        Ok(ExpenseLine {
            id: row.integer("id")?,
            description: row.text("description")?,
            category: row.text("category")?,
            submitted_by: row.text("submitted_by")?,
            amount: row.decimal("amount")?,
            date: row.date("date")?,
            status: row.text("status")?,
        })
    }
}
