use chrono::NaiveDate;

use super::{FieldValue, Record, date};
use crate::domain::DeskError;
use crate::loader::{FromRow, RawRow};

#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceOfficer {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub company: String,
    pub department: String,
    pub region: String,
    pub status: String,
    pub joined_on: NaiveDate,
    pub open_cases: u32,
}

impl ComplianceOfficer {
    pub fn sample() -> Vec<Self> {
        let rows = [
            (1, "Maya Brooks", "Northwind Ltd", "Audit", "EMEA", "Active", (2019, 4, 1), 3),
            (2, "Noah Adeyemi", "Contoso Bank", "Risk", "APAC", "Active", (2020, 9, 14), 7),
            (3, "Olivia Chen", "Northwind Ltd", "Legal", "EMEA", "On leave", (2018, 1, 22), 0),
            (4, "Pablo Ortega", "Fabrikam Inc", "Audit", "AMER", "Active", (2021, 6, 7), 5),
            (5, "Quinn Walsh", "Contoso Bank", "AML", "EMEA", "Inactive", (2017, 11, 30), 0),
            (6, "Rita Kowalski", "Fabrikam Inc", "Risk", "AMER", "Active", (2022, 2, 1), 2),
            (7, "Samir Haddad", "Tailspin Air", "AML", "APAC", "Active", (2023, 3, 13), 9),
            (8, "Tess Lindqvist", "Tailspin Air", "Legal", "EMEA", "Active", (2020, 5, 18), 1),
            (9, "Umar Farouk", "Contoso Bank", "Audit", "AMER", "On leave", (2019, 8, 26), 4),
            (10, "Vera Novak", "Northwind Ltd", "Risk", "APAC", "Active", (2024, 1, 3), 6),
        ];
        rows.into_iter()
            .map(|(id, name, company, department, region, status, joined, open_cases)| {
                ComplianceOfficer {
                    id,
                    email: format!("{}@{}.example", name.to_lowercase().replace(' ', "."), company_domain(company)),
                    name: name.to_string(),
                    company: company.to_string(),
                    department: department.to_string(),
                    region: region.to_string(),
                    status: status.to_string(),
                    joined_on: date(joined.0, joined.1, joined.2),
                    open_cases,
                }
            })
            .collect()
    }
}

fn company_domain(company: &str) -> String {
    company
        .split_whitespace()
        .next()
        .unwrap_or(company)
        .to_lowercase()
}

impl Record for ComplianceOfficer {
    type Id = u32;
    const KIND: &'static str = "Compliance officers";

    fn id(&self) -> u32 {
        self.id
    }

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "email",
            "company",
            "department",
            "region",
            "status",
            "joined_on",
            "open_cases",
        ]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["name", "email", "company", "department", "region"]
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value: FieldValue = match name {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "company" => self.company.as_str().into(),
            "department" => self.department.as_str().into(),
            "region" => self.region.as_str().into(),
            "status" => self.status.as_str().into(),
            "joined_on" => self.joined_on.into(),
            "open_cases" => self.open_cases.into(),
            _ => return None,
        };
        Some(value)
    }
}

impl FromRow for ComplianceOfficer {
    fn from_row(row: &RawRow<'_>) -> Result<Self, DeskError> {
        Ok(ComplianceOfficer {
            id: row.integer("id")?,
            name: row.text("name")?,
            email: row.text("email")?,
            company: row.text("company")?,
            department: row.text("department")?,
            region: row.text("region")?,
            status: row.text("status")?,
            joined_on: row.date("joined_on")?,
            open_cases: row.integer("open_cases")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_emails_are_derived_from_name_and_company() {
        let officer = &ComplianceOfficer::sample()[1];
        assert_eq!(officer.email, "noah.adeyemi@contoso.example");
    }
}
